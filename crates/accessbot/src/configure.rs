// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample configurations printed by `accessbot configure`.

use accessbot_config::model::Platform;

const COMMON_HEADER: &str = r##"# accessbot configuration
# Save as /etc/accessbot/accessbot.toml or ./accessbot.toml.

[teleport]
addr = "teleport.example.com:443"
identity = "/var/lib/teleport/plugins/accessbot/auth_id"
refresh_identity = true
cluster_name = "teleport"
# Enables request links in notifications.
# web_proxy_url = "https://teleport.example.com"
"##;

const DISCORD: &str = r##"
[discord]
token = "<bot token>"

[role_to_recipients]
"*" = ["<default channel id>"]
"dev" = ["<dev channel id>"]
"##;

const SLACK: &str = r##"
[slack]
token = "xoxb-<bot token>"

[role_to_recipients]
"*" = "#access-requests"
"dev" = ["#dev-access", "lead@example.com"]
"##;

const MSTEAMS: &str = r##"
[msteams]
app_id = "<azure bot app id>"
app_secret = "<azure bot app secret>"
tenant_id = "<azure tenant id>"

[role_to_recipients]
"*" = "admin@example.com"
"dev" = ["dev-lead@example.com", "<channel conversation id>"]
"##;

const FOOTER: &str = r##"
[log]
output = "stderr" # or "stdout", or a file path
severity = "INFO"
"##;

/// A commented, valid sample configuration for `platform`.
pub fn sample_config(platform: Platform) -> String {
    let body = match platform {
        Platform::Discord => DISCORD,
        Platform::Slack => SLACK,
        Platform::MsTeams => MSTEAMS,
    };
    format!("{COMMON_HEADER}{body}{FOOTER}")
}
