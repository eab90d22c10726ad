// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelt key fails
//! at startup instead of being silently ignored.

use std::time::Duration;

use accessbot_core::recipients::{RecipientsMap, WILDCARD};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Top-level plugin configuration.
///
/// Exactly one of the platform sections (`discord`, `slack`, `msteams`) is
/// expected to be present; validation enforces this.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccessBotConfig {
    /// Access-request API connection settings.
    #[serde(default)]
    pub teleport: TeleportConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msteams: Option<MsTeamsConfig>,

    /// Role name (or `"*"`) to recipients.
    #[serde(default)]
    pub role_to_recipients: RecipientsMap,

    #[serde(default)]
    pub log: LogConfig,

    /// Watcher job tuning.
    #[serde(default)]
    pub watcher: WatcherSettings,
}

/// Which messaging platform a config targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Discord,
    Slack,
    MsTeams,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::MsTeams => "msteams",
        }
    }
}

impl AccessBotConfig {
    /// Every platform section that is present.
    pub fn configured_platforms(&self) -> Vec<Platform> {
        let mut platforms = Vec::new();
        if self.discord.is_some() {
            platforms.push(Platform::Discord);
        }
        if self.slack.is_some() {
            platforms.push(Platform::Slack);
        }
        if self.msteams.is_some() {
            platforms.push(Platform::MsTeams);
        }
        platforms
    }

    /// The single configured platform, if exactly one is present.
    pub fn platform(&self) -> Option<Platform> {
        match self.configured_platforms().as_slice() {
            [one] => Some(*one),
            _ => None,
        }
    }

    /// Legacy `recipients` list of the configured platform section.
    pub fn legacy_recipients(&self) -> &[String] {
        match self.platform() {
            Some(Platform::Discord) => self.discord.as_ref().map(|c| c.recipients.as_slice()),
            Some(Platform::Slack) => self.slack.as_ref().map(|c| c.recipients.as_slice()),
            Some(Platform::MsTeams) => self.msteams.as_ref().map(|c| c.recipients.as_slice()),
            None => None,
        }
        .unwrap_or_default()
    }

    /// Effective role mapping: `[role_to_recipients]`, or the legacy list under `"*"`.
    pub fn recipients(&self) -> RecipientsMap {
        if !self.role_to_recipients.is_empty() {
            return self.role_to_recipients.clone();
        }
        let mut map = RecipientsMap::new();
        let legacy = self.legacy_recipients();
        if !legacy.is_empty() {
            map.add(WILDCARD, legacy.iter().cloned());
        }
        map
    }
}

/// Access-request API connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TeleportConfig {
    /// Address of the auth or proxy service.
    #[serde(default = "default_teleport_addr")]
    pub addr: String,

    /// Path to the plugin identity file.
    #[serde(default)]
    pub identity: Option<String>,

    /// Reload the identity file when it changes on disk.
    #[serde(default)]
    pub refresh_identity: bool,

    /// Cluster name shown in notifications.
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Public web proxy URL. When set, notifications link to the request.
    #[serde(default)]
    pub web_proxy_url: Option<String>,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            addr: default_teleport_addr(),
            identity: None,
            refresh_identity: false,
            cluster_name: default_cluster_name(),
            web_proxy_url: None,
        }
    }
}

fn default_teleport_addr() -> String {
    "localhost:3025".to_string()
}

fn default_cluster_name() -> String {
    "teleport".to_string()
}

/// Discord bot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token.
    pub token: String,

    #[serde(default = "default_discord_api_url")]
    pub api_url: String,

    /// Legacy recipient list, used as `"*"` when `role_to_recipients` is absent.
    #[serde(default)]
    pub recipients: Vec<String>,
}

fn default_discord_api_url() -> String {
    "https://discord.com/api/v10".to_string()
}

/// Slack bot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlackConfig {
    /// Bot user OAuth token (`xoxb-...`).
    pub token: String,

    #[serde(default = "default_slack_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub recipients: Vec<String>,
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_string()
}

/// Microsoft Teams bot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MsTeamsConfig {
    /// Azure bot application (client) id.
    pub app_id: String,

    /// Azure bot client secret.
    pub app_secret: String,

    /// Azure AD tenant id.
    pub tenant_id: String,

    /// Bot Framework connector service URL.
    #[serde(default = "default_msteams_service_url")]
    pub service_url: String,

    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    #[serde(default = "default_login_url")]
    pub login_url: String,

    #[serde(default)]
    pub recipients: Vec<String>,
}

fn default_msteams_service_url() -> String {
    "https://smba.trafficmanager.net/teams".to_string()
}

fn default_graph_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_login_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `stderr`, `stdout`, or a file path.
    #[serde(default = "default_log_output")]
    pub output: String,

    /// trace, debug, info, warn or error.
    #[serde(default = "default_log_severity")]
    pub severity: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: default_log_output(),
            severity: default_log_severity(),
        }
    }
}

fn default_log_output() -> String {
    "stderr".to_string()
}

fn default_log_severity() -> String {
    "info".to_string()
}

/// Watcher job tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSettings {
    /// How long to wait for the event stream's initial sync.
    #[serde(default = "default_init_timeout_secs")]
    pub init_timeout_secs: u64,

    /// First delay between failed connection attempts.
    #[serde(default = "default_connect_backoff_base_ms")]
    pub connect_backoff_base_ms: u64,

    /// Upper bound on the delay between failed connection attempts.
    #[serde(default = "default_connect_backoff_max_secs")]
    pub connect_backoff_max_secs: u64,

    /// How long shutdown waits for in-flight handlers.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            init_timeout_secs: default_init_timeout_secs(),
            connect_backoff_base_ms: default_connect_backoff_base_ms(),
            connect_backoff_max_secs: default_connect_backoff_max_secs(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl WatcherSettings {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }

    pub fn connect_backoff_base(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_base_ms)
    }

    pub fn connect_backoff_max(&self) -> Duration {
        Duration::from_secs(self.connect_backoff_max_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

fn default_init_timeout_secs() -> u64 {
    5
}

fn default_connect_backoff_base_ms() -> u64 {
    500
}

fn default_connect_backoff_max_secs() -> u64 {
    30
}

fn default_drain_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_recipients_become_wildcard() {
        let config: AccessBotConfig = toml::from_str(
            r##"
[slack]
token = "xoxb-1"
recipients = ["#access", "ops@example.com"]
"##,
        )
        .unwrap();
        let map = config.recipients();
        assert_eq!(
            map.get("*"),
            Some(&["#access".to_string(), "ops@example.com".to_string()][..])
        );
    }

    #[test]
    fn role_to_recipients_takes_precedence() {
        let config: AccessBotConfig = toml::from_str(
            r##"
[discord]
token = "abc"

[role_to_recipients]
"*" = "1234"
dev = ["5678", "9012"]
"##,
        )
        .unwrap();
        assert_eq!(config.platform(), Some(Platform::Discord));
        let map = config.recipients();
        assert_eq!(map.get("*"), Some(&["1234".to_string()][..]));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn platform_is_none_when_ambiguous() {
        let config: AccessBotConfig = toml::from_str(
            r##"
[discord]
token = "abc"

[slack]
token = "xoxb-1"
"##,
        )
        .unwrap();
        assert_eq!(config.platform(), None);
        assert_eq!(config.configured_platforms().len(), 2);
    }

    #[test]
    fn watcher_settings_defaults() {
        let settings = WatcherSettings::default();
        assert_eq!(settings.init_timeout(), Duration::from_secs(5));
        assert_eq!(settings.connect_backoff_base(), Duration::from_millis(500));
        assert_eq!(settings.connect_backoff_max(), Duration::from_secs(30));
    }
}
