// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and validation.

use std::path::Path;

use accessbot_config::diagnostic::ConfigError;
use accessbot_config::{
    AccessBotConfig, Platform, load_and_validate_path, load_and_validate_str, load_config_from_path,
    load_config_from_str,
};
use figment::Jail;

#[test]
fn full_msteams_config_loads() {
    let toml = r##"
[teleport]
addr = "teleport.example.com:443"
identity = "/var/lib/accessbot/identity"
refresh_identity = true
cluster_name = "prod"
web_proxy_url = "https://teleport.example.com"

[msteams]
app_id = "00000000-0000-0000-0000-000000000001"
app_secret = "s3cret"
tenant_id = "00000000-0000-0000-0000-000000000002"

[role_to_recipients]
"*" = "ops@example.com"
dev = ["dev-lead@example.com", "dev-channel"]

[log]
output = "/var/log/accessbot.log"
severity = "debug"

[watcher]
init_timeout_secs = 15
"##;

    let config = load_and_validate_str(toml).expect("config should validate");
    assert_eq!(config.platform(), Some(Platform::MsTeams));
    assert_eq!(config.teleport.cluster_name, "prod");
    assert!(config.teleport.refresh_identity);
    let teams = config.msteams.as_ref().unwrap();
    assert_eq!(teams.graph_url, "https://graph.microsoft.com/v1.0");
    assert_eq!(teams.login_url, "https://login.microsoftonline.com");
    assert_eq!(config.recipients().get("dev").map(<[String]>::len), Some(2));
    assert_eq!(config.watcher.init_timeout_secs, 15);
    assert_eq!(config.watcher.drain_timeout_secs, 10);
}

#[test]
fn defaults_are_sensible() {
    let config = AccessBotConfig::default();
    assert_eq!(config.teleport.addr, "localhost:3025");
    assert_eq!(config.teleport.cluster_name, "teleport");
    assert!(config.teleport.web_proxy_url.is_none());
    assert_eq!(config.log.output, "stderr");
    assert_eq!(config.log.severity, "info");
    assert!(config.configured_platforms().is_empty());
}

#[test]
fn unknown_key_suggests_correction() {
    let toml = r##"
[slack]
tokn = "xoxb-1"
"##;
    let errors = load_and_validate_str(toml).unwrap_err();
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, span, ..
            } => Some((key.clone(), suggestion.clone(), *span)),
            _ => None,
        })
        .expect("expected an unknown key error");
    assert!(unknown.0.ends_with("tokn"), "got key {}", unknown.0);
    assert_eq!(unknown.1.as_deref(), Some("token"));
    let span = unknown.2.expect("span should point into the inline source");
    assert_eq!(&toml[span.offset()..span.offset() + span.len()], "tokn");
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(matches!(
        errors[0],
        ConfigError::UnknownKey { ref key, .. } if key.contains("telegram")
    ));
}

#[test]
fn wrong_type_is_reported() {
    let toml = r##"
[watcher]
init_timeout_secs = "five"
"##;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        matches!(
            errors[0],
            ConfigError::InvalidType { ref key, .. } if key.contains("init_timeout_secs")
        ),
        "got {:?}",
        errors
    );
}

#[test]
fn missing_credential_field_is_reported() {
    let errors = load_and_validate_str("[discord]\nrecipients = [\"1\"]\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::MissingKey { ref key } if key.contains("token")));
}

#[test]
fn validation_errors_are_all_returned() {
    let toml = r##"
[discord]
token = ""

[slack]
token = "xoxb-1"
"##;
    let errors = load_and_validate_str(toml).unwrap_err();
    let text: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert!(text.iter().any(|t| t.starts_with("platform:")), "{text:?}");
    assert!(text.iter().any(|t| t.starts_with("discord.token:")), "{text:?}");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = load_config_from_path(Path::new("/nonexistent/accessbot.toml")).unwrap();
    assert!(config.configured_platforms().is_empty());
    let errors = load_and_validate_path(Path::new("/nonexistent/accessbot.toml")).unwrap_err();
    assert!(errors[0].to_string().starts_with("platform:"));
}

#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "accessbot.toml",
            r##"
[slack]
token = "xoxb-from-file"
recipients = ["#access"]

[teleport]
cluster_name = "file"
"##,
        )?;
        jail.set_env("ACCESSBOT_SLACK_TOKEN", "xoxb-from-env");
        jail.set_env("ACCESSBOT_TELEPORT_WEB_PROXY_URL", "https://proxy.example.com");
        jail.set_env("ACCESSBOT_WATCHER_DRAIN_TIMEOUT_SECS", "3");

        let config = load_and_validate_path(Path::new("accessbot.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.slack.as_ref().unwrap().token, "xoxb-from-env");
        assert_eq!(config.teleport.cluster_name, "file");
        assert_eq!(
            config.teleport.web_proxy_url.as_deref(),
            Some("https://proxy.example.com")
        );
        assert_eq!(config.watcher.drain_timeout_secs, 3);
        Ok(())
    });
}

#[test]
fn env_log_severity_applies_without_section_in_file() {
    Jail::expect_with(|jail| {
        jail.create_file("accessbot.toml", "[discord]\ntoken = \"t\"\nrecipients = [\"1\"]\n")?;
        jail.set_env("ACCESSBOT_LOG_SEVERITY", "debug");

        let config = load_and_validate_path(Path::new("accessbot.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.log.severity, "debug");
        assert_eq!(config.discord.as_ref().unwrap().token, "t");
        Ok(())
    });
}

#[test]
fn inline_loading_ignores_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("ACCESSBOT_LOG_SEVERITY", "error");
        let config = load_config_from_str("").map_err(|e| e.to_string())?;
        assert_eq!(config.log.severity, "info");
        Ok(())
    });
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "slack.tokn".to_string(),
        suggestion: Some("token".to_string()),
        valid_keys: "token, api_url, recipients".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().unwrap().to_string();
    assert!(help.contains("did you mean `token`"), "got {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .unwrap();
    assert!(buf.contains("slack.tokn"));
}
