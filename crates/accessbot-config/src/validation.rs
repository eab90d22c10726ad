// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every check runs; the caller gets the full list of problems at once.

use accessbot_core::recipients::WILDCARD;

use crate::diagnostic::ConfigError;
use crate::model::{AccessBotConfig, Platform};

const SEVERITIES: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a loaded configuration.
pub fn validate_config(config: &AccessBotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_platform(config, &mut errors);
    validate_recipients(config, &mut errors);
    validate_teleport(config, &mut errors);
    validate_log(config, &mut errors);
    validate_watcher(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn require(errors: &mut Vec<ConfigError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ConfigError::validation(field, "must not be empty"));
    }
}

fn validate_platform(config: &AccessBotConfig, errors: &mut Vec<ConfigError>) {
    let platforms = config.configured_platforms();
    match platforms.len() {
        0 => errors.push(ConfigError::validation(
            "platform",
            "one of [discord], [slack] or [msteams] must be configured",
        )),
        1 => {}
        _ => {
            let names: Vec<String> = platforms.iter().map(Platform::to_string).collect();
            errors.push(ConfigError::validation(
                "platform",
                format!("only one platform may be configured, found {}", names.join(", ")),
            ));
        }
    }

    if let Some(discord) = &config.discord {
        require(errors, "discord.token", &discord.token);
        validate_url(errors, "discord.api_url", &discord.api_url);
    }
    if let Some(slack) = &config.slack {
        require(errors, "slack.token", &slack.token);
        validate_url(errors, "slack.api_url", &slack.api_url);
    }
    if let Some(teams) = &config.msteams {
        require(errors, "msteams.app_id", &teams.app_id);
        require(errors, "msteams.app_secret", &teams.app_secret);
        require(errors, "msteams.tenant_id", &teams.tenant_id);
        validate_url(errors, "msteams.service_url", &teams.service_url);
        validate_url(errors, "msteams.graph_url", &teams.graph_url);
        validate_url(errors, "msteams.login_url", &teams.login_url);
    }
}

fn validate_recipients(config: &AccessBotConfig, errors: &mut Vec<ConfigError>) {
    if config.platform().is_none() {
        return;
    }

    let has_mapping = !config.role_to_recipients.is_empty();
    let has_legacy = !config.legacy_recipients().is_empty();

    if has_mapping && has_legacy {
        errors.push(ConfigError::validation(
            "role_to_recipients",
            "cannot be combined with the platform `recipients` list; use one or the other",
        ));
        return;
    }

    let recipients = config.recipients();
    if recipients.is_empty() {
        errors.push(ConfigError::validation(
            "role_to_recipients",
            "at least one recipient must be configured",
        ));
    } else if !recipients.has_wildcard() {
        errors.push(ConfigError::validation(
            "role_to_recipients",
            format!("a non-empty `\"{WILDCARD}\"` entry is required"),
        ));
    }
}

fn validate_teleport(config: &AccessBotConfig, errors: &mut Vec<ConfigError>) {
    require(errors, "teleport.addr", &config.teleport.addr);
    if let Some(url) = &config.teleport.web_proxy_url {
        validate_url(errors, "teleport.web_proxy_url", url);
    }
}

fn validate_log(config: &AccessBotConfig, errors: &mut Vec<ConfigError>) {
    require(errors, "log.output", &config.log.output);
    let severity = config.log.severity.to_ascii_lowercase();
    if !SEVERITIES.contains(&severity.as_str()) {
        errors.push(ConfigError::validation(
            "log.severity",
            format!(
                "`{}` is not one of {}",
                config.log.severity,
                SEVERITIES.join(", ")
            ),
        ));
    }
}

fn validate_watcher(config: &AccessBotConfig, errors: &mut Vec<ConfigError>) {
    let watcher = &config.watcher;
    if watcher.init_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "watcher.init_timeout_secs",
            "must be greater than zero",
        ));
    }
    if watcher.connect_backoff_base_ms == 0 {
        errors.push(ConfigError::validation(
            "watcher.connect_backoff_base_ms",
            "must be greater than zero",
        ));
    }
    if watcher.connect_backoff_base() > watcher.connect_backoff_max() {
        errors.push(ConfigError::validation(
            "watcher.connect_backoff_max_secs",
            "must not be smaller than connect_backoff_base_ms",
        ));
    }
}

fn validate_url(errors: &mut Vec<ConfigError>, field: &str, url: &str) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::validation(
            field,
            format!("`{url}` must be an http:// or https:// URL"),
        ));
    }
}
