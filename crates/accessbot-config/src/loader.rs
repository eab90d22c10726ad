// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Lookup order, later layers overriding earlier ones: compiled defaults,
//! `/etc/accessbot/accessbot.toml`, `~/.config/accessbot/accessbot.toml`,
//! `./accessbot.toml`, then `ACCESSBOT_*` environment variables.

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AccessBotConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ACCESSBOT_";

/// Sections addressable from the environment, e.g. `ACCESSBOT_SLACK_TOKEN`.
const ENV_SECTIONS: &[&str] = &["teleport", "discord", "slack", "msteams", "log", "watcher"];

/// Config files consulted when no explicit path is given, lowest priority first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/accessbot/accessbot.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("accessbot/accessbot.toml"));
    }
    paths.push(PathBuf::from("accessbot.toml"));
    paths
}

/// Loads from the default file hierarchy plus environment overrides.
pub fn load_config() -> Result<AccessBotConfig, figment::Error> {
    build_figment().extract()
}

/// Loads a single file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<AccessBotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AccessBotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads from an in-memory TOML document. Environment is not consulted.
pub fn load_config_from_str(toml_content: &str) -> Result<AccessBotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AccessBotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// The unextracted default figment, for callers that inspect metadata.
pub fn build_figment() -> Figment {
    default_config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(AccessBotConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Maps `ACCESSBOT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `ACCESSBOT_TELEPORT_WEB_PROXY_URL` lands on `teleport.web_proxy_url`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    // figment passes the variable name through with its original case.
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("SLACK_TOKEN"), "slack.token");
        assert_eq!(map_env_key("TELEPORT_WEB_PROXY_URL"), "teleport.web_proxy_url");
        assert_eq!(map_env_key("MSTEAMS_APP_SECRET"), "msteams.app_secret");
        assert_eq!(map_env_key("WATCHER_INIT_TIMEOUT_SECS"), "watcher.init_timeout_secs");
        assert_eq!(map_env_key("LOG_SEVERITY"), "log.severity");
    }

    #[test]
    fn lowercase_env_keys_also_map() {
        assert_eq!(map_env_key("slack_token"), "slack.token");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("LOGGING_LEVEL"), "logging_level");
        assert_eq!(map_env_key("bogus"), "bogus");
    }

    #[test]
    fn default_paths_end_with_local_file() {
        let paths = default_config_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/accessbot/accessbot.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("accessbot.toml")));
    }
}
