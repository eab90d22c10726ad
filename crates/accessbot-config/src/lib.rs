// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the accessbot plugins.
//!
//! TOML files are layered with `ACCESSBOT_*` environment overrides, checked
//! with `deny_unknown_fields`, then validated semantically. Failures come back
//! as a list of miette diagnostics with typo suggestions.
//!
//! ```no_run
//! use accessbot_config::{load_and_validate, render_errors};
//!
//! match load_and_validate() {
//!     Ok(config) => println!("cluster: {}", config.teleport.cluster_name),
//!     Err(errors) => render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AccessBotConfig, Platform};

/// Loads from the default file hierarchy and validates.
pub fn load_and_validate() -> Result<AccessBotConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_default_sources)
}

/// Loads a single file (plus environment overrides) and validates.
pub fn load_and_validate_path(path: &Path) -> Result<AccessBotConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads an in-memory TOML document and validates.
pub fn load_and_validate_str(toml_content: &str) -> Result<AccessBotConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<AccessBotConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<diagnostic::TomlSource>,
) -> Result<AccessBotConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn read_source(path: &Path) -> Option<diagnostic::TomlSource> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (path.display().to_string(), content))
}

fn collect_default_sources() -> Vec<diagnostic::TomlSource> {
    loader::default_config_paths()
        .iter()
        .filter_map(|path| {
            let absolute = if path.is_relative() {
                std::env::current_dir().map(|d| d.join(path)).ok()?
            } else {
                path.clone()
            };
            read_source(&absolute)
        })
        .collect()
}
