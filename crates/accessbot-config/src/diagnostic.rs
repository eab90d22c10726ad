// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rich diagnostics for configuration errors.
//!
//! Figment errors are turned into [`ConfigError`] values that miette can
//! render with a source excerpt and a "did you mean" hint for misspelt keys.

#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(accessbot::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(accessbot::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(accessbot::config::missing_key),
        help("add `{key} = <value>` to accessbot.toml or set it via ACCESSBOT_*")
    )]
    MissingKey { key: String },

    /// A semantic check failed after deserialization.
    #[error("{field}: {message}")]
    #[diagnostic(code(accessbot::config::validation))]
    Validation { field: String, message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(accessbot::config::other))]
    Other(String),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// A TOML document the error may point into: `(display path, content)`.
pub type TomlSource = (String, String);

/// Converts every error carried by a figment error into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(&error, &path, field, sources);
                    ConfigError::UnknownKey {
                        key: qualified(&path, field),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: qualified(&path, field),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}"),
                    expected: expected.clone(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn qualified(path: &[String], field: &str) -> String {
    match path.last() {
        None => field.to_string(),
        Some(last) if last == field => path.join("."),
        Some(_) => format!("{}.{field}", path.join(".")),
    }
}

fn locate(
    error: &figment::Error,
    path: &[String],
    field: &str,
    sources: &[TomlSource],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .map(|source| match source {
            figment::Source::File(p) => p.display().to_string(),
            other => other.to_string(),
        });

    // Prefer the file figment blames; inline sources carry no file origin.
    let is_origin = |name: &str| {
        origin
            .as_deref()
            .is_some_and(|origin| origin == name || origin.ends_with(name))
    };
    let candidates = sources
        .iter()
        .filter(|(name, _)| is_origin(name.as_str()))
        .chain(sources.iter().filter(|(name, _)| !is_origin(name.as_str())));

    let section: Vec<String> = path
        .iter()
        .filter(|segment| segment.as_str() != field)
        .cloned()
        .collect();

    for (name, content) in candidates {
        if let Some(offset) = find_key_offset(content, &section, field) {
            return (
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(name, content.clone())),
            );
        }
    }
    (None, None)
}

/// Byte offset of `field` inside the `[section]` table (or the top level).
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let mut offset = 0;
    let mut in_section = section.is_empty();
    let header = format!("[{}]", section.join("."));

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            in_section = !section.is_empty() && trimmed.trim_end().starts_with(&header);
        } else if in_section {
            let bare = trimmed.trim_start_matches('"');
            if let Some(after) = bare.strip_prefix(field)
                && after
                    .trim_start_matches('"')
                    .trim_start()
                    .starts_with('=')
            {
                let quote = trimmed.len() - bare.len();
                return Some(offset + (line.len() - trimmed.len()) + quote);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest valid key above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Writes every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
