// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup from the `[log]` section.

use std::fs::OpenOptions;
use std::sync::Mutex;

use accessbot_config::model::LogConfig;
use accessbot_core::error::AccessBotError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Default filter directives for a severity: our crates at `severity`,
/// everything else at `warn` or quieter.
pub fn default_directives(severity: &str) -> String {
    let severity = severity.to_ascii_lowercase();
    if severity == "error" {
        "accessbot=error,error".to_string()
    } else {
        format!("accessbot={severity},warn")
    }
}

/// Where log lines go, and whether they may carry ANSI colours.
pub fn make_writer(output: &str) -> Result<(BoxMakeWriter, bool), AccessBotError> {
    match output {
        "" | "stderr" => Ok((BoxMakeWriter::new(std::io::stderr), true)),
        "stdout" => Ok((BoxMakeWriter::new(std::io::stdout), true)),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AccessBotError::Config(format!("cannot open log file {path}: {e}")))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `log.severity`.
pub fn init_tracing(log: &LogConfig) -> Result<(), AccessBotError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log.severity)));
    let (writer, ansi) = make_writer(&log.output)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| AccessBotError::Internal(format!("failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn directives_follow_severity() {
        assert_eq!(default_directives("DEBUG"), "accessbot=debug,warn");
        assert_eq!(default_directives("error"), "accessbot=error,error");
    }

    #[test]
    fn file_output_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accessbot.log");
        std::fs::write(&path, "first\n").unwrap();

        let (writer, ansi) = make_writer(path.to_str().unwrap()).unwrap();
        assert!(!ansi);
        writer.make_writer().write_all(b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn unwritable_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("accessbot.log");
        let err = make_writer(path.to_str().unwrap()).err().unwrap();
        assert!(matches!(err, AccessBotError::Config(_)));
    }
}
