// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! accessbot - access request notifications for chat platforms.
//!
//! This is the binary entry point.

mod bot;
mod check;
mod configure;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use accessbot_config::model::Platform;
use accessbot_config::{AccessBotConfig, ConfigError};
use clap::{Parser, Subcommand, ValueEnum};

/// accessbot - access request notifications for chat platforms.
#[derive(Parser, Debug)]
#[command(name = "accessbot", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default search path.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and test the platform connection.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print a sample configuration.
    Configure {
        #[arg(long, value_enum)]
        platform: PlatformArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Discord,
    Slack,
    Msteams,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Discord => Platform::Discord,
            PlatformArg::Slack => Platform::Slack,
            PlatformArg::Msteams => Platform::MsTeams,
        }
    }
}

fn load(path: Option<&PathBuf>) -> Result<AccessBotConfig, Vec<ConfigError>> {
    match path {
        Some(path) => accessbot_config::load_and_validate_path(path),
        None => accessbot_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Configure { platform } => {
            print!("{}", configure::sample_config(platform.into()));
            ExitCode::SUCCESS
        }
        Commands::Check { plain } => {
            let config = match load(cli.config.as_ref()) {
                Ok(config) => config,
                Err(errors) => {
                    accessbot_config::render_errors(&errors);
                    return ExitCode::FAILURE;
                }
            };
            if let Err(e) = logging::init_tracing(&config.log) {
                eprintln!("accessbot: {e}");
                return ExitCode::FAILURE;
            }
            if check::run_check(&config, plain).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn configure_takes_platform() {
        let cli = Cli::try_parse_from(["accessbot", "configure", "--platform", "msteams"]).unwrap();
        match cli.command {
            Commands::Configure { platform } => {
                assert_eq!(Platform::from(platform), Platform::MsTeams)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["accessbot", "check", "--config", "/tmp/a.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.toml")));
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accessbot.toml");
        std::fs::write(&path, configure::sample_config(Platform::Slack)).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.platform(), Some(Platform::Slack));
    }
}
