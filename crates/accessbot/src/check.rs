// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `accessbot check` command implementation.
//!
//! Verifies that the loaded configuration yields a working bot: the
//! platform credentials are accepted and every configured recipient
//! resolves.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use accessbot_config::AccessBotConfig;
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::HealthStatus;
use colored::Colorize;
use tracing::info;

use crate::bot::build_bot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(
        name: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
        started: Instant,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration: started.elapsed(),
        }
    }
}

/// Runs every check and prints a report. Returns false if any check failed.
pub async fn run_check(config: &AccessBotConfig, plain: bool) -> bool {
    let results = collect_checks(config).await;
    let use_color = !plain && std::io::stdout().is_terminal();
    print_report(&results, use_color);
    results.iter().all(|r| r.status != CheckStatus::Fail)
}

pub async fn collect_checks(config: &AccessBotConfig) -> Vec<CheckResult> {
    let mut results = vec![check_recipients_map(config)];

    let started = Instant::now();
    let built = match build_bot(config) {
        Ok(built) => built,
        Err(e) => {
            results.push(CheckResult::new("bot", CheckStatus::Fail, e.to_string(), started));
            return results;
        }
    };

    results.push(CheckResult::new(
        "plugin data",
        CheckStatus::Pass,
        format!("{:?} message encoding", built.codec.message_format()),
        started,
    ));

    let health = check_health(built.bot.as_ref()).await;
    let healthy = health.status != CheckStatus::Fail;
    results.push(health);
    if healthy {
        results.extend(check_recipients(built.bot.as_ref(), config).await);
    }
    results
}

fn check_recipients_map(config: &AccessBotConfig) -> CheckResult {
    let started = Instant::now();
    let map = config.recipients();
    let roles: Vec<&str> = map.iter().map(|(role, _)| role.as_str()).collect();
    CheckResult::new(
        "recipients map",
        CheckStatus::Pass,
        format!(
            "{} role(s) [{}], {} distinct recipient(s)",
            map.len(),
            roles.join(", "),
            map.all_recipients().len()
        ),
        started,
    )
}

async fn check_health(bot: &dyn MessagingBot) -> CheckResult {
    let started = Instant::now();
    let (status, message) = match bot.check_health().await {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "credentials accepted".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    info!(bot = bot.name(), ?status, "health check finished");
    CheckResult::new(bot.name(), status, message, started)
}

/// One result per configured recipient. Failures are warnings, since the
/// plugin skips unresolvable recipients at runtime.
async fn check_recipients(bot: &dyn MessagingBot, config: &AccessBotConfig) -> Vec<CheckResult> {
    let mut results = Vec::new();
    for name in config.recipients().all_recipients() {
        let started = Instant::now();
        let result = match bot.fetch_recipient(&name).await {
            Ok(recipient) => CheckResult::new(
                &name,
                CheckStatus::Pass,
                format!("{} {}", recipient.kind, recipient.id),
                started,
            ),
            Err(e) => CheckResult::new(&name, CheckStatus::Warn, e.to_string(), started),
        };
        results.push(result);
    }
    results
}

fn print_report(results: &[CheckResult], use_color: bool) {
    println!();
    println!("  accessbot check");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let line = match (result.status, use_color) {
            (CheckStatus::Pass, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✓".green(),
                result.name,
                result.message
            ),
            (CheckStatus::Warn, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "!".yellow(),
                result.name,
                result.message.yellow()
            ),
            (CheckStatus::Fail, true) => format!(
                "    {} {:<20} {} ({duration_ms}ms)",
                "✗".red(),
                result.name,
                result.message.red()
            ),
            (status, false) => {
                let tag = match status {
                    CheckStatus::Pass => "[OK]  ",
                    CheckStatus::Warn => "[WARN]",
                    CheckStatus::Fail => "[FAIL]",
                };
                format!(
                    "    {tag} {:<20} {} ({duration_ms}ms)",
                    result.name, result.message
                )
            }
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{line}");
    }

    println!();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recipients_map_is_summarised() {
        let config = accessbot_config::load_and_validate_str(
            "[discord]\ntoken = \"t\"\n[role_to_recipients]\n\"*\" = [\"1\", \"2\"]\ndev = \"1\"\n",
        )
        .unwrap();
        let result = check_recipients_map(&config);
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.message.starts_with("2 role(s)"), "got: {}", result.message);
        assert!(result.message.ends_with("2 distinct recipient(s)"), "got: {}", result.message);
    }

    #[tokio::test]
    async fn unconfigured_platform_fails() {
        let results = collect_checks(&AccessBotConfig::default()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].status, CheckStatus::Fail);
    }
}
