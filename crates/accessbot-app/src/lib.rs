// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition of the watcher job with the request-processing handler.

pub mod app;
pub mod plugin_data;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use accessbot_config::model::WatcherSettings;
use accessbot_core::error::AccessBotError;
use accessbot_core::traits::EventSource;
use accessbot_core::types::{HealthStatus, WatchFilter};
use accessbot_watcher::{WatcherConfig, WatcherJob};

pub use app::App;
pub use plugin_data::{Modified, PluginDataAccess, RetryPolicy};

/// Watcher timings from the `[watcher]` config section.
pub fn watcher_config(settings: &WatcherSettings) -> WatcherConfig {
    WatcherConfig {
        init_timeout: settings.init_timeout(),
        connect_backoff_base: settings.connect_backoff_base(),
        connect_backoff_max: settings.connect_backoff_max(),
    }
}

/// Runs a plugin until cancelled.
///
/// Checks the bot first, then watches pending requests. On the way out,
/// in-flight handlers get up to `drain_timeout` to finish.
pub async fn run_plugin(
    app: Arc<App>,
    source: Arc<dyn EventSource>,
    config: WatcherConfig,
    drain_timeout: Duration,
    cancel: CancellationToken,
) -> Result<(), AccessBotError> {
    let bot = app.bot().name().to_string();
    match app.bot().check_health().await? {
        HealthStatus::Healthy => info!(bot = %bot, "messaging platform reachable"),
        HealthStatus::Degraded(reason) => {
            warn!(bot = %bot, reason = %reason, "messaging platform degraded, starting anyway")
        }
        HealthStatus::Unhealthy(reason) => {
            return Err(AccessBotError::Platform {
                platform: "health",
                message: format!("{bot} is unhealthy: {reason}"),
                source: None,
            });
        }
    }

    let job = WatcherJob::new(source, WatchFilter::pending(), app, config);
    let result = job.run(cancel).await;

    if !job.drain(drain_timeout).await {
        warn!(in_flight = job.in_flight(), "exiting with event handlers still running");
    }

    result.map_err(|e| AccessBotError::Api {
        message: "access request watcher failed".to_string(),
        source: Some(Box::new(e)),
    })
}
