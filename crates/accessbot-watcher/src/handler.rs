// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use accessbot_core::error::AccessBotError;
use accessbot_core::types::Event;

/// Processes one event. Invoked concurrently, once per delivered event.
///
/// The token is the watcher's own; handlers that must stop on shutdown
/// should observe it.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, cancel: CancellationToken, event: Event) -> Result<(), AccessBotError>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(CancellationToken, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), AccessBotError>> + Send + 'static,
{
    async fn handle(&self, cancel: CancellationToken, event: Event) -> Result<(), AccessBotError> {
        (self)(cancel, event).await
    }
}
