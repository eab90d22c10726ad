// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-request event stream capability.

use async_trait::async_trait;

use crate::error::WatchError;
use crate::types::{Event, WatchFilter};

/// Something that can open filtered event subscriptions.
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Opens a new subscription.
    ///
    /// Transport failures should be reported as
    /// [`WatchError::ConnectionProblem`] so the caller retries.
    async fn watch(&self, filter: &WatchFilter) -> Result<Box<dyn EventStream>, WatchError>;
}

/// One open subscription. Only ever driven by a single task.
#[async_trait]
pub trait EventStream: Send {
    /// Resolves once the stream has delivered its initial synchronization signal.
    async fn wait_init(&mut self) -> Result<(), WatchError>;

    /// Next event in delivery order. End of stream is [`WatchError::Closed`].
    async fn next_event(&mut self) -> Result<Event, WatchError>;

    /// Releases the subscription.
    async fn close(&mut self);
}
