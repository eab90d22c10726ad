// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compare-and-swap updates of decoded plugin data.

use std::sync::Arc;
use std::time::Duration;

use accessbot_core::error::AccessBotError;
use accessbot_core::plugindata::PluginDataCodec;
use accessbot_core::traits::PluginDataStore;
use accessbot_core::types::GenericPluginData;
use accessbot_watcher::Backoff;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bounds on the compare-and-swap retry loop.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_base: Duration::from_millis(50),
            backoff_max: Duration::from_secs(2),
        }
    }
}

/// Outcome of a successful [`PluginDataAccess::modify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modified {
    /// The callback declined to change anything. Carries the current value.
    Unchanged(Option<GenericPluginData>),
    /// The record was written. Carries the previous and the new value.
    Updated {
        previous: Option<GenericPluginData>,
        current: GenericPluginData,
    },
}

/// Typed access to the plugin-data store.
#[derive(Clone)]
pub struct PluginDataAccess {
    store: Arc<dyn PluginDataStore>,
    codec: PluginDataCodec,
    retry: RetryPolicy,
}

impl PluginDataAccess {
    pub fn new(
        store: Arc<dyn PluginDataStore>,
        codec: PluginDataCodec,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            codec,
            retry,
        }
    }

    pub fn codec(&self) -> PluginDataCodec {
        self.codec
    }

    /// Current decoded record, `None` if the request was never seen.
    pub async fn get(&self, request_id: &str) -> Result<Option<GenericPluginData>, AccessBotError> {
        let map = self.store.get(request_id).await?;
        Ok(map.map(|m| self.codec.decode(&m)))
    }

    /// Read-modify-write with retries on lost races.
    ///
    /// `modify` sees the current value (`None` if absent) and returns the
    /// replacement, or `None` to leave the record alone. It may run several
    /// times, so it must not have side effects.
    pub async fn modify<F>(
        &self,
        request_id: &str,
        cancel: &CancellationToken,
        mut modify: F,
    ) -> Result<Modified, AccessBotError>
    where
        F: FnMut(Option<&GenericPluginData>) -> Option<GenericPluginData> + Send,
    {
        let mut backoff = Backoff::new(self.retry.backoff_base, self.retry.backoff_max);

        loop {
            if cancel.is_cancelled() {
                return Err(AccessBotError::Cancelled);
            }

            let raw = self.store.get(request_id).await?;
            let previous = raw.as_ref().map(|m| self.codec.decode(m));
            let Some(current) = modify(previous.as_ref()) else {
                return Ok(Modified::Unchanged(previous));
            };

            let encoded = self.codec.encode(&current);
            match self
                .store
                .compare_and_swap(request_id, raw.as_ref(), encoded)
                .await
            {
                Ok(()) => return Ok(Modified::Updated { previous, current }),
                Err(e) if e.is_compare_failed() => {
                    if backoff.attempts() + 1 >= self.retry.max_attempts {
                        return Err(e);
                    }
                    let delay = backoff.next_delay();
                    debug!(
                        request_id,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "plugin data changed concurrently, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(AccessBotError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
