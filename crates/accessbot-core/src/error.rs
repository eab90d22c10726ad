// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every accessbot crate.

use std::fmt;

use thiserror::Error;

/// Boxed error source carried by several variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across the capability traits and the request pipeline.
#[derive(Debug, Error)]
pub enum AccessBotError {
    /// Configuration errors (missing credentials, malformed values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Errors talking to the access-request API or the plugin-data store.
    #[error("access request api error: {message}")]
    Api {
        message: String,
        source: Option<BoxError>,
    },

    /// Errors returned by a messaging platform (HTTP failure, rejected payload).
    #[error("{platform} error: {message}")]
    Platform {
        platform: &'static str,
        message: String,
        source: Option<BoxError>,
    },

    /// A compare-and-swap on plugin data lost the race against another writer.
    #[error("plugin data for request {request_id} was modified concurrently")]
    CompareFailed { request_id: String },

    /// A requested object (recipient, request) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Message rendering failed.
    #[error("format error: {0}")]
    Format(String),

    /// Several independent operations failed.
    #[error("{} operations failed: {}", .errors.len(), AggregateDisplay(.errors))]
    Aggregate { errors: Vec<AccessBotError> },

    /// The owner cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AccessBotError {
    /// Shorthand for a platform error without a source.
    pub fn platform(platform: &'static str, message: impl Into<String>) -> Self {
        Self::Platform {
            platform,
            message: message.into(),
            source: None,
        }
    }

    /// Collapses a list of independent failures into one error.
    ///
    /// Returns `None` for an empty list and the error itself for a list of one,
    /// so callers can `if let Some(err) = AccessBotError::aggregate(errors)`.
    pub fn aggregate(mut errors: Vec<AccessBotError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate { errors }),
        }
    }

    /// Returns true if this error is a lost compare-and-swap race.
    pub fn is_compare_failed(&self) -> bool {
        matches!(self, Self::CompareFailed { .. })
    }
}

struct AggregateDisplay<'a>(&'a [AccessBotError]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// A value produced by an operation that may have partially failed.
///
/// `broadcast`-style operations attempt every target independently; the
/// successes land in `value` and every individual failure in `failures`.
#[derive(Debug)]
pub struct Partial<T> {
    pub value: T,
    pub failures: Vec<AccessBotError>,
}

impl<T> Partial<T> {
    /// A fully successful result.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            failures: Vec::new(),
        }
    }

    /// True when no target failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Splits into the partial value and the aggregate error, if any.
    pub fn into_parts(self) -> (T, Option<AccessBotError>) {
        (self.value, AccessBotError::aggregate(self.failures))
    }
}

/// Errors surfaced by an event stream.
///
/// The watcher loop classifies these to decide between reconnecting,
/// terminating cleanly, and terminating with an error.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Transient transport failure (connection refused, reset, unavailable).
    #[error("connection problem: {0}")]
    ConnectionProblem(String),

    /// The stream ended without being asked to.
    #[error("event stream closed unexpectedly")]
    Closed,

    /// The stream did not deliver its initial synchronization signal in time.
    #[error("timed out after {0:?} waiting for the event stream to initialize")]
    InitTimeout(std::time::Duration),

    /// The owner cancelled the watch.
    #[error("watch cancelled")]
    Cancelled,

    /// Anything else. Fatal for the watcher job.
    #[error("watch failed: {0}")]
    Other(BoxError),
}

impl WatchError {
    /// Errors that are handled by reconnecting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionProblem(_) | Self::Closed | Self::InitTimeout(_)
        )
    }

    /// Owner-initiated shutdown, which is not an error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
