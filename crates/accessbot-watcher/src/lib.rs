// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher job for the access request event stream.
//!
//! [`WatcherJob`] keeps one subscription alive, reconnecting on transient
//! failures, and hands every event to an [`EventHandler`] on its own task.
//! Readiness is published through [`Readiness`] and is false whenever the
//! job is between syncs. A running job also stops on SIGINT or SIGTERM.

pub mod backoff;
pub mod handler;
pub mod job;
pub mod shutdown;

pub use backoff::Backoff;
pub use handler::EventHandler;
pub use job::{JobState, Readiness, WatcherConfig, WatcherJob};
pub use shutdown::cancel_on_signal;
