// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for accessbot.
//!
//! - [`ScriptedEventSource`]: an event source whose connections, init
//!   behaviour and events are scripted by the test.
//! - [`MemoryPluginDataStore`]: an in-memory compare-and-swap store with
//!   injectable conflicts.
//! - [`MockBot`]: a messaging bot that records every call.

pub mod builders;
pub mod mock_bot;
pub mod scripted_source;
pub mod store;

pub use builders::{pending_request, review};
pub use mock_bot::{Broadcast, MockBot, Update};
pub use scripted_source::{InitBehavior, ScriptedEventSource, StreamHandle};
pub use store::MemoryPluginDataStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
