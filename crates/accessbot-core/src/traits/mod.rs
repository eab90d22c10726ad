// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams between the core and its collaborators.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod bot;
pub mod events;
pub mod store;

pub use bot::MessagingBot;
pub use events::{EventSource, EventStream};
pub use store::PluginDataStore;
