// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord messaging bot for accessbot.
//!
//! Talks to the Discord REST API directly with a bot token. Notifications
//! are plain channel messages; review replies reference the original
//! message and status changes edit it in place.

pub mod bot;
pub mod client;
pub mod types;

pub use bot::DiscordBot;
pub use client::DiscordClient;
