// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slack messaging bot for accessbot.

pub mod bot;
pub mod client;
pub mod types;

pub use bot::SlackBot;
pub use client::SlackClient;
