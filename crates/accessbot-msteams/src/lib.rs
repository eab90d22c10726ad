// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Microsoft Teams messaging bot for accessbot.
//!
//! Authenticates with app client credentials, resolves e-mail recipients
//! through Microsoft Graph and posts through the Bot Framework connector.
//! Teams conversation ids contain characters the legacy plugin-data
//! encoding cannot carry, so this bot stores messages in the structured
//! format ([`MESSAGE_FORMAT`]).

pub mod bot;
pub mod client;
pub mod token;
pub mod types;

use accessbot_core::plugindata::MessageFormat;

pub use bot::MsTeamsBot;
pub use client::TeamsClient;
pub use token::TokenProvider;

pub(crate) const PLATFORM: &str = "msteams";

/// Plugin-data message encoding used with this bot.
pub const MESSAGE_FORMAT: MessageFormat = MessageFormat::Structured;
