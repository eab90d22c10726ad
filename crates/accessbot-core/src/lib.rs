// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the accessbot access-request notification plugins.
//!
//! This crate holds the data model, the error types, the capability traits
//! the plugins are composed from ([`EventSource`], [`MessagingBot`],
//! [`PluginDataStore`]), the flat-map plugin-data codec and the
//! role-to-recipient resolver.

pub mod error;
pub mod plugindata;
pub mod recipients;
pub mod traits;
pub mod types;

pub use error::{AccessBotError, Partial, WatchError};
pub use plugindata::{MessageFormat, PluginDataCodec};
pub use recipients::{RecipientSet, RecipientsMap, WILDCARD};
pub use traits::{EventSource, EventStream, MessagingBot, PluginDataStore};
pub use types::{
    AccessRequest, AccessRequestData, AccessReview, Event, GenericPluginData, HealthStatus,
    MessageData, PluginDataMap, Recipient, RequestState, ResolutionTag, SentMessages, WatchFilter,
};
