// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by the watcher, the codec, the formatter and the bots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Flat string map persisted alongside each access request.
pub type PluginDataMap = HashMap<String, String>;

/// Notifications sent for one request, in broadcast order.
pub type SentMessages = Vec<MessageData>;

/// Health status reported by bot health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Bot is fully operational.
    Healthy,
    /// Bot is operational but experiencing issues.
    Degraded(String),
    /// Bot is not operational.
    Unhealthy(String),
}

/// State of an access request as reported by the event API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestState {
    Pending,
    Approved,
    Denied,
}

/// A single review applied to an access request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessReview {
    pub author: String,
    pub proposed_state: RequestState,
    #[serde(default)]
    pub reason: String,
    pub created: DateTime<Utc>,
}

/// An access request as delivered by the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub request_reason: String,
    pub state: RequestState,
    #[serde(default)]
    pub resolve_reason: String,
    #[serde(default)]
    pub suggested_reviewers: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<AccessReview>,
    pub created: DateTime<Utc>,
}

impl AccessRequest {
    /// Snapshot of the fields the plugins persist and render.
    ///
    /// Resolution and review count are left zeroed; those are owned by the
    /// plugin data, not by the request.
    pub fn data(&self) -> AccessRequestData {
        AccessRequestData {
            user: self.user.clone(),
            roles: self.roles.clone(),
            request_reason: self.request_reason.clone(),
            ..AccessRequestData::default()
        }
    }
}

/// Final outcome of a request as recorded in plugin data.
///
/// `Unresolved` is the zero value and persists as an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResolutionTag {
    #[default]
    Unresolved,
    ResolvedApproved,
    ResolvedDenied,
    ResolvedExpired,
}

impl ResolutionTag {
    /// Raw persisted value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "",
            Self::ResolvedApproved => "approved",
            Self::ResolvedDenied => "denied",
            Self::ResolvedExpired => "expired",
        }
    }

    /// Parses a persisted value. Anything unrecognised reads as `Unresolved`.
    pub fn from_persisted(value: &str) -> Self {
        match value {
            "approved" => Self::ResolvedApproved,
            "denied" => Self::ResolvedDenied,
            "expired" => Self::ResolvedExpired,
            _ => Self::Unresolved,
        }
    }

    /// Maps a request state to the tag it resolves to, if it is final.
    pub fn from_state(state: RequestState) -> Option<Self> {
        match state {
            RequestState::Pending => None,
            RequestState::Approved => Some(Self::ResolvedApproved),
            RequestState::Denied => Some(Self::ResolvedDenied),
        }
    }

    pub fn is_resolved(self) -> bool {
        self != Self::Unresolved
    }
}

/// Snapshot of a request's externally relevant state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequestData {
    pub user: String,
    pub roles: Vec<String>,
    pub request_reason: String,
    pub reviews_count: u32,
    pub resolution_tag: ResolutionTag,
    pub resolution_reason: String,
}

/// Identifies one previously sent notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageData {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageData {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// Everything a plugin persists about one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericPluginData {
    pub request: AccessRequestData,
    pub sent_messages: SentMessages,
}

/// A resolved notification target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Raw configured value (e-mail, channel name, channel id).
    pub name: String,
    /// Platform identifier messages are addressed to.
    pub id: String,
    /// Free-form tag such as `User` or `Channel`.
    pub kind: String,
    /// Platform-specific payload, only interpreted by the bot that produced it.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Recipient {
    /// A recipient whose platform id is the configured name.
    pub fn channel(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            kind: "Channel".to_string(),
            data: None,
        }
    }
}

/// An event delivered by the access-request event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A request was created or changed.
    Put(AccessRequest),
    /// A request was deleted (typically on expiry).
    Delete { request_id: String },
}

impl Event {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Put(req) => &req.id,
            Self::Delete { request_id } => request_id,
        }
    }
}

/// Server-side filter applied to a watch subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchFilter {
    /// Only deliver requests in this state. `None` delivers all.
    pub state: Option<RequestState>,
}

impl WatchFilter {
    /// The filter every notification plugin watches with.
    pub fn pending() -> Self {
        Self {
            state: Some(RequestState::Pending),
        }
    }
}
