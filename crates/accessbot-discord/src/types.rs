// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord REST API request and response types.

use serde::{Deserialize, Serialize};

/// Body of a create or edit message call.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

/// Points a reply at an earlier message in the same channel.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReference {
    pub message_id: String,
}

/// The subset of a Discord message object we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMessage {
    pub id: String,
    pub channel_id: String,
}

/// `GET /users/@me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Discord's JSON error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: u64,
    pub message: String,
}
