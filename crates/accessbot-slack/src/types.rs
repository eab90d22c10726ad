// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slack Web API request and response types.

use serde::{Deserialize, Serialize};

/// Fields every Web API response carries.
///
/// Slack reports most failures as `200 OK` with `ok: false`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `chat.postMessage` body. Replies set `thread_ts`.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessage<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<&'a str>,
}

/// `chat.update` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessage<'a> {
    pub channel: &'a str,
    pub ts: &'a str,
    pub text: &'a str,
}

/// `chat.postMessage` / `chat.update` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupByEmailResponse {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// `auth.test` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTestResponse {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user: String,
}
