// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Microsoft identity platform, Graph and Bot Framework connector types.

use serde::{Deserialize, Serialize};

/// OAuth2 client-credentials token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Microsoft Graph user, as returned by `GET /users/{id-or-upn}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelAccount {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantInfo {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelData {
    pub tenant: TenantInfo,
}

/// Body of `POST /v3/conversations`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationParameters {
    pub is_group: bool,
    pub bot: ChannelAccount,
    pub members: Vec<ChannelAccount>,
    pub tenant_id: String,
    pub channel_data: ChannelData,
}

/// Response of conversation creation and of activity calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
}

/// Outgoing message activity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub text_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    pub fn markdown(text: String) -> Self {
        Self {
            kind: "message",
            text,
            text_format: "markdown",
            reply_to_id: None,
        }
    }

    pub fn reply(text: String, reply_to_id: &str) -> Self {
        Self {
            reply_to_id: Some(reply_to_id.to_string()),
            ..Self::markdown(text)
        }
    }
}
