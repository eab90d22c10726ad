// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Microsoft Graph and the Bot Framework connector.

use std::sync::Arc;
use std::time::Duration;

use accessbot_config::model::MsTeamsConfig;
use accessbot_core::error::AccessBotError;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::PLATFORM;
use crate::token::{BOT_FRAMEWORK_SCOPE, GRAPH_SCOPE, TokenProvider};
use crate::types::{
    Activity, ChannelAccount, ChannelData, ConversationParameters, GraphUser, ResourceResponse,
    TenantInfo,
};

#[derive(Debug, Clone)]
pub struct TeamsClient {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    app_id: String,
    tenant_id: String,
    service_url: String,
    graph_url: String,
}

impl TeamsClient {
    pub fn new(config: &MsTeamsConfig) -> Result<Self, AccessBotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AccessBotError::Platform {
                platform: PLATFORM,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let tokens = TokenProvider::new(
            client.clone(),
            &config.login_url,
            &config.tenant_id,
            &config.app_id,
            &config.app_secret,
        );

        Ok(Self {
            client,
            tokens: Arc::new(tokens),
            app_id: config.app_id.clone(),
            tenant_id: config.tenant_id.clone(),
            service_url: config.service_url.clone(),
            graph_url: config.graph_url.clone(),
        })
    }

    /// Fetches a bot framework token, proving the app credentials work.
    pub async fn authenticate(&self) -> Result<(), AccessBotError> {
        self.tokens.token(BOT_FRAMEWORK_SCOPE).await.map(|_| ())
    }

    /// Looks up an Azure AD user by e-mail or user principal name.
    pub async fn graph_user(&self, email: &str) -> Result<GraphUser, AccessBotError> {
        let url = endpoint(&self.graph_url, &["users", email])?;
        self.send::<(), _>(GRAPH_SCOPE, Method::GET, url, None)
            .await
            .map_err(|e| match e {
                AccessBotError::NotFound(_) => {
                    AccessBotError::NotFound(format!("teams user {email}"))
                }
                other => other,
            })
    }

    /// Opens (or reuses) the 1:1 conversation between the bot and a user.
    pub async fn create_conversation(&self, user_id: &str) -> Result<String, AccessBotError> {
        let url = endpoint(&self.service_url, &["v3", "conversations"])?;
        let params = ConversationParameters {
            is_group: false,
            bot: ChannelAccount {
                id: format!("28:{}", self.app_id),
            },
            members: vec![ChannelAccount {
                id: user_id.to_string(),
            }],
            tenant_id: self.tenant_id.clone(),
            channel_data: ChannelData {
                tenant: TenantInfo {
                    id: self.tenant_id.clone(),
                },
            },
        };
        let created: ResourceResponse = self
            .send(BOT_FRAMEWORK_SCOPE, Method::POST, url, Some(&params))
            .await?;
        Ok(created.id)
    }

    /// Posts a new activity, or a reply when the activity names one.
    pub async fn send_activity(
        &self,
        conversation_id: &str,
        activity: &Activity,
    ) -> Result<String, AccessBotError> {
        let url = match &activity.reply_to_id {
            Some(parent) => endpoint(
                &self.service_url,
                &["v3", "conversations", conversation_id, "activities", parent.as_str()],
            )?,
            None => endpoint(
                &self.service_url,
                &["v3", "conversations", conversation_id, "activities"],
            )?,
        };
        let sent: ResourceResponse = self
            .send(BOT_FRAMEWORK_SCOPE, Method::POST, url, Some(activity))
            .await?;
        Ok(sent.id)
    }

    pub async fn update_activity(
        &self,
        conversation_id: &str,
        activity_id: &str,
        activity: &Activity,
    ) -> Result<(), AccessBotError> {
        let url = endpoint(
            &self.service_url,
            &["v3", "conversations", conversation_id, "activities", activity_id],
        )?;
        let _: serde_json::Value = self
            .send(BOT_FRAMEWORK_SCOPE, Method::PUT, url, Some(activity))
            .await?;
        Ok(())
    }

    async fn send<B, T>(
        &self,
        scope: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, AccessBotError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.tokens.token(scope).await?;
        let mut request = self.client.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| AccessBotError::Platform {
            platform: PLATFORM,
            message: format!("HTTP request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(status = %status, %method, path = url.path(), "teams response received");

        if status == StatusCode::NOT_FOUND {
            return Err(AccessBotError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AccessBotError::platform(
                PLATFORM,
                format!("{method} {} returned {status}: {body}", url.path()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| AccessBotError::Platform {
            platform: PLATFORM,
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        // Updates may answer with an empty body.
        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(bytes).map_err(|e| AccessBotError::Platform {
            platform: PLATFORM,
            message: format!("failed to parse response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

/// Appends percent-encoded path segments to a base URL.
///
/// Conversation ids carry `:` and `;`, and user principal names carry `@`,
/// so they are never spliced into the URL as raw text.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, AccessBotError> {
    let mut url = Url::parse(base)
        .map_err(|e| AccessBotError::Config(format!("invalid msteams url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| AccessBotError::Config(format!("msteams url {base} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let url =
            endpoint("https://smba.trafficmanager.net/teams", &["v3", "conversations"]).unwrap();
        assert_eq!(url.as_str(), "https://smba.trafficmanager.net/teams/v3/conversations");

        let url = endpoint("https://smba.trafficmanager.net/teams/", &["v3"]).unwrap();
        assert_eq!(url.as_str(), "https://smba.trafficmanager.net/teams/v3");
    }

    #[test]
    fn endpoint_escapes_segments() {
        let url = endpoint("http://localhost:8080", &["users", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/users/a%2Fb%20c");
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(endpoint("not a url", &["v3"]).is_err());
    }
}
