// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Discord REST API.
//!
//! Provides [`DiscordClient`] which handles bot authentication, message
//! creation and edits, and a single retry on rate limiting.

use std::time::Duration;

use accessbot_core::error::AccessBotError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, ChannelMessage, CurrentUser, MessagePayload, MessageReference,
};

const PLATFORM: &str = "discord";

/// Fallback delay when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Thin wrapper around `reqwest` for the handful of endpoints the bot needs.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl DiscordClient {
    /// Creates a client authenticated with a bot token.
    pub fn new(token: &str, base_url: &str) -> Result<Self, AccessBotError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|e| AccessBotError::Config(format!("invalid discord token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AccessBotError::Platform {
                platform: PLATFORM,
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Returns the authenticated bot user.
    pub async fn current_user(&self) -> Result<CurrentUser, AccessBotError> {
        self.send::<(), _>(Method::GET, "/users/@me", None).await
    }

    /// Posts a message, optionally as a reply to `reply_to`.
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: String,
        reply_to: Option<&str>,
    ) -> Result<ChannelMessage, AccessBotError> {
        let payload = MessagePayload {
            content,
            message_reference: reply_to.map(|id| MessageReference {
                message_id: id.to_string(),
            }),
        };
        self.send(
            Method::POST,
            &format!("/channels/{channel_id}/messages"),
            Some(&payload),
        )
        .await
    }

    /// Replaces the content of an existing message.
    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: String,
    ) -> Result<ChannelMessage, AccessBotError> {
        let payload = MessagePayload {
            content,
            message_reference: None,
        };
        self.send(
            Method::PATCH,
            &format!("/channels/{channel_id}/messages/{message_id}"),
            Some(&payload),
        )
        .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AccessBotError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);

        for attempt in 0..=self.max_retries {
            let mut request = self.client.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await.map_err(|e| AccessBotError::Platform {
                platform: PLATFORM,
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, %method, path, attempt, "discord response received");

            if status.is_success() {
                return response.json::<T>().await.map_err(|e| AccessBotError::Platform {
                    platform: PLATFORM,
                    message: format!("failed to parse response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                let delay = retry_after(response.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
                warn!(path, delay_ms = delay.as_millis() as u64, "rate limited, will retry");
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Err(AccessBotError::platform(
            PLATFORM,
            format!("{method} {path} failed after retries"),
        ))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Maps a non-success response to a platform error, preferring Discord's own message.
pub(crate) fn api_error(status: StatusCode, body: &str) -> AccessBotError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => format!("Discord API error {} ({}): {}", status.as_u16(), err.code, err.message),
        Err(_) => format!("API returned {status}: {body}"),
    };
    AccessBotError::platform(PLATFORM, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_client(server: &MockServer) -> DiscordClient {
        DiscordClient::new("test-token", &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn create_message_sends_bot_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .and(header("authorization", "Bot test-token"))
            .and(body_json(serde_json::json!({"content": "hello"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "900", "channel_id": "123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let msg = test_client(&server)
            .await
            .create_message("123", "hello".into(), None)
            .await
            .unwrap();
        assert_eq!(msg.id, "900");
        assert_eq!(msg.channel_id, "123");
    }

    #[tokio::test]
    async fn reply_carries_message_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .and(body_json(serde_json::json!({
                "content": "review",
                "message_reference": {"message_id": "900"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "901", "channel_id": "123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let msg = test_client(&server)
            .await
            .create_message("123", "review".into(), Some("900"))
            .await
            .unwrap();
        assert_eq!(msg.id, "901");
    }

    #[tokio::test]
    async fn retries_once_on_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/channels/123/messages/900"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "0.01")
                    .set_body_json(serde_json::json!(
                        {"message": "You are being rate limited.", "code": 0}
                    )),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/channels/123/messages/900"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "900", "channel_id": "123"})),
            )
            .mount(&server)
            .await;

        let msg = test_client(&server)
            .await
            .edit_message("123", "900", "edited".into())
            .await
            .unwrap();
        assert_eq!(msg.id, "900");
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/404/messages"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!(
                        {"message": "Unknown Channel", "code": 10003}
                    )),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .await
            .create_message("404", "hello".into(), None)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown Channel"), "got: {msg}");
        assert!(msg.contains("10003"), "got: {msg}");
    }

    #[test]
    fn retry_after_parses_fractional_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, HeaderValue::from_static("1.5"));
        assert_eq!(retry_after(&headers), Some(Duration::from_millis(1500)));

        headers.insert(reqwest::header::RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), None);
    }
}
