// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Slack Web API.

use std::time::Duration;

use accessbot_core::error::AccessBotError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{
    AuthTestResponse, Envelope, LookupByEmailResponse, MessageResponse, PostMessage,
    UpdateMessage,
};

const PLATFORM: &str = "slack";

/// Slack's documented minimum wait after a 429 without `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl SlackClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self, AccessBotError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| AccessBotError::Config(format!("invalid slack token: {e}")))?;
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

    pub async fn auth_test(&self) -> Result<AuthTestResponse, AccessBotError> {
        let url = self.url("auth.test");
        self.call("auth.test", || self.client.post(&url)).await
    }

    pub async fn lookup_user_by_email(
        &self,
        email: &str,
    ) -> Result<LookupByEmailResponse, AccessBotError> {
        let url = self.url("users.lookupByEmail");
        self.call("users.lookupByEmail", || {
            self.client.get(&url).query(&[("email", email)])
        })
        .await
    }

    /// Posts to a channel, or into a thread when `thread_ts` is set.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<MessageResponse, AccessBotError> {
        let url = self.url("chat.postMessage");
        let body = PostMessage {
            channel,
            text,
            thread_ts,
        };
        self.call("chat.postMessage", || self.client.post(&url).json(&body))
            .await
    }

    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<MessageResponse, AccessBotError> {
        let url = self.url("chat.update");
        let body = UpdateMessage { channel, ts, text };
        self.call("chat.update", || self.client.post(&url).json(&body))
            .await
    }

    fn url(&self, api_method: &str) -> String {
        format!("{}/{api_method}", self.base_url)
    }

    /// Sends a request built by `build`, retrying once on rate limiting.
    async fn call<T, F>(&self, api_method: &str, build: F) -> Result<T, AccessBotError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        for attempt in 0..=self.max_retries {
            let response = build().send().await.map_err(|e| AccessBotError::Platform {
                platform: PLATFORM,
                message: format!("{api_method}: HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, api_method, attempt, "slack response received");

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                let delay = retry_after(response.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
                warn!(api_method, delay_ms = delay.as_millis() as u64, "rate limited, will retry");
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(AccessBotError::platform(
                    PLATFORM,
                    format!("{api_method}: API returned {status}: {body}"),
                ));
            }
            return parse_response(api_method, &body);
        }

        Err(AccessBotError::platform(
            PLATFORM,
            format!("{api_method} failed after retries"),
        ))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Checks the `ok` flag before decoding the method-specific fields.
pub(crate) fn parse_response<T: DeserializeOwned>(
    api_method: &str,
    body: &str,
) -> Result<T, AccessBotError> {
    let parse_err = |e: serde_json::Error| AccessBotError::Platform {
        platform: PLATFORM,
        message: format!("{api_method}: failed to parse response: {e}"),
        source: Some(Box::new(e)),
    };

    let envelope: Envelope = serde_json::from_str(body).map_err(parse_err)?;
    if !envelope.ok {
        let code = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
        return Err(AccessBotError::platform(PLATFORM, format!("{api_method}: {code}")));
    }
    serde_json::from_str(body).map_err(parse_err)
}
