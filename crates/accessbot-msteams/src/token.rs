// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-credential access tokens with per-scope caching.

use std::collections::HashMap;
use std::time::Duration;

use accessbot_core::error::AccessBotError;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::PLATFORM;
use crate::types::TokenResponse;

/// Scope for the Bot Framework connector.
pub const BOT_FRAMEWORK_SCOPE: &str = "https://api.botframework.com/.default";

/// Scope for Microsoft Graph.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Fetches and caches tokens from the Microsoft identity platform.
///
/// The lock is held across the refresh request so concurrent callers
/// wait for one fetch instead of each issuing their own.
#[derive(Debug)]
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    app_id: String,
    app_secret: String,
    cache: Mutex<HashMap<&'static str, CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        client: reqwest::Client,
        login_url: &str,
        tenant_id: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Self {
        Self {
            client,
            token_url: format!(
                "{}/{tenant_id}/oauth2/v2.0/token",
                login_url.trim_end_matches('/')
            ),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A valid bearer token for `scope`.
    pub async fn token(&self, scope: &'static str) -> Result<String, AccessBotError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(scope) {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.fetch(scope).await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(scope, expires_in = fresh.expires_in, "fetched access token");
        cache.insert(
            scope,
            CachedToken {
                value: fresh.access_token.clone(),
                refresh_at: Instant::now() + lifetime,
            },
        );
        Ok(fresh.access_token)
    }

    async fn fetch(&self, scope: &str) -> Result<TokenResponse, AccessBotError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.as_str()),
            ("scope", scope),
        ];
        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AccessBotError::Platform {
                platform: PLATFORM,
                message: format!("token request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AccessBotError::platform(
                PLATFORM,
                format!("token endpoint returned {status}: {body}"),
            ));
        }
        response.json().await.map_err(|e| AccessBotError::Platform {
            platform: PLATFORM,
            message: format!("failed to parse token response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> TokenProvider {
        TokenProvider::new(reqwest::Client::new(), &server.uri(), "tenant-1", "app", "secret")
    }

    fn token(value: &str, expires_in: u64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": expires_in,
            "access_token": value,
        }))
    }

    #[tokio::test]
    async fn tokens_are_cached_per_scope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("api.botframework.com"))
            .respond_with(token("bf-token", 3600))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("graph.microsoft.com"))
            .respond_with(token("graph-token", 3600))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server);
        assert_eq!(provider.token(BOT_FRAMEWORK_SCOPE).await.unwrap(), "bf-token");
        assert_eq!(provider.token(BOT_FRAMEWORK_SCOPE).await.unwrap(), "bf-token");
        assert_eq!(provider.token(GRAPH_SCOPE).await.unwrap(), "graph-token");
    }

    #[tokio::test]
    async fn short_lived_tokens_are_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(token("short", 30))
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server);
        provider.token(BOT_FRAMEWORK_SCOPE).await.unwrap();
        provider.token(BOT_FRAMEWORK_SCOPE).await.unwrap();
    }

    #[tokio::test]
    async fn rejected_credentials_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let err = provider(&server).token(GRAPH_SCOPE).await.unwrap_err();
        assert!(err.to_string().contains("invalid_client"));
    }
}
