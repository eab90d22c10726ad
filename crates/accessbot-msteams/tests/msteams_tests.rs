// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MsTeamsBot against mocked identity, Graph and connector endpoints.

use accessbot_config::model::MsTeamsConfig;
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{HealthStatus, MessageData, Recipient, RequestState, ResolutionTag};
use accessbot_format::MessageFormatter;
use accessbot_msteams::MsTeamsBot;
use accessbot_test_utils::{pending_request, review};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";

fn bot(server: &MockServer) -> MsTeamsBot {
    let config = MsTeamsConfig {
        app_id: "app-1".into(),
        app_secret: "secret".into(),
        tenant_id: "tenant-1".into(),
        service_url: format!("{}/teams", server.uri()),
        graph_url: format!("{}/graph", server.uri()),
        login_url: server.uri(),
        recipients: Vec::new(),
    };
    MsTeamsBot::new(&config, MessageFormatter::new("prod", None)).unwrap()
}

async fn mount_tokens(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("graph.microsoft.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer", "expires_in": 3600, "access_token": "graph-token"
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("api.botframework.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer", "expires_in": 3600, "access_token": "bf-token"
        })))
        .mount(server)
        .await;
}

fn resource(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": id }))
}

#[tokio::test]
async fn health_check_fetches_connector_token() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    assert_eq!(bot(&server).check_health().await.unwrap(), HealthStatus::Healthy);
}

#[tokio::test]
async fn bad_credentials_are_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("AADSTS7000215: Invalid client secret"),
        )
        .mount(&server)
        .await;

    match bot(&server).check_health().await.unwrap() {
        HealthStatus::Unhealthy(reason) => assert!(reason.contains("AADSTS7000215")),
        other => panic!("expected unhealthy, got {other:?}"),
    }
}

#[tokio::test]
async fn email_recipient_opens_personal_conversation() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/graph/users/bob@example.com"))
        .and(header("authorization", "Bearer graph-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "aad-bob", "displayName": "Bob", "userPrincipalName": "bob@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/teams/v3/conversations"))
        .and(header("authorization", "Bearer bf-token"))
        .and(body_partial_json(serde_json::json!({
            "isGroup": false,
            "bot": {"id": "28:app-1"},
            "members": [{"id": "aad-bob"}],
            "tenantId": "tenant-1"
        })))
        .respond_with(resource("a:conv-bob"))
        .expect(1)
        .mount(&server)
        .await;

    let recipient = bot(&server).fetch_recipient("bob@example.com").await.unwrap();

    assert_eq!(recipient.id, "a:conv-bob");
    assert_eq!(recipient.kind, "User");
    assert_eq!(recipient.data.unwrap()["user_id"], "aad-bob");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/graph/users/ghost@example.com"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = bot(&server).fetch_recipient("ghost@example.com").await.unwrap_err();
    assert!(matches!(err, accessbot_core::error::AccessBotError::NotFound(_)));
}

#[tokio::test]
async fn broadcast_posts_markdown_activities() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("POST"))
        .and(path("/teams/v3/conversations/a:conv-bob/activities"))
        .and(body_partial_json(serde_json::json!({"type": "message", "textFormat": "markdown"})))
        .and(body_string_contains("req-1"))
        .respond_with(resource("act-1"))
        .expect(1)
        .mount(&server)
        .await;

    let recipient = Recipient {
        name: "bob@example.com".into(),
        id: "a:conv-bob".into(),
        kind: "User".into(),
        data: None,
    };
    let data = pending_request("req-1", &["dev"]).data();
    let (sent, failure) = bot(&server)
        .broadcast(&[recipient], "req-1", &data)
        .await
        .into_parts();

    assert!(failure.is_none());
    assert_eq!(sent, vec![MessageData::new("a:conv-bob", "act-1")]);
}

#[tokio::test]
async fn review_reply_targets_parent_activity() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("POST"))
        .and(path("/teams/v3/conversations/a:conv-bob/activities/act-1"))
        .and(body_partial_json(serde_json::json!({"replyToId": "act-1"})))
        .respond_with(resource("act-2"))
        .expect(1)
        .mount(&server)
        .await;

    bot(&server)
        .post_review_reply(
            &MessageData::new("a:conv-bob", "act-1"),
            &review("carol", RequestState::Approved, "ok"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_includes_status_and_reviews() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("PUT"))
        .and(path("/teams/v3/conversations/a:conv-bob/activities/act-1"))
        .and(body_string_contains("DENIED"))
        .and(body_string_contains("carol"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut data = pending_request("req-1", &["dev"]).data();
    data.resolution_tag = ResolutionTag::ResolvedDenied;
    let reviews = vec![review("carol", RequestState::Denied, "no")];

    bot(&server)
        .update_messages(
            "req-1",
            &data,
            &[MessageData::new("a:conv-bob", "act-1")],
            &reviews,
        )
        .await
        .unwrap();
}
