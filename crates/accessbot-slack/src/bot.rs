// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessagingBot`] implementation for Slack.

use accessbot_config::model::SlackConfig;
use accessbot_core::error::{AccessBotError, Partial};
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{
    AccessRequestData, AccessReview, HealthStatus, MessageData, Recipient, SentMessages,
};
use accessbot_format::MessageFormatter;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::SlackClient;

/// Posts access request notifications to Slack channels and direct messages.
///
/// Recipients that look like e-mail addresses are looked up as users and
/// messaged directly; anything else is used as a channel name or id.
pub struct SlackBot {
    client: SlackClient,
    formatter: MessageFormatter,
}

impl SlackBot {
    pub fn new(config: &SlackConfig, formatter: MessageFormatter) -> Result<Self, AccessBotError> {
        let client = SlackClient::new(&config.token, &config.api_url)?;
        Ok(Self { client, formatter })
    }
}

#[async_trait]
impl MessagingBot for SlackBot {
    fn name(&self) -> &str {
        "slack"
    }

    async fn check_health(&self) -> Result<HealthStatus, AccessBotError> {
        match self.client.auth_test().await {
            Ok(auth) => {
                debug!(team = %auth.team, user = %auth.user, "slack token valid");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn fetch_recipient(&self, name: &str) -> Result<Recipient, AccessBotError> {
        if !name.contains('@') {
            return Ok(Recipient::channel(name));
        }
        let found = self.client.lookup_user_by_email(name).await?;
        Ok(Recipient {
            name: name.to_string(),
            id: found.user.id,
            kind: "User".to_string(),
            data: None,
        })
    }

    async fn broadcast(
        &self,
        recipients: &[Recipient],
        request_id: &str,
        data: &AccessRequestData,
    ) -> Partial<SentMessages> {
        let text = self.formatter.request_message(request_id, data);
        let mut result = Partial::ok(SentMessages::new());

        for recipient in recipients {
            match self.client.post_message(&recipient.id, &text, None).await {
                // Direct messages come back with the DM channel id, not the user id.
                Ok(msg) => result.value.push(MessageData::new(msg.channel, msg.ts)),
                Err(e) => {
                    warn!(
                        request_id,
                        recipient = %recipient.name,
                        error = %e,
                        "failed to post slack message"
                    );
                    result.failures.push(e);
                }
            }
        }
        result
    }

    async fn post_review_reply(
        &self,
        message: &MessageData,
        review: &AccessReview,
    ) -> Result<(), AccessBotError> {
        let text = self.formatter.review_text(review)?;
        self.client
            .post_message(&message.channel_id, &text, Some(&message.message_id))
            .await?;
        Ok(())
    }

    async fn update_messages(
        &self,
        request_id: &str,
        data: &AccessRequestData,
        messages: &[MessageData],
        _reviews: &[AccessReview],
    ) -> Result<(), AccessBotError> {
        let text = self.formatter.request_message(request_id, data);
        let mut errors = Vec::new();
        for message in messages {
            if let Err(e) = self
                .client
                .update_message(&message.channel_id, &message.message_id, &text)
                .await
            {
                warn!(
                    request_id,
                    channel = %message.channel_id,
                    error = %e,
                    "failed to update slack message"
                );
                errors.push(e);
            }
        }
        match AccessBotError::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
