// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessagingBot`] implementation for Discord.

use accessbot_config::model::DiscordConfig;
use accessbot_core::error::{AccessBotError, Partial};
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{
    AccessRequestData, AccessReview, HealthStatus, MessageData, Recipient, SentMessages,
};
use accessbot_format::MessageFormatter;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::DiscordClient;

/// Posts access request notifications to Discord channels.
///
/// Recipients are channel ids; there is no lookup step.
pub struct DiscordBot {
    client: DiscordClient,
    formatter: MessageFormatter,
}

impl DiscordBot {
    pub fn new(
        config: &DiscordConfig,
        formatter: MessageFormatter,
    ) -> Result<Self, AccessBotError> {
        let client = DiscordClient::new(&config.token, &config.api_url)?;
        Ok(Self { client, formatter })
    }
}

#[async_trait]
impl MessagingBot for DiscordBot {
    fn name(&self) -> &str {
        "discord"
    }

    async fn check_health(&self) -> Result<HealthStatus, AccessBotError> {
        match self.client.current_user().await {
            Ok(user) => {
                debug!(bot_user = %user.username, bot_id = %user.id, "discord token valid");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn fetch_recipient(&self, name: &str) -> Result<Recipient, AccessBotError> {
        if name.trim().is_empty() {
            return Err(AccessBotError::NotFound("empty discord channel id".into()));
        }
        Ok(Recipient::channel(name))
    }

    async fn broadcast(
        &self,
        recipients: &[Recipient],
        request_id: &str,
        data: &AccessRequestData,
    ) -> Partial<SentMessages> {
        let content = self.formatter.request_message(request_id, data);
        let mut result = Partial::ok(SentMessages::new());

        for recipient in recipients {
            match self
                .client
                .create_message(&recipient.id, content.clone(), None)
                .await
            {
                Ok(msg) => result.value.push(MessageData::new(msg.channel_id, msg.id)),
                Err(e) => {
                    warn!(
                        request_id,
                        channel = %recipient.id,
                        error = %e,
                        "failed to post discord message"
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
            .create_message(&message.channel_id, text, Some(&message.message_id))
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
        let content = self.formatter.request_message(request_id, data);
        let mut errors = Vec::new();
        for message in messages {
            if let Err(e) = self
                .client
                .edit_message(&message.channel_id, &message.message_id, content.clone())
                .await
            {
                warn!(
                    request_id,
                    channel = %message.channel_id,
                    error = %e,
                    "failed to edit discord message"
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
