// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`MessagingBot`] implementation for Microsoft Teams.

use accessbot_config::model::MsTeamsConfig;
use accessbot_core::error::{AccessBotError, Partial};
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{
    AccessRequestData, AccessReview, HealthStatus, MessageData, Recipient, SentMessages,
};
use accessbot_format::MessageFormatter;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::TeamsClient;
use crate::types::Activity;

/// Posts access request notifications as Bot Framework activities.
///
/// E-mail recipients get a 1:1 conversation with the bot; anything else is
/// taken to be a channel conversation id the bot is installed in.
pub struct MsTeamsBot {
    client: TeamsClient,
    formatter: MessageFormatter,
}

impl MsTeamsBot {
    pub fn new(
        config: &MsTeamsConfig,
        formatter: MessageFormatter,
    ) -> Result<Self, AccessBotError> {
        Ok(Self {
            client: TeamsClient::new(config)?,
            formatter,
        })
    }

    fn request_text(
        &self,
        request_id: &str,
        data: &AccessRequestData,
        reviews: &[AccessReview],
    ) -> Result<String, AccessBotError> {
        let mut text = self.formatter.request_message(request_id, data);
        if !reviews.is_empty() {
            text.push_str("\n*Reviews*:");
            for review in reviews {
                text.push('\n');
                text.push_str(&self.formatter.review_text(review)?);
            }
        }
        Ok(teams_markdown(&text))
    }
}

#[async_trait]
impl MessagingBot for MsTeamsBot {
    fn name(&self) -> &str {
        "msteams"
    }

    async fn check_health(&self) -> Result<HealthStatus, AccessBotError> {
        match self.client.authenticate().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn fetch_recipient(&self, name: &str) -> Result<Recipient, AccessBotError> {
        if !name.contains('@') {
            return Ok(Recipient::channel(name));
        }
        let user = self.client.graph_user(name).await?;
        let conversation_id = self.client.create_conversation(&user.id).await?;
        debug!(recipient = name, user_id = %user.id, "opened teams conversation");
        Ok(Recipient {
            name: name.to_string(),
            id: conversation_id,
            kind: "User".to_string(),
            data: Some(serde_json::json!({
                "user_id": user.id,
                "display_name": user.display_name,
            })),
        })
    }

    async fn broadcast(
        &self,
        recipients: &[Recipient],
        request_id: &str,
        data: &AccessRequestData,
    ) -> Partial<SentMessages> {
        let mut result = Partial::ok(SentMessages::new());
        let text = match self.request_text(request_id, data, &[]) {
            Ok(text) => text,
            Err(e) => {
                result.failures.push(e);
                return result;
            }
        };

        for recipient in recipients {
            match self
                .client
                .send_activity(&recipient.id, &Activity::markdown(text.clone()))
                .await
            {
                Ok(activity_id) => result.value.push(MessageData::new(&recipient.id, activity_id)),
                Err(e) => {
                    warn!(
                        request_id,
                        recipient = %recipient.name,
                        error = %e,
                        "failed to post teams message"
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
        let text = teams_markdown(&self.formatter.review_text(review)?);
        self.client
            .send_activity(&message.channel_id, &Activity::reply(text, &message.message_id))
            .await?;
        Ok(())
    }

    async fn update_messages(
        &self,
        request_id: &str,
        data: &AccessRequestData,
        messages: &[MessageData],
        reviews: &[AccessReview],
    ) -> Result<(), AccessBotError> {
        let text = self.request_text(request_id, data, reviews)?;
        let mut errors = Vec::new();
        for message in messages {
            let activity = Activity::markdown(text.clone());
            if let Err(e) = self
                .client
                .update_activity(&message.channel_id, &message.message_id, &activity)
                .await
            {
                warn!(
                    request_id,
                    conversation = %message.channel_id,
                    error = %e,
                    "failed to update teams message"
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

/// Teams markdown needs a blank line for a line break outside code blocks.
fn teams_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut in_fence = false;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str(if in_fence { "\n" } else { "\n\n" });
        }
        out.push_str(line);
        in_fence ^= line.matches("```").count() % 2 == 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_become_paragraphs() {
        assert_eq!(teams_markdown("a\nb"), "a\n\nb");
    }

    #[test]
    fn fenced_blocks_keep_single_newlines() {
        assert_eq!(
            teams_markdown("*Reason*: ```\nline one\nline two\n```\n*Status*"),
            "*Reason*: ```\nline one\nline two\n```\n\n*Status*"
        );
    }

    #[test]
    fn inline_fence_does_not_toggle() {
        assert_eq!(teams_markdown("```x```\ny"), "```x```\n\ny");
    }
}
