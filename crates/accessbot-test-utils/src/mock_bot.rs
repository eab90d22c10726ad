// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging bot for deterministic testing.
//!
//! `MockBot` resolves every recipient to a channel of the same name, posts
//! to it with a sequential message id, and records all calls for assertion.
//! Individual recipients can be made unresolvable or unreachable.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use accessbot_core::error::{AccessBotError, Partial};
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{
    AccessRequestData, AccessReview, HealthStatus, MessageData, Recipient, SentMessages,
};

use crate::lock;

/// One recorded `broadcast` call.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub recipients: Vec<Recipient>,
    pub request_id: String,
    pub data: AccessRequestData,
}

/// One recorded `update_messages` call.
#[derive(Debug, Clone)]
pub struct Update {
    pub request_id: String,
    pub data: AccessRequestData,
    pub messages: Vec<MessageData>,
    pub reviews: Vec<AccessReview>,
}

#[derive(Default)]
struct Inner {
    aliases: HashMap<String, String>,
    unknown: HashSet<String>,
    unreachable: HashSet<String>,
    health: Option<HealthStatus>,
    broadcasts: Vec<Broadcast>,
    replies: Vec<(MessageData, AccessReview)>,
    updates: Vec<Update>,
}

/// A recording [`MessagingBot`].
#[derive(Clone, Default)]
pub struct MockBot {
    inner: Arc<Mutex<Inner>>,
    next_id: Arc<AtomicUsize>,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fetch_recipient(name)` resolves to channel `id`.
    pub fn alias(&self, name: &str, id: &str) {
        lock(&self.inner)
            .aliases
            .insert(name.to_string(), id.to_string());
    }

    /// `fetch_recipient(name)` fails with `NotFound`.
    pub fn unknown(&self, name: &str) {
        lock(&self.inner).unknown.insert(name.to_string());
    }

    /// Posting to channel `id` fails.
    pub fn unreachable(&self, id: &str) {
        lock(&self.inner).unreachable.insert(id.to_string());
    }

    pub fn set_health(&self, status: HealthStatus) {
        lock(&self.inner).health = Some(status);
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        lock(&self.inner).broadcasts.clone()
    }

    pub fn replies(&self) -> Vec<(MessageData, AccessReview)> {
        lock(&self.inner).replies.clone()
    }

    pub fn updates(&self) -> Vec<Update> {
        lock(&self.inner).updates.clone()
    }
}

#[async_trait]
impl MessagingBot for MockBot {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check_health(&self) -> Result<HealthStatus, AccessBotError> {
        Ok(lock(&self.inner)
            .health
            .clone()
            .unwrap_or(HealthStatus::Healthy))
    }

    async fn fetch_recipient(&self, name: &str) -> Result<Recipient, AccessBotError> {
        let inner = lock(&self.inner);
        if inner.unknown.contains(name) {
            return Err(AccessBotError::NotFound(format!("recipient {name}")));
        }
        let mut recipient = Recipient::channel(name);
        if let Some(id) = inner.aliases.get(name) {
            recipient.id = id.clone();
        }
        Ok(recipient)
    }

    async fn broadcast(
        &self,
        recipients: &[Recipient],
        request_id: &str,
        data: &AccessRequestData,
    ) -> Partial<SentMessages> {
        let mut inner = lock(&self.inner);
        inner.broadcasts.push(Broadcast {
            recipients: recipients.to_vec(),
            request_id: request_id.to_string(),
            data: data.clone(),
        });

        let mut result = Partial::ok(SentMessages::new());
        for recipient in recipients {
            if inner.unreachable.contains(&recipient.id) {
                result.failures.push(AccessBotError::platform(
                    "mock",
                    format!("channel {} unreachable", recipient.id),
                ));
                continue;
            }
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            result
                .value
                .push(MessageData::new(recipient.id.clone(), format!("msg-{n}")));
        }
        result
    }

    async fn post_review_reply(
        &self,
        message: &MessageData,
        review: &AccessReview,
    ) -> Result<(), AccessBotError> {
        lock(&self.inner)
            .replies
            .push((message.clone(), review.clone()));
        Ok(())
    }

    async fn update_messages(
        &self,
        request_id: &str,
        data: &AccessRequestData,
        messages: &[MessageData],
        reviews: &[AccessReview],
    ) -> Result<(), AccessBotError> {
        lock(&self.inner).updates.push(Update {
            request_id: request_id.to_string(),
            data: data.clone(),
            messages: messages.to_vec(),
            reviews: reviews.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_broadcast_and_reports_failures() {
        let bot = MockBot::new();
        bot.alias("#ops", "C1");
        bot.unreachable("C2");

        let recipients = vec![
            bot.fetch_recipient("#ops").await.unwrap(),
            bot.fetch_recipient("C2").await.unwrap(),
        ];
        let partial = bot
            .broadcast(&recipients, "req-1", &AccessRequestData::default())
            .await;

        assert_eq!(partial.value, vec![MessageData::new("C1", "msg-0")]);
        assert_eq!(partial.failures.len(), 1);
        assert_eq!(bot.broadcasts().len(), 1);
    }

    #[tokio::test]
    async fn unknown_recipient_is_not_found() {
        let bot = MockBot::new();
        bot.unknown("ghost@example.com");
        let err = bot.fetch_recipient("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AccessBotError::NotFound(_)));
    }
}
