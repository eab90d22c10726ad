// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging platform capability (Discord, Microsoft Teams, Slack).

use async_trait::async_trait;

use crate::error::{AccessBotError, Partial};
use crate::types::{
    AccessRequestData, AccessReview, HealthStatus, MessageData, Recipient, SentMessages,
};

/// A chat platform that access-request notifications are posted to.
///
/// Implementations render their own message text. `broadcast` and
/// `update_messages` try every target independently and report partial
/// failure instead of stopping at the first error.
#[async_trait]
pub trait MessagingBot: Send + Sync + 'static {
    /// Short platform name used in logs.
    fn name(&self) -> &str;

    /// Checks that the platform credentials work.
    async fn check_health(&self) -> Result<HealthStatus, AccessBotError>;

    /// Resolves a configured recipient string into a platform target.
    async fn fetch_recipient(&self, name: &str) -> Result<Recipient, AccessBotError>;

    /// Posts the initial notification to every recipient.
    async fn broadcast(
        &self,
        recipients: &[Recipient],
        request_id: &str,
        data: &AccessRequestData,
    ) -> Partial<SentMessages>;

    /// Posts a review as a reply to a previously sent notification.
    async fn post_review_reply(
        &self,
        message: &MessageData,
        review: &AccessReview,
    ) -> Result<(), AccessBotError>;

    /// Rewrites every previously sent notification with the current state.
    async fn update_messages(
        &self,
        request_id: &str,
        data: &AccessRequestData,
        messages: &[MessageData],
        reviews: &[AccessReview],
    ) -> Result<(), AccessBotError>;
}
