// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The request-processing handler.
//!
//! Each event is handled independently and possibly concurrently with other
//! events for the same request. All shared state lives in plugin data and is
//! updated through compare-and-swap, so a handler never trusts what it read
//! before its own successful write.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use accessbot_core::error::AccessBotError;
use accessbot_core::recipients::{RecipientSet, RecipientsMap};
use accessbot_core::traits::MessagingBot;
use accessbot_core::types::{
    AccessRequest, AccessReview, Event, GenericPluginData, MessageData, Recipient, RequestState,
    ResolutionTag,
};
use accessbot_watcher::EventHandler;

use crate::plugin_data::{Modified, PluginDataAccess};

/// Generic access request notification plugin.
pub struct App {
    bot: Arc<dyn MessagingBot>,
    plugin_data: PluginDataAccess,
    recipients: RecipientsMap,
}

impl App {
    pub fn new(
        bot: Arc<dyn MessagingBot>,
        plugin_data: PluginDataAccess,
        recipients: RecipientsMap,
    ) -> Self {
        Self {
            bot,
            plugin_data,
            recipients,
        }
    }

    pub fn bot(&self) -> &Arc<dyn MessagingBot> {
        &self.bot
    }

    async fn on_put(
        &self,
        cancel: &CancellationToken,
        req: AccessRequest,
    ) -> Result<(), AccessBotError> {
        match req.state {
            RequestState::Pending => self.on_pending_request(cancel, &req).await,
            RequestState::Approved | RequestState::Denied => {
                self.on_resolved_request(cancel, &req).await
            }
        }
    }

    /// First sighting creates plugin data and broadcasts; later ones only
    /// post new reviews.
    async fn on_pending_request(
        &self,
        cancel: &CancellationToken,
        req: &AccessRequest,
    ) -> Result<(), AccessBotError> {
        let initial = GenericPluginData {
            request: req.data(),
            sent_messages: Vec::new(),
        };
        let created = self
            .plugin_data
            .modify(&req.id, cancel, |existing| match existing {
                Some(_) => None,
                None => Some(initial.clone()),
            })
            .await?;

        if matches!(created, Modified::Updated { .. }) {
            info!(request_id = %req.id, user = %req.user, "new access request");
            self.broadcast(cancel, req).await?;
        }

        if !req.reviews.is_empty() {
            self.on_reviews(cancel, &req.id, &req.reviews, true).await?;
        }
        Ok(())
    }

    async fn broadcast(
        &self,
        cancel: &CancellationToken,
        req: &AccessRequest,
    ) -> Result<(), AccessBotError> {
        let recipients = self.resolve_recipients(req).await;
        if recipients.is_empty() {
            warn!(request_id = %req.id, roles = ?req.roles, "no recipients to notify");
            return Ok(());
        }

        let data = req.data();
        let (sent, failure) = self
            .bot
            .broadcast(&recipients, &req.id, &data)
            .await
            .into_parts();
        info!(
            request_id = %req.id,
            sent = sent.len(),
            recipients = recipients.len(),
            "broadcast access request"
        );

        if !sent.is_empty() {
            self.plugin_data
                .modify(&req.id, cancel, |existing| {
                    let mut data = existing.cloned().unwrap_or_default();
                    data.sent_messages.extend(sent.iter().cloned());
                    Some(data)
                })
                .await?;
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Raw recipients resolved through the bot, de-duplicated by platform id.
    async fn resolve_recipients(&self, req: &AccessRequest) -> Vec<Recipient> {
        let raw = self
            .recipients
            .recipients_for(&req.roles, &req.suggested_reviewers);

        let mut set = RecipientSet::new();
        for name in raw {
            match self.bot.fetch_recipient(&name).await {
                Ok(recipient) => {
                    if !set.add(recipient) {
                        debug!(
                            request_id = %req.id,
                            recipient = %name,
                            "duplicate recipient skipped"
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        request_id = %req.id,
                        recipient = %name,
                        error = %e,
                        "failed to resolve recipient"
                    )
                }
            }
        }
        set.to_vec()
    }

    /// Posts replies for reviews beyond the stored count.
    ///
    /// Returns the sent messages and whether anything new was posted.
    async fn post_new_reviews(
        &self,
        cancel: &CancellationToken,
        request_id: &str,
        reviews: &[AccessReview],
    ) -> Result<Option<GenericPluginData>, AccessBotError> {
        let total = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
        let modified = self
            .plugin_data
            .modify(request_id, cancel, |existing| {
                let existing = existing?;
                if existing.request.reviews_count >= total {
                    return None;
                }
                let mut data = existing.clone();
                data.request.reviews_count = total;
                Some(data)
            })
            .await?;

        let (previous, current) = match modified {
            Modified::Updated {
                previous: Some(previous),
                current,
            } => (previous, current),
            _ => return Ok(None),
        };

        let first_new = previous.request.reviews_count as usize;
        let mut errors = Vec::new();
        for review in &reviews[first_new.min(reviews.len())..] {
            for message in &current.sent_messages {
                if let Err(e) = self.bot.post_review_reply(message, review).await {
                    errors.push(e);
                }
            }
        }
        debug!(
            request_id,
            new_reviews = reviews.len() - first_new.min(reviews.len()),
            "posted review replies"
        );

        match AccessBotError::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(Some(current)),
        }
    }

    async fn on_reviews(
        &self,
        cancel: &CancellationToken,
        request_id: &str,
        reviews: &[AccessReview],
        update: bool,
    ) -> Result<(), AccessBotError> {
        let Some(data) = self.post_new_reviews(cancel, request_id, reviews).await? else {
            return Ok(());
        };
        if update {
            self.update_messages(request_id, &data, reviews).await?;
        }
        Ok(())
    }

    async fn on_resolved_request(
        &self,
        cancel: &CancellationToken,
        req: &AccessRequest,
    ) -> Result<(), AccessBotError> {
        let Some(tag) = ResolutionTag::from_state(req.state) else {
            return Ok(());
        };

        let replies = self.on_reviews(cancel, &req.id, &req.reviews, false).await;
        let resolved = self
            .resolve(cancel, &req.id, tag, &req.resolve_reason, &req.reviews)
            .await;
        replies.and(resolved)
    }

    async fn on_deleted_request(
        &self,
        cancel: &CancellationToken,
        request_id: &str,
    ) -> Result<(), AccessBotError> {
        self.resolve(cancel, request_id, ResolutionTag::ResolvedExpired, "", &[])
            .await
    }

    /// Records the resolution once and rewrites every sent message.
    async fn resolve(
        &self,
        cancel: &CancellationToken,
        request_id: &str,
        tag: ResolutionTag,
        reason: &str,
        reviews: &[AccessReview],
    ) -> Result<(), AccessBotError> {
        let modified = self
            .plugin_data
            .modify(request_id, cancel, |existing| {
                let existing = existing?;
                if existing.request.resolution_tag.is_resolved() {
                    return None;
                }
                let mut data = existing.clone();
                data.request.resolution_tag = tag;
                data.request.resolution_reason = reason.to_string();
                Some(data)
            })
            .await?;

        match modified {
            Modified::Updated { current, .. } => {
                info!(request_id, resolution = tag.as_str(), "access request resolved");
                self.update_messages(request_id, &current, reviews).await
            }
            Modified::Unchanged(None) => {
                debug!(request_id, "resolution for unknown request ignored");
                Ok(())
            }
            Modified::Unchanged(Some(_)) => {
                debug!(request_id, "request already resolved");
                Ok(())
            }
        }
    }

    async fn update_messages(
        &self,
        request_id: &str,
        data: &GenericPluginData,
        reviews: &[AccessReview],
    ) -> Result<(), AccessBotError> {
        if data.sent_messages.is_empty() {
            return Ok(());
        }
        let messages: &[MessageData] = &data.sent_messages;
        self.bot
            .update_messages(request_id, &data.request, messages, reviews)
            .await
    }
}

#[async_trait]
impl EventHandler for App {
    async fn handle(&self, cancel: CancellationToken, event: Event) -> Result<(), AccessBotError> {
        match event {
            Event::Put(req) => self.on_put(&cancel, req).await,
            Event::Delete { request_id } => self.on_deleted_request(&cancel, &request_id).await,
        }
    }
}
