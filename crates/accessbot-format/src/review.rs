// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review replies and full notification bodies.

use accessbot_core::error::AccessBotError;
use accessbot_core::types::{AccessRequestData, AccessReview, RequestState};
use handlebars::Handlebars;
use serde::Serialize;

use crate::fields::fields_text_with_limit;
use crate::status::status_text_with_limit;
use crate::{FormatLimits, escape_fence, truncate};

const REVIEW_TEMPLATE: &str = "{{author}} reviewed the request at {{created}}.\n\
Resolution: {{icon}} {{state}}.\n\
{{#if reason}}Reason: ```\n{{reason}}\n```{{/if}}";

/// Timestamp layout used in review replies, e.g. `02 Jan 26 15:04 UTC`.
pub const REVIEW_TIME_FORMAT: &str = "%d %b %y %H:%M UTC";

#[derive(Serialize)]
struct ReviewContext<'a> {
    author: &'a str,
    created: String,
    icon: &'static str,
    state: &'static str,
    reason: String,
}

fn proposed_state_label(state: RequestState) -> (&'static str, &'static str) {
    match state {
        RequestState::Approved => ("✅", "APPROVED"),
        RequestState::Denied => ("❌", "DENIED"),
        RequestState::Pending => ("⏳", "PENDING"),
    }
}

/// Renders notification bodies and review replies for one cluster.
pub struct MessageFormatter {
    handlebars: Handlebars<'static>,
    cluster_name: String,
    web_proxy_url: Option<String>,
    limits: FormatLimits,
}

impl MessageFormatter {
    pub fn new(cluster_name: impl Into<String>, web_proxy_url: Option<String>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        Self {
            handlebars,
            cluster_name: cluster_name.into(),
            web_proxy_url,
            limits: FormatLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: FormatLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Field list for a request.
    pub fn fields(&self, request_id: &str, data: &AccessRequestData) -> String {
        fields_text_with_limit(
            request_id,
            data,
            &self.cluster_name,
            self.web_proxy_url.as_deref(),
            self.limits.request_reason,
        )
    }

    /// Status line for a request.
    pub fn status(&self, data: &AccessRequestData) -> String {
        status_text_with_limit(
            data.resolution_tag,
            &data.resolution_reason,
            self.limits.resolution_reason,
        )
    }

    /// Complete notification body: header, fields, then status.
    pub fn request_message(&self, request_id: &str, data: &AccessRequestData) -> String {
        format!(
            "You have a new Role Request:\n{}\n{}",
            self.fields(request_id, data),
            self.status(data)
        )
    }

    /// One review as a reply text.
    ///
    /// # Errors
    ///
    /// Returns [`AccessBotError::Format`] if the template engine fails.
    pub fn review_text(&self, review: &AccessReview) -> Result<String, AccessBotError> {
        let (icon, state) = proposed_state_label(review.proposed_state);
        let context = ReviewContext {
            author: &review.author,
            created: review.created.format(REVIEW_TIME_FORMAT).to_string(),
            icon,
            state,
            reason: escape_fence(&truncate(&review.reason, self.limits.review_reason)),
        };
        self.handlebars
            .render_template(REVIEW_TEMPLATE, &context)
            .map_err(|e| AccessBotError::Format(format!("review template: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn review(reason: &str) -> AccessReview {
        AccessReview {
            author: "bob@example.com".into(),
            proposed_state: RequestState::Approved,
            reason: reason.into(),
            created: Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 0).unwrap(),
        }
    }

    #[test]
    fn review_with_reason() {
        let formatter = MessageFormatter::new("prod", None);
        let text = formatter.review_text(&review("looks good")).unwrap();
        assert_eq!(
            text,
            "bob@example.com reviewed the request at 02 Jan 26 15:04 UTC.\n\
             Resolution: ✅ APPROVED.\n\
             Reason: ```\nlooks good\n```"
        );
    }

    #[test]
    fn review_without_reason_has_no_reason_line() {
        let formatter = MessageFormatter::new("prod", None);
        let text = formatter.review_text(&review("")).unwrap();
        assert!(text.ends_with("Resolution: ✅ APPROVED.\n"));
    }

    #[test]
    fn review_reason_is_not_html_escaped() {
        let formatter = MessageFormatter::new("prod", None);
        let text = formatter.review_text(&review("<b>&</b>")).unwrap();
        assert!(text.contains("<b>&</b>"));
    }

    #[test]
    fn review_reason_uses_its_own_limit() {
        let formatter = MessageFormatter::new("prod", None).with_limits(FormatLimits {
            request_reason: 100,
            resolution_reason: 100,
            review_reason: 3,
        });
        let text = formatter.review_text(&review("abcdef")).unwrap();
        assert!(text.contains("abc (truncated)"));
    }

    #[test]
    fn request_message_contains_fields_and_status() {
        let formatter = MessageFormatter::new("prod", Some("https://proxy.example.com".into()));
        let data = AccessRequestData {
            user: "alice".into(),
            roles: vec!["dev".into()],
            ..Default::default()
        };
        let text = formatter.request_message("req-1", &data);
        assert!(text.starts_with("You have a new Role Request:\n*ID*: req-1\n*Cluster*: prod"));
        assert!(text.contains("*Link*: https://proxy.example.com/web/requests/req-1"));
        assert!(text.ends_with("*Status*: ⏳ PENDING"));
    }
}
