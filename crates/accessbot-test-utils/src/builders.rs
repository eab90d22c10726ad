// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture constructors.

use chrono::{TimeZone, Utc};

use accessbot_core::types::{AccessRequest, AccessReview, RequestState};

/// A pending request from `alice@example.com` for the given roles.
pub fn pending_request(id: &str, roles: &[&str]) -> AccessRequest {
    AccessRequest {
        id: id.to_string(),
        user: "alice@example.com".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        request_reason: "investigating incident".to_string(),
        state: RequestState::Pending,
        resolve_reason: String::new(),
        suggested_reviewers: Vec::new(),
        reviews: Vec::new(),
        created: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).single().unwrap_or_default(),
    }
}

/// A review by `author` proposing `state`.
pub fn review(author: &str, state: RequestState, reason: &str) -> AccessReview {
    AccessReview {
        author: author.to_string(),
        proposed_state: state,
        reason: reason.to_string(),
        created: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().unwrap_or_default(),
    }
}
