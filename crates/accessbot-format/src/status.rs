// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use accessbot_core::types::ResolutionTag;

use crate::{RESOLUTION_REASON_LIMIT, fenced};

/// Icon and label for a resolution.
pub fn status_label(tag: ResolutionTag) -> (&'static str, &'static str) {
    match tag {
        ResolutionTag::Unresolved => ("⏳", "PENDING"),
        ResolutionTag::ResolvedApproved => ("✅", "APPROVED"),
        ResolutionTag::ResolvedDenied => ("❌", "DENIED"),
        ResolutionTag::ResolvedExpired => ("⌛", "EXPIRED"),
    }
}

/// Status line, followed by the resolution reason when there is one.
pub fn status_text(tag: ResolutionTag, reason: &str) -> String {
    status_text_with_limit(tag, reason, RESOLUTION_REASON_LIMIT)
}

pub fn status_text_with_limit(tag: ResolutionTag, reason: &str, limit: usize) -> String {
    let (icon, label) = status_label(tag);
    let mut text = format!("*Status*: {icon} {label}");
    if !reason.is_empty() {
        text.push_str("\n*Resolution reason*: ");
        text.push_str(&fenced(reason, limit));
    }
    text
}
