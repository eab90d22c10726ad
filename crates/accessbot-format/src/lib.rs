// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message text for access request notifications.
//!
//! Output uses the lightweight markdown subset Slack, Discord and Teams all
//! render (`*bold*`, inline code and fenced blocks). Free-text reasons are
//! truncated per field class, see [`FormatLimits`].

pub mod fields;
pub mod review;
pub mod status;

pub use fields::fields_text;
pub use review::MessageFormatter;
pub use status::status_text;

/// Maximum characters of a request reason shown in a notification.
pub const REQUEST_REASON_LIMIT: usize = 500;

/// Maximum characters of a resolution reason shown in a status line.
pub const RESOLUTION_REASON_LIMIT: usize = 1000;

/// Maximum characters of a review reason shown in a review reply.
pub const REVIEW_REASON_LIMIT: usize = 500;

/// Appended to any truncated text.
pub const TRUNCATION_MARKER: &str = " (truncated)";

/// Per-field truncation limits, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatLimits {
    pub request_reason: usize,
    pub resolution_reason: usize,
    pub review_reason: usize,
}

impl Default for FormatLimits {
    fn default() -> Self {
        Self {
            request_reason: REQUEST_REASON_LIMIT,
            resolution_reason: RESOLUTION_REASON_LIMIT,
            review_reason: REVIEW_REASON_LIMIT,
        }
    }
}

/// Cuts `text` to at most `limit` characters, marking the cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}{TRUNCATION_MARKER}", &text[..end]),
        None => text.to_string(),
    }
}

/// Neutralises fence markers so user text cannot close a code block.
pub(crate) fn escape_fence(text: &str) -> String {
    text.replace("```", "'''")
}

/// Wraps free text in a fenced block after truncation.
pub(crate) fn fenced(text: &str, limit: usize) -> String {
    format!("```\n{}\n```", escape_fence(&truncate(text, limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        assert_eq!(truncate("héllo wörld", 5), "héllo (truncated)");
        assert_eq!(truncate("⏳⏳⏳", 1), "⏳ (truncated)");
    }

    #[test]
    fn limits_are_independent() {
        let limits = FormatLimits::default();
        assert_eq!(limits.request_reason, 500);
        assert_eq!(limits.resolution_reason, 1000);
        assert_eq!(limits.review_reason, 500);
    }

    #[test]
    fn fences_in_user_text_are_neutralised() {
        assert_eq!(fenced("a ```b``` c", 100), "```\na '''b''' c\n```");
    }
}
