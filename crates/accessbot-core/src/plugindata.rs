// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat string-map encoding of [`GenericPluginData`].
//!
//! The plugin-data store only holds `string -> string` maps, so every field is
//! flattened to a fixed key. Encoding always writes all seven keys so that a
//! partial update can never leave a stale value behind. Decoding is
//! best-effort: missing keys read as zero values and malformed entries are
//! dropped, never reported.
//!
//! `messages` entries come in two shapes:
//!
//! - legacy: `channel/message`
//! - structured: URL-safe base64 of `{"channel_id":..,"message_id":..}`
//!
//! Decoding tries the structured shape first and falls back to the legacy
//! one, so records written by either generation keep decoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

use crate::types::{
    AccessRequestData, GenericPluginData, MessageData, PluginDataMap, ResolutionTag, SentMessages,
};

pub const KEY_USER: &str = "user";
pub const KEY_ROLES: &str = "roles";
pub const KEY_REQUEST_REASON: &str = "request_reason";
pub const KEY_REVIEWS_COUNT: &str = "reviews_count";
pub const KEY_RESOLUTION: &str = "resolution";
pub const KEY_RESOLVE_REASON: &str = "resolve_reason";
pub const KEY_MESSAGES: &str = "messages";

/// Every key written by [`PluginDataCodec::encode`].
pub const KEYS: [&str; 7] = [
    KEY_USER,
    KEY_ROLES,
    KEY_REQUEST_REASON,
    KEY_REVIEWS_COUNT,
    KEY_RESOLUTION,
    KEY_RESOLVE_REASON,
    KEY_MESSAGES,
];

const LIST_SEPARATOR: char = ',';
const MESSAGE_SEPARATOR: char = '/';

/// Shape used when writing `messages` entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFormat {
    /// `channel/message`. Entries whose ids contain `/` or `,` are written
    /// structured instead, since the legacy shape has no escaping.
    #[default]
    Legacy,
    /// Base64 JSON for every entry.
    Structured,
}

/// Encoder/decoder between [`GenericPluginData`] and [`PluginDataMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginDataCodec {
    message_format: MessageFormat,
}

impl PluginDataCodec {
    pub fn new(message_format: MessageFormat) -> Self {
        Self { message_format }
    }

    pub fn message_format(&self) -> MessageFormat {
        self.message_format
    }

    /// Encodes plugin data. The result always contains exactly [`KEYS`].
    pub fn encode(&self, data: &GenericPluginData) -> PluginDataMap {
        let req = &data.request;
        let reviews_count = if req.reviews_count == 0 {
            String::new()
        } else {
            req.reviews_count.to_string()
        };

        let mut map = PluginDataMap::with_capacity(KEYS.len());
        map.insert(KEY_USER.to_string(), req.user.clone());
        map.insert(KEY_ROLES.to_string(), req.roles.join(","));
        map.insert(KEY_REQUEST_REASON.to_string(), req.request_reason.clone());
        map.insert(KEY_REVIEWS_COUNT.to_string(), reviews_count);
        map.insert(
            KEY_RESOLUTION.to_string(),
            req.resolution_tag.as_str().to_string(),
        );
        map.insert(KEY_RESOLVE_REASON.to_string(), req.resolution_reason.clone());
        map.insert(
            KEY_MESSAGES.to_string(),
            self.encode_messages(&data.sent_messages),
        );
        map
    }

    /// Decodes plugin data. Never fails.
    pub fn decode(&self, map: &PluginDataMap) -> GenericPluginData {
        let request = AccessRequestData {
            user: field(map, KEY_USER).to_string(),
            roles: split_list(field(map, KEY_ROLES))
                .map(str::to_string)
                .collect(),
            request_reason: field(map, KEY_REQUEST_REASON).to_string(),
            reviews_count: field(map, KEY_REVIEWS_COUNT).parse().unwrap_or(0),
            resolution_tag: ResolutionTag::from_persisted(field(map, KEY_RESOLUTION)),
            resolution_reason: field(map, KEY_RESOLVE_REASON).to_string(),
        };

        GenericPluginData {
            request,
            sent_messages: decode_messages(field(map, KEY_MESSAGES)),
        }
    }

    /// Decodes a possibly absent record; absence reads as the zero value.
    pub fn decode_opt(&self, map: Option<&PluginDataMap>) -> GenericPluginData {
        map.map(|m| self.decode(m)).unwrap_or_default()
    }

    fn encode_messages(&self, messages: &SentMessages) -> String {
        messages
            .iter()
            .map(|msg| match self.message_format {
                MessageFormat::Structured => encode_structured(msg),
                MessageFormat::Legacy if needs_escaping(msg) => {
                    warn!(
                        channel_id = msg.channel_id.as_str(),
                        message_id = msg.message_id.as_str(),
                        "message identifiers contain a separator, writing structured entry"
                    );
                    encode_structured(msg)
                }
                MessageFormat::Legacy => {
                    format!("{}{MESSAGE_SEPARATOR}{}", msg.channel_id, msg.message_id)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn field<'a>(map: &'a PluginDataMap, key: &str) -> &'a str {
    map.get(key).map(String::as_str).unwrap_or_default()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(LIST_SEPARATOR).filter(|s| !s.is_empty())
}

fn needs_escaping(msg: &MessageData) -> bool {
    let bad = |s: &str| s.contains(MESSAGE_SEPARATOR) || s.contains(LIST_SEPARATOR);
    bad(&msg.channel_id) || bad(&msg.message_id)
}

fn encode_structured(msg: &MessageData) -> String {
    // Serializing two strings cannot fail.
    let json = serde_json::to_vec(msg).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_structured(entry: &str) -> Option<MessageData> {
    let bytes = URL_SAFE_NO_PAD.decode(entry).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn decode_legacy(entry: &str) -> Option<MessageData> {
    let mut parts = entry.split(MESSAGE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(channel_id), Some(message_id), None) => {
            Some(MessageData::new(channel_id, message_id))
        }
        _ => None,
    }
}

fn decode_messages(value: &str) -> SentMessages {
    split_list(value)
        .filter_map(|entry| decode_structured(entry).or_else(|| decode_legacy(entry)))
        .collect()
}
