// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role-to-recipient resolution.
//!
//! A [`RecipientsMap`] maps role names to raw recipient strings (channel ids,
//! e-mail addresses). Roles with no mapping, or an empty one, fall back to the
//! wildcard entry. Resolution has set semantics: the result is the
//! de-duplicated union, in no particular order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Recipient;

/// Role name matching every role without an explicit mapping.
pub const WILDCARD: &str = "*";

/// Mapping from role (or [`WILDCARD`]) to raw recipient strings.
///
/// Deserializes from a table whose values are either a single string or a
/// list of strings, which is how `[role_to_recipients]` is written in TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecipientsMap(HashMap<String, Vec<String>>);

impl RecipientsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds recipients for a role, appending to any existing entry.
    pub fn add(&mut self, role: impl Into<String>, recipients: impl IntoIterator<Item = String>) {
        self.0.entry(role.into()).or_default().extend(recipients);
    }

    pub fn get(&self, role: &str) -> Option<&[String]> {
        self.0.get(role).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the wildcard entry exists and is non-empty.
    pub fn has_wildcard(&self) -> bool {
        self.get(WILDCARD).is_some_and(|r| !r.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Recipients to notify for a request with the given roles and suggested reviewers.
    pub fn recipients_for(&self, roles: &[String], suggested_reviewers: &[String]) -> Vec<String> {
        let mut set: HashSet<&str> = HashSet::new();

        for role in roles {
            let mapped = match self.get(role) {
                Some(recipients) if !recipients.is_empty() => recipients,
                _ => self.get(WILDCARD).unwrap_or_default(),
            };
            set.extend(mapped.iter().map(String::as_str));
        }
        set.extend(suggested_reviewers.iter().map(String::as_str));

        set.into_iter().map(str::to_string).collect()
    }

    /// Every recipient mentioned anywhere in the map, de-duplicated.
    pub fn all_recipients(&self) -> Vec<String> {
        let set: HashSet<&str> = self
            .0
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        set.into_iter().map(str::to_string).collect()
    }
}

impl FromIterator<(String, Vec<String>)> for RecipientsMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for RecipientsMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, OneOrMany>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(role, value)| {
                let recipients = match value {
                    OneOrMany::One(r) => vec![r],
                    OneOrMany::Many(rs) => rs,
                };
                (role, recipients)
            })
            .collect())
    }
}

/// Resolved recipients keyed by platform id, preserving first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RecipientSet {
    order: Vec<String>,
    by_id: HashMap<String, Recipient>,
}

impl RecipientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipient unless one with the same id is already present.
    pub fn add(&mut self, recipient: Recipient) -> bool {
        if self.by_id.contains_key(&recipient.id) {
            return false;
        }
        self.order.push(recipient.id.clone());
        self.by_id.insert(recipient.id.clone(), recipient);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Recipient> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> RecipientsMap {
        entries
            .iter()
            .map(|(role, rs)| (role.to_string(), rs.iter().map(|r| r.to_string()).collect()))
            .collect()
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_mapping_wins_over_wildcard() {
        let m = map(&[("dev", &["chanDev"]), ("*", &["chanA", "chanB"])]);
        assert_eq!(m.recipients_for(&strings(&["dev"]), &[]), strings(&["chanDev"]));
    }

    #[test]
    fn unmapped_role_falls_back_to_wildcard() {
        let m = map(&[("*", &["chanA", "chanB"])]);
        assert_eq!(
            sorted(m.recipients_for(&strings(&["dev"]), &[])),
            strings(&["chanA", "chanB"])
        );
    }

    #[test]
    fn empty_mapping_falls_back_to_wildcard() {
        let m = map(&[("dev", &[]), ("*", &["chanA"])]);
        assert_eq!(m.recipients_for(&strings(&["dev"]), &[]), strings(&["chanA"]));
    }

    #[test]
    fn suggested_reviewers_are_deduplicated() {
        let m = map(&[("dev", &["chanA", "chanB"]), ("*", &["chanC"])]);
        let got = m.recipients_for(&strings(&["dev"]), &strings(&["chanA", "chanB"]));
        assert_eq!(sorted(got), strings(&["chanA", "chanB"]));
    }

    #[test]
    fn no_wildcard_means_no_recipients() {
        let m = map(&[("admin", &["chanAdmin"])]);
        assert!(m.recipients_for(&strings(&["dev"]), &[]).is_empty());
    }

    #[test]
    fn union_across_roles() {
        let m = map(&[("dev", &["chanA"]), ("ops", &["chanA", "chanB"])]);
        let got = m.recipients_for(&strings(&["dev", "ops"]), &strings(&["bob@example.com"]));
        assert_eq!(sorted(got), strings(&["bob@example.com", "chanA", "chanB"]));
    }

    #[test]
    fn all_recipients_ignores_keys() {
        let m = map(&[("dev", &["chanA", "chanB"]), ("*", &["chanB", "chanC"])]);
        assert_eq!(sorted(m.all_recipients()), strings(&["chanA", "chanB", "chanC"]));
    }

    #[test]
    fn deserializes_string_or_list() {
        let m: RecipientsMap =
            serde_json::from_str(r#"{"*": "chanA", "dev": ["chanB", "chanC"]}"#).unwrap();
        assert_eq!(m.get("*"), Some(&strings(&["chanA"])[..]));
        assert_eq!(m.get("dev"), Some(&strings(&["chanB", "chanC"])[..]));
        assert!(m.has_wildcard());
    }

    #[test]
    fn recipient_set_dedupes_by_id() {
        let mut set = RecipientSet::new();
        assert!(set.add(Recipient::channel("C1")));
        assert!(set.add(Recipient::channel("C2")));
        let mut dup = Recipient::channel("C1");
        dup.name = "#general".into();
        assert!(!set.add(dup));
        let ids: Vec<_> = set.to_vec().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, strings(&["C1", "C2"]));
    }
}
