// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory plugin-data store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use accessbot_core::error::AccessBotError;
use accessbot_core::traits::PluginDataStore;
use accessbot_core::types::PluginDataMap;

use crate::lock;

/// A [`PluginDataStore`] backed by a `HashMap`.
///
/// `inject_conflicts(n)` makes the next `n` compare-and-swap calls lose
/// their race, which exercises callers' retry loops.
#[derive(Clone, Default)]
pub struct MemoryPluginDataStore {
    records: Arc<Mutex<HashMap<String, PluginDataMap>>>,
    conflicts: Arc<AtomicUsize>,
    swaps: Arc<AtomicUsize>,
}

impl MemoryPluginDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record unconditionally.
    pub fn insert(&self, request_id: &str, data: PluginDataMap) {
        lock(&self.records).insert(request_id.to_string(), data);
    }

    /// Current record, if any.
    pub fn snapshot(&self, request_id: &str) -> Option<PluginDataMap> {
        lock(&self.records).get(request_id).cloned()
    }

    /// Makes the next `n` compare-and-swaps fail.
    pub fn inject_conflicts(&self, n: usize) {
        self.conflicts.store(n, Ordering::SeqCst);
    }

    /// Total compare-and-swap calls, successful or not.
    pub fn swap_attempts(&self) -> usize {
        self.swaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginDataStore for MemoryPluginDataStore {
    async fn get(&self, request_id: &str) -> Result<Option<PluginDataMap>, AccessBotError> {
        Ok(self.snapshot(request_id))
    }

    async fn compare_and_swap(
        &self,
        request_id: &str,
        expect: Option<&PluginDataMap>,
        set: PluginDataMap,
    ) -> Result<(), AccessBotError> {
        self.swaps.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(AccessBotError::CompareFailed {
                request_id: request_id.to_string(),
            });
        }

        let mut records = lock(&self.records);
        if records.get(request_id) != expect {
            return Err(AccessBotError::CompareFailed {
                request_id: request_id.to_string(),
            });
        }
        records.insert(request_id.to_string(), set);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str) -> PluginDataMap {
        PluginDataMap::from([("user".to_string(), user.to_string())])
    }

    #[tokio::test]
    async fn swap_requires_matching_expectation() {
        let store = MemoryPluginDataStore::new();
        store.compare_and_swap("r1", None, record("alice")).await.unwrap();

        let err = store
            .compare_and_swap("r1", None, record("bob"))
            .await
            .unwrap_err();
        assert!(err.is_compare_failed());

        let current = store.get("r1").await.unwrap();
        store
            .compare_and_swap("r1", current.as_ref(), record("bob"))
            .await
            .unwrap();
        assert_eq!(store.snapshot("r1"), Some(record("bob")));
    }

    #[tokio::test]
    async fn injected_conflicts_are_consumed() {
        let store = MemoryPluginDataStore::new();
        store.inject_conflicts(2);
        for _ in 0..2 {
            assert!(
                store
                    .compare_and_swap("r1", None, record("a"))
                    .await
                    .unwrap_err()
                    .is_compare_failed()
            );
        }
        store.compare_and_swap("r1", None, record("a")).await.unwrap();
        assert_eq!(store.swap_attempts(), 3);
    }
}
