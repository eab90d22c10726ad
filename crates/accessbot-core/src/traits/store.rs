// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin-data persistence capability.

use async_trait::async_trait;

use crate::error::AccessBotError;
use crate::types::PluginDataMap;

/// Per-request flat string maps held by the access-request API.
#[async_trait]
pub trait PluginDataStore: Send + Sync + 'static {
    /// Current record for a request, `None` if nothing was stored yet.
    async fn get(&self, request_id: &str) -> Result<Option<PluginDataMap>, AccessBotError>;

    /// Replaces the record if it still equals `expect`.
    ///
    /// `expect = None` means "no record yet". A lost race returns
    /// [`AccessBotError::CompareFailed`].
    async fn compare_and_swap(
        &self,
        request_id: &str,
        expect: Option<&PluginDataMap>,
        set: PluginDataMap,
    ) -> Result<(), AccessBotError>;
}
