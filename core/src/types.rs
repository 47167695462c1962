//! Per-request parameters and response shapes for the content API.
//!
//! # Design
//! The client never enforces a schema: callers decode into
//! `serde_json::Value` or their own types. `ContentList` is offered for the
//! envelope every list endpoint shares; the item type stays the caller's.

use serde::{Deserialize, Serialize};

/// Options for a single `get` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetParams {
    /// Selects one item when non-empty; empty requests the whole collection.
    pub content_id: String,
}

impl GetParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = id.into();
        self
    }
}

/// Envelope of a list endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentList<T> {
    pub contents: Vec<T>,
    pub total_count: u64,
    pub offset: u64,
    pub limit: u64,
}
