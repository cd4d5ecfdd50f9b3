// ABOUTME: Record store abstraction for persisted scans
// ABOUTME: Document-oriented async trait with provider-level error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

//! # Record Store
//!
//! Document-oriented storage seam. Implementations own id assignment and the
//! server-side creation timestamp; callers only ever hand over a session id
//! and a JSON document. The gateway reclassifies [`StoreError`] into the
//! user-facing taxonomy at its boundary.

/// SQLite-backed implementation
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// Provider-level store failures, before boundary reclassification
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the request under current access policy
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// The store reports an outage
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The store or collection does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The request lacked a valid session
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Any other backend failure
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A scan about to be written
#[derive(Debug, Clone)]
pub struct NewScan {
    /// Owning anonymous session id
    pub session_id: String,
    /// Denormalized total calories, kept as a column for cheap filtering
    pub total_calories: f64,
    /// Full scan document body
    pub document: Value,
}

/// A scan read back from the store
#[derive(Debug, Clone)]
pub struct StoredScan {
    /// Store-assigned record id
    pub id: String,
    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
    /// Raw document body; decoding tolerance is the reader's job
    pub document: Value,
}

/// Start-after cursor for history pagination.
///
/// Records are ordered by creation time descending with the record id as a
/// stable tiebreak, so paging over equal timestamps is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    /// Creation timestamp of the last record on the previous page
    pub created_at: DateTime<Utc>,
    /// Id of the last record on the previous page
    pub id: String,
}

impl From<&StoredScan> for ScanCursor {
    fn from(scan: &StoredScan) -> Self {
        Self {
            created_at: scan.created_at,
            id: scan.id.clone(),
        }
    }
}

/// Page parameters for history listing
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Maximum records to return (0 means store default)
    pub limit: u32,
    /// Resume after this cursor, exclusive
    pub start_after: Option<ScanCursor>,
}

impl PageRequest {
    /// First page of `limit` records
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            start_after: None,
        }
    }

    /// Page of `limit` records after the given cursor
    #[must_use]
    pub fn after(limit: u32, cursor: ScanCursor) -> Self {
        Self {
            limit,
            start_after: Some(cursor),
        }
    }
}

/// Core record store abstraction.
///
/// All implementations must provide a consistent document-store interface:
/// session-scoped queries, creation-time ordering with id tiebreak, and a
/// lightweight diagnostic write for connectivity preflight.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Issue a lightweight write against a throwaway diagnostic location.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure; the gateway maps it to the
    /// connection-test-failed category.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert a scan, assigning its id and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure.
    async fn insert_scan(&self, scan: &NewScan) -> Result<String, StoreError>;

    /// Fetch one scan owned by the session.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure; an absent record is `Ok(None)`.
    async fn get_scan(&self, session_id: &str, id: &str) -> Result<Option<StoredScan>, StoreError>;

    /// Delete one scan owned by the session.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure.
    async fn delete_scan(&self, session_id: &str, id: &str) -> Result<(), StoreError>;

    /// List the session's scans, newest first, id tiebreak, cursor paging.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure.
    async fn list_scans(
        &self,
        session_id: &str,
        page: &PageRequest,
    ) -> Result<Vec<StoredScan>, StoreError>;

    /// List the session's scans created within `[start, end)`, newest first.
    ///
    /// # Errors
    ///
    /// Returns the provider-level failure.
    async fn scans_between(
        &self,
        session_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StoredScan>, StoreError>;
}
