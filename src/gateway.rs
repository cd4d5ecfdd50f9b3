// ABOUTME: Persistence gateway: authenticated, preflighted, retried scan saves and bounded reads
// ABOUTME: Reclassifies store/identity failures into the user-facing error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

//! # Persistence Gateway
//!
//! Save path state machine: Idle → Authenticating → ConnectivityCheck →
//! Writing → Committed | Failed. The whole save (auth + preflight + write)
//! runs under one overall timeout; the write itself is retried on a fixed
//! delay, and only the final failure propagates. Reads are bounded-timeout,
//! session-scoped, and never retried.
//!
//! The gateway is explicitly constructed with its store and identity
//! provider; there are no process-wide singletons.

use crate::aggregate::{summarize, ScanSummary};
use crate::errors::{AppError, AppResult};
use crate::identity::{IdentityError, IdentityProvider, SessionId};
use crate::models::food::FoodResult;
use crate::models::scan::{DataQuality, FoodSnapshot, ScanDocument, ScanMetadata, ScanRecord};
use crate::store::{NewScan, PageRequest, RecordStore, ScanCursor, StoreError};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// Gateway timing and retry policy
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Overall bound on a save: auth + preflight + write, end to end
    pub save_timeout: Duration,
    /// Bound on each read operation
    pub read_timeout: Duration,
    /// Write retries after the initial attempt
    pub write_retries: u32,
    /// Fixed delay between write attempts
    pub retry_delay: Duration,
    /// Run the connectivity preflight before every save
    pub preflight: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            save_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(15),
            write_retries: 3,
            retry_delay: Duration::from_secs(2),
            preflight: true,
        }
    }
}

/// A scan ready to be saved: the result list is a snapshot taken the moment
/// save was invoked, so in-flight UI edits cannot race the write.
#[derive(Debug, Clone, Default)]
pub struct ScanDraft {
    /// Identified food items at save time
    pub foods: Vec<FoodResult>,
    /// Local image path reference (never the bytes)
    pub image_path: Option<String>,
    /// Application version producing the scan
    pub app_version: Option<String>,
    /// Device platform label
    pub platform: Option<String>,
    /// When the analysis ran
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Aggregate view of one UTC day's scans
#[derive(Debug, Clone)]
pub struct DailySummary {
    /// The summarized day
    pub date: NaiveDate,
    /// Number of scans saved that day
    pub scan_count: usize,
    /// Aggregates re-derived by re-walking stored snapshot arrays
    pub totals: ScanSummary,
}

/// Cross-scan statistics for the whole session history
#[derive(Debug, Clone)]
pub struct ScanStatistics {
    /// Number of scans on record
    pub total_scans: usize,
    /// Creation time of the oldest scan
    pub first_scan_at: Option<DateTime<Utc>>,
    /// Creation time of the newest scan
    pub last_scan_at: Option<DateTime<Utc>>,
    /// Aggregates over every stored food snapshot
    pub totals: ScanSummary,
}

/// Persistence gateway over a record store and an identity provider
#[derive(Debug, Clone)]
pub struct ScanGateway<S, I> {
    store: S,
    identity: I,
    config: GatewayConfig,
}

impl<S: RecordStore, I: IdentityProvider> ScanGateway<S, I> {
    /// Build a gateway with the default policy
    pub fn new(store: S, identity: I) -> Self {
        Self::with_config(store, identity, GatewayConfig::default())
    }

    /// Build a gateway with an explicit policy
    pub const fn with_config(store: S, identity: I, config: GatewayConfig) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }

    /// Save a completed scan and return the new record id.
    ///
    /// # Errors
    ///
    /// `SaveTimeout` when the overall bound is exceeded; otherwise the
    /// classified auth / connection-test / store failure. Intermediate write
    /// failures are swallowed and retried; only the last one propagates.
    pub async fn save_scan(&self, draft: &ScanDraft) -> AppResult<String> {
        match timeout(self.config.save_timeout, self.save_scan_inner(draft)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::save_timed_out()),
        }
    }

    async fn save_scan_inner(&self, draft: &ScanDraft) -> AppResult<String> {
        if draft.foods.is_empty() {
            return Err(AppError::invalid_input("cannot save a scan with no food items"));
        }

        // Authenticating
        let session = self.authenticate().await?;

        // ConnectivityCheck
        if self.config.preflight {
            self.store.ping().await.map_err(|err| {
                warn!(error = %err, "connectivity preflight failed, aborting save");
                AppError::connection_test_failed(err.to_string())
            })?;
        }

        // Writing
        let scan = build_scan(&session, draft);
        let mut attempt: u32 = 0;
        loop {
            match self.store.insert_scan(&scan).await {
                Ok(id) => {
                    info!(
                        scan_id = %id,
                        items = draft.foods.len(),
                        total_calories = scan.total_calories,
                        "scan committed"
                    );
                    return Ok(id);
                }
                Err(err) if attempt < self.config.write_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.config.write_retries,
                        error = %err,
                        "scan write failed, retrying"
                    );
                    sleep(self.config.retry_delay).await;
                }
                Err(err) => return Err(classify_store(&err, "scan write")),
            }
        }
    }

    /// List the session's scan history, newest first.
    ///
    /// # Errors
    ///
    /// Classified auth, timeout, or store failure.
    pub async fn history(&self, page: &PageRequest) -> AppResult<Vec<ScanRecord>> {
        let session = self.authenticate().await?;
        let scans = self
            .bounded("history query", self.store.list_scans(session.as_str(), page))
            .await?;
        Ok(scans
            .iter()
            .map(|s| ScanRecord::from_stored(s.id.clone(), s.created_at, &s.document))
            .collect())
    }

    /// Fetch one scan by id.
    ///
    /// # Errors
    ///
    /// Classified auth, timeout, or store failure; an absent record is
    /// `Ok(None)`.
    pub async fn scan(&self, id: &str) -> AppResult<Option<ScanRecord>> {
        let session = self.authenticate().await?;
        let stored = self
            .bounded("scan fetch", self.store.get_scan(session.as_str(), id))
            .await?;
        Ok(stored
            .as_ref()
            .map(|s| ScanRecord::from_stored(s.id.clone(), s.created_at, &s.document)))
    }

    /// Delete one scan by id.
    ///
    /// # Errors
    ///
    /// Classified auth, timeout, or store failure.
    pub async fn delete_scan(&self, id: &str) -> AppResult<()> {
        let session = self.authenticate().await?;
        self.bounded("scan delete", self.store.delete_scan(session.as_str(), id))
            .await
    }

    /// Aggregate one UTC day's scans by re-walking their snapshot arrays.
    ///
    /// # Errors
    ///
    /// Classified auth, timeout, or store failure.
    pub async fn daily_summary(&self, date: NaiveDate) -> AppResult<DailySummary> {
        let session = self.authenticate().await?;
        let start = Utc
            .from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end = start + chrono::Duration::days(1);

        let scans = self
            .bounded(
                "daily summary query",
                self.store.scans_between(session.as_str(), start, end),
            )
            .await?;

        let foods = collect_stored_foods(scans.iter().map(|s| &s.document));
        Ok(DailySummary {
            date,
            scan_count: scans.len(),
            totals: summarize(&foods),
        })
    }

    /// Aggregate statistics across the whole session history.
    ///
    /// Pages through the store rather than trusting any cached totals.
    ///
    /// # Errors
    ///
    /// Classified auth, timeout, or store failure.
    pub async fn statistics(&self) -> AppResult<ScanStatistics> {
        let session = self.authenticate().await?;

        let mut total_scans = 0;
        let mut first_scan_at = None;
        let mut last_scan_at = None;
        let mut foods = Vec::new();
        let mut page = PageRequest::first(STATISTICS_PAGE_SIZE);

        loop {
            let scans = self
                .bounded(
                    "statistics query",
                    self.store.list_scans(session.as_str(), &page),
                )
                .await?;
            if scans.is_empty() {
                break;
            }

            total_scans += scans.len();
            // Pages arrive newest-first.
            if last_scan_at.is_none() {
                last_scan_at = scans.first().map(|s| s.created_at);
            }
            first_scan_at = scans.last().map(|s| s.created_at);
            foods.extend(collect_stored_foods(scans.iter().map(|s| &s.document)));

            if scans.len() < STATISTICS_PAGE_SIZE as usize {
                break;
            }
            let Some(last) = scans.last() else { break };
            page = PageRequest::after(STATISTICS_PAGE_SIZE, ScanCursor::from(last));
        }

        Ok(ScanStatistics {
            total_scans,
            first_scan_at,
            last_scan_at,
            totals: summarize(&foods),
        })
    }

    async fn authenticate(&self) -> AppResult<SessionId> {
        self.identity.session_id().await.map_err(classify_identity)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> AppResult<T> {
        match timeout(self.config.read_timeout, fut).await {
            Ok(result) => result.map_err(|err| classify_store(&err, operation)),
            Err(_) => Err(AppError::read_timed_out(operation)),
        }
    }
}

/// Page size used when walking the full history for statistics
const STATISTICS_PAGE_SIZE: u32 = 200;

/// Assemble the persisted scan from a draft snapshot
fn build_scan(session: &SessionId, draft: &ScanDraft) -> NewScan {
    let summary = summarize(&draft.foods);
    let snapshots: Vec<FoodSnapshot> = draft.foods.iter().map(Into::into).collect();

    let metadata = ScanMetadata {
        app_version: draft.app_version.clone(),
        platform: draft.platform.clone(),
        analyzed_at: draft.analyzed_at,
        databases_searched: summary.databases_searched.iter().cloned().collect(),
        usda_total_results: (summary.total_usda_results > 0).then_some(summary.total_usda_results),
        extra: serde_json::Map::new(),
    };

    let document = ScanDocument {
        total_calories: summary.total_calories,
        foods: snapshots,
        image_path: draft.image_path.clone(),
        metadata,
        database_counts: summary.database_counts.clone(),
        data_quality: DataQuality {
            source_counts: summary.database_counts.clone(),
            average_confidence: summary.average_confidence,
        },
    };

    NewScan {
        session_id: session.as_str().to_owned(),
        total_calories: summary.total_calories,
        // ScanDocument serialization is infallible: plain structs and maps.
        document: serde_json::to_value(&document).unwrap_or(Value::Null),
    }
}

/// Pull every stored food snapshot out of a set of raw documents
fn collect_stored_foods<'a>(documents: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    documents
        .filter_map(|doc| doc.get("foods").and_then(Value::as_array))
        .flat_map(|foods| foods.iter().cloned())
        .collect()
}

/// Map provider-level store failures into the user-facing taxonomy
fn classify_store(err: &StoreError, operation: &str) -> AppError {
    match err {
        StoreError::PermissionDenied(detail) => {
            AppError::permission_denied(format!("{operation}: {detail}"))
        }
        StoreError::Unavailable(detail) => {
            AppError::service_unavailable(format!("{operation}: {detail}"))
        }
        StoreError::NotFound(detail) => AppError::store_not_found(format!("{operation}: {detail}")),
        StoreError::Unauthenticated(detail) => {
            AppError::auth_failed(format!("{operation}: {detail}"))
        }
        StoreError::Backend(detail) => AppError::storage(format!("{operation}: {detail}")),
    }
}

/// Map identity failures into the user-facing taxonomy
fn classify_identity(err: IdentityError) -> AppError {
    match err {
        IdentityError::Network(detail) => AppError::auth_failed(detail),
        IdentityError::Disabled(_) => AppError::auth_disabled(),
        IdentityError::Storage(detail) => AppError::internal(detail),
    }
}
