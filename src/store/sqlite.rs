// ABOUTME: SQLite implementation of the record store
// ABOUTME: Scan documents as JSON text with denormalized session/creation columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use super::{NewScan, PageRequest, RecordStore, StoreError, StoredScan};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Default page size when a list request passes limit 0
const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Fixed id of the throwaway diagnostic row
const DIAGNOSTIC_ROW_ID: &str = "connectivity_check";

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (and create, for sqlite URLs) the database and run migrations.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the connection or migration fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a backend error if a DDL statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS scans (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                total_calories REAL NOT NULL DEFAULT 0,
                document TEXT NOT NULL -- JSON scan document
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_scans_session_created
             ON scans(session_id, created_at DESC, id DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS diagnostics (
                id TEXT PRIMARY KEY,
                written_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO diagnostics (id, written_at) VALUES ($1, $2)
            ON CONFLICT(id) DO UPDATE SET written_at = excluded.written_at
            ",
        )
        .bind(DIAGNOSTIC_ROW_ID)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        sqlx::query("DELETE FROM diagnostics WHERE id = $1")
            .bind(DIAGNOSTIC_ROW_ID)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn insert_scan(&self, scan: &NewScan) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let document = serde_json::to_string(&scan.document)
            .map_err(|e| StoreError::Backend(format!("failed to serialize scan document: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO scans (id, session_id, created_at, total_calories, document)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(&scan.session_id)
        .bind(timestamp(Utc::now()))
        .bind(scan.total_calories)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(id)
    }

    async fn get_scan(&self, session_id: &str, id: &str) -> Result<Option<StoredScan>, StoreError> {
        let row = sqlx::query(
            "SELECT id, created_at, document FROM scans WHERE session_id = $1 AND id = $2",
        )
        .bind(session_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(|row| scan_from_row(&row)))
    }

    async fn delete_scan(&self, session_id: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM scans WHERE session_id = $1 AND id = $2")
            .bind(session_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("scan {id}")));
        }
        Ok(())
    }

    async fn list_scans(
        &self,
        session_id: &str,
        page: &PageRequest,
    ) -> Result<Vec<StoredScan>, StoreError> {
        let limit = if page.limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            page.limit
        };

        let rows = if let Some(cursor) = &page.start_after {
            sqlx::query(
                r"
                SELECT id, created_at, document FROM scans
                WHERE session_id = $1
                  AND (created_at < $2 OR (created_at = $2 AND id < $3))
                ORDER BY created_at DESC, id DESC
                LIMIT $4
                ",
            )
            .bind(session_id)
            .bind(timestamp(cursor.created_at))
            .bind(&cursor.id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
        } else {
            sqlx::query(
                r"
                SELECT id, created_at, document FROM scans
                WHERE session_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                ",
            )
            .bind(session_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?
        };

        Ok(rows.iter().map(scan_from_row).collect())
    }

    async fn scans_between(
        &self,
        session_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StoredScan>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, created_at, document FROM scans
            WHERE session_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(session_id)
        .bind(timestamp(start))
        .bind(timestamp(end))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.iter().map(scan_from_row).collect())
    }
}

/// Fixed-width UTC timestamp so TEXT ordering matches chronological ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn scan_from_row(row: &sqlx::sqlite::SqliteRow) -> StoredScan {
    let created_at: String = row.get("created_at");
    let document: String = row.get("document");
    StoredScan {
        id: row.get("id"),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
        // Malformed stored documents degrade to null; readers decode
        // tolerantly rather than failing the query.
        document: serde_json::from_str::<Value>(&document).unwrap_or(Value::Null),
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        sqlx::Error::PoolTimedOut => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}
