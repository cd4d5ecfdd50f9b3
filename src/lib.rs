// ABOUTME: Library entry point for the snapcal food-photo calorie tracking core
// ABOUTME: Nutrition models, scan aggregation, analysis client, and persistence gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

#![deny(unsafe_code)]

//! # Snapcal Core
//!
//! The data and service layer of a food-photo calorie tracker: a UI captures
//! an image, this crate sends it to the analysis endpoint, turns the loose
//! JSON payload into validated [`models::FoodResult`] values, recomputes
//! calories from the per-100g rate as the user adjusts portion weight, and
//! persists completed scans through the [`gateway::ScanGateway`] with a
//! bounded-retry write and classified errors.
//!
//! ## Architecture
//!
//! - **Models** ([`models`]): immutable `NutrientInfo` / `FoodResult` /
//!   scan-record shapes with pure derived accessors
//! - **Aggregator** ([`aggregate`]): one summary algorithm over live results
//!   and raw stored field maps
//! - **Analysis** ([`analysis`]): HTTP clients for the analysis endpoint and
//!   the USDA nutrition search function
//! - **Store** ([`store`]): document-oriented record store trait with a
//!   SQLite implementation
//! - **Gateway** ([`gateway`]): authenticate → preflight → write-with-retry
//!   under one timeout; bounded, tolerant reads
//! - **Identity** ([`identity`]): anonymous per-installation session id
//!
//! Every failure crossing the crate boundary is reclassified into
//! [`errors::ErrorCode`]; callers never see raw provider error strings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use snapcal::config::AppConfig;
//! use snapcal::errors::{AppError, AppResult};
//! use snapcal::gateway::ScanGateway;
//! use snapcal::identity::FileIdentity;
//! use snapcal::store::sqlite::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let store = SqliteStore::new(&config.database_url)
//!         .await
//!         .map_err(|e| AppError::storage(e.to_string()))?;
//!     let identity = FileIdentity::from_default()
//!         .map_err(|e| AppError::internal(e.to_string()))?;
//!     let gateway = ScanGateway::with_config(store, identity, config.gateway_config());
//!
//!     let history = gateway.history(&snapcal::store::PageRequest::first(10)).await?;
//!     println!("{} scans on record", history.len());
//!     Ok(())
//! }
//! ```

/// Scan aggregation over live and stored food records
pub mod aggregate;
/// Clients for the analysis endpoint and nutrition search function
pub mod analysis;
/// Environment-based configuration
pub mod config;
/// Error taxonomy and result alias
pub mod errors;
/// Persistence gateway
pub mod gateway;
/// Anonymous session identity
pub mod identity;
/// Structured logging setup
pub mod logging;
/// Nutrition and scan data models
pub mod models;
/// Record store abstraction and SQLite implementation
pub mod store;
