// ABOUTME: Data models for food analysis results and persisted scan records
// ABOUTME: NutrientInfo, FoodResult, and the scan document shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

/// One identified food item and its defensive parser
pub mod food;
/// Per-100g macro record and calorie arithmetic
pub mod nutrition;
/// Persisted scan record shapes
pub mod scan;

pub use food::{clamp_weight, parse_batch, ConfidenceLevel, FoodResult};
pub use nutrition::{MacroPercentages, NutrientInfo};
pub use scan::{DataQuality, FoodSnapshot, ScanDocument, ScanMetadata, ScanRecord};
