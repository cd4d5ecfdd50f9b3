// ABOUTME: Scan aggregation: totals, per-database counts, confidence, and nutrient sums
// ABOUTME: Format-agnostic over live FoodResult values and raw stored field maps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

//! # Scan Aggregator
//!
//! One algorithm, two inputs: the same summary math runs against live
//! [`FoodResult`] objects right after analysis (to build the save payload)
//! and against raw `serde_json::Value` maps read back from storage (for
//! daily summaries and cross-scan statistics). The [`FoodFacts`] trait is
//! the seam between the two.

use crate::models::food::{database_label_for, FoodResult};
use crate::models::nutrition::NutrientInfo;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// The named fields the aggregator needs from any food-item record
pub trait FoodFacts {
    /// Total calories for the item's portion
    fn total_calories(&self) -> f64;
    /// Identification confidence
    fn confidence(&self) -> f64;
    /// Display database label for the item's source
    fn database_label(&self) -> String;
    /// USDA search results considered for this item; absent counts as 0
    fn usda_search_results(&self) -> u64;
    /// Source databases consulted, possibly with duplicates
    fn databases_searched(&self) -> Vec<String>;
    /// Portion weight in grams
    fn weight_grams(&self) -> f64;
    /// Per-100g macro breakdown, when recorded
    fn nutrients(&self) -> Option<NutrientInfo>;
}

impl FoodFacts for FoodResult {
    fn total_calories(&self) -> f64 {
        self.calculated_total_calories()
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    fn database_label(&self) -> String {
        self.database_type()
    }

    fn usda_search_results(&self) -> u64 {
        u64::from(self.usda_search_results.unwrap_or(0))
    }

    fn databases_searched(&self) -> Vec<String> {
        self.databases_searched.clone()
    }

    fn weight_grams(&self) -> f64 {
        self.weight_grams
    }

    fn nutrients(&self) -> Option<NutrientInfo> {
        self.nutrients
    }
}

/// Raw field maps read back from storage expose the same named fields as the
/// in-memory type, just untyped. Missing or malformed fields degrade to
/// zero/absent rather than failing the walk.
impl FoodFacts for Value {
    fn total_calories(&self) -> f64 {
        // Recompute from the per-100g rate, same as the live path; the stored
        // total is a display cache.
        self.get("calories_per_100g")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            * self.weight_grams()
            / 100.0
    }

    fn confidence(&self) -> f64 {
        self.get("confidence").and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn database_label(&self) -> String {
        database_label_for(self.get("data_source").and_then(Value::as_str))
    }

    fn usda_search_results(&self) -> u64 {
        self.get("usda_search_results")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    fn databases_searched(&self) -> Vec<String> {
        self.get("databases_searched")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn weight_grams(&self) -> f64 {
        self.get("weight_grams")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    fn nutrients(&self) -> Option<NutrientInfo> {
        self.get("nutrients")
            .filter(|v| v.is_object())
            .map(NutrientInfo::from_json)
    }
}

/// Nutrient gram totals across a scan, scaled to each item's portion weight
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientTotals {
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
    /// Fiber in grams
    pub fiber_g: f64,
}

/// Aggregate view of a sequence of food items
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanSummary {
    /// Number of items aggregated
    pub item_count: usize,
    /// Sum of per-item total calories; empty sequences sum to 0
    pub total_calories: f64,
    /// Occurrence count per database label, deterministically ordered
    pub database_counts: BTreeMap<String, u32>,
    /// Sum of USDA search results, absent treated as 0
    pub total_usda_results: u64,
    /// Deduplicated union of every item's databases-searched list.
    /// This is the only place deduplication happens.
    pub databases_searched: BTreeSet<String>,
    /// Arithmetic mean confidence; 0 for an empty sequence
    pub average_confidence: f64,
    /// Weight-scaled nutrient sums
    pub nutrient_totals: NutrientTotals,
}

impl ScanSummary {
    /// Whether any item carried external-database provenance
    #[must_use]
    pub fn has_provenance(&self) -> bool {
        self.total_usda_results > 0 || !self.databases_searched.is_empty()
    }
}

/// Summarize a sequence of food items.
///
/// Pure and total: an empty sequence yields all zeros, and the mean-confidence
/// division is guarded.
pub fn summarize<'a, T, I>(items: I) -> ScanSummary
where
    T: FoodFacts + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut summary = ScanSummary::default();
    let mut confidence_sum = 0.0;

    for item in items {
        summary.item_count += 1;
        summary.total_calories += item.total_calories();
        confidence_sum += item.confidence();
        summary.total_usda_results += item.usda_search_results();
        *summary
            .database_counts
            .entry(item.database_label())
            .or_insert(0) += 1;
        summary.databases_searched.extend(item.databases_searched());

        if let Some(nutrients) = item.nutrients() {
            // Storage can hand back junk weights; scaling is floored at zero.
            let scale = item.weight_grams().max(0.0) / 100.0;
            summary.nutrient_totals.protein_g += nutrients.protein * scale;
            summary.nutrient_totals.carbs_g += nutrients.carbs * scale;
            summary.nutrient_totals.fat_g += nutrients.fat * scale;
            summary.nutrient_totals.fiber_g += nutrients.fiber * scale;
        }
    }

    if summary.item_count > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            summary.average_confidence = confidence_sum / summary.item_count as f64;
        }
    }
    summary
}
