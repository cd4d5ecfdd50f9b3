// ABOUTME: Tests for the scan aggregator over live results and raw stored field maps
// ABOUTME: Covers totals, deduplication, database counts, and live/stored equivalence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use serde_json::{json, Value};
use snapcal::aggregate::{summarize, ScanSummary};
use snapcal::models::{FoodResult, NutrientInfo};

const EPSILON: f64 = 1e-9;

fn rice_and_chicken() -> Vec<FoodResult> {
    let mut rice = FoodResult::new("Rice", 130.0, 150.0, 0.9).unwrap();
    rice.data_source = Some("USDA_Foundation_Match".to_owned());
    rice.usda_search_results = Some(12);
    rice.databases_searched = vec!["Foundation".to_owned(), "SR Legacy".to_owned()];
    rice.nutrients = Some(NutrientInfo::new(2.7, 28.2, 0.3, 0.4));

    let mut chicken = FoodResult::new("Chicken Breast", 165.0, 100.0, 0.8).unwrap();
    chicken.data_source = Some("USDA_SR_Legacy".to_owned());
    chicken.usda_search_results = Some(8);
    chicken.databases_searched = vec!["SR Legacy".to_owned()];
    chicken.nutrients = Some(NutrientInfo::new(31.0, 0.0, 3.6, 0.0));

    vec![rice, chicken]
}

#[test]
fn empty_sequence_yields_all_zeros() {
    let foods: Vec<FoodResult> = Vec::new();
    let summary = summarize(&foods);
    assert_eq!(summary, ScanSummary::default());
    assert_eq!(summary.average_confidence, 0.0);
    assert!(!summary.has_provenance());
}

#[test]
fn end_to_end_totals_for_a_two_item_scan() {
    let summary = summarize(&rice_and_chicken());

    assert_eq!(summary.item_count, 2);
    // 130 * 150/100 + 165 * 100/100 = 195 + 165
    assert!((summary.total_calories - 360.0).abs() < EPSILON);
    assert!((summary.average_confidence - 0.85).abs() < EPSILON);
    assert_eq!(summary.total_usda_results, 20);

    assert_eq!(summary.database_counts.get("Foundation"), Some(&1));
    assert_eq!(summary.database_counts.get("SR Legacy"), Some(&1));

    // Union is deduplicated.
    assert_eq!(summary.databases_searched.len(), 2);
    assert!(summary.databases_searched.contains("Foundation"));
    assert!(summary.databases_searched.contains("SR Legacy"));
    assert!(summary.has_provenance());
}

#[test]
fn nutrient_totals_scale_by_portion_weight() {
    let summary = summarize(&rice_and_chicken());
    // Rice at 150 g: 2.7 * 1.5; chicken at 100 g: 31.0 * 1.0
    assert!((summary.nutrient_totals.protein_g - (2.7 * 1.5 + 31.0)).abs() < EPSILON);
    assert!((summary.nutrient_totals.carbs_g - 28.2 * 1.5).abs() < EPSILON);
    assert!((summary.nutrient_totals.fat_g - (0.3 * 1.5 + 3.6)).abs() < EPSILON);
    assert!((summary.nutrient_totals.fiber_g - 0.4 * 1.5).abs() < EPSILON);
}

#[test]
fn items_without_provenance_count_under_unknown() {
    let foods = vec![
        FoodResult::new("A", 100.0, 100.0, 0.5).unwrap(),
        FoodResult::new("B", 100.0, 100.0, 0.5).unwrap(),
    ];
    let summary = summarize(&foods);
    assert_eq!(summary.database_counts.get("Unknown"), Some(&2));
    assert_eq!(summary.total_usda_results, 0);
    assert!(!summary.has_provenance());
}

#[test]
fn stored_field_maps_aggregate_identically_to_live_results() {
    let live = summarize(&rice_and_chicken());

    let stored: Vec<Value> = vec![
        json!({
            "name": "Rice",
            "calories_per_100g": 130.0,
            "weight_grams": 150.0,
            "confidence": 0.9,
            "data_source": "USDA_Foundation_Match",
            "usda_search_results": 12,
            "databases_searched": ["Foundation", "SR Legacy"],
            "nutrients": { "protein": 2.7, "carbs": 28.2, "fat": 0.3, "fiber": 0.4 },
        }),
        json!({
            "name": "Chicken Breast",
            "calories_per_100g": 165.0,
            "weight_grams": 100.0,
            "confidence": 0.8,
            "data_source": "USDA_SR_Legacy",
            "usda_search_results": 8,
            "databases_searched": ["SR Legacy"],
            "nutrients": { "protein": 31.0, "carbs": 0.0, "fat": 3.6, "fiber": 0.0 },
        }),
    ];
    let replayed = summarize(&stored);

    assert_eq!(replayed.item_count, live.item_count);
    assert!((replayed.total_calories - live.total_calories).abs() < EPSILON);
    assert!((replayed.average_confidence - live.average_confidence).abs() < EPSILON);
    assert_eq!(replayed.total_usda_results, live.total_usda_results);
    assert_eq!(replayed.database_counts, live.database_counts);
    assert_eq!(replayed.databases_searched, live.databases_searched);
}

#[test]
fn malformed_stored_fields_degrade_to_zero() {
    let stored: Vec<Value> = vec![json!({
        "name": "Junk",
        "calories_per_100g": "not a number",
        "weight_grams": null,
        "confidence": [],
        "databases_searched": "not an array",
    })];
    let summary = summarize(&stored);
    assert_eq!(summary.item_count, 1);
    assert_eq!(summary.total_calories, 0.0);
    assert_eq!(summary.average_confidence, 0.0);
    assert!(summary.databases_searched.is_empty());
    assert_eq!(summary.database_counts.get("Unknown"), Some(&1));
}

#[test]
fn stored_totals_are_recomputed_not_trusted() {
    // A stale cached total_calories must not leak into the sum.
    let stored: Vec<Value> = vec![json!({
        "name": "Rice",
        "calories_per_100g": 130.0,
        "weight_grams": 150.0,
        "confidence": 0.9,
        "total_calories": 77777.0,
    })];
    let summary = summarize(&stored);
    assert!((summary.total_calories - 195.0).abs() < EPSILON);
}
