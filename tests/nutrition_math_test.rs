// ABOUTME: Tests for NutrientInfo scaling, Atwater calorie math, and percentage shares
// ABOUTME: Covers lossy JSON construction defaults and precondition rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use serde_json::json;
use snapcal::models::NutrientInfo;

const EPSILON: f64 = 1e-9;

#[test]
fn adjusted_macros_scale_linearly_with_weight() {
    let info = NutrientInfo::new(20.0, 40.0, 10.0, 5.0);

    assert!((info.adjusted_protein(150.0).unwrap() - 30.0).abs() < EPSILON);
    assert!((info.adjusted_carbs(150.0).unwrap() - 60.0).abs() < EPSILON);
    assert!((info.adjusted_fat(150.0).unwrap() - 15.0).abs() < EPSILON);
    assert!((info.adjusted_fiber(150.0).unwrap() - 7.5).abs() < EPSILON);
}

#[test]
fn zero_weight_scales_everything_to_zero() {
    let info = NutrientInfo::new(20.0, 40.0, 10.0, 5.0);
    assert_eq!(info.adjusted_protein(0.0).unwrap(), 0.0);
    assert_eq!(info.total_macro_calories(0.0).unwrap(), 0.0);
}

#[test]
fn total_macro_calories_matches_atwater_identity() {
    let info = NutrientInfo::new(12.0, 33.0, 9.0, 4.0);
    for weight in [10.0, 100.0, 250.0, 500.0] {
        let expected = info.adjusted_protein(weight).unwrap() * 4.0
            + info.adjusted_carbs(weight).unwrap() * 4.0
            + info.adjusted_fat(weight).unwrap() * 9.0;
        let total = info.total_macro_calories(weight).unwrap();
        assert!((total - expected).abs() < EPSILON, "weight {weight}");
    }
}

#[test]
fn fiber_contributes_no_calories() {
    let with_fiber = NutrientInfo::new(10.0, 10.0, 10.0, 50.0);
    let without_fiber = NutrientInfo::new(10.0, 10.0, 10.0, 0.0);
    assert_eq!(
        with_fiber.total_macro_calories(100.0).unwrap(),
        without_fiber.total_macro_calories(100.0).unwrap()
    );
}

#[test]
fn macro_percentages_sum_to_one_hundred() {
    let info = NutrientInfo::new(25.0, 50.0, 20.0, 3.0);
    let shares = info.macro_percentages(180.0).unwrap();
    let sum = shares.protein + shares.carbs + shares.fat;
    assert!((sum - 100.0).abs() < 1e-6, "sum was {sum}");
}

#[test]
fn macro_percentages_are_all_zero_when_total_is_zero() {
    let info = NutrientInfo::new(0.0, 0.0, 0.0, 12.0);
    let shares = info.macro_percentages(200.0).unwrap();
    assert_eq!(shares.protein, 0.0);
    assert_eq!(shares.carbs, 0.0);
    assert_eq!(shares.fat, 0.0);
}

#[test]
fn from_json_defaults_every_missing_field_to_zero() {
    let info = NutrientInfo::from_json(&json!({}));
    assert_eq!(info, NutrientInfo::default());

    let partial = NutrientInfo::from_json(&json!({ "carbs": 31.5, "fiber": null }));
    assert_eq!(partial.protein, 0.0);
    assert_eq!(partial.carbs, 31.5);
    assert_eq!(partial.fiber, 0.0);
}

#[test]
fn from_json_never_fails_on_junk() {
    let info = NutrientInfo::from_json(&json!({
        "protein": "a lot",
        "carbs": [1, 2],
        "fat": {"value": 3},
        "fiber": true,
    }));
    assert_eq!(info, NutrientInfo::default());
}

#[test]
fn negative_inputs_pass_through_unchanged() {
    let info = NutrientInfo::from_json(&json!({ "fat": -2.5 }));
    assert_eq!(info.fat, -2.5);
    // Scaling still applies the raw value.
    assert_eq!(info.adjusted_fat(100.0).unwrap(), -2.5);
}

#[test]
fn negative_weight_is_a_precondition_violation() {
    let info = NutrientInfo::new(10.0, 10.0, 10.0, 1.0);
    assert!(info.adjusted_protein(-10.0).is_err());
    assert!(info.adjusted_carbs(-10.0).is_err());
    assert!(info.adjusted_fat(-10.0).is_err());
    assert!(info.adjusted_fiber(-10.0).is_err());
    assert!(info.total_macro_calories(-10.0).is_err());
    assert!(info.macro_percentages(-10.0).is_err());
}
