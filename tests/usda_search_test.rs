// ABOUTME: Tests for the USDA nutrition search wire types
// ABOUTME: Covers camelCase decoding, bucket collapsing, and tolerant defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use snapcal::analysis::usda::{FoodMatch, NutrientBuckets, SearchResponse};

#[test]
fn search_response_decodes_the_function_payload() {
    let payload = r#"{
        "status": "success",
        "total_results": 42,
        "foods": [
            {
                "fdcId": 171688,
                "description": "Apples, raw, with skin",
                "dataType": "Foundation",
                "nutrients": {
                    "protein": { "value": 0.26, "unit": "G" },
                    "carbohydrates": { "value": 13.81, "unit": "G" },
                    "fat": { "value": 0.17, "unit": "G" },
                    "calories": { "value": 52.0, "unit": "KCAL" },
                    "fiber": { "value": 2.4, "unit": "G" }
                },
                "servingSize": 100.0,
                "servingSizeUnit": "g"
            }
        ]
    }"#;

    let response: SearchResponse = serde_json::from_str(payload).unwrap();
    assert_eq!(response.status, "success");
    assert_eq!(response.total_results, 42);
    assert_eq!(response.foods.len(), 1);

    let apple = &response.foods[0];
    assert_eq!(apple.fdc_id, Some(171_688));
    assert_eq!(apple.data_type.as_deref(), Some("Foundation"));
    assert_eq!(apple.serving_size, Some(100.0));
    assert_eq!(apple.nutrients.calories.as_ref().unwrap().value, 52.0);
    assert_eq!(apple.nutrients.calories.as_ref().unwrap().unit, "KCAL");
}

#[test]
fn sparse_food_matches_decode_with_defaults() {
    let m: FoodMatch = serde_json::from_str(r#"{ "description": "Mystery item" }"#).unwrap();
    assert_eq!(m.fdc_id, None);
    assert_eq!(m.description, "Mystery item");
    assert!(m.brand_owner.is_none());
    assert_eq!(m.nutrients, NutrientBuckets::default());
}

#[test]
fn buckets_collapse_into_a_per_100g_record() {
    let buckets: NutrientBuckets = serde_json::from_str(
        r#"{
            "protein": { "value": 0.26, "unit": "G" },
            "carbohydrates": { "value": 13.81, "unit": "G" },
            "fiber": { "value": 2.4, "unit": "G" }
        }"#,
    )
    .unwrap();

    let info = buckets.to_nutrient_info();
    assert_eq!(info.protein, 0.26);
    assert_eq!(info.carbs, 13.81);
    // Absent fat bucket defaults to zero.
    assert_eq!(info.fat, 0.0);
    assert_eq!(info.fiber, 2.4);
}

#[test]
fn branded_entries_carry_owner_and_ingredients() {
    let m: FoodMatch = serde_json::from_str(
        r#"{
            "fdcId": 2038064,
            "description": "GRANOLA BAR",
            "dataType": "Branded",
            "brandOwner": "Some Brand LLC",
            "ingredients": "OATS, HONEY, SALT"
        }"#,
    )
    .unwrap();
    assert_eq!(m.brand_owner.as_deref(), Some("Some Brand LLC"));
    assert!(m.ingredients.as_deref().unwrap().contains("OATS"));
}

#[test]
fn error_status_decodes_without_foods() {
    let response: SearchResponse =
        serde_json::from_str(r#"{ "status": "error" }"#).unwrap();
    assert_eq!(response.status, "error");
    assert_eq!(response.total_results, 0);
    assert!(response.foods.is_empty());
}
