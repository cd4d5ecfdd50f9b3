// ABOUTME: Tests for partial-success batch parsing of provider food arrays
// ABOUTME: Covers analysis response decoding, failure payloads, and the zero-results condition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use serde_json::{json, Value};
use snapcal::analysis::{parse_response, AnalyzeResponse};
use snapcal::errors::ErrorCode;
use snapcal::models::parse_batch;

fn five_items_with_one_bad() -> Vec<Value> {
    vec![
        json!({ "name": "Rice", "calories_per_100g": 130.0, "estimated_weight_grams": 150.0, "confidence": 0.9 }),
        json!({ "name": "Chicken", "calories_per_100g": 165.0, "estimated_weight_grams": 100.0, "confidence": 0.85 }),
        // Non-numeric confidence makes this item unparseable.
        json!({ "name": "Mystery", "calories_per_100g": 100.0, "confidence": "high" }),
        json!({ "name": "Broccoli", "calories_per_100g": 34.0, "estimated_weight_grams": 90.0, "confidence": 0.8 }),
        json!({ "name": "Salmon", "calories_per_100g": 208.0, "estimated_weight_grams": 120.0, "confidence": 0.75 }),
    ]
}

#[test]
fn one_bad_item_is_skipped_without_aborting_the_batch() {
    let parsed = parse_batch(&five_items_with_one_bad());
    assert_eq!(parsed.len(), 4);
    let names: Vec<&str> = parsed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Rice", "Chicken", "Broccoli", "Salmon"]);
}

#[test]
fn non_object_elements_are_skipped() {
    let items = vec![json!("just a string"), json!(42), json!(null), json!({})];
    let parsed = parse_batch(&items);
    // Only the empty object parses (everything defaulted).
    assert_eq!(parsed.len(), 1);
}

#[test]
fn empty_batch_parses_to_empty() {
    assert!(parse_batch(&[]).is_empty());
}

#[test]
fn failure_payload_is_classified_as_external_service_error() {
    let payload = AnalyzeResponse {
        success: false,
        foods: Vec::new(),
        error: Some("model quota exceeded".to_owned()),
    };
    let err = parse_response(payload).unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    // Raw provider detail never reaches the user-facing message.
    assert!(!err.user_message().contains("quota"));
}

#[test]
fn successful_response_with_no_items_is_no_food_detected() {
    let payload = AnalyzeResponse {
        success: true,
        foods: Vec::new(),
        error: None,
    };
    let err = parse_response(payload).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoFoodDetected);
}

#[test]
fn all_items_unparseable_is_also_no_food_detected() {
    let payload = AnalyzeResponse {
        success: true,
        foods: vec![json!("bad"), json!({ "confidence": [] })],
        error: None,
    };
    let err = parse_response(payload).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoFoodDetected);
}

#[test]
fn successful_response_yields_parsed_foods() {
    let payload = AnalyzeResponse {
        success: true,
        foods: five_items_with_one_bad(),
        error: None,
    };
    let foods = parse_response(payload).unwrap();
    assert_eq!(foods.len(), 4);
}

#[test]
fn wire_response_decodes_with_every_field_defaulted() {
    let payload: AnalyzeResponse = serde_json::from_str("{}").unwrap();
    assert!(!payload.success);
    assert!(payload.foods.is_empty());
    assert!(payload.error.is_none());
}
