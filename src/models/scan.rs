// ABOUTME: Persisted scan record shapes: food snapshots, metadata, and data-quality blocks
// ABOUTME: Write-side ScanDocument and tolerant read-side ScanRecord decoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use crate::models::food::FoodResult;
use crate::models::nutrition::NutrientInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flattened copy of a [`FoodResult`] as stored inside a scan record.
///
/// `total_calories` is denormalized at save time; readers re-derive their own
/// aggregates by re-walking snapshots rather than trusting stored totals for
/// anything beyond display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSnapshot {
    /// Food name
    #[serde(default = "default_name")]
    pub name: String,
    /// Calories per 100 g at save time
    #[serde(default)]
    pub calories_per_100g: f64,
    /// Portion weight in grams at save time
    #[serde(default)]
    pub weight_grams: f64,
    /// Total calories for the portion, cached at save time
    #[serde(default)]
    pub total_calories: f64,
    /// Identification confidence
    #[serde(default)]
    pub confidence: f64,
    /// FoodData Central id, if matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdc_id: Option<i64>,
    /// Legacy NDB number, if matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndb_number: Option<String>,
    /// Raw source label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Matched database entry description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_match: Option<String>,
    /// Food category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_category: Option<String>,
    /// Preparation method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_method: Option<String>,
    /// USDA search result count for this item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usda_search_results: Option<u32>,
    /// Source databases consulted for this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases_searched: Vec<String>,
    /// Per-100g macro breakdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<NutrientInfo>,
}

fn default_name() -> String {
    crate::models::food::UNKNOWN_FOOD_NAME.to_owned()
}

impl From<&FoodResult> for FoodSnapshot {
    fn from(food: &FoodResult) -> Self {
        Self {
            name: food.name.clone(),
            calories_per_100g: food.calories_per_100g,
            weight_grams: food.weight_grams,
            total_calories: food.calculated_total_calories(),
            confidence: food.confidence,
            fdc_id: food.fdc_id,
            ndb_number: food.ndb_number.clone(),
            data_source: food.data_source.clone(),
            database_match: food.database_match.clone(),
            food_category: food.food_category.clone(),
            preparation_method: food.preparation_method.clone(),
            usda_search_results: food.usda_search_results,
            databases_searched: food.databases_searched.clone(),
            nutrients: food.nutrients,
        }
    }
}

/// Free-form scan metadata map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScanMetadata {
    /// Application version that produced the scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Device platform (e.g. "android", "ios", "cli")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// When the analysis itself ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
    /// Deduplicated set of databases searched across items, when enhanced
    /// provenance is available
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases_searched: Vec<String>,
    /// Aggregate USDA result count across items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usda_total_results: Option<u64>,
    /// Anything else the client wants to stash
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-source counts and mean confidence across a scan's items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DataQuality {
    /// Item count per database label
    #[serde(default)]
    pub source_counts: BTreeMap<String, u32>,
    /// Arithmetic mean confidence across items (0 for empty scans)
    #[serde(default)]
    pub average_confidence: f64,
}

/// The JSON document persisted for one completed analysis+save action.
///
/// Owning session id, record id, and server-assigned creation timestamp are
/// store-level columns, not part of the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScanDocument {
    /// Sum of all snapshot totals at the moment of save; a denormalized
    /// cache, never recomputed after write
    #[serde(default)]
    pub total_calories: f64,
    /// Ordered food-item snapshots
    #[serde(default)]
    pub foods: Vec<FoodSnapshot>,
    /// Local image path (a reference, never the bytes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: ScanMetadata,
    /// Item count per database label
    #[serde(default)]
    pub database_counts: BTreeMap<String, u32>,
    /// Data-quality block
    #[serde(default)]
    pub data_quality: DataQuality,
}

/// A scan read back from the record store
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    /// Store-assigned record id
    pub id: String,
    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
    /// Decoded document body
    pub document: ScanDocument,
}

impl ScanRecord {
    /// Decode a stored document tolerantly: missing or malformed fields
    /// become defaults rather than failing the record, and one malformed
    /// snapshot never drops its siblings.
    #[must_use]
    pub fn from_stored(id: String, created_at: DateTime<Utc>, document: &Value) -> Self {
        fn decode<T: serde::de::DeserializeOwned>(document: &Value, key: &str) -> Option<T> {
            document
                .get(key)
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
        }

        let foods = document
            .get("foods")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let document = ScanDocument {
            total_calories: document
                .get("total_calories")
                .and_then(Value::as_f64)
                .unwrap_or_default(),
            foods,
            image_path: document
                .get("image_path")
                .and_then(Value::as_str)
                .map(str::to_owned),
            metadata: decode(document, "metadata").unwrap_or_default(),
            database_counts: decode(document, "database_counts").unwrap_or_default(),
            data_quality: decode(document, "data_quality").unwrap_or_default(),
        };
        Self {
            id,
            created_at,
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_stored_decodes_fields_independently() {
        let doc = json!({
            "total_calories": "not a number",
            "foods": [{ "name": "Rice", "weight_grams": 150.0 }],
            "metadata": [1, 2, 3],
            "database_counts": { "Foundation": 1 },
        });
        let record = ScanRecord::from_stored("id-1".to_owned(), Utc::now(), &doc);

        // Bad fields fall back alone; good siblings survive.
        assert_eq!(record.document.total_calories, 0.0);
        assert_eq!(record.document.metadata, ScanMetadata::default());
        assert_eq!(record.document.foods.len(), 1);
        assert_eq!(record.document.foods[0].name, "Rice");
        assert_eq!(record.document.database_counts.get("Foundation"), Some(&1));
    }

    #[test]
    fn one_malformed_snapshot_does_not_drop_its_siblings() {
        let doc = json!({
            "foods": [
                { "name": "Rice" },
                "garbage",
                { "name": "Chicken" },
            ],
        });
        let record = ScanRecord::from_stored("id-2".to_owned(), Utc::now(), &doc);
        let names: Vec<&str> = record
            .document
            .foods
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["Rice", "Chicken"]);
    }

    #[test]
    fn null_document_decodes_to_defaults() {
        let record = ScanRecord::from_stored("id-3".to_owned(), Utc::now(), &Value::Null);
        assert_eq!(record.document, ScanDocument::default());
    }

    #[test]
    fn snapshot_from_food_result_caches_the_computed_total() {
        let food = FoodResult::new("Rice", 130.0, 150.0, 0.9).unwrap();
        let snapshot = FoodSnapshot::from(&food);
        assert!((snapshot.total_calories - 195.0).abs() < 1e-9);
    }
}
