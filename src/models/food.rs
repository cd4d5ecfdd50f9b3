// ABOUTME: FoodResult model for one identified food item within a scan
// ABOUTME: Defensive decoding of the analysis payload plus derived calorie and classification accessors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use crate::errors::{AppError, AppResult};
use crate::models::nutrition::NutrientInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Name used when the provider omits one
pub const UNKNOWN_FOOD_NAME: &str = "Unknown Food";
/// Per-100g calorie rate assumed when the provider omits one
pub const DEFAULT_CALORIES_PER_100G: f64 = 200.0;
/// Portion weight assumed when the provider omits one
pub const DEFAULT_WEIGHT_GRAMS: f64 = 100.0;
/// Confidence assumed when the provider omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Smallest portion weight the UI slider allows
pub const MIN_WEIGHT_GRAMS: f64 = 10.0;
/// Largest portion weight the UI slider allows
pub const MAX_WEIGHT_GRAMS: f64 = 500.0;

/// Clamp a user-adjusted portion weight into the UI slider range
#[must_use]
pub fn clamp_weight(weight_grams: f64) -> f64 {
    weight_grams.clamp(MIN_WEIGHT_GRAMS, MAX_WEIGHT_GRAMS)
}

/// Confidence classification for an identified food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Well-identified item, safe to display without caveats
    High,
    /// Plausible identification
    Medium,
    /// Weak identification, UI should flag it
    Low,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// One identified food item with its nutrition basis and optional
/// external-database provenance.
///
/// Instances are immutable; the user-adjustment path goes through
/// [`FoodResult::with_weight`], which produces a new instance. A scan's list
/// of results is replaced wholesale on re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodResult {
    /// Food name
    pub name: String,
    /// Calories per 100 g (the nutrition basis; always >= 0)
    pub calories_per_100g: f64,
    /// Current portion weight in grams (always > 0)
    pub weight_grams: f64,
    /// Identification confidence in [0, 1]
    pub confidence: f64,
    /// FoodData Central id, when matched against an external database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fdc_id: Option<i64>,
    /// Legacy NDB number, when matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndb_number: Option<String>,
    /// Raw source label reported by the nutrition lookup (e.g. "USDA_Foundation_Match")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Description of the matched database entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_match: Option<String>,
    /// Food category from the matched entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_category: Option<String>,
    /// Preparation method (e.g. "fried", "steamed")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_method: Option<String>,
    /// Number of USDA search results considered for this item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usda_search_results: Option<u32>,
    /// Source databases consulted, in source order, not deduplicated here.
    /// Deduplication happens only at aggregation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub databases_searched: Vec<String>,
    /// Per-100g macro breakdown, when the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrients: Option<NutrientInfo>,
}

impl FoodResult {
    /// Build a result from explicit values, validating the nutrition basis.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `calories_per_100g` is negative or
    /// `weight_grams` is not strictly positive.
    pub fn new(
        name: impl Into<String>,
        calories_per_100g: f64,
        weight_grams: f64,
        confidence: f64,
    ) -> AppResult<Self> {
        validate_basis(calories_per_100g, weight_grams)?;
        Ok(Self {
            name: name.into(),
            calories_per_100g,
            weight_grams,
            confidence: confidence.clamp(0.0, 1.0),
            fdc_id: None,
            ndb_number: None,
            data_source: None,
            database_match: None,
            food_category: None,
            preparation_method: None,
            usda_search_results: None,
            databases_searched: Vec::new(),
            nutrients: None,
        })
    }

    /// Build one result from a single element of the provider's `foods` array.
    ///
    /// Every field has a default; numeric fields are coerced from numbers or
    /// numeric strings. The provider's own `total_calories` is intentionally
    /// ignored: calories are always recomputed from the per-100g rate and the
    /// current weight so live portion edits stay consistent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the element is not an object or a present
    /// numeric field cannot be coerced, and `InvalidInput` if the coerced
    /// nutrition basis is out of range.
    pub fn from_enhanced_api(item: &Value) -> AppResult<Self> {
        let obj = item
            .as_object()
            .ok_or_else(|| AppError::invalid_format("food item is not a JSON object"))?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_FOOD_NAME)
            .to_owned();

        let calories_per_100g =
            required_number(obj.get("calories_per_100g"), "calories_per_100g")?
                .unwrap_or(DEFAULT_CALORIES_PER_100G);
        let weight_grams = required_number(obj.get("estimated_weight_grams"), "estimated_weight_grams")?
            .unwrap_or(DEFAULT_WEIGHT_GRAMS);
        let confidence = required_number(obj.get("confidence"), "confidence")?
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);

        validate_basis(calories_per_100g, weight_grams)?;

        // Provider-supplied totals are informational only.
        if let Some(total) = obj.get("total_calories").and_then(Value::as_f64) {
            let recomputed = calories_per_100g * weight_grams / 100.0;
            if (total - recomputed).abs() > 1.0 {
                debug!(
                    provider_total = total,
                    recomputed, "ignoring provider total_calories in favor of recomputation"
                );
            }
        }

        let databases_searched = obj
            .get("databases_searched")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name,
            calories_per_100g,
            weight_grams,
            confidence,
            fdc_id: obj.get("fdc_id").and_then(coerce_i64),
            ndb_number: obj.get("ndb_number").and_then(coerce_string),
            data_source: obj.get("data_source").and_then(coerce_string),
            database_match: obj.get("database_match").and_then(coerce_string),
            food_category: obj.get("food_category").and_then(coerce_string),
            preparation_method: obj.get("preparation_method").and_then(coerce_string),
            usda_search_results: obj
                .get("usda_search_results")
                .and_then(coerce_i64)
                .and_then(|n| u32::try_from(n).ok()),
            databases_searched,
            nutrients: obj
                .get("nutrients")
                .filter(|v| v.is_object())
                .map(NutrientInfo::from_json),
        })
    }

    /// Copy this result with a new portion weight.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the new weight is not strictly positive.
    pub fn with_weight(&self, weight_grams: f64) -> AppResult<Self> {
        validate_basis(self.calories_per_100g, weight_grams)?;
        Ok(Self {
            weight_grams,
            ..self.clone()
        })
    }

    /// Total calories for the current portion: `calories_per_100g * weight / 100`.
    ///
    /// Single source of truth for displayed and saved calories.
    #[must_use]
    pub fn calculated_total_calories(&self) -> f64 {
        self.calories_per_100g * self.weight_grams / 100.0
    }

    /// Classify the raw `data_source` label into a display database label.
    ///
    /// Ordered substring matching, first match wins; a missing source maps to
    /// "Unknown" and an unrecognized non-null source is returned verbatim.
    #[must_use]
    pub fn database_type(&self) -> String {
        database_label_for(self.data_source.as_deref())
    }

    /// Source-aware confidence classification.
    #[must_use]
    pub fn confidence_level(&self) -> ConfidenceLevel {
        let source = self.data_source.as_deref().unwrap_or("");
        let foundation = source.contains("Foundation");
        let sr_legacy = source.contains("SR_Legacy") || source.contains("SR Legacy");

        if (foundation && self.confidence > 0.7)
            || (sr_legacy && self.confidence > 0.6)
            || self.confidence > 0.8
        {
            ConfidenceLevel::High
        } else if self.confidence > 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Human-readable provenance summary: whichever of data source, FDC id,
    /// NDB number, and USDA result count are present, joined with " | ".
    #[must_use]
    pub fn data_source_info(&self) -> String {
        let mut parts = Vec::new();
        if let Some(source) = &self.data_source {
            parts.push(source.clone());
        }
        if let Some(fdc_id) = self.fdc_id {
            parts.push(format!("FDC ID: {fdc_id}"));
        }
        if let Some(ndb) = &self.ndb_number {
            parts.push(format!("NDB: {ndb}"));
        }
        if let Some(count) = self.usda_search_results {
            parts.push(format!("{count} USDA results"));
        }
        if parts.is_empty() {
            "Unknown source".to_owned()
        } else {
            parts.join(" | ")
        }
    }
}

/// Parse a provider `foods` array with partial-success semantics.
///
/// Each malformed item is logged and skipped; the batch never aborts. Callers
/// treat an all-empty result as the distinct zero-results condition.
#[must_use]
pub fn parse_batch(items: &[Value]) -> Vec<FoodResult> {
    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match FoodResult::from_enhanced_api(item) {
            Ok(food) => parsed.push(food),
            Err(err) => {
                warn!(index, error = %err, "skipping unparseable food item");
            }
        }
    }
    parsed
}

/// Ordered substring table mapping raw source labels to display labels
const SOURCE_LABELS: &[(&str, &str)] = &[
    ("Foundation", "Foundation"),
    ("SR Legacy", "SR Legacy"),
    ("SR_Legacy", "SR Legacy"),
    ("Survey", "Survey (FNDDS)"),
    ("FNDDS", "Survey (FNDDS)"),
    ("Branded", "Branded"),
    ("Estimated", "Estimated"),
    ("Fallback", "Fallback"),
];

/// Map a raw source label to its display database label.
///
/// Shared between live [`FoodResult`] values and raw stored field maps so the
/// aggregator classifies both identically.
#[must_use]
pub fn database_label_for(source: Option<&str>) -> String {
    let Some(source) = source else {
        return "Unknown".to_owned();
    };
    for (needle, label) in SOURCE_LABELS {
        if source.contains(needle) {
            return (*label).to_owned();
        }
    }
    source.to_owned()
}

fn validate_basis(calories_per_100g: f64, weight_grams: f64) -> AppResult<()> {
    if calories_per_100g.is_nan() || calories_per_100g < 0.0 {
        return Err(AppError::invalid_input(format!(
            "calories_per_100g must be non-negative, got {calories_per_100g}"
        )));
    }
    if weight_grams.is_nan() || weight_grams <= 0.0 {
        return Err(AppError::invalid_input(format!(
            "weight_grams must be positive, got {weight_grams}"
        )));
    }
    Ok(())
}

/// Coerce a present numeric field, treating null as absent.
///
/// Numbers pass through; numeric strings are parsed. Any other present value
/// is a hard per-item failure, unlike the lossy nutrient path.
fn required_number(value: Option<&Value>, field: &str) -> AppResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => coerce_f64(v).map(Some).ok_or_else(|| {
            AppError::invalid_format(format!("field '{field}' is not a coercible number"))
        }),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
