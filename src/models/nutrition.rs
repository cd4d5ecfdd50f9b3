// ABOUTME: Per-100g macronutrient record and portion-scaled calorie arithmetic
// ABOUTME: NutrientInfo with Atwater-factor macro calories and percentage shares
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Calories per gram of protein (Atwater factor)
pub const PROTEIN_CALORIES_PER_GRAM: f64 = 4.0;
/// Calories per gram of carbohydrate (Atwater factor)
pub const CARB_CALORIES_PER_GRAM: f64 = 4.0;
/// Calories per gram of fat (Atwater factor)
pub const FAT_CALORIES_PER_GRAM: f64 = 9.0;

/// Macronutrient content per 100 g of food.
///
/// Immutable value object: replaced wholesale when portion data changes,
/// never updated in place. Fiber is tracked but excluded from calorie math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NutrientInfo {
    /// Protein in grams per 100 g
    pub protein: f64,
    /// Carbohydrates in grams per 100 g
    pub carbs: f64,
    /// Fat in grams per 100 g
    pub fat: f64,
    /// Dietary fiber in grams per 100 g
    pub fiber: f64,
}

/// Each macro's share of total macro calories, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacroPercentages {
    /// Protein share in percent
    pub protein: f64,
    /// Carbohydrate share in percent
    pub carbs: f64,
    /// Fat share in percent
    pub fat: f64,
}

impl NutrientInfo {
    /// Build from explicit per-100g values
    #[must_use]
    pub const fn new(protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
            fiber,
        }
    }

    /// Build from a loosely-typed JSON object.
    ///
    /// Missing, null, or non-numeric keys default to 0.0; this construction
    /// never fails. Negative values are preserved as-is.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        Self {
            protein: lossy_number(value.get("protein")),
            carbs: lossy_number(value.get("carbs")),
            fat: lossy_number(value.get("fat")),
            fiber: lossy_number(value.get("fiber")),
        }
    }

    /// Protein in grams for an actual serving of `weight_grams`
    pub fn adjusted_protein(&self, weight_grams: f64) -> AppResult<f64> {
        Ok(self.protein * check_weight(weight_grams)? / 100.0)
    }

    /// Carbohydrates in grams for an actual serving of `weight_grams`
    pub fn adjusted_carbs(&self, weight_grams: f64) -> AppResult<f64> {
        Ok(self.carbs * check_weight(weight_grams)? / 100.0)
    }

    /// Fat in grams for an actual serving of `weight_grams`
    pub fn adjusted_fat(&self, weight_grams: f64) -> AppResult<f64> {
        Ok(self.fat * check_weight(weight_grams)? / 100.0)
    }

    /// Fiber in grams for an actual serving of `weight_grams`
    pub fn adjusted_fiber(&self, weight_grams: f64) -> AppResult<f64> {
        Ok(self.fiber * check_weight(weight_grams)? / 100.0)
    }

    /// Total macro calories for a serving: 4/4/9 over protein, carbs, fat.
    ///
    /// Fiber contributes no calories here.
    pub fn total_macro_calories(&self, weight_grams: f64) -> AppResult<f64> {
        Ok(self.adjusted_protein(weight_grams)? * PROTEIN_CALORIES_PER_GRAM
            + self.adjusted_carbs(weight_grams)? * CARB_CALORIES_PER_GRAM
            + self.adjusted_fat(weight_grams)? * FAT_CALORIES_PER_GRAM)
    }

    /// Each macro's calorie share of [`Self::total_macro_calories`].
    ///
    /// Returns all zeros when the total is zero, so callers never divide by
    /// zero on foods with no recorded macros.
    pub fn macro_percentages(&self, weight_grams: f64) -> AppResult<MacroPercentages> {
        let total = self.total_macro_calories(weight_grams)?;
        if total == 0.0 {
            return Ok(MacroPercentages::default());
        }
        Ok(MacroPercentages {
            protein: self.adjusted_protein(weight_grams)? * PROTEIN_CALORIES_PER_GRAM / total
                * 100.0,
            carbs: self.adjusted_carbs(weight_grams)? * CARB_CALORIES_PER_GRAM / total * 100.0,
            fat: self.adjusted_fat(weight_grams)? * FAT_CALORIES_PER_GRAM / total * 100.0,
        })
    }
}

/// Reject negative serving weights; scaling is only defined for w >= 0
fn check_weight(weight_grams: f64) -> AppResult<f64> {
    if weight_grams.is_nan() || weight_grams < 0.0 {
        return Err(AppError::invalid_input(format!(
            "serving weight must be non-negative, got {weight_grams}"
        )));
    }
    Ok(weight_grams)
}

/// Coerce an optional JSON value to f64, defaulting to 0.0
fn lossy_number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}
