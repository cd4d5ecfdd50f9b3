// ABOUTME: Client for the deployed USDA nutrition search function
// ABOUTME: Typed decode of bucketed nutrient values with tolerant defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use crate::errors::{AppError, AppResult};
use crate::models::nutrition::NutrientInfo;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Default data types requested from the search function
pub const DEFAULT_DATA_TYPES: &str = "Foundation,SR Legacy";

/// Default page size requested from the search function
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// One nutrient value with its unit, as bucketed by the search function
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct NutrientValue {
    /// Amount per 100 g for Foundation/SR Legacy entries
    #[serde(default)]
    pub value: f64,
    /// Unit label (typically "G" or "KCAL")
    #[serde(default)]
    pub unit: String,
}

/// Bucketed nutrients for one matched food
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct NutrientBuckets {
    /// Protein per 100 g
    #[serde(default)]
    pub protein: Option<NutrientValue>,
    /// Carbohydrates per 100 g
    #[serde(default)]
    pub carbohydrates: Option<NutrientValue>,
    /// Fat per 100 g
    #[serde(default)]
    pub fat: Option<NutrientValue>,
    /// Energy per 100 g
    #[serde(default)]
    pub calories: Option<NutrientValue>,
    /// Fiber per 100 g
    #[serde(default)]
    pub fiber: Option<NutrientValue>,
}

impl NutrientBuckets {
    /// Collapse the buckets into a per-100g macro record, defaulting absent
    /// buckets to zero.
    #[must_use]
    pub fn to_nutrient_info(&self) -> NutrientInfo {
        let value = |bucket: &Option<NutrientValue>| bucket.as_ref().map_or(0.0, |n| n.value);
        NutrientInfo::new(
            value(&self.protein),
            value(&self.carbohydrates),
            value(&self.fat),
            value(&self.fiber),
        )
    }
}

/// One matched food from the search function
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FoodMatch {
    /// FoodData Central id
    #[serde(default)]
    pub fdc_id: Option<i64>,
    /// Entry description
    #[serde(default)]
    pub description: String,
    /// USDA data type ("Foundation", "SR Legacy", ...)
    #[serde(default)]
    pub data_type: Option<String>,
    /// Bucketed nutrient values
    #[serde(default)]
    pub nutrients: NutrientBuckets,
    /// Brand owner for branded entries
    #[serde(default)]
    pub brand_owner: Option<String>,
    /// Ingredient list for branded entries
    #[serde(default)]
    pub ingredients: Option<String>,
    /// Declared serving size
    #[serde(default)]
    pub serving_size: Option<f64>,
    /// Declared serving size unit
    #[serde(default)]
    pub serving_size_unit: Option<String>,
}

/// Wire response from the search function
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// "success" or "error"
    #[serde(default)]
    pub status: String,
    /// Total hits reported by USDA, before truncation
    #[serde(default)]
    pub total_results: u64,
    /// Matched foods (the function truncates to its own cap)
    #[serde(default)]
    pub foods: Vec<FoodMatch>,
}

/// Client for the deployed nutrition search function.
#[derive(Debug, Clone)]
pub struct NutritionSearchClient {
    client: Client,
    base_url: Url,
}

impl NutritionSearchClient {
    /// Build a client against the function base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> AppResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal("failed to build HTTP client").with_source(e))?;
        Ok(Self { client, base_url })
    }

    /// Search USDA entries for a food name with default data types and page
    /// size.
    ///
    /// # Errors
    ///
    /// See [`Self::search_with`].
    pub async fn search(&self, food_name: &str) -> AppResult<SearchResponse> {
        self.search_with(food_name, DEFAULT_DATA_TYPES, DEFAULT_PAGE_SIZE)
            .await
    }

    /// Search USDA entries with explicit data types and page size. No retries;
    /// failures are classified like analysis transport failures.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty query, `NetworkError`/`ReadTimeout` for
    /// transport failures, `ExternalServiceError` when the function reports
    /// an error status.
    pub async fn search_with(
        &self,
        food_name: &str,
        data_types: &str,
        page_size: u32,
    ) -> AppResult<SearchResponse> {
        if food_name.trim().is_empty() {
            return Err(AppError::invalid_input("food_name is required"));
        }

        let url = self
            .base_url
            .join("search-food-nutrition")
            .map_err(|e| AppError::config(format!("invalid search endpoint path: {e}")))?;

        let response = self
            .client
            .post(url)
            .json(&json!({
                "food_name": food_name,
                "data_type": data_types,
                "page_size": page_size,
            }))
            .send()
            .await
            .map_err(classify_transport)?;

        let payload: SearchResponse = response.json().await.map_err(classify_transport)?;
        if payload.status != "success" {
            return Err(AppError::external_service(
                "nutrition search function reported a failure",
            ));
        }
        info!(
            query = food_name,
            matches = payload.foods.len(),
            total = payload.total_results,
            "nutrition search completed"
        );
        Ok(payload)
    }
}

fn classify_transport(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::read_timed_out("nutrition search").with_source(err)
    } else if err.is_decode() {
        AppError::invalid_format("nutrition search response was not valid JSON").with_source(err)
    } else {
        AppError::network("could not reach the nutrition search function").with_source(err)
    }
}
