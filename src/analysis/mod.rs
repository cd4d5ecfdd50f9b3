// ABOUTME: HTTP client for the food-photo analysis endpoint
// ABOUTME: Posts base64 images, decodes the foods payload with partial success, classifies failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

//! # Analysis Endpoint Client
//!
//! Consumes the cloud analysis function: `POST {"image": <base64>}`, response
//! `{success, foods?, error?}`. The analysis call carries its own client
//! timeout and is never retried; a timeout is surfaced distinctly from a
//! connectivity failure, and a transport-successful response with no
//! parseable items is the distinct zero-results condition.

/// USDA nutrition search client
pub mod usda;

use crate::errors::{AppError, AppResult};
use crate::models::food::{parse_batch, FoodResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default analysis request timeout
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(45);

/// Connection timeout for the underlying client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw wire response from the analysis endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    /// Whether the service considers the analysis successful
    #[serde(default)]
    pub success: bool,
    /// Raw food items; decoded item-by-item so one bad element cannot
    /// poison the batch
    #[serde(default)]
    pub foods: Vec<Value>,
    /// Service-reported error detail (logged, never shown to users)
    #[serde(default)]
    pub error: Option<String>,
}

/// Health payload reported by the analysis service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    /// Service status string ("healthy" when up)
    #[serde(default)]
    pub status: String,
    /// Service name
    #[serde(default)]
    pub service: String,
    /// Whether the service has its inference API key configured
    #[serde(default)]
    pub gemini_api_key: String,
}

/// Client for the food analysis endpoint.
///
/// Explicitly constructed and handed to callers; there is no process-wide
/// shared instance.
#[derive(Debug, Clone)]
pub struct FoodAnalyzer {
    client: Client,
    base_url: Url,
}

impl FoodAnalyzer {
    /// Build a client against the service base URL with the given request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> AppResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal("failed to build HTTP client").with_source(e))?;
        Ok(Self { client, base_url })
    }

    /// Analyze a food photo.
    ///
    /// # Errors
    ///
    /// `AnalysisTimeout` when the request exceeds its bound, `NetworkError`
    /// when the endpoint is unreachable, `ExternalServiceError` when the
    /// service reports a failure payload, and `NoFoodDetected` when the
    /// response parses to zero items.
    pub async fn analyze(&self, image: &[u8]) -> AppResult<Vec<FoodResult>> {
        let url = self.endpoint("analyze-food")?;
        info!(bytes = image.len(), "submitting food photo for analysis");

        let response = self
            .client
            .post(url)
            .json(&json!({ "image": BASE64.encode(image) }))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body, "analysis endpoint returned an error status");
            return Err(AppError::external_service(format!(
                "analysis endpoint returned status {status}"
            )));
        }

        let payload: AnalyzeResponse = response.json().await.map_err(classify_transport)?;
        let foods = parse_response(payload)?;
        info!(items = foods.len(), "analysis completed");
        Ok(foods)
    }

    /// Probe the service health endpoint.
    ///
    /// # Errors
    ///
    /// Classified the same way as [`Self::analyze`] transport failures.
    pub async fn health(&self) -> AppResult<ServiceHealth> {
        let url = self.endpoint("health")?;
        let health = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?
            .json::<ServiceHealth>()
            .await
            .map_err(classify_transport)?;
        debug!(status = %health.status, "analysis service health");
        Ok(health)
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::config(format!("invalid analyzer endpoint path: {e}")))
    }
}

/// Decode an analysis response into food results.
///
/// Public so the decode path is testable without a live endpoint.
///
/// # Errors
///
/// `ExternalServiceError` for a failure payload, `NoFoodDetected` when no
/// item in the batch parses.
pub fn parse_response(payload: AnalyzeResponse) -> AppResult<Vec<FoodResult>> {
    if !payload.success {
        // Raw provider error strings stay in the logs; callers only see the
        // classified category.
        warn!(
            error = payload.error.as_deref().unwrap_or("unspecified"),
            "analysis service reported a failure"
        );
        return Err(AppError::external_service(
            "analysis service reported a failure payload",
        ));
    }

    let foods = parse_batch(&payload.foods);
    if foods.is_empty() {
        return Err(AppError::no_food_detected());
    }
    Ok(foods)
}

fn classify_transport(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::analysis_timed_out().with_source(err)
    } else if err.is_decode() {
        AppError::invalid_format("analysis response was not valid JSON").with_source(err)
    } else {
        AppError::network("could not reach the analysis endpoint").with_source(err)
    }
}
