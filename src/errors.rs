// ABOUTME: Unified error handling for the snapcal core library
// ABOUTME: Defines the error taxonomy surfaced to UI callers with stable, user-presentable messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

//! # Unified Error Handling
//!
//! Every failure that crosses the library boundary is reclassified into the
//! [`ErrorCode`] taxonomy before callers see it. Raw provider/store error
//! strings never leak upward; the UI layer renders [`ErrorCode::description`]
//! and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes surfaced by the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Connectivity (1000-1999)
    #[serde(rename = "NETWORK_ERROR")]
    NetworkError = 1000,
    #[serde(rename = "ANALYSIS_TIMEOUT")]
    AnalysisTimeout = 1001,
    #[serde(rename = "SAVE_TIMEOUT")]
    SaveTimeout = 1002,
    #[serde(rename = "READ_TIMEOUT")]
    ReadTimeout = 1003,
    #[serde(rename = "CONNECTION_TEST_FAILED")]
    ConnectionTestFailed = 1004,

    // Identity (2000-2999)
    #[serde(rename = "AUTH_FAILED")]
    AuthFailed = 2000,
    #[serde(rename = "AUTH_DISABLED")]
    AuthDisabled = 2001,

    // Record store (3000-3999)
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 3000,
    #[serde(rename = "SERVICE_UNAVAILABLE")]
    ServiceUnavailable = 3001,
    #[serde(rename = "STORE_NOT_FOUND")]
    StoreNotFound = 3002,
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 3003,

    // Analysis (4000-4999)
    #[serde(rename = "NO_FOOD_DETECTED")]
    NoFoodDetected = 4000,
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 4001,

    // Validation (5000-5999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 5000,
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 5001,

    // Internal (9000-9999)
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9000,
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 9001,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9002,
}

impl ErrorCode {
    /// Get the user-presentable description for this error.
    ///
    /// These strings are the contract with the UI layer: they are stable and
    /// safe to display verbatim.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NetworkError => "Network error. Check your connection and try again",
            Self::AnalysisTimeout => "Food analysis timed out. Try again with a smaller photo",
            Self::SaveTimeout => "Saving timed out. Check your connection and try again",
            Self::ReadTimeout => "Loading timed out. Check your connection and try again",
            Self::ConnectionTestFailed => "Connection test failed. Unable to reach the record store",
            Self::AuthFailed => "Authentication failed. Check your internet connection",
            Self::AuthDisabled => "Anonymous sign-in is not enabled for this project",
            Self::PermissionDenied => "Permission denied. The record store rejected the request",
            Self::ServiceUnavailable => "The record store is temporarily unavailable. Try again later",
            Self::StoreNotFound => "Record store not found. The project may be misconfigured",
            Self::StorageError => "Storage operation failed",
            Self::NoFoodDetected => "No food items were detected in the photo",
            Self::ExternalServiceError => "The analysis service reported an error",
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidFormat => "The data format is invalid",
            Self::SerializationError => "Data serialization failed",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
        }
    }

    /// Whether this code represents a timeout-triggered abandonment
    #[must_use]
    pub const fn is_timeout(self) -> bool {
        matches!(
            self,
            Self::AnalysisTimeout | Self::SaveTimeout | Self::ReadTimeout
        )
    }
}

/// Unified error type for the library
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code locating this failure in the taxonomy
    pub code: ErrorCode,
    /// Human-readable detail (diagnostic, not shown to end users)
    pub message: String,
    /// Source error for chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given code and diagnostic message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The stable message shown to end users
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.code.description()
    }

    /// Network/connectivity failure reaching an endpoint
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    /// Analysis request exceeded its client timeout
    #[must_use]
    pub fn analysis_timed_out() -> Self {
        Self::new(ErrorCode::AnalysisTimeout, "analysis request exceeded its time bound")
    }

    /// Save operation exceeded its overall timeout
    #[must_use]
    pub fn save_timed_out() -> Self {
        Self::new(ErrorCode::SaveTimeout, "save operation exceeded its time bound")
    }

    /// Read operation exceeded its timeout
    pub fn read_timed_out(operation: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ReadTimeout,
            format!("{} exceeded its time bound", operation.into()),
        )
    }

    /// Connectivity preflight against the diagnostic location failed
    pub fn connection_test_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConnectionTestFailed, message)
    }

    /// Identity provider rejected the session request
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthFailed, message)
    }

    /// Anonymous authentication is disabled on the provider
    #[must_use]
    pub fn auth_disabled() -> Self {
        Self::new(
            ErrorCode::AuthDisabled,
            "identity provider reports anonymous sessions are not enabled",
        )
    }

    /// Record store rejected the request under current access policy
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Record store reports an outage
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Record store or project is misconfigured
    pub fn store_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreNotFound, message)
    }

    /// Generic storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Analysis succeeded transport-wise but identified no food items
    #[must_use]
    pub fn no_food_detected() -> Self {
        Self::new(
            ErrorCode::NoFoodDetected,
            "analysis response contained no parseable food items",
        )
    }

    /// Analysis service reported a failure payload
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceError, message)
    }

    /// Input validation failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Malformed data encountered during decoding
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    /// Configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal invariant violation
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, err.to_string()).with_source(err)
    }
}

/// Result type alias for library operations
pub type AppResult<T> = Result<T, AppError>;
