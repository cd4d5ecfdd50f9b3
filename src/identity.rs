// ABOUTME: Anonymous session identity for scoping stored records to an installation
// ABOUTME: IdentityProvider trait plus a file-backed per-installation UUID implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Snapcal

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Stable anonymous session identifier. Scopes stored records to their
/// originating installation without collecting personal data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-level identity failures, before boundary reclassification
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider could not be reached
    #[error("network failure during authentication: {0}")]
    Network(String),
    /// The provider rejected anonymous sessions by policy
    #[error("anonymous authentication is disabled: {0}")]
    Disabled(String),
    /// Local identity storage failed
    #[error("identity storage failure: {0}")]
    Storage(String),
}

/// Source of the anonymous session identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain or create the stable per-installation session id.
    ///
    /// # Errors
    ///
    /// Returns a provider-level failure; the gateway maps network failures to
    /// the "check connection" category and policy failures to the
    /// "not enabled" category.
    async fn session_id(&self) -> Result<SessionId, IdentityError>;
}

/// File-backed identity: a UUID persisted under the platform data directory,
/// created on first use.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    /// Use an explicit identity file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional identity file location for this platform
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("snapcal").join("installation_id"))
    }

    /// Build against the platform default location.
    ///
    /// # Errors
    ///
    /// Fails when the platform exposes no data directory.
    pub fn from_default() -> Result<Self, IdentityError> {
        Self::default_path().map(Self::new).ok_or_else(|| {
            IdentityError::Storage("no platform data directory available".to_owned())
        })
    }

    /// The identity file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IdentityProvider for FileIdentity {
    async fn session_id(&self) -> Result<SessionId, IdentityError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let id = contents.trim();
                if !id.is_empty() {
                    return Ok(SessionId::new(id));
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(IdentityError::Storage(err.to_string())),
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| IdentityError::Storage(e.to_string()))?;
        }
        fs::write(&self.path, &id)
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        info!(path = %self.path.display(), "created new installation identity");
        Ok(SessionId::new(id))
    }
}
