//! Common types and utilities shared across croscan crates.
//!
//! This crate defines the shared error type, the fetch status policy, and the
//! observability helpers used throughout the croscan workspace. It is kept
//! lightweight so every crate can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`CroError`] and [`Result`]: Shared error handling
//! - [`StatusPolicy`]: How the page fetcher classifies HTTP status codes
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use croscan_common::{CroError, StatusPolicy};
//!
//! assert!(StatusPolicy::OkOnly.accepts(200));
//! assert!(!StatusPolicy::OkOnly.accepts(204));
//!
//! let err = CroError::fetch(Some(404), "Failed to fetch URL");
//! assert!(err.is_fetch());
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Decides which HTTP status codes count as a successful page fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Only `200 OK` is a success.
    #[default]
    OkOnly,
    /// Any `2xx` status is a success.
    Success,
}

impl StatusPolicy {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            StatusPolicy::OkOnly => status == 200,
            StatusPolicy::Success => (200..300).contains(&status),
        }
    }
}

/// Error types used across the croscan pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CroError {
    /// The page could not be retrieved: bad status or transport fault.
    #[error("Failed to fetch URL: {message}")]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    /// The model-serving call failed or was unreachable.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else raised during orchestration.
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl CroError {
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: message.into(),
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

/// Convenient alias for results that use [`CroError`].
pub type Result<T> = std::result::Result<T, CroError>;
