//! Centralized error types for the Comfycast services.
//!
//! Only caller mistakes (bad input, asking for an uncached day) surface to
//! the boundary as typed errors; upstream weather failures degrade to empty
//! data inside the adapters and never reach this module.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for API responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Comfort error: {0}")]
    Comfort(#[from] ComfortError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for the HTTP boundary.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Cache(e) => e.user_message(),
            AppError::Comfort(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Day cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached weather for {city} on {date}")]
    DayNotCached { city: String, date: String },

    #[error("cache storage error: {0}")]
    Storage(String),
}

impl CacheError {
    pub fn user_message(&self) -> String {
        match self {
            CacheError::DayNotCached { city, date } => format!(
                "No cached weather for {} on {}. Fetch the forecast first.",
                city, date
            ),
            CacheError::Storage(_) => {
                "Local weather data could not be accessed. Please try again.".to_string()
            }
        }
    }
}

/// Comfort query input errors.
#[derive(Debug, Error)]
pub enum ComfortError {
    #[error("unsupported sex value: {0}")]
    InvalidSex(String),
}

impl ComfortError {
    pub fn user_message(&self) -> String {
        match self {
            ComfortError::InvalidSex(_) => {
                "Sex must be one of: male, female, m, f, 1, 0.".to_string()
            }
        }
    }
}
