/*!
 * Error types for the pgnexport application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to an archive source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

/// Errors that make a movetext decode bail out to raw passthrough
#[derive(Error, Debug)]
pub enum MovetextError {
    /// A move-number marker whose numeric prefix does not parse
    #[error("Move-number marker has no numeric prefix: {0}")]
    BadMarker(String),

    /// A move token arrived before any move-number marker
    #[error("Move token before any move-number marker: {0}")]
    UnanchoredMove(String),
}

/// Errors that can occur during CSV export
#[derive(Error, Debug)]
pub enum ExportError {}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from an archive source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from movetext decoding
    #[error("Movetext error: {0}")]
    Movetext(#[from] MovetextError),

    /// Error from CSV export
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
