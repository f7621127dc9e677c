//! Error types for the pre-selection engine
//!
//! Only configuration and setup can fail in a recoverable way: once a module
//! is built, event processing is an infallible accept/reject decision.

use thiserror::Error;

/// Pre-selection error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration value (wrong channel string, bad key)
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed numeric parameter of a selection or cleaner
    #[error("bad parameter: {0}")]
    BadParameter(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
