//! Error types for the field-rewriting JSON codec
//!
//! Encoding and decoding errors are serde_json's own. Directive and
//! configuration errors are raised while a codec is being set up, never
//! while a value is encoded.

use crate::directive::DirectiveError;
use std::io;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the codec
#[derive(Debug, Error)]
pub enum Error {
    /// A registered directive could not be parsed
    #[error("invalid directive for {record}.{field}: {source}")]
    Directive {
        /// Record (serde struct) name
        record: String,
        /// Field name
        field: String,
        /// Parse error
        #[source]
        source: DirectiveError,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Encoding or decoding error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
