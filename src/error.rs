//! Unified error type for brandgen.

use thiserror::Error;

/// Errors that can occur while generating brand concepts and logos.
#[derive(Debug, Error)]
pub enum StudioError {
    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The text service answered with concepts that do not fit the schema.
    #[error("Malformed concepts: {0}")]
    MalformedConcepts(String),

    /// A concept image is not a usable `data:` URI.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// A replayed interaction was missing or recorded as a failure.
    #[error("Replay error: {0}")]
    Replay(String),

    /// No API key configured.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}
