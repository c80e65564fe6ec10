//! Text generator port for schema-constrained language model calls.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// A request for structured text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash"`).
    pub model: String,
    /// The natural-language instruction.
    pub prompt: String,
    /// JSON schema the answer must follow.
    pub response_schema: serde_json::Value,
}

/// Raw text answer. Expected to parse as the requested schema, but not
/// guaranteed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    /// The answer text.
    pub text: String,
}

/// Boxed future type returned by [`TextGenerator::generate`].
pub type TextFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TextResponse, StudioError>> + Send + 'a>>;

/// Generates structured text from a prompt via an external API.
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given request.
    fn generate(&self, request: &TextRequest) -> TextFuture<'_>;
}
