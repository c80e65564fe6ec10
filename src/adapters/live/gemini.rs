//! Live adapters for the Gemini `generateContent` API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiKey;
use crate::error::StudioError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, ImageGenerator, ImageRequest, ImageResponse,
};
use crate::ports::text_generator::{TextFuture, TextGenerator, TextRequest, TextResponse};

/// Default base URL of the Gemini models endpoint.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// MIME type assumed when an inline image part omits one.
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Connection details shared by the Gemini adapters.
struct GeminiEndpoint {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiEndpoint {
    fn new(api_key: ApiKey, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { client: Client::new(), api_key, base_url }
    }

    /// POST `body` to `{base}/{model}:generateContent`, returning the parsed
    /// response and its raw text.
    async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<(GeminiResponse, String), StudioError> {
        let url = format!("{}/{model}:generateContent", self.base_url);
        debug!(%url, "calling Gemini");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(StudioError::Api { status: status.as_u16(), message: response_text });
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            StudioError::Api { status: 200, message: format!("Failed to parse response: {e}") }
        })?;
        Ok((parsed, response_text))
    }
}

/// Live Gemini text generator with schema-constrained JSON output.
pub struct GeminiTextGenerator {
    endpoint: GeminiEndpoint,
}

impl GeminiTextGenerator {
    /// Create a new text generator with the given API key.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create a text generator that talks to `base_url` instead of Google.
    #[must_use]
    pub fn with_base_url(api_key: ApiKey, base_url: &str) -> Self {
        Self { endpoint: GeminiEndpoint::new(api_key, base_url) }
    }
}

impl TextGenerator for GeminiTextGenerator {
    fn generate(&self, request: &TextRequest) -> TextFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": request.prompt}]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": request.response_schema,
                }
            });

            let (parsed, response_text) =
                self.endpoint.generate_content(&request.model, &body).await?;

            let text: String = parsed
                .candidates
                .into_iter()
                .next()
                .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();

            if text.trim().is_empty() {
                return Err(StudioError::Api {
                    status: 200,
                    message: format!("No text in response. Body: {}", truncate(&response_text)),
                });
            }

            Ok(TextResponse { text })
        })
    }
}

/// Live Gemini image generator.
pub struct GeminiImageGenerator {
    endpoint: GeminiEndpoint,
}

impl GeminiImageGenerator {
    /// Create a new image generator with the given API key.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create an image generator that talks to `base_url` instead of Google.
    #[must_use]
    pub fn with_base_url(api_key: ApiKey, base_url: &str) -> Self {
        Self { endpoint: GeminiEndpoint::new(api_key, base_url) }
    }
}

impl ImageGenerator for GeminiImageGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": request.prompt}]
                }],
                "generationConfig": {
                    "responseModalities": ["IMAGE"],
                    "imageConfig": {
                        "aspectRatio": request.aspect_ratio,
                    }
                }
            });

            let (parsed, response_text) =
                self.endpoint.generate_content(&request.model, &body).await?;

            let parts = parsed.candidates.into_iter().next().map(|c| c.content.parts);
            let image = parts.unwrap_or_default().into_iter().find_map(|part| {
                let inline = part.inline_data.filter(|inline| !inline.data.is_empty())?;
                match base64::engine::general_purpose::STANDARD.decode(&inline.data) {
                    Ok(data) => {
                        let mime_type =
                            inline.mime_type.unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                        Some(GeneratedImage { data, mime_type })
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping inline image with invalid base64");
                        None
                    }
                }
            });

            if image.is_none() {
                debug!(body = %truncate(&response_text), "no inline images in response");
            }

            Ok(ImageResponse { images: image.into_iter().collect() })
        })
    }
}

/// Shorten a response body for error messages.
fn truncate(text: &str) -> String {
    const LIMIT: usize = 500;
    if text.chars().count() > LIMIT {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    } else {
        text.to_string()
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Default, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: Option<String>,
    data: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn key() -> ApiKey {
        ApiKey::new("test-key")
    }

    fn text_request() -> TextRequest {
        TextRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "three concepts please".into(),
            response_schema: json!({"type": "ARRAY"}),
        }
    }

    fn image_request() -> ImageRequest {
        ImageRequest {
            model: "gemini-2.5-flash-image".into(),
            prompt: "a fox, flat design".into(),
            aspect_ratio: "1:1".into(),
        }
    }

    #[tokio::test]
    async fn text_sends_schema_and_joins_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "ARRAY"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "[{\"a\":"}, {"text": "1}]"}]}
                }]
            })))
            .mount(&server)
            .await;

        let generator = GeminiTextGenerator::with_base_url(key(), &server.uri());
        let response = generator.generate(&text_request()).await.unwrap();
        assert_eq!(response.text, "[{\"a\":1}]");
    }

    #[tokio::test]
    async fn text_without_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let generator = GeminiTextGenerator::with_base_url(key(), &server.uri());
        let err = generator.generate(&text_request()).await.unwrap_err();
        assert!(err.to_string().contains("No text in response"));
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let generator = GeminiTextGenerator::with_base_url(key(), &server.uri());
        let err = generator.generate(&text_request()).await.unwrap_err();
        let StudioError::Api { status, message } = &err else {
            panic!("expected an API error, got {err:?}");
        };
        assert_eq!(*status, 429);
        assert_eq!(message, "quota exceeded");
    }

    /// Serve `parts` as the first candidate, followed by a second candidate
    /// holding a different image.
    async fn image_generate_with_parts(
        server: &MockServer,
        parts: serde_json::Value,
    ) -> ImageResponse {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": parts}},
                    {"content": {"parts": [{"inlineData": {"data": "CQk="}}]}}
                ]
            })))
            .mount(server)
            .await;
        let generator = GeminiImageGenerator::with_base_url(key(), &server.uri());
        generator.generate(&image_request()).await.unwrap()
    }

    #[tokio::test]
    async fn image_decodes_first_inline_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-2.5-flash-image:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"imageConfig": {"aspectRatio": "1:1"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [
                        {"text": "Here is your logo"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}},
                        {"inlineData": {"data": "BAU="}}
                    ]}
                }]
            })))
            .mount(&server)
            .await;

        let generator = GeminiImageGenerator::with_base_url(key(), &server.uri());
        let response = generator.generate(&image_request()).await.unwrap();
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].data, vec![1, 2, 3]);
        assert_eq!(response.images[0].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn image_skips_empty_inline_payload() {
        let server = MockServer::start().await;
        let response = image_generate_with_parts(
            &server,
            json!([{"inlineData": {"data": ""}}, {"inlineData": {"data": "AQID"}}]),
        )
        .await;
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].data, vec![1, 2, 3]);
        assert_eq!(response.images[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn image_keeps_first_payload_when_later_one_is_corrupt() {
        let server = MockServer::start().await;
        let response = image_generate_with_parts(
            &server,
            json!([{"inlineData": {"data": "AQID"}}, {"inlineData": {"data": "***"}}]),
        )
        .await;
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].data_uri(), "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn image_reads_only_first_candidate() {
        let server = MockServer::start().await;
        let response = image_generate_with_parts(&server, json!([{"text": "no image"}])).await;
        assert!(response.images.is_empty());
    }

    #[tokio::test]
    async fn image_response_without_images_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "I can't draw that"}]}}]
            })))
            .mount(&server)
            .await;

        let generator = GeminiImageGenerator::with_base_url(key(), &server.uri());
        let response = generator.generate(&image_request()).await.unwrap();
        assert!(response.images.is_empty());
    }

    #[test]
    fn truncate_limits_long_bodies() {
        let long = "é".repeat(600);
        let short = truncate(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 503);
        assert_eq!(truncate("ok"), "ok");
    }
}
