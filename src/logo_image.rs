//! Logo rendering: one image request per concept, failures become absence.

use tracing::{debug, warn};

use crate::ports::{ImageGenerator, ImageRequest};

/// Style instructions appended to every concept prompt so all logos share
/// one look.
pub const STYLE_SUFFIX: &str = "minimalist vector logo, professional design, white background, \
     high resolution, 4k, no realistic photo effects, flat design";

/// Append [`STYLE_SUFFIX`] to a concept's image prompt.
#[must_use]
pub fn styled_prompt(prompt: &str) -> String {
    format!("{}, {STYLE_SUFFIX}", prompt.trim())
}

/// Render a logo for `prompt` and return it as a `data:` URI.
///
/// Returns `None` when the service answers without an image or fails in any
/// way; errors are logged, never returned.
pub async fn render_logo(
    images: &dyn ImageGenerator,
    model: &str,
    aspect_ratio: &str,
    prompt: &str,
) -> Option<String> {
    let request = ImageRequest {
        model: model.to_string(),
        prompt: styled_prompt(prompt),
        aspect_ratio: aspect_ratio.to_string(),
    };

    match images.generate(&request).await {
        Ok(response) => {
            let first = response.images.into_iter().next();
            if first.is_none() {
                warn!(model, "no image data in response");
            }
            first.map(|image| {
                debug!(mime_type = %image.mime_type, bytes = image.data.len(), "logo rendered");
                image.data_uri()
            })
        }
        Err(e) => {
            warn!(model, error = %e, "logo generation failed");
            None
        }
    }
}
