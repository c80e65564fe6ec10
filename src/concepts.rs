//! Concept generation: brand details in, a fixed number of logo concepts out.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::brand::{BrandInput, Concept, SessionId};
use crate::error::StudioError;
use crate::ports::{TextGenerator, TextRequest};

/// Fields every concept object must carry.
const REQUIRED_FIELDS: [&str; 5] =
    ["title", "rationale", "colorPalette", "typographySuggestion", "imagePrompt"];

/// Concept as returned by the text service, before ids are assigned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConcept {
    title: String,
    rationale: String,
    color_palette: Vec<String>,
    typography_suggestion: String,
    image_prompt: String,
}

/// Build the designer instruction for `brand`, asking for `count` concepts.
#[must_use]
pub fn build_prompt(brand: &BrandInput, count: usize) -> String {
    let industry = match brand.industry.trim() {
        "" => "Not specified",
        industry => industry,
    };
    format!(
        "You are a world-class brand identity designer.\n\
         Client Name: \"{company}\"\n\
         Industry: \"{industry}\"\n\
         Description: \"{description}\"\n\
         \n\
         Develop {count} distinct, high-quality logo concepts for this client.\n\
         For each concept, provide:\n\
         1. A creative title for the concept.\n\
         2. A rationale explaining why it fits the brand.\n\
         3. A color palette as a list of hex codes.\n\
         4. A typography style suggestion.\n\
         5. A highly detailed image generation prompt describing a flat, vector-style logo \
         on a white background, optimized for an AI image generator. Focus on the icon or \
         symbol and avoid text inside the logo image where possible.",
        company = brand.company_name.trim(),
        description = brand.description.trim(),
    )
}

/// JSON schema for the concept array.
#[must_use]
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "rationale": { "type": "STRING" },
                "colorPalette": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "typographySuggestion": { "type": "STRING" },
                "imagePrompt": { "type": "STRING" }
            },
            "required": REQUIRED_FIELDS,
        }
    })
}

/// Parse and validate the text service's answer into exactly `count`
/// concepts for `session`.
///
/// Extra concepts beyond `count` are dropped; fewer is an error.
///
/// # Errors
///
/// Returns [`StudioError::MalformedConcepts`] if the text is not a JSON array
/// of complete concept objects.
pub fn parse_concepts(
    text: &str,
    count: usize,
    session: SessionId,
) -> Result<Vec<Concept>, StudioError> {
    let raw: Vec<RawConcept> = serde_json::from_str(text.trim())
        .map_err(|e| StudioError::MalformedConcepts(format!("invalid concept JSON: {e}")))?;

    if raw.len() < count {
        return Err(StudioError::MalformedConcepts(format!(
            "expected {count} concepts, got {}",
            raw.len()
        )));
    }
    if raw.len() > count {
        warn!(expected = count, received = raw.len(), "text service returned extra concepts");
    }

    raw.into_iter()
        .take(count)
        .enumerate()
        .map(|(index, c)| {
            check_concept(index, &c)?;
            Ok(Concept {
                id: format!("concept-{session}-{index}"),
                title: c.title.trim().to_string(),
                rationale: c.rationale.trim().to_string(),
                color_palette: c
                    .color_palette
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                typography_suggestion: c.typography_suggestion.trim().to_string(),
                image_prompt: c.image_prompt.trim().to_string(),
                image_url: None,
                image_loading: true,
            })
        })
        .collect()
}

fn check_concept(index: usize, c: &RawConcept) -> Result<(), StudioError> {
    let empty = [
        ("title", c.title.trim().is_empty()),
        ("rationale", c.rationale.trim().is_empty()),
        ("colorPalette", c.color_palette.iter().all(|s| s.trim().is_empty())),
        ("typographySuggestion", c.typography_suggestion.trim().is_empty()),
        ("imagePrompt", c.image_prompt.trim().is_empty()),
    ];
    match empty.iter().find(|(_, is_empty)| *is_empty) {
        Some((field, _)) => {
            Err(StudioError::MalformedConcepts(format!("concept {index} has an empty {field}")))
        }
        None => Ok(()),
    }
}

/// Ask the text service for `count` logo concepts for `brand`.
///
/// Either every concept is produced or none is.
///
/// # Errors
///
/// Returns an error if the remote call fails or its answer does not parse
/// as `count` complete concepts.
pub async fn generate_concepts(
    text: &dyn TextGenerator,
    model: &str,
    count: usize,
    brand: &BrandInput,
    session: SessionId,
) -> Result<Vec<Concept>, StudioError> {
    let request = TextRequest {
        model: model.to_string(),
        prompt: build_prompt(brand, count),
        response_schema: response_schema(),
    };
    debug!(%session, model, count, "requesting concepts");

    let response = text.generate(&request).await?;
    let concepts = parse_concepts(&response.text, count, session)?;

    debug!(%session, received = concepts.len(), "concepts parsed");
    Ok(concepts)
}
