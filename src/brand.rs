//! Brand inputs, logo concepts and the per-session state they live in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Brand details supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    /// Company name. Required.
    pub company_name: String,
    /// What the company does. Required.
    pub description: String,
    /// Industry. Empty means not specified.
    #[serde(default)]
    pub industry: String,
}

impl BrandInput {
    /// Check that the input can be submitted.
    ///
    /// # Errors
    ///
    /// Returns the reason the input would be rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.company_name.trim().is_empty() {
            return Err("company name is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        Ok(())
    }
}

/// Token identifying one generation session within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One proposed logo identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Identifier, unique within the session.
    pub id: String,
    /// Short creative title.
    pub title: String,
    /// Why the concept fits the brand.
    pub rationale: String,
    /// Hex color codes, in display order.
    pub color_palette: Vec<String>,
    /// Typography style suggestion.
    pub typography_suggestion: String,
    /// Prompt handed to the image service.
    pub image_prompt: String,
    /// `data:` URI of the rendered logo, once available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// True until the image request for this concept resolves.
    pub image_loading: bool,
}

impl Concept {
    /// Record the outcome of this concept's image request.
    ///
    /// Returns `false` if the concept was already resolved; the first
    /// resolution wins.
    pub fn resolve_image(&mut self, image_url: Option<String>) -> bool {
        if !self.image_loading {
            return false;
        }
        self.image_url = image_url;
        self.image_loading = false;
        true
    }
}

/// Coarse phase of a session, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted yet.
    Idle,
    /// Waiting for the concept list.
    GeneratingConcepts,
    /// Concepts are visible; images may still be pending.
    ConceptsReady,
    /// Concept generation failed. Terminal until the next submission.
    Error,
}

/// State of the active session, as a presentation layer would hold it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Active session, if any submission has been made.
    pub session: Option<SessionId>,
    /// True while concepts are being generated.
    pub generating: bool,
    /// Concepts of the active session.
    pub concepts: Vec<Concept>,
    /// User-facing error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionState {
    /// Derive the current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.session.is_none() {
            Phase::Idle
        } else if self.generating {
            Phase::GeneratingConcepts
        } else if self.error.is_some() {
            Phase::Error
        } else {
            Phase::ConceptsReady
        }
    }

    /// Discard everything from the previous session and start `session`.
    pub(crate) fn begin(&mut self, session: SessionId) {
        self.session = Some(session);
        self.generating = true;
        self.concepts.clear();
        self.error = None;
    }

    /// Store the concept list. Returns `false` if `session` is stale.
    pub(crate) fn store_concepts(&mut self, session: SessionId, concepts: Vec<Concept>) -> bool {
        if self.session != Some(session) {
            return false;
        }
        self.generating = false;
        self.concepts = concepts;
        true
    }

    /// Record a concept-generation failure. Returns `false` if `session` is stale.
    pub(crate) fn fail(&mut self, session: SessionId, message: impl Into<String>) -> bool {
        if self.session != Some(session) {
            return false;
        }
        self.generating = false;
        self.concepts.clear();
        self.error = Some(message.into());
        true
    }

    /// Apply an image outcome to the concept with `concept_id`.
    ///
    /// Returns `false` if `session` is stale, the concept is unknown, or it
    /// was already resolved.
    pub(crate) fn resolve_image(
        &mut self,
        session: SessionId,
        concept_id: &str,
        image_url: Option<String>,
    ) -> bool {
        if self.session != Some(session) {
            return false;
        }
        self.concepts
            .iter_mut()
            .find(|c| c.id == concept_id)
            .is_some_and(|c| c.resolve_image(image_url))
    }
}
