//! Session orchestration: concepts first, then one independent image task
//! per concept.
//!
//! The studio owns the [`SessionState`] a presentation layer renders from and
//! reports every applied change on an event channel. Image tasks are spawned
//! without a join barrier; each one updates only its own concept, and only
//! while its session is still the active one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::brand::{BrandInput, Concept, SessionId, SessionState};
use crate::concepts::generate_concepts;
use crate::error::StudioError;
use crate::logo_image::render_logo;
use crate::ports::{ImageGenerator, TextGenerator};

/// Message shown when concept generation fails.
pub const CONCEPTS_FAILED_MESSAGE: &str =
    "We encountered an issue generating your brand concepts. Please try again.";

/// Resolved models and limits used for every session.
#[derive(Debug, Clone)]
pub struct StudioSettings {
    /// Full model id for concept text.
    pub text_model: String,
    /// Full model id for logo images.
    pub image_model: String,
    /// Aspect ratio requested for logo images.
    pub aspect_ratio: String,
    /// Number of concepts per session.
    pub concept_count: usize,
}

/// A change applied to the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioEvent {
    /// A submission was accepted; previous concepts are gone.
    SessionStarted {
        /// The new session.
        session: SessionId,
    },
    /// Concepts are available; their images are pending.
    ConceptsReady {
        /// Session the concepts belong to.
        session: SessionId,
        /// The concepts, in display order.
        concepts: Vec<Concept>,
    },
    /// Concept generation failed; the session shows only `message`.
    ConceptsFailed {
        /// Session that failed.
        session: SessionId,
        /// User-facing message.
        message: String,
    },
    /// One concept's image request resolved.
    ImageResolved {
        /// Session the concept belongs to.
        session: SessionId,
        /// Concept that was updated.
        concept_id: String,
        /// The image, or `None` if unavailable.
        image_url: Option<String>,
    },
}

/// Outcome of [`Studio::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Input was invalid; nothing was sent and the state is unchanged.
    Rejected(String),
    /// Concept generation failed; the session is in the error phase.
    Failed(StudioError),
    /// A newer submission replaced this one before its concepts arrived.
    Superseded(SessionId),
    /// Concepts are stored and image requests are in flight.
    Ready {
        /// The active session.
        session: SessionId,
        /// Number of concepts, and of image requests issued.
        concepts: usize,
    },
}

/// Runs generation sessions against injected text and image services.
pub struct Studio {
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    settings: Arc<StudioSettings>,
    state: Arc<Mutex<SessionState>>,
    events: UnboundedSender<StudioEvent>,
    last_session: AtomicU64,
}

impl Studio {
    /// Create a studio and the receiver for its change events.
    #[must_use]
    pub fn new(
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        settings: StudioSettings,
    ) -> (Self, UnboundedReceiver<StudioEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let studio = Self {
            text,
            images,
            settings: Arc::new(settings),
            state: Arc::new(Mutex::new(SessionState::default())),
            events,
            last_session: AtomicU64::new(0),
        };
        (studio, rx)
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Start a new session for `brand`, replacing whatever was shown before.
    ///
    /// Returns once the concepts are stored (or generation failed). Image
    /// requests keep running in the background and report through
    /// [`StudioEvent::ImageResolved`].
    pub async fn submit(&self, brand: BrandInput) -> Submission {
        if let Err(reason) = brand.validate() {
            debug!(%reason, "submission rejected");
            return Submission::Rejected(reason);
        }

        let session = SessionId(self.last_session.fetch_add(1, Ordering::Relaxed) + 1);
        publish(
            &self.state,
            &self.events,
            |s| {
                s.begin(session);
                true
            },
            StudioEvent::SessionStarted { session },
        );
        info!(%session, company = %brand.company_name, "generating concepts");

        let generated = generate_concepts(
            self.text.as_ref(),
            &self.settings.text_model,
            self.settings.concept_count,
            &brand,
            session,
        )
        .await;

        let concepts = match generated {
            Ok(concepts) => concepts,
            Err(e) => {
                warn!(%session, error = %e, "concept generation failed");
                publish(
                    &self.state,
                    &self.events,
                    |s| s.fail(session, CONCEPTS_FAILED_MESSAGE),
                    StudioEvent::ConceptsFailed {
                        session,
                        message: CONCEPTS_FAILED_MESSAGE.to_string(),
                    },
                );
                return Submission::Failed(e);
            }
        };

        let stored = publish(
            &self.state,
            &self.events,
            |s| s.store_concepts(session, concepts.clone()),
            StudioEvent::ConceptsReady { session, concepts: concepts.clone() },
        );
        if !stored {
            debug!(%session, "concepts arrived for a superseded session");
            return Submission::Superseded(session);
        }

        for concept in &concepts {
            self.spawn_image(session, concept);
        }
        Submission::Ready { session, concepts: concepts.len() }
    }

    fn spawn_image(&self, session: SessionId, concept: &Concept) {
        let images = Arc::clone(&self.images);
        let settings = Arc::clone(&self.settings);
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let concept_id = concept.id.clone();
        let prompt = concept.image_prompt.clone();

        tokio::spawn(async move {
            let image_url = render_logo(
                images.as_ref(),
                &settings.image_model,
                &settings.aspect_ratio,
                &prompt,
            )
            .await;

            let applied = publish(
                &state,
                &events,
                |s| s.resolve_image(session, &concept_id, image_url.clone()),
                StudioEvent::ImageResolved {
                    session,
                    concept_id: concept_id.clone(),
                    image_url: image_url.clone(),
                },
            );
            if !applied {
                debug!(%session, %concept_id, "dropped image for a superseded session");
            }
        });
    }
}

/// Apply `update` under the state lock and, if it changed anything, emit
/// `event` before releasing the lock so events stay in state order.
fn publish(
    state: &Mutex<SessionState>,
    events: &UnboundedSender<StudioEvent>,
    update: impl FnOnce(&mut SessionState) -> bool,
    event: StudioEvent,
) -> bool {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    if !update(&mut *guard) {
        return false;
    }
    if events.send(event).is_err() {
        debug!("no one is listening for studio events");
    }
    true
}
