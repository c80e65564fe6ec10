//! Replaying adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::replay;
use crate::adapters::{GENERATE, TEXT_PORT};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::text_generator::{TextFuture, TextGenerator, TextRequest, TextResponse};

/// Serves recorded concept text from a cassette.
pub struct ReplayingTextGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingTextGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl TextGenerator for ReplayingTextGenerator {
    fn generate(&self, request: &TextRequest) -> TextFuture<'_> {
        let result = replay::<TextResponse, _>(&self.replayer, TEXT_PORT, GENERATE, request);
        Box::pin(async move { result })
    }
}
