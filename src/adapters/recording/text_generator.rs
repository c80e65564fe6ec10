//! Recording adapter for the `TextGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::adapters::{GENERATE, TEXT_PORT};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::text_generator::{TextFuture, TextGenerator, TextRequest};

/// Records concept text interactions while delegating to an inner implementation.
pub struct RecordingTextGenerator {
    inner: Arc<dyn TextGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTextGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(inner: Arc<dyn TextGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl TextGenerator for RecordingTextGenerator {
    fn generate(&self, request: &TextRequest) -> TextFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.generate(&request).await;
            record_result(&self.recorder, TEXT_PORT, GENERATE, &request, &result);
            result
        })
    }
}
