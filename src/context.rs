//! Service context that bundles the port implementations for one run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::adapters::live::gemini::{GeminiImageGenerator, GeminiTextGenerator};
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::recording::text_generator::RecordingTextGenerator;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::adapters::replaying::text_generator::ReplayingTextGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::error::StudioError;
use crate::ports::{ImageGenerator, TextGenerator};

/// Text and image services handed to the studio.
pub struct ServiceContext {
    /// Concept text port.
    pub text: Arc<dyn TextGenerator>,
    /// Logo image port.
    pub images: Arc<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write everything recorded so far to the cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(&self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(interactions = recorder.interaction_count(), "writing cassette");
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context talking to Gemini.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(config: &Config) -> Result<Self, StudioError> {
        let key = config.gemini_key().ok_or(StudioError::MissingApiKey {
            provider: "Gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        })?;
        Ok(Self {
            text: Arc::new(GeminiTextGenerator::new(key.clone())),
            images: Arc::new(GeminiImageGenerator::new(key)),
        })
    }

    /// Create a recording context that wraps the live adapters with one
    /// shared recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), StudioError> {
        let live = Self::live(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".brandgen/cassettes")
            .join(&timestamp)
            .join("session.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-session"),
            get_commit_hash(),
        )));

        let ctx = Self {
            text: Arc::new(RecordingTextGenerator::new(live.text, Arc::clone(&recorder))),
            images: Arc::new(RecordingImageGenerator::new(live.images, Arc::clone(&recorder))),
        };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file. No credential needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, StudioError> {
        let replayer = CassetteReplayer::load(path)
            .map_err(|e| StudioError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            text: Arc::new(ReplayingTextGenerator::new(Arc::clone(&replayer))),
            images: Arc::new(ReplayingImageGenerator::new(replayer)),
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
