//! Adapter implementations for port traits.
//!
//! - `live/`: Real API implementations
//! - `recording/`: Record interactions to cassettes
//! - `replaying/`: Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;

/// Cassette port name of the text generator.
pub(crate) const TEXT_PORT: &str = "text_generator";

/// Cassette port name of the image generator.
pub(crate) const IMAGE_PORT: &str = "image_generator";

/// The single method both ports expose.
pub(crate) const GENERATE: &str = "generate";
