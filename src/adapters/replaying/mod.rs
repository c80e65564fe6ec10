//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_generator;
pub mod text_generator;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::StudioError;

/// Deserialize the recorded answer to a call with `input`.
///
/// A recorded `Err` is returned as [`StudioError::Replay`], as is a cassette
/// that has nothing left for the port.
pub(crate) fn replay<T, I>(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
    input: &I,
) -> Result<T, StudioError>
where
    T: serde::de::DeserializeOwned,
    I: Serialize,
{
    let input = serde_json::to_value(input)
        .map_err(|e| StudioError::Replay(format!("cannot serialize {port} input: {e}")))?;
    let interaction = replayer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_interaction(port, method, &input)
        .ok_or_else(|| {
            StudioError::Replay(format!(
                "cassette exhausted: no interaction left for {port}::{method}"
            ))
        })?;
    replay_output(interaction.output)
}

/// Interpret a recorded output as `Result<T, StudioError>`.
fn replay_output<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, StudioError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(StudioError::Replay(msg));
    }
    let value = match output.get("Ok").or_else(|| output.get("ok")) {
        Some(ok_val) => ok_val.clone(),
        None => output,
    };
    serde_json::from_value(value)
        .map_err(|e| StudioError::Replay(format!("recorded output does not fit: {e}")))
}
