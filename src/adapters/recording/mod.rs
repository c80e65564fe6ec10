//! Recording adapters that capture interactions to cassettes.

pub mod image_generator;
pub mod text_generator;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// A value that cannot be serialized is logged and left out of the
/// cassette; recording never changes the result the caller sees.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let output = match result {
        Ok(v) => serde_json::to_value(v).map(|inner| serde_json::json!({ "Ok": inner })),
        Err(e) => Ok(serde_json::json!({ "Err": e.to_string() })),
    };
    let input = serde_json::to_value(input);

    match (input, output) {
        (Ok(input), Ok(output)) => {
            let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
            guard.record(port, method, input, output);
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(port, method, error = %e, "interaction not recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_ok_and_err_shapes() {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new("unused.yaml", "t", "c")));

        let ok: Result<u8, String> = Ok(5);
        record_result(&recorder, "p", "m", &"input", &ok);
        let err: Result<u8, String> = Err("boom".into());
        record_result(&recorder, "p", "m", &"input", &err);

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        assert_eq!(recorder.interaction_count(), 2);
    }
}
