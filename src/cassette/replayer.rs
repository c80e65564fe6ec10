//! Replays recorded interactions from a cassette.
//!
//! Image calls run concurrently, so their order differs between runs. A
//! call is therefore matched to the first unused interaction with an equal
//! input, falling back to the first unused one for that port and method.

use std::collections::HashMap;
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

impl PortMethodKey {
    fn new(port: &str, method: &str) -> Self {
        Self { port: port.to_string(), method: method.to_string() }
    }
}

/// Interactions of one port/method pair and which of them were served.
#[derive(Debug, Default)]
struct Queue {
    interactions: Vec<Interaction>,
    used: Vec<bool>,
}

/// Serves recorded interactions, each at most once.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Queue>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Queue> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey::new(&interaction.port, &interaction.method);
            let queue = queues.entry(key).or_default();
            queue.interactions.push(interaction.clone());
            queue.used.push(false);
        }
        Self { queues }
    }

    /// Load a YAML cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(&cassette))
    }

    /// Take the interaction that answers a call with `input`.
    ///
    /// Returns `None` when nothing is left for this port and method.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> Option<Interaction> {
        let queue = self.queues.get_mut(&PortMethodKey::new(port, method))?;
        let unused = |i: &usize| !queue.used[*i];
        let index = (0..queue.interactions.len())
            .filter(unused)
            .find(|&i| queue.interactions[i].input == *input)
            .or_else(|| (0..queue.interactions.len()).find(unused))?;
        queue.used[index] = true;
        Some(queue.interactions[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, prompt: &str) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: "generate".into(),
            input: json!({ "prompt": prompt }),
            output: json!({ "Ok": { "images": [] } }),
        }
    }

    fn replayer(interactions: Vec<Interaction>) -> CassetteReplayer {
        CassetteReplayer::new(&Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        })
    }

    #[test]
    fn matching_input_wins_over_order() {
        let mut r = replayer(vec![
            interaction(0, "image_generator", "first"),
            interaction(1, "image_generator", "second"),
        ]);

        let got = r.next_interaction("image_generator", "generate", &json!({"prompt": "second"}));
        assert_eq!(got.unwrap().seq, 1);
        let got = r.next_interaction("image_generator", "generate", &json!({"prompt": "second"}));
        assert_eq!(got.unwrap().seq, 0, "falls back to the first unused interaction");
    }

    #[test]
    fn exhausted_queue_returns_none() {
        let mut r = replayer(vec![interaction(0, "image_generator", "only")]);
        let input = json!({});
        assert!(r.next_interaction("image_generator", "generate", &input).is_some());
        assert!(r.next_interaction("image_generator", "generate", &input).is_none());
    }

    #[test]
    fn ports_are_independent() {
        let mut r = replayer(vec![
            interaction(0, "text_generator", "concepts"),
            interaction(1, "image_generator", "logo"),
        ]);
        assert!(r.next_interaction("unknown", "generate", &json!({})).is_none());
        assert_eq!(r.next_interaction("image_generator", "generate", &json!({})).unwrap().seq, 1);
        assert_eq!(r.next_interaction("text_generator", "generate", &json!({})).unwrap().seq, 0);
    }

    #[test]
    fn load_from_yaml_file() {
        let dir = std::env::temp_dir().join("brandgen_replayer_load_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.cassette.yaml");
        std::fs::write(
            &path,
            "name: t\nrecorded_at: \"2026-01-01T00:00:00Z\"\ncommit: c\ninteractions:\n  \
             - seq: 0\n    port: text_generator\n    method: generate\n    input: {}\n    \
             output:\n      Ok:\n        text: \"[]\"\n",
        )
        .unwrap();

        let mut r = CassetteReplayer::load(&path).unwrap();
        let got = r.next_interaction("text_generator", "generate", &json!({})).unwrap();
        assert_eq!(got.output["Ok"]["text"], "[]");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_fails() {
        assert!(CassetteReplayer::load(Path::new("/nonexistent/cassette.yaml")).is_err());
    }
}
