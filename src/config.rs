//! Configuration file loading with environment variable overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variables consulted for the Gemini credential, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Default generation settings (CLI flags take precedence).
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<ApiKey>,
}

/// A credential for the generation services. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for use in request headers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Default generation settings from the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Model (or alias) used for concept text.
    pub text_model: String,
    /// Model (or alias) used for logo images.
    pub image_model: String,
    /// Aspect ratio requested for logo images.
    pub aspect_ratio: String,
    /// Number of concepts requested per session.
    pub concept_count: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            text_model: "flash".to_string(),
            image_model: "nano-banana".to_string(),
            aspect_ratio: "1:1".to_string(),
            concept_count: 3,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
        if config.defaults.concept_count == 0 {
            return Err(format!("concept_count in {} must be at least 1", path.display()));
        }
        Ok(config)
    }

    /// Get the Gemini API key, preferring environment variables.
    #[must_use]
    pub fn gemini_key(&self) -> Option<ApiKey> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .map(ApiKey::new)
            .or_else(|| self.keys.gemini.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `BRANDGEN_CONFIG` environment variable
/// 3. `~/.config/brandgen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("BRANDGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/brandgen/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/brandgen/config.toml")
    } else {
        PathBuf::from("brandgen.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.keys.gemini.is_none());
        assert_eq!(config.defaults.text_model, "flash");
        assert_eq!(config.defaults.image_model, "nano-banana");
        assert_eq!(config.defaults.aspect_ratio, "1:1");
        assert_eq!(config.defaults.concept_count, 3);
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.defaults.concept_count, 3);
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("brandgen_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[keys]
gemini = "test-gemini-key"

[defaults]
text_model = "gemini-2.5-pro"
image_model = "nano-banana-pro"
concept_count = 4
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.keys.gemini.as_ref().map(ApiKey::expose), Some("test-gemini-key"));
        assert_eq!(config.defaults.text_model, "gemini-2.5-pro");
        assert_eq!(config.defaults.image_model, "nano-banana-pro");
        // Unset fields keep their defaults
        assert_eq!(config.defaults.aspect_ratio, "1:1");
        assert_eq!(config.defaults.concept_count, 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("brandgen_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_concept_count_rejected() {
        let dir = std::env::temp_dir().join("brandgen_config_zero_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[defaults]\nconcept_count = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.contains("at least 1"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let config = Config {
            keys: KeysConfig { gemini: Some(ApiKey::new("super-secret-value")) },
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("ApiKey(***)"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}
