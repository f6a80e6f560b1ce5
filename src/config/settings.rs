//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! The Gemini API key lives here and nowhere else — business logic never
//! reads the process environment. The CLI seeds `gemini.api_key` from
//! `GEMINI_API_KEY` at startup as a convenience, before any component is
//! constructed.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GeminiConfig
// ---------------------------------------------------------------------------

/// Settings for the generative-language endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the API (no trailing slash).
    pub base_url: String,
    /// API key appended as the `key` query parameter. Empty means the
    /// gateway will fail fast with a configuration error.
    pub api_key: String,
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Maximum seconds to wait for a model response before timing out.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: String::new(),
            model: "gemini-2.0-flash".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Settings for the deck-building backend and its relay fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Direct URL of the deck-conversion endpoint.
    pub base_url: String,
    /// Passthrough prefixes tried in order when the direct route fails.
    /// Each is prepended verbatim to `base_url`.
    pub relay_prefixes: Vec<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dianjeol.pythonanywhere.com/api/convert-direct".into(),
            relay_prefixes: vec![
                "https://api.allorigins.win/raw?url=".into(),
                "https://corsproxy.io/?".into(),
            ],
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// DeckConfig
// ---------------------------------------------------------------------------

/// Session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Language code preselected by the CLI (must be in the catalog).
    pub default_language: String,
    /// Deck name used when the user leaves the name empty.
    pub default_deck_name: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            default_language: "en".into(),
            default_deck_name: "Default Deck".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use cardforge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generative-language endpoint settings.
    pub gemini: GeminiConfig,
    /// Deck backend and relay settings.
    pub backend: BackendConfig,
    /// Session defaults.
    pub deck: DeckConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
