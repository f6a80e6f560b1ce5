//! Target-language catalog.
//!
//! A [`Language`] is chosen once per session and threaded through prompt
//! construction (the translation target). The catalog mirrors the set of
//! languages the app ships UI strings for; `find` resolves a code from the
//! CLI or config.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// One selectable target language. Immutable for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// ISO-639-1 code, possibly with a region suffix (e.g. `"fa-AF"`).
    pub code: String,
    /// Native display name, also used in prompts ("translate to {name}").
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Supported target languages, `(code, native name)`.
const CATALOG: &[(&str, &str)] = &[
    ("am", "አማርኛ"),
    ("ar", "العربية"),
    ("de", "Deutsch"),
    ("en", "English"),
    ("es", "Español"),
    ("fa-AF", "دری"),
    ("fr", "Français"),
    ("it", "Italiano"),
    ("ka", "ქართული"),
    ("ku", "Kurdî"),
    ("pt", "Português"),
    ("so", "Soomaali"),
    ("ti", "ትግርኛ"),
    ("tr", "Türkçe"),
    ("uk", "Українська"),
    ("zh", "中文"),
];

/// All supported target languages, in catalog order.
pub fn all() -> Vec<Language> {
    CATALOG
        .iter()
        .map(|(code, name)| Language::new(*code, *name))
        .collect()
}

/// Look up a language by its code (case-insensitive). `None` when the code
/// is not in the catalog.
pub fn find(code: &str) -> Option<Language> {
    CATALOG
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(code, name)| Language::new(*code, *name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
