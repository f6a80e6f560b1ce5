//! Submission payload built from the selected entries.
//!
//! The backend contract is `{ deck_name, vocabulary }` where `vocabulary`
//! maps front text → back text. Because the front text is the map key,
//! duplicate fronts collide; the policy is last-write-wins (a later entry
//! silently replaces an earlier one with the same front). That boundary is
//! covered explicitly by tests since it is a silent-data-loss point.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::deck::Entry;

/// Deck name used when the caller supplies an empty or whitespace-only one.
pub const DEFAULT_DECK_NAME: &str = "Default Deck";

// ---------------------------------------------------------------------------
// SubmissionPayload
// ---------------------------------------------------------------------------

/// The JSON body posted to the deck backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub deck_name: String,
    /// front text → back text, last write wins on duplicate fronts.
    pub vocabulary: BTreeMap<String, String>,
}

impl SubmissionPayload {
    /// Build a payload from entries (the caller passes the selected
    /// subset). Entry text is trimmed; `deck_name` falls back to
    /// [`DEFAULT_DECK_NAME`] when empty after trimming.
    pub fn from_entries(entries: &[Entry], deck_name: &str) -> Self {
        let mut vocabulary = BTreeMap::new();
        for entry in entries {
            let previous =
                vocabulary.insert(entry.front().trim().to_string(), entry.back().trim().to_string());
            if let Some(old) = previous {
                log::warn!(
                    "payload: duplicate front {:?} — replacing {:?}",
                    entry.front().trim(),
                    old
                );
            }
        }

        let deck_name = deck_name.trim();
        let deck_name = if deck_name.is_empty() {
            DEFAULT_DECK_NAME.to_string()
        } else {
            deck_name.to_string()
        };

        Self {
            deck_name,
            vocabulary,
        }
    }

    /// Number of cards in the payload (after any duplicate-front collapse).
    pub fn card_count(&self) -> usize {
        self.vocabulary.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
