//! Session state machine definition.
//!
//! [`SessionState`] is the single structural state of one deck-building
//! session. Exactly one variant is active at a time; the only way entries
//! move between phases is a transition performed by
//! [`SessionFlow`](crate::session::SessionFlow).
//!
//! ```text
//! LanguageSelect ──select──▶ InputAcquire
//!   ──text | photo | gallery | question──▶ [Processing] ──▶ ModeSelect
//!   ──vocabulary | qa──▶ [Processing] ──▶ Editing
//!   ──submit──▶ [Processing] ──▶ Result ──reset──▶ LanguageSelect
//! any failed operation ──▶ the state that preceded it (never forward)
//! ```
//!
//! `Processing` is a transient overlay entered before any network call and
//! exited on completion or failure; it carries the progress label the
//! presentation layer shows next to its spinner.

use crate::deck::EntryEditor;
use crate::submit::Outcome;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// States of one deck-building session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the user to pick the target language.
    LanguageSelect,

    /// Waiting for input: free text, a photo, or a question.
    InputAcquire,

    /// Input captured; waiting for the deck mode choice.
    ModeSelect,

    /// A network call is in flight; the string is the progress label.
    Processing(String),

    /// Entries are parsed; the user is selecting and editing them.
    Editing(EntryEditor),

    /// Terminal until `reset`: the deck was built.
    Result(Outcome),
}

impl SessionState {
    /// Returns `true` while a network operation is in flight. The
    /// presentation layer uses this to block further input.
    pub fn is_processing(&self) -> bool {
        matches!(self, SessionState::Processing(_))
    }

    /// A short human-readable label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::LanguageSelect => "Select language",
            SessionState::InputAcquire => "Choose input",
            SessionState::ModeSelect => "Choose deck type",
            SessionState::Processing(_) => "Processing",
            SessionState::Editing(_) => "Editing",
            SessionState::Result(_) => "Done",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::LanguageSelect
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
