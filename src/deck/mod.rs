//! Deck domain model: entries, languages, parsing and editing.
//!
//! This module provides:
//! * [`Entry`] / [`CardContent`] — tagged card model (vocabulary vs. Q&A).
//! * [`DeckMode`] — which kind of deck the model is asked to produce.
//! * [`Language`] — the per-session translation target, with a catalog.
//! * [`parser::parse`] — model reply → entries, with explicit
//!   [`ParsePolicy`].
//! * [`EntryEditor`] — the working set between parsing and submission.

pub mod editor;
pub mod entry;
pub mod language;
pub mod parser;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use editor::EntryEditor;
pub use entry::{CardContent, DeckMode, Entry, EntryField};
pub use language::Language;
pub use parser::{ParseError, ParsePolicy};
