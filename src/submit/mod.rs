//! Deck submission: payload construction and resilient delivery.
//!
//! This module provides:
//! * [`SubmissionPayload`] — the `{ deck_name, vocabulary }` body, built
//!   from the selected entries with last-write-wins key collapse.
//! * [`DeckBackend`] — async trait the session flow depends on.
//! * [`SubmissionClient`] — real implementation with ordered relay
//!   fallback and status-derived error classification.
//! * [`Outcome`] / [`Artifact`] — what a successful submission yields.
//! * [`SubmissionError`] / [`SubmissionErrorKind`] — classified failures.

pub mod client;
pub mod payload;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{
    Artifact, DeckBackend, Outcome, SubmissionClient, SubmissionError, SubmissionErrorKind,
};
pub use payload::{SubmissionPayload, DEFAULT_DECK_NAME};

// test-only re-export so the session test module can import the double
// without the full path.
#[cfg(test)]
pub use client::MockDeckBackend;
