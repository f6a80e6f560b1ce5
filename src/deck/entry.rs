//! Card entry model shared by the parser, editor and submission client.
//!
//! [`Entry`] is a tagged union over the two card flavours rather than a
//! positional `(original, translated)` pair, so downstream code never has to
//! remember which field holds the question in Q&A mode. The submission view
//! of an entry is exposed through [`Entry::front`] / [`Entry::back`]:
//! the front is what the learner sees first (translation or question), the
//! back is what they are asked to recall (word or answer).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DeckMode
// ---------------------------------------------------------------------------

/// The two kinds of deck the model can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckMode {
    /// Word / translation pairs, one per line in the model reply.
    Vocabulary,
    /// Question / answer pairs, one blank-line-separated block per card.
    Qa,
}

impl DeckMode {
    /// The parse policy this mode uses unless the caller overrides it.
    ///
    /// Vocabulary replies are long lists where a single garbled line is not
    /// worth failing the whole generation over, so malformed lines are
    /// skipped. A silently dropped Q&A pair is much harder for a user to
    /// notice, so Q&A mode rejects the whole reply instead.
    pub fn default_policy(&self) -> crate::deck::parser::ParsePolicy {
        match self {
            DeckMode::Vocabulary => crate::deck::parser::ParsePolicy::Lenient,
            DeckMode::Qa => crate::deck::parser::ParsePolicy::Strict,
        }
    }

    /// Short human-readable name for logs and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            DeckMode::Vocabulary => "vocabulary",
            DeckMode::Qa => "qa",
        }
    }
}

// ---------------------------------------------------------------------------
// CardContent
// ---------------------------------------------------------------------------

/// The text of one card, tagged by deck mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardContent {
    /// A word in the source text and its translation into the target
    /// language.
    Vocabulary { word: String, translation: String },
    /// A question about the source text and its answer.
    Qa { question: String, answer: String },
}

impl CardContent {
    /// Which [`DeckMode`] this content belongs to.
    pub fn mode(&self) -> DeckMode {
        match self {
            CardContent::Vocabulary { .. } => DeckMode::Vocabulary,
            CardContent::Qa { .. } => DeckMode::Qa,
        }
    }
}

// ---------------------------------------------------------------------------
// EntryField
// ---------------------------------------------------------------------------

/// Names the two editable sides of an entry, independent of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    /// Translation (vocabulary) or question (Q&A) — the submission key.
    Front,
    /// Word (vocabulary) or answer (Q&A) — the submission value.
    Back,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One flashcard: its text plus whether the user wants it in the deck.
///
/// Created by the parser with `selected = true`; owned and mutated by
/// [`EntryEditor`](crate::deck::EntryEditor); read by the submission client.
/// Never persisted beyond the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub content: CardContent,
    pub selected: bool,
}

impl Entry {
    /// Build a selected vocabulary entry.
    pub fn vocabulary(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            content: CardContent::Vocabulary {
                word: word.into(),
                translation: translation.into(),
            },
            selected: true,
        }
    }

    /// Build a selected Q&A entry.
    pub fn qa(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            content: CardContent::Qa {
                question: question.into(),
                answer: answer.into(),
            },
            selected: true,
        }
    }

    /// The front side: translation or question. Used as the payload key.
    pub fn front(&self) -> &str {
        match &self.content {
            CardContent::Vocabulary { translation, .. } => translation,
            CardContent::Qa { question, .. } => question,
        }
    }

    /// The back side: word or answer. Used as the payload value.
    pub fn back(&self) -> &str {
        match &self.content {
            CardContent::Vocabulary { word, .. } => word,
            CardContent::Qa { answer, .. } => answer,
        }
    }

    /// Overwrite one side of the card with user-edited text.
    pub fn set_field(&mut self, field: EntryField, value: impl Into<String>) {
        let value = value.into();
        match (&mut self.content, field) {
            (CardContent::Vocabulary { translation, .. }, EntryField::Front) => {
                *translation = value
            }
            (CardContent::Vocabulary { word, .. }, EntryField::Back) => *word = value,
            (CardContent::Qa { question, .. }, EntryField::Front) => *question = value,
            (CardContent::Qa { answer, .. }, EntryField::Back) => *answer = value,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
