//! In-memory working set of parsed entries.
//!
//! [`EntryEditor`] is the state holder behind the selection screen: it owns
//! the entries between parsing and submission and exposes the only three
//! mutation points the presentation layer gets (`toggle`, `set_field`, and
//! reading back the selected subset).
//!
//! All operations are synchronous and index-bounded. An out-of-range index
//! is a programmer error in the calling layer, not a recoverable condition —
//! the methods index directly and panic.

use crate::deck::entry::{Entry, EntryField};

// ---------------------------------------------------------------------------
// EntryEditor
// ---------------------------------------------------------------------------

/// Owns the live entry sequence for the duration of the editing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEditor {
    entries: Vec<Entry>,
}

impl EntryEditor {
    /// Take ownership of freshly parsed entries. The parser creates every
    /// entry selected, so the initial state is "all in".
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Flip the selection state of the entry at `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn toggle(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        entry.selected = !entry.selected;
    }

    /// Replace one side of the entry at `index` with user-edited text.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    pub fn set_field(&mut self, index: usize, field: EntryField, value: impl Into<String>) {
        self.entries[index].set_field(field, value);
    }

    /// All entries, selected or not, in parse order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The entries currently marked for submission, in parse order.
    pub fn selected_entries(&self) -> Vec<Entry> {
        self.entries.iter().filter(|e| e.selected).cloned().collect()
    }

    /// Number of entries currently marked for submission.
    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
