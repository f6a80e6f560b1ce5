//! Free-text model reply → typed [`Entry`] sequence.
//!
//! The model is only ever *asked* for a machine-friendly layout; what comes
//! back is best-effort text, so all structure recovery lives here behind one
//! function. The two deck modes use different layouts and different failure
//! policies:
//!
//! * **Vocabulary** — one `original;translated` pair per line. Malformed
//!   lines are skipped under the default [`ParsePolicy::Lenient`].
//! * **Q&A** — blank-line-separated blocks of exactly two marked lines
//!   (`F:`/`Q:` question, `A:` answer). The default policy is
//!   [`ParsePolicy::Strict`]: one malformed block fails the whole reply,
//!   because a silently dropped card is harder to spot than an error.
//!
//! The policy is an explicit parameter so callers (and tests) can see which
//! behaviour they get instead of it being an implicit code-path divergence.

use thiserror::Error;

use crate::deck::entry::{DeckMode, Entry};

/// Separator between the original and translated half of a vocabulary line.
const VOCAB_SEPARATOR: char = ';';

/// Accepted question-line markers. The prompt asks for `F:` (the original
/// app's German-flavoured format); `Q:` is accepted because models
/// regularly "correct" the marker to English.
const QUESTION_MARKERS: [&str; 2] = ["F:", "Q:"];

/// Accepted answer-line markers.
const ANSWER_MARKERS: [&str; 1] = ["A:"];

// ---------------------------------------------------------------------------
// ParsePolicy / ParseError
// ---------------------------------------------------------------------------

/// What to do with a malformed line or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Skip malformed input and keep the well-formed remainder.
    Lenient,
    /// Reject the whole reply on the first malformed line/block.
    Strict,
}

/// Errors produced while recovering entries from a model reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A vocabulary line did not split into exactly two non-empty halves
    /// (strict policy only).
    #[error("malformed vocabulary line: {0:?}")]
    MalformedLine(String),

    /// A Q&A block did not resolve to a marked question line followed by a
    /// marked answer line.
    #[error("malformed question/answer block: {0:?}")]
    MalformedBlock(String),

    /// Q&A mode produced no valid blocks at all.
    #[error("model reply contained no question/answer pairs")]
    NoEntries,
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

/// Parse a raw model reply into entries for the given mode.
///
/// An empty result is valid for vocabulary mode (an unhelpful reply is not
/// an error); Q&A mode with zero valid blocks fails with
/// [`ParseError::NoEntries`]. No returned entry ever has an empty side
/// after trimming — malformed input is dropped or rejected, never
/// defaulted.
pub fn parse(raw: &str, mode: DeckMode, policy: ParsePolicy) -> Result<Vec<Entry>, ParseError> {
    match mode {
        DeckMode::Vocabulary => parse_vocabulary(raw, policy),
        DeckMode::Qa => parse_qa(raw, policy),
    }
}

/// Parse with the mode's default policy (lenient for vocabulary, strict
/// for Q&A).
pub fn parse_default(raw: &str, mode: DeckMode) -> Result<Vec<Entry>, ParseError> {
    parse(raw, mode, mode.default_policy())
}

// ---------------------------------------------------------------------------
// Vocabulary mode
// ---------------------------------------------------------------------------

fn parse_vocabulary(raw: &str, policy: ParsePolicy) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match split_vocab_line(line) {
            Some((original, translated)) => {
                entries.push(Entry::vocabulary(original, translated));
            }
            None => match policy {
                ParsePolicy::Lenient => {
                    log::debug!("parser: skipping malformed vocabulary line {line:?}");
                }
                ParsePolicy::Strict => {
                    return Err(ParseError::MalformedLine(line.to_string()));
                }
            },
        }
    }

    log::debug!("parser: {} vocabulary entries", entries.len());
    Ok(entries)
}

/// Split a trimmed, non-empty line on the separator. The line must contain
/// the separator exactly once and both halves must be non-empty after
/// trimming.
fn split_vocab_line(line: &str) -> Option<(&str, &str)> {
    if line.matches(VOCAB_SEPARATOR).count() != 1 {
        return None;
    }
    let (original, translated) = line.split_once(VOCAB_SEPARATOR)?;
    let (original, translated) = (original.trim(), translated.trim());
    if original.is_empty() || translated.is_empty() {
        return None;
    }
    Some((original, translated))
}

// ---------------------------------------------------------------------------
// Q&A mode
// ---------------------------------------------------------------------------

fn parse_qa(raw: &str, policy: ParsePolicy) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();

    for block in split_blocks(raw) {
        match parse_qa_block(&block) {
            Some((question, answer)) => {
                entries.push(Entry::qa(question, answer));
            }
            None => match policy {
                ParsePolicy::Lenient => {
                    log::debug!("parser: skipping malformed Q&A block {block:?}");
                }
                ParsePolicy::Strict => {
                    return Err(ParseError::MalformedBlock(block));
                }
            },
        }
    }

    if entries.is_empty() {
        return Err(ParseError::NoEntries);
    }

    log::debug!("parser: {} Q&A entries", entries.len());
    Ok(entries)
}

/// Split a reply on blank-line boundaries into trimmed, non-empty blocks.
fn split_blocks(raw: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

/// A block is valid when it is exactly two lines: a marked question and a
/// marked answer, both non-empty after the marker is stripped.
fn parse_qa_block(block: &str) -> Option<(String, String)> {
    let mut lines = block.lines();
    let first = lines.next()?;
    let second = lines.next()?;
    if lines.next().is_some() {
        return None;
    }

    let question = strip_marker(first, &QUESTION_MARKERS)?;
    let answer = strip_marker(second, &ANSWER_MARKERS)?;
    Some((question.to_string(), answer.to_string()))
}

fn strip_marker<'a>(line: &'a str, markers: &[&str]) -> Option<&'a str> {
    let line = line.trim();
    for marker in markers {
        if let Some(rest) = line.strip_prefix(marker) {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
