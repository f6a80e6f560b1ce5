//! Cardforge — Anki deck generation from text, photos and questions.
//!
//! The crate is a pipeline with five stages:
//!
//! 1. **Input** — free text typed by the user, a photo (OCR'd through the
//!    model), or a question (answered by the model).
//! 2. **Prompt** — [`llm::PromptBuilder`] renders the language-aware
//!    instruction for the chosen deck mode.
//! 3. **Model** — [`llm::GeminiGateway`] posts the prompt (plus optional
//!    inline image) to the Gemini `generateContent` endpoint.
//! 4. **Parse + edit** — [`deck`] turns the reply into [`deck::Entry`]
//!    values and [`deck::EntryEditor`] lets the user select and amend them.
//! 5. **Submit** — [`submit::SubmissionClient`] posts the deck to the
//!    backend, falling back across relay routes when the direct route is
//!    unreachable.
//!
//! [`session::SessionFlow`] ties the stages together behind a state
//! machine; the binary in `main.rs` drives it from the command line.

pub mod config;
pub mod deck;
pub mod llm;
pub mod media;
pub mod session;
pub mod submit;
