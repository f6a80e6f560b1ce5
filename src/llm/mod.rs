//! Generative-language boundary.
//!
//! This module provides:
//! * [`ModelGateway`] — async trait implemented by all model backends.
//! * [`GeminiGateway`] — Google AI `generateContent` implementation.
//! * [`PromptBuilder`] — builds the vocabulary / Q&A / image prompts.
//! * [`GatewayError`] — error variants for model operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cardforge::config::AppConfig;
//! use cardforge::deck::Language;
//! use cardforge::llm::{GeminiGateway, ModelGateway, PromptBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let gateway = GeminiGateway::from_config(&config.gemini);
//!
//!     let prompts = PromptBuilder::new(&Language::new("de", "Deutsch"));
//!     let reply = gateway
//!         .invoke(&prompts.vocabulary("la casa es grande"), None)
//!         .await
//!         .unwrap();
//!     println!("{reply}");
//! }
//! ```

pub mod gateway;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use gateway::{GatewayError, GeminiGateway, ModelGateway};
pub use prompt::PromptBuilder;

// test-only re-export so the session test module can import MockGateway
// without `use cardforge::llm::gateway::MockGateway`.
#[cfg(test)]
pub use gateway::MockGateway;
