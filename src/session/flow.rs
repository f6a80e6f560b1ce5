//! Session orchestrator — drives input → generation → editing → submission.
//!
//! [`SessionFlow`] owns the [`SessionState`] and the two network
//! collaborators ([`ModelGateway`], [`DeckBackend`]). Each operation
//! validates the current state, enters `Processing` around its single
//! network call, and on failure rolls the state back to the one that
//! preceded the operation — never forward, and with entries intact after a
//! failed submission.
//!
//! The flow performs no user-visible reporting itself: every error is
//! returned to the caller (the presentation layer) as a [`SessionError`]
//! with a displayable message. One flow instance serves one user session;
//! instances are never shared between sessions.

use std::sync::Arc;

use thiserror::Error;

use crate::deck::{self, DeckMode, EntryEditor, Language, ParseError};
use crate::llm::{GatewayError, ModelGateway, PromptBuilder};
use crate::media::{EncodedImage, EncodingError};
use crate::session::state::SessionState;
use crate::submit::{DeckBackend, SubmissionError, SubmissionPayload};

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Everything a session operation can fail with. Each variant already
/// carries a user-presentable message from the stage that produced it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Image could not be turned into a transport payload.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The generative endpoint failed or returned nothing usable.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The model reply could not be parsed into entries.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Every submission route failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The operation is not valid in the current state. The session is
    /// driven by external input, so this is recoverable, not a panic.
    #[error("cannot {operation} while in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Submission was requested with no entries selected.
    #[error("select at least one entry before creating the deck")]
    NoSelection,
}

// ---------------------------------------------------------------------------
// SessionFlow
// ---------------------------------------------------------------------------

/// Finite-state controller for one deck-building session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use cardforge::config::AppConfig;
/// use cardforge::deck::{language, DeckMode};
/// use cardforge::llm::GeminiGateway;
/// use cardforge::session::SessionFlow;
/// use cardforge::submit::SubmissionClient;
///
/// # async fn example() -> Result<(), cardforge::session::SessionError> {
/// let config = AppConfig::default();
/// let mut flow = SessionFlow::new(
///     Arc::new(GeminiGateway::from_config(&config.gemini)),
///     Arc::new(SubmissionClient::from_config(&config.backend)),
/// );
///
/// flow.select_language(language::find("de").unwrap())?;
/// flow.provide_text("la casa es grande")?;
/// flow.choose_mode(DeckMode::Vocabulary).await?;
/// let outcome = flow.submit("Spanish basics").await?;
/// # let _ = outcome;
/// # Ok(())
/// # }
/// ```
pub struct SessionFlow {
    gateway: Arc<dyn ModelGateway>,
    backend: Arc<dyn DeckBackend>,
    state: SessionState,
    language: Option<Language>,
    source_text: Option<String>,
    mode: Option<DeckMode>,
}

impl SessionFlow {
    /// Create a new session in `LanguageSelect`.
    pub fn new(gateway: Arc<dyn ModelGateway>, backend: Arc<dyn DeckBackend>) -> Self {
        Self {
            gateway,
            backend,
            state: SessionState::LanguageSelect,
            language: None,
            source_text: None,
            mode: None,
        }
    }

    /// Current structural state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The language chosen for this session, once selected.
    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    // -----------------------------------------------------------------------
    // LanguageSelect
    // -----------------------------------------------------------------------

    /// Pick the target language and move on to input acquisition.
    pub fn select_language(&mut self, language: Language) -> Result<(), SessionError> {
        self.expect_state("select a language", &SessionState::LanguageSelect)?;

        log::debug!("session: language = {}", language.code);
        self.language = Some(language);
        self.state = SessionState::InputAcquire;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // InputAcquire
    // -----------------------------------------------------------------------

    /// Use pasted/typed text directly as the source material.
    pub fn provide_text(&mut self, text: &str) -> Result<(), SessionError> {
        self.expect_state("provide text", &SessionState::InputAcquire)?;

        log::debug!("session: text input ({} chars)", text.len());
        self.source_text = Some(text.to_string());
        self.state = SessionState::ModeSelect;
        Ok(())
    }

    /// Send an already-encoded image through the model to extract its text.
    pub async fn provide_image(&mut self, image: EncodedImage) -> Result<(), SessionError> {
        self.expect_state("provide an image", &SessionState::InputAcquire)?;

        let prompt = self.prompts()?.image_extraction();
        self.state = SessionState::Processing("Processing image...".into());

        match self.gateway.invoke(&prompt, Some(&image)).await {
            Ok(text) => {
                log::debug!("session: image extracted to {} chars", text.len());
                self.source_text = Some(text);
                self.state = SessionState::ModeSelect;
                Ok(())
            }
            Err(e) => {
                log::warn!("session: image extraction failed: {e}");
                self.state = SessionState::InputAcquire;
                Err(e.into())
            }
        }
    }

    /// Read and encode an image file, then extract its text. An encoding
    /// failure aborts the input step before any network call.
    pub async fn provide_image_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), SessionError> {
        self.expect_state("provide an image", &SessionState::InputAcquire)?;

        let image = EncodedImage::from_file(path)?;
        self.provide_image(image).await
    }

    /// Ask the model a free question; its answer becomes the source
    /// material for card generation.
    pub async fn provide_question(&mut self, question: &str) -> Result<(), SessionError> {
        self.expect_state("ask a question", &SessionState::InputAcquire)?;

        self.state = SessionState::Processing("Thinking...".into());

        match self.gateway.invoke(question, None).await {
            Ok(answer) => {
                log::debug!("session: question answered ({} chars)", answer.len());
                self.source_text = Some(answer);
                self.state = SessionState::ModeSelect;
                Ok(())
            }
            Err(e) => {
                log::warn!("session: question failed: {e}");
                self.state = SessionState::InputAcquire;
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // ModeSelect
    // -----------------------------------------------------------------------

    /// Generate cards from the captured source text in the chosen mode.
    pub async fn choose_mode(&mut self, mode: DeckMode) -> Result<(), SessionError> {
        self.expect_state("choose a deck mode", &SessionState::ModeSelect)?;

        let prompts = self.prompts()?;
        let text = self
            .source_text
            .clone()
            .ok_or(SessionError::InvalidState {
                operation: "choose a deck mode",
                state: "ModeSelect without source text",
            })?;

        let prompt = match mode {
            DeckMode::Vocabulary => prompts.vocabulary(&text),
            DeckMode::Qa => prompts.qa(&text),
        };

        self.state = SessionState::Processing("Generating cards...".into());

        let reply = match self.gateway.invoke(&prompt, None).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("session: generation failed: {e}");
                self.state = SessionState::ModeSelect;
                return Err(e.into());
            }
        };

        match deck::parser::parse(&reply, mode, mode.default_policy()) {
            Ok(entries) => {
                log::info!("session: {} {} entries parsed", entries.len(), mode.label());
                self.mode = Some(mode);
                self.state = SessionState::Editing(EntryEditor::new(entries));
                Ok(())
            }
            Err(e) => {
                log::warn!("session: parse failed: {e}");
                self.state = SessionState::ModeSelect;
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// The entry working set, while editing.
    pub fn editor(&self) -> Option<&EntryEditor> {
        match &self.state {
            SessionState::Editing(editor) => Some(editor),
            _ => None,
        }
    }

    /// Mutable access to the working set, while editing. This is the only
    /// mutation point the presentation layer gets.
    pub fn editor_mut(&mut self) -> Option<&mut EntryEditor> {
        match &mut self.state {
            SessionState::Editing(editor) => Some(editor),
            _ => None,
        }
    }

    /// Build the payload from the selected entries and deliver it. On
    /// failure the session returns to `Editing` with the entries intact.
    pub async fn submit(
        &mut self,
        deck_name: &str,
    ) -> Result<crate::submit::Outcome, SessionError> {
        let editor = match &self.state {
            SessionState::Editing(editor) => editor.clone(),
            _ => {
                return Err(SessionError::InvalidState {
                    operation: "submit",
                    state: self.state.label(),
                })
            }
        };

        let selected = editor.selected_entries();
        if selected.is_empty() {
            return Err(SessionError::NoSelection);
        }

        let payload = SubmissionPayload::from_entries(&selected, deck_name);
        self.state = SessionState::Processing("Generating Anki deck...".into());

        match self.backend.submit(&payload).await {
            Ok(outcome) => {
                log::info!(
                    "session: deck {:?} built ({} cards)",
                    outcome.deck_name,
                    payload.card_count()
                );
                self.state = SessionState::Result(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("session: submission failed: {e}");
                // Roll back with the working set untouched.
                self.state = SessionState::Editing(editor);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Result
    // -----------------------------------------------------------------------

    /// Discard all session data and start over at language selection.
    /// Valid in any state.
    pub fn reset(&mut self) {
        log::debug!("session: reset");
        self.language = None;
        self.source_text = None;
        self.mode = None;
        self.state = SessionState::LanguageSelect;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn expect_state(
        &self,
        operation: &'static str,
        expected: &SessionState,
    ) -> Result<(), SessionError> {
        if std::mem::discriminant(&self.state) == std::mem::discriminant(expected) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state.label(),
            })
        }
    }

    fn prompts(&self) -> Result<PromptBuilder, SessionError> {
        let language = self.language.as_ref().ok_or(SessionError::InvalidState {
            operation: "build a prompt",
            state: "no language selected",
        })?;
        Ok(PromptBuilder::new(language))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{language, EntryField};
    use crate::llm::MockGateway;
    use crate::submit::{Artifact, MockDeckBackend, SubmissionErrorKind};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn flow_with(gateway: MockGateway, backend: MockDeckBackend) -> SessionFlow {
        SessionFlow::new(Arc::new(gateway), Arc::new(backend))
    }

    fn rate_limited() -> SubmissionError {
        SubmissionError {
            kind: SubmissionErrorKind::RateLimited,
            message: "Too many requests. Please wait and try again.".into(),
        }
    }

    /// Drive a flow to the editing phase with two vocabulary entries.
    async fn flow_in_editing(backend: MockDeckBackend) -> SessionFlow {
        let mut flow = flow_with(MockGateway::ok("casa;house\nperro;dog"), backend);
        flow.select_language(language::find("de").unwrap()).unwrap();
        flow.provide_text("la casa es grande").unwrap();
        flow.choose_mode(DeckMode::Vocabulary).await.unwrap();
        flow
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn full_vocabulary_session_reaches_result() {
        let backend = MockDeckBackend::ok(Artifact::Package(b"PK-deck".to_vec()));
        let mut flow = flow_in_editing(backend).await;

        assert_eq!(flow.editor().unwrap().len(), 2);

        let outcome = flow.submit("Spanish").await.unwrap();
        assert_eq!(outcome.deck_name, "Spanish");
        assert_eq!(outcome.artifact, Artifact::Package(b"PK-deck".to_vec()));
        assert!(matches!(flow.state(), SessionState::Result(_)));
    }

    #[tokio::test]
    async fn question_input_becomes_source_text() {
        let mut flow = flow_with(
            MockGateway::ok("Paris is the capital of France."),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("en").unwrap()).unwrap();
        flow.provide_question("What is the capital of France?")
            .await
            .unwrap();

        assert_eq!(flow.state(), &SessionState::ModeSelect);
        assert_eq!(
            flow.source_text.as_deref(),
            Some("Paris is the capital of France.")
        );
    }

    #[tokio::test]
    async fn image_input_extracts_text_then_mode_select() {
        let mut flow = flow_with(
            MockGateway::ok("casa\nperro\ngato"),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();

        let image = EncodedImage::from_bytes(b"jpeg-bytes", "image/jpeg");
        flow.provide_image(image).await.unwrap();

        assert_eq!(flow.state(), &SessionState::ModeSelect);
        assert_eq!(flow.source_text.as_deref(), Some("casa\nperro\ngato"));
    }

    // -----------------------------------------------------------------------
    // Editing phase
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn editor_edits_flow_into_payload() {
        let backend = Arc::new(MockDeckBackend::ok(Artifact::Package(vec![1])));
        let mut flow = SessionFlow::new(
            Arc::new(MockGateway::ok("casa;house\nperro;dog")),
            backend.clone(),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();
        flow.provide_text("la casa es grande").unwrap();
        flow.choose_mode(DeckMode::Vocabulary).await.unwrap();

        {
            let editor = flow.editor_mut().unwrap();
            editor.set_field(0, EntryField::Front, "home");
            editor.toggle(1); // drop "perro"
        }
        flow.submit("Edited").await.unwrap();

        // Inspect what the backend actually received.
        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            submitted[0].vocabulary.get("home").map(String::as_str),
            Some("casa")
        );
        assert!(!submitted[0].vocabulary.contains_key("dog"));
    }

    #[tokio::test]
    async fn empty_deck_name_defaults_in_payload() {
        let backend = MockDeckBackend::ok(Artifact::Package(vec![1]));
        let mut flow = flow_in_editing(backend).await;

        let outcome = flow.submit("").await.unwrap();
        assert_eq!(outcome.deck_name, "Default Deck");
    }

    #[tokio::test]
    async fn submit_without_selection_is_rejected_in_place() {
        let backend = MockDeckBackend::ok(Artifact::Package(vec![1]));
        let mut flow = flow_in_editing(backend).await;

        {
            let editor = flow.editor_mut().unwrap();
            editor.toggle(0);
            editor.toggle(1);
        }

        let err = flow.submit("x").await.unwrap_err();
        assert!(matches!(err, SessionError::NoSelection));
        // Still editing, entries intact.
        assert_eq!(flow.editor().unwrap().len(), 2);
    }

    // -----------------------------------------------------------------------
    // Failure rollback
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn parse_failure_returns_to_mode_select() {
        // QA mode is strict; free prose fails the parse.
        let mut flow = flow_with(
            MockGateway::ok("no markers in this reply"),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();
        flow.provide_text("some text").unwrap();

        let err = flow.choose_mode(DeckMode::Qa).await.unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
        assert_eq!(flow.state(), &SessionState::ModeSelect);
    }

    #[tokio::test]
    async fn gateway_failure_returns_to_mode_select() {
        let mut flow = flow_with(
            MockGateway::err(|| GatewayError::EmptyResponse),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();
        flow.provide_text("some text").unwrap();

        let err = flow.choose_mode(DeckMode::Vocabulary).await.unwrap_err();
        assert!(matches!(err, SessionError::Gateway(_)));
        assert_eq!(flow.state(), &SessionState::ModeSelect);
    }

    #[tokio::test]
    async fn submission_failure_returns_to_editing_with_entries() {
        let mut flow = flow_in_editing(MockDeckBackend::err(rate_limited())).await;

        let err = flow.submit("Spanish").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Submission(SubmissionError {
                kind: SubmissionErrorKind::RateLimited,
                ..
            })
        ));

        // Entries must survive the failed attempt.
        let editor = flow.editor().expect("back in editing");
        assert_eq!(editor.len(), 2);
        assert_eq!(editor.selected_count(), 2);
    }

    #[tokio::test]
    async fn image_failure_returns_to_input_acquire() {
        let mut flow = flow_with(
            MockGateway::err(|| GatewayError::Timeout),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();

        let image = EncodedImage::from_bytes(b"jpeg", "image/jpeg");
        let err = flow.provide_image(image).await.unwrap_err();
        assert!(matches!(err, SessionError::Gateway(_)));
        assert_eq!(flow.state(), &SessionState::InputAcquire);
    }

    #[tokio::test]
    async fn unreadable_image_file_aborts_before_network() {
        let mut flow = flow_with(
            MockGateway::ok("never reached"),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );
        flow.select_language(language::find("de").unwrap()).unwrap();

        let err = flow
            .provide_image_file("/no/such/photo.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Encoding(_)));
        assert_eq!(flow.state(), &SessionState::InputAcquire);
    }

    // -----------------------------------------------------------------------
    // Transition guards and reset
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn operations_in_wrong_state_are_invalid() {
        let mut flow = flow_with(
            MockGateway::ok("x"),
            MockDeckBackend::ok(Artifact::Package(vec![1])),
        );

        // Still in LanguageSelect.
        assert!(matches!(
            flow.provide_text("text").unwrap_err(),
            SessionError::InvalidState { .. }
        ));
        assert!(matches!(
            flow.choose_mode(DeckMode::Vocabulary).await.unwrap_err(),
            SessionError::InvalidState { .. }
        ));
        assert!(matches!(
            flow.submit("x").await.unwrap_err(),
            SessionError::InvalidState { .. }
        ));
        assert_eq!(flow.state(), &SessionState::LanguageSelect);
    }

    #[tokio::test]
    async fn reset_discards_all_session_data() {
        let backend = MockDeckBackend::ok(Artifact::Package(vec![1]));
        let mut flow = flow_in_editing(backend).await;
        flow.submit("Spanish").await.unwrap();

        flow.reset();

        assert_eq!(flow.state(), &SessionState::LanguageSelect);
        assert!(flow.language().is_none());
        assert!(flow.source_text.is_none());
        assert!(flow.mode.is_none());
        assert!(flow.editor().is_none());
    }
}
