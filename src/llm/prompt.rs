//! Prompt builder for deck generation.
//!
//! [`PromptBuilder`] constructs the three prompts the pipeline sends:
//! * **vocabulary** — asks for one `original;translated` pair per line.
//! * **qa** — asks for `F:`/`A:` two-line blocks following Anki card
//!   best practices.
//! * **image extraction** — asks for the words visible in a photo.
//!
//! The target [`Language`] is fixed at construction time and threaded into
//! the translation instructions. The output-format instructions must stay
//! in lock-step with [`deck::parser`](crate::deck::parser) — the parser
//! recovers exactly the layouts requested here.

use crate::deck::Language;

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds generation prompts for a fixed target language.
///
/// # Example
/// ```rust
/// use cardforge::deck::Language;
/// use cardforge::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new(&Language::new("de", "Deutsch"));
/// let prompt = builder.vocabulary("la casa es grande");
/// assert!(prompt.contains("Deutsch"));
/// ```
pub struct PromptBuilder {
    language: Language,
}

impl PromptBuilder {
    /// Create a builder for the given target language.
    pub fn new(language: &Language) -> Self {
        Self {
            language: language.clone(),
        }
    }

    /// Prompt for vocabulary mode: extract words from `text` and translate
    /// them, one `original;translated` pair per line.
    pub fn vocabulary(&self, text: &str) -> String {
        format!(
            "Extract vocabulary words from this text and translate them to {lang}. \
             Return ONLY a simple list where each line contains the word in the \
             original language, followed by a semicolon, and then the word in \
             {lang}. Example format:\n\
             original_word;translated_word\n\
             \n\
             Here is the text:\n\
             {text}",
            lang = self.language.name,
        )
    }

    /// Prompt for Q&A mode: question/answer blocks in the source language
    /// with target-language translations in parentheses.
    pub fn qa(&self, text: &str) -> String {
        format!(
            "You are an expert in creating Anki flashcards. Create question-answer \
             pairs from the following text. The text is in the original language. \
             Create questions and answers in the original language, and add {lang} \
             translations in parentheses.\n\
             \n\
             Follow these Anki best practices:\n\
             - Questions should be specific and clear\n\
             - Each question should test one concept\n\
             - Answers should be concise\n\
             - Avoid yes/no questions\n\
             - Use the minimum information principle\n\
             \n\
             Format EXACTLY like this:\n\
             F: [Original Question] ({lang} translation of question)\n\
             A: [Original Answer] ({lang} translation of answer)\n\
             \n\
             Example format:\n\
             F: Wo liegt Paris? (Where is Paris?)\n\
             A: Paris liegt in Frankreich (Paris is in France)\n\
             \n\
             Text to process:\n\
             {text}",
            lang = self.language.name,
        )
    }

    /// Prompt for the photo input path: pull the visible text out of an
    /// image so it can be fed through the normal text pipeline.
    pub fn image_extraction(&self) -> String {
        "Please analyze this image and extract any text or words you can find. \
         Format the output as a simple list of words."
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
