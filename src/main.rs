//! Command-line entry point — Cardforge.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line.
//! 3. Load [`AppConfig`] from disk (returns default on first run); seed the
//!    Gemini API key from `GEMINI_API_KEY` when the file carries none. The
//!    environment is read here and nowhere else.
//! 4. Build the Gemini gateway and the submission client from config.
//! 5. Drive one [`SessionFlow`] end to end: language → input → mode →
//!    (optional interactive trim) → submit.
//! 6. Write the resulting `.apkg` to disk, or print the download URL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use cardforge::{
    config::{AppConfig, AppPaths},
    deck::{language, DeckMode},
    llm::GeminiGateway,
    session::SessionFlow,
    submit::{Artifact, SubmissionClient},
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Generate Anki decks from text, photos or questions via Gemini.
#[derive(Debug, Parser)]
#[command(name = "cardforge", version, about)]
struct Cli {
    /// Source text to generate cards from.
    #[arg(long, conflicts_with_all = ["image", "question"])]
    text: Option<String>,

    /// Path to an image whose text is extracted through the model.
    #[arg(long, conflicts_with = "question")]
    image: Option<PathBuf>,

    /// A question for the model; its answer becomes the source text.
    #[arg(long)]
    question: Option<String>,

    /// Target language code (see --list-languages).
    #[arg(long)]
    lang: Option<String>,

    /// Deck type to generate.
    #[arg(long, value_enum, default_value = "vocabulary")]
    mode: ModeArg,

    /// Name of the generated deck.
    #[arg(long)]
    deck: Option<String>,

    /// Where to write the generated .apkg (defaults to the download dir).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the supported language catalog and exit.
    #[arg(long)]
    list_languages: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Word/translation pairs.
    Vocabulary,
    /// Question/answer cards.
    Qa,
}

impl From<ModeArg> for DeckMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Vocabulary => DeckMode::Vocabulary,
            ModeArg::Qa => DeckMode::Qa,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_languages {
        for lang in language::all() {
            println!("{:<6} {}", lang.code, lang.name);
        }
        return Ok(());
    }

    let mut config = AppConfig::load().context("loading settings")?;
    if config.gemini.api_key.is_empty() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = key;
        }
    }

    let lang_code = cli.lang.as_deref().unwrap_or(&config.deck.default_language);
    let lang = language::find(lang_code)
        .with_context(|| format!("unknown language code {lang_code:?} (try --list-languages)"))?;

    let mut flow = SessionFlow::new(
        Arc::new(GeminiGateway::from_config(&config.gemini)),
        Arc::new(SubmissionClient::from_config(&config.backend)),
    );

    flow.select_language(lang)?;

    // Exactly one input source.
    if let Some(text) = &cli.text {
        flow.provide_text(text)?;
    } else if let Some(path) = &cli.image {
        log::info!("extracting text from {}", path.display());
        flow.provide_image_file(path).await?;
    } else if let Some(question) = &cli.question {
        log::info!("asking the model: {question}");
        flow.provide_question(question).await?;
    } else {
        bail!("provide one of --text, --image or --question");
    }

    flow.choose_mode(cli.mode.into()).await?;

    let editor = flow.editor().context("no entries after generation")?;
    println!("Generated {} entries:", editor.len());
    for entry in editor.entries() {
        println!("  {}  ->  {}", entry.front(), entry.back());
    }

    let deck_name = cli
        .deck
        .clone()
        .unwrap_or_else(|| config.deck.default_deck_name.clone());
    let outcome = flow.submit(&deck_name).await?;

    match outcome.artifact {
        Artifact::Package(bytes) => {
            let path = cli.output.clone().unwrap_or_else(|| {
                AppPaths::new()
                    .download_dir
                    .join(format!("{}.apkg", outcome.deck_name.replace(' ', "_")))
            });
            std::fs::write(&path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Deck written to {}", path.display());
        }
        Artifact::Locator(url) => {
            println!("Deck ready for download: {url}");
        }
    }

    Ok(())
}
