use anyhow::{bail, Context, Result};
use clap::Parser;
use scene_dialogue::ai::GeminiDialogueClient;
use scene_dialogue::dialogue::{line_at, render_transcript};
use scene_dialogue::languages::{self, LANGUAGES};
use scene_dialogue::models::{
    clamp_age, Config, DialogueLine, LearnerProfile, Proficiency, DEFAULT_AGE,
};
use scene_dialogue::session::{DialogueSession, RequestState};
use scene_dialogue::speech::{EspeakEngine, Player};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "scene-dialogue")]
#[command(about = "Generate a language-practice dialogue from a photo")]
struct CliArgs {
    /// Image to build the dialogue around (PNG, JPEG, WEBP, ...).
    #[arg(value_name = "IMAGE", required_unless_present = "list_languages")]
    image: Option<PathBuf>,

    /// Language you already speak.
    #[arg(long, default_value = "en-US", value_parser = parse_language_arg)]
    native: String,

    /// Language you are learning.
    #[arg(long, default_value = "es-ES", value_parser = parse_language_arg)]
    target: String,

    /// Learner age; clamped to 5-100.
    #[arg(long, default_value_t = DEFAULT_AGE as u32, value_parser = parse_age_arg)]
    age: u32,

    /// Beginner, Intermediate or Advanced.
    #[arg(long, default_value_t = Proficiency::Beginner)]
    level: Proficiency,

    /// Read every line aloud after printing.
    #[arg(long, conflicts_with = "line")]
    speak: bool,

    /// Read only line N of the printed transcript aloud (1-based).
    #[arg(long, value_name = "N")]
    line: Option<usize>,

    /// Print the supported languages and exit.
    #[arg(long)]
    list_languages: bool,
}

fn parse_language_arg(input: &str) -> std::result::Result<String, String> {
    languages::find(input)
        .map(|lang| lang.code.to_string())
        .ok_or_else(|| {
            format!(
                "Unknown language code '{}'. Run with --list-languages to see the options",
                input
            )
        })
}

fn parse_age_arg(input: &str) -> std::result::Result<u32, String> {
    input
        .trim()
        .parse::<u32>()
        .map(|age| clamp_age(age) as u32)
        .map_err(|_| format!("Invalid age '{}'. Expected a whole number", input))
}

/// Lines to read aloud: one numbered line, every line, or none.
fn lines_to_play(
    lines: &[DialogueLine],
    speak_all: bool,
    number: Option<usize>,
) -> Result<Vec<&DialogueLine>> {
    match number {
        Some(n) => match line_at(lines, n) {
            Some(line) => Ok(vec![line]),
            None => bail!(
                "There is no line {}; the dialogue has {} lines",
                n,
                lines.len()
            ),
        },
        None if speak_all => Ok(lines.iter().collect()),
        None => Ok(Vec::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_dialogue=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if args.list_languages {
        for lang in LANGUAGES {
            println!("{:<7} {}", lang.code, lang.name);
        }
        return Ok(());
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match run(args, config).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: CliArgs, config: Config) -> Result<()> {
    let image_path = args.image.context("An image path is required")?;

    info!("Using Gemini model {}", config.gemini_model);
    let client = GeminiDialogueClient::new(config.gemini_api_key, config.gemini_model)
        .with_base_url(config.gemini_base_url);
    let profile = LearnerProfile::new(args.native, args.target, args.age, args.level);
    let target = profile.target_language.clone();
    let session = DialogueSession::with_profile(Box::new(client), profile);

    session
        .load_image(&image_path)
        .await
        .with_context(|| format!("Error reading file {}", image_path.display()))?;

    let lines = match session.submit().await {
        Ok(lines) => lines,
        Err(_) => match session.state() {
            RequestState::Failed(failure) => bail!(failure.message),
            other => bail!("Dialogue request ended in unexpected state {:?}", other),
        },
    };

    println!("{}", render_transcript(&lines));

    let to_play = lines_to_play(&lines, args.speak, args.line)?;
    if !to_play.is_empty() {
        let player = Player::new(Arc::new(EspeakEngine::new(config.espeak_bin)));
        for line in to_play {
            player
                .play(&line.line, &target)
                .await
                .with_context(|| format!("Could not read aloud: {}", line.line))?;
        }
    }

    Ok(())
}
