use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{fs, io::AsyncReadExt};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use quizforge_core::{
    Models, Provider, RawQuizText, Settings, TranscriptSource, extract_key_points,
    format_key_points, format_parsed_quiz, format_quiz_readable, generate_quiz, parse_quiz,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "quizforge")]
#[command(about = "Distill transcripts into key points and generate quizzes from them")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract key points from a transcript and author a quiz
    Generate {
        /// Transcript file (.json Whisper output or plain text), or "-" for stdin
        input: String,

        /// Number of key points to distill
        #[arg(short = 'k', long)]
        key_points: Option<usize>,

        /// Number of multiple-choice questions
        #[arg(long)]
        mcq: Option<usize>,

        /// Number of true/false questions
        #[arg(long)]
        tf: Option<usize>,

        /// AI provider for quiz authoring
        #[arg(short, long)]
        provider: Option<CliProvider>,

        /// Config file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the quiz items (or key points) as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after key-point extraction
        #[arg(long)]
        key_points_only: bool,
    },
    /// Parse previously authored quiz text without calling any model
    Parse {
        /// Raw quiz text file, or "-" for stdin
        input: String,

        /// Write the quiz items as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

async fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "{} Saved: {}",
        style("✓").green().bold(),
        style(path.display()).dim()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            input,
            key_points,
            mcq,
            tf,
            provider,
            config,
            output,
            key_points_only,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            if let Some(n) = key_points {
                settings.key_points.target = n;
            }
            if let Some(n) = mcq {
                settings.quiz.num_mcq = n;
            }
            if let Some(n) = tf {
                settings.quiz.num_tf = n;
            }
            if let Some(p) = provider {
                settings.author.provider = p.into();
            }
            let source = TranscriptSource::from_arg(&input);
            generate(&source, settings, output.as_deref(), key_points_only).await
        }
        Command::Parse { input, output } => parse(&input, output.as_deref()).await,
    }
}

async fn generate(
    source: &TranscriptSource,
    settings: Settings,
    output: Option<&Path>,
    key_points_only: bool,
) -> Result<()> {
    let provider = settings.author.provider;

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        fail(e);
    }

    println!(
        "\n{}  {}\n",
        style("quizforge").cyan().bold(),
        style("Transcript Quiz Generator").dim()
    );

    let models = match Models::from_settings(&settings) {
        Ok(models) => models,
        Err(e) => fail(e),
    };
    println!("{} Models ready", style("✓").green().bold());
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();

    // Step 1: Load transcript
    let transcript = source.load().await?;
    if transcript.is_blank() {
        fail("transcript is empty");
    }
    println!(
        "{} Loaded transcript: {} words",
        style("✓").green().bold(),
        transcript.as_str().split_whitespace().count()
    );

    // --key-points-only stops here
    if key_points_only {
        let step_start = Instant::now();
        let spinner = create_spinner("Distilling key points...");
        let key_points = extract_key_points(&transcript, &models, &settings.key_points).await;
        if key_points.is_empty() {
            spinner.finish_and_clear();
            fail("no key points could be extracted from the transcript");
        }
        spinner.finish_with_message(format!(
            "{} Distilled {} key points {}",
            style("✓").green().bold(),
            key_points.len(),
            style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
        ));

        println!("{}\n", style("─".repeat(60)).dim());
        print!("{}", format_key_points(&key_points));
        if let Some(path) = output {
            write_json(path, &key_points).await?;
        }
        return Ok(());
    }

    // Step 2: Key points and quiz
    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Distilling key points and authoring quiz with {}...",
        provider.name()
    ));
    let outcome = match generate_quiz(&transcript, &models, &settings).await {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.finish_and_clear();
            fail(e);
        }
    };

    if outcome.is_starved() {
        spinner.finish_and_clear();
        fail("no key points could be extracted from the transcript");
    }
    if outcome.quiz.is_empty() {
        spinner.finish_and_clear();
        if let Some(raw) = &outcome.raw_quiz {
            debug!(raw = raw.as_str(), "unparseable quiz text");
        }
        fail(format!(
            "{} returned a quiz with no usable questions",
            provider.name()
        ));
    }
    spinner.finish_with_message(format!(
        "{} Quiz generated ({}): {} key points, {} questions {}",
        style("✓").green().bold(),
        provider.name(),
        outcome.key_points.len(),
        outcome.quiz.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    println!(
        "{}\n",
        style(format!(
            "─── Total: {} ───",
            format_duration(total_start.elapsed())
        ))
        .dim()
    );
    print!("{}", format_quiz_readable(&outcome));

    if let Some(path) = output {
        write_json(path, &outcome.items()).await?;
    }

    Ok(())
}

async fn parse(input: &str, output: Option<&Path>) -> Result<()> {
    let text = if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        text
    } else {
        fs::read_to_string(input)
            .await
            .with_context(|| format!("failed to read {input}"))?
    };

    let quiz = parse_quiz(&RawQuizText::new(text));
    if quiz.is_empty() {
        fail("no valid quiz questions found");
    }
    println!(
        "{} Parsed {} multiple-choice and {} true/false questions\n",
        style("✓").green().bold(),
        quiz.multiple_choice.len(),
        quiz.true_false.len()
    );
    print!("{}", format_parsed_quiz(&quiz));

    if let Some(path) = output {
        write_json(path, &quiz.items()).await?;
    }
    Ok(())
}
