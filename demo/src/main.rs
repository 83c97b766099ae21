//! Sentio — Feedback Analysis Demo CLI
//!
//! Runs free-text customer feedback through the standard five-stage
//! analysis workflow (sentiment, themes, one action stage per department)
//! and prints the aggregated result. In demo mode everything is
//! deterministic and offline; in live mode the stages call the configured
//! text-generation provider.
//!
//! Usage:
//!   cargo run -p demo -- analyze "The delivery was late and the box was broken."
//!   cargo run -p demo -- analyze --json "Great support!"
//!   cargo run -p demo -- samples
//!   cargo run -p demo -- health
//!   cargo run -p demo -- --mode live analyze "..."   (needs an API key)

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sentio_contracts::{
    analysis::Department,
    config::{RunMode, WorkflowConfig},
    error::{SentioError, SentioResult},
    run::{RunOutcome, RunStatus},
};
use sentio_genai::{create_generator, TextGenerator};
use sentio_stages::standard_engine;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Sentio — customer feedback analysis workflow.
///
/// Feedback text fans out to a sentiment classifier and a theme extractor,
/// then three department action generators run over both results, and an
/// aggregator merges everything into one structured analysis.
#[derive(Parser)]
#[command(
    name = "sentio",
    about = "Customer feedback analysis workflow demo",
    long_about = "Analyzes free-text customer feedback: overall sentiment, main themes,\n\
                  and recommended follow-up actions for HR, customer service, and product."
)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply without one).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the run mode from file and environment: "demo" or "live".
    #[arg(long, value_name = "MODE", global = true)]
    mode: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one piece of feedback text.
    Analyze {
        /// The feedback text.
        text: String,
        /// Print the outbound JSON payload instead of the readable report.
        #[arg(long)]
        json: bool,
    },
    /// Run the built-in sample corpus (complaint, praise, suggestion, query).
    Samples,
    /// Check whether the generation capability is reachable.
    Health,
}

// ── Sample corpus ─────────────────────────────────────────────────────────────

/// One sample per feedback category the demo heuristics distinguish.
const SAMPLES: &[(&str, &str)] = &[
    (
        "complaint",
        "My delivery arrived two weeks late and the box was broken. Terrible experience.",
    ),
    (
        "praise",
        "The support staff were amazing and sorted everything out in minutes!",
    ),
    (
        "suggestion",
        "You should add dark mode to the app. It could improve reading at night.",
    ),
    (
        "query",
        "Where can I find the invoice for my last order?",
    ),
];

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // .env first, so SENTIO_MODE and provider keys are visible to config
    // loading and generator construction.
    dotenvy::dotenv().ok();

    // Structured logging. Set RUST_LOG=debug for per-stage detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> SentioResult<()> {
    let mut config = WorkflowConfig::load(cli.config.as_deref())?;
    if let Some(raw) = &cli.mode {
        config.mode = RunMode::parse(raw).ok_or_else(|| SentioError::Config {
            reason: format!("unrecognized --mode value '{raw}' (expected 'demo' or 'live')"),
        })?;
    }
    debug!(mode = config.mode.as_str(), "configuration loaded");

    let generator = create_generator(&config)?;

    // The JSON path keeps stdout machine-readable; everything else gets the
    // banner.
    if !matches!(cli.command, Command::Analyze { json: true, .. }) {
        print_banner(&config);
    }

    match cli.command {
        Command::Analyze { text, json } => analyze(&config, generator, &text, json).await,
        Command::Samples => samples(&config, generator).await,
        Command::Health => health(generator).await,
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

async fn analyze(
    config: &WorkflowConfig,
    generator: Arc<dyn TextGenerator>,
    text: &str,
    json: bool,
) -> SentioResult<()> {
    let engine = standard_engine(generator, config)?;
    let outcome = engine.analyze(text).await?;
    if json {
        match serde_json::to_string_pretty(&outcome.analysis) {
            Ok(payload) => println!("{payload}"),
            Err(e) => eprintln!("failed to serialize analysis: {e}"),
        }
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

async fn samples(
    config: &WorkflowConfig,
    generator: Arc<dyn TextGenerator>,
) -> SentioResult<()> {
    let engine = standard_engine(generator, config)?;
    for (category, text) in SAMPLES {
        println!("=== Sample: {category} ===");
        println!("  \"{text}\"");
        let outcome = engine.analyze(text).await?;
        print_outcome(&outcome);
    }
    Ok(())
}

async fn health(generator: Arc<dyn TextGenerator>) -> SentioResult<()> {
    match generator.health().await {
        Ok(()) => {
            println!(
                "  Generation capability reachable ({} mode).",
                generator.mode().as_str()
            );
            println!();
            Ok(())
        }
        Err(e) => Err(SentioError::Unavailable {
            reason: format!("generation capability unreachable: {e}"),
        }),
    }
}

// ── Output formatting ─────────────────────────────────────────────────────────

fn print_banner(config: &WorkflowConfig) {
    println!();
    println!("Sentio — Feedback Analysis Workflow");
    println!("===================================");
    println!("  mode: {}", config.mode.as_str());
    println!();
}

fn print_outcome(outcome: &RunOutcome) {
    let analysis = &outcome.analysis;
    let report = &outcome.report;

    println!();
    println!("  Run:        {} ({})", report.run_id, status_word(report.status));
    println!("  Elapsed:    {}ms", report.elapsed_ms);
    println!(
        "  Sentiment:  {} (confidence {:.2})",
        analysis.sentiment.label, analysis.sentiment.confidence
    );
    if analysis.themes.is_empty() {
        println!("  Themes:     (none)");
    } else {
        println!("  Themes:     {}", analysis.themes.join(", "));
    }
    println!("  Action items:");
    for department in Department::ALL {
        let items = analysis.action_items.for_department(department);
        if items.is_empty() {
            println!("    {department}: (none)");
        } else {
            println!("    {department}:");
            for item in items {
                println!("      - {item}");
            }
        }
    }
    println!("  Summary:    {}", analysis.summary);

    if report.failed_stages() > 0 {
        println!();
        println!("  Degraded stages:");
        for trace in report.stages.iter().filter(|t| !t.completed) {
            let reason = trace.reason.map(|r| r.as_str()).unwrap_or("unknown");
            println!("    {} ({reason})", trace.stage);
        }
    }

    let notes: Vec<_> = report
        .stages
        .iter()
        .filter_map(|t| t.note.as_deref().map(|n| (&t.stage, n)))
        .collect();
    if !notes.is_empty() {
        println!();
        println!("  Notes:");
        for (stage, note) in notes {
            println!("    {stage}: {note}");
        }
    }
    println!();
}

fn status_word(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Completed => "completed",
        RunStatus::PartiallyFailed => "partially failed",
    }
}
