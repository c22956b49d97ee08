//! CLI entrypoint for interview-coach
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coach_application::{InterviewTracker, SessionStore, TranscriptStore};
use coach_infrastructure::{
    ConfigLoader, JsonTranscriptStore, LiteLlmGateway, TracingInterviewTracker,
};
use coach_presentation::{ChatRepl, Cli};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?
    };

    let mut config = file_config.interview_config();
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    if let Some(max_turns) = cli.max_turns {
        config = config.with_max_turns(max_turns);
    }
    if let Some(path) = &cli.job_description {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read job description {}", path.display()))?;
        config = config.with_job_description(text);
    }

    info!(model = %config.model, backend = %file_config.llm.base_url, "starting interview-coach");

    // === Dependency Injection ===
    let tracker: Arc<dyn InterviewTracker> = Arc::new(TracingInterviewTracker::new());
    let gateway = Arc::new(LiteLlmGateway::new(&file_config.llm, tracker.clone())?);
    let transcripts: Arc<dyn TranscriptStore> = if file_config.transcripts.enabled {
        Arc::new(JsonTranscriptStore::new(&file_config.transcripts.dir))
    } else {
        Arc::new(coach_application::NoTranscriptStore)
    };
    let store = Arc::new(SessionStore::new(gateway, tracker, transcripts));

    ChatRepl::new(store, config)
        .with_quiet(cli.quiet)
        .run()
        .await
}
