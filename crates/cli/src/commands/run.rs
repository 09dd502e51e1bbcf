//! `ponder run`: Solve a single goal.

use anyhow::Context;
use clap::Args;
use ponder_agent::{Outcome, ReactAgent};
use ponder_config::{AppConfig, TranscriptBackend};
use ponder_core::transcript::TranscriptStore;
use ponder_memory::{FileTranscript, InMemoryTranscript};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Args)]
pub struct RunArgs {
    /// What the agent should accomplish
    pub goal: String,

    /// Override the iteration budget
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Append turns to this JSONL file
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Print every turn after the run
    #[arg(long)]
    pub show_transcript: bool,
}

fn build_transcript(config: &AppConfig, path: Option<PathBuf>) -> Arc<dyn TranscriptStore> {
    match (path, config.transcript.backend) {
        (Some(path), _) => Arc::new(FileTranscript::new(path)),
        (None, TranscriptBackend::File) => Arc::new(FileTranscript::new(
            config
                .transcript
                .path
                .clone()
                .unwrap_or_else(FileTranscript::default_path),
        )),
        (None, TranscriptBackend::Memory) => Arc::new(InMemoryTranscript::new()),
    }
}

pub async fn run(config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let mut agent_config = config.agent_config();
    if let Some(max) = args.max_iterations {
        agent_config = agent_config.with_max_iterations(max);
    }

    let provider = ponder_providers::from_config(&config).with_context(|| {
        format!(
            "No model client; set PONDER_API_KEY or add api_key to {}",
            AppConfig::config_dir().join("config.toml").display()
        )
    })?;
    let tools = Arc::new(super::build_registry(&config)?);
    let transcript = build_transcript(&config, args.transcript);
    info!(backend = transcript.name(), "Transcript ready");

    let agent = ReactAgent::new(Arc::new(provider), tools, transcript.clone(), agent_config)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            on_ctrl_c.cancel();
        }
    });

    let result = agent.execute_with_cancel(&args.goal, cancel).await?;

    if args.show_transcript {
        for turn in transcript.all().await? {
            eprintln!("── [{}] {} ──", turn.sequence, turn.role);
            eprintln!("{}", turn.content);
        }
        eprintln!();
    }

    if result.outcome == Outcome::BudgetExhausted {
        warn!(iterations = result.iterations, "No answer within the iteration budget");
    }
    println!("{}", result.answer);
    Ok(())
}
