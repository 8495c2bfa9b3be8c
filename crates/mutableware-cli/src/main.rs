use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;

use config::PipelineConfig;
use mutableware_core::HandlerInfo;
use pipeline::Pipeline;

/// Ask a mutable handler chain which sound animals make.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Pipeline config (JSON). The built-in duck/cow pipeline is used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of requests handled at once.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Print one JSON report per animal, including the handler stack.
    #[arg(long)]
    show_stack: bool,

    /// Animals to look up.
    #[arg(default_values = ["duck", "cow", "dog"])]
    animals: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    animal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    answered_by: Vec<HandlerInfo>,
}

impl Report {
    fn new(animal: String, pipeline: &Pipeline) -> Self {
        match pipeline.answer(&animal) {
            Ok(answer) => Self {
                animal,
                sound: Some(answer.sound),
                error: None,
                answered_by: answer.answered_by,
            },
            Err(err) => Self {
                animal,
                sound: None,
                error: Some(err.to_string()),
                answered_by: Vec::new(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = PipelineConfig::load(args.config.as_deref())?;
    let pipeline = Arc::new(Pipeline::build(&config));
    info!(handlers = ?pipeline.handlers(), "handler chain (first invoked first)");

    // handle は同期処理なので blocking pool で並列に回す
    let permits = Arc::new(Semaphore::new(args.workers.max(1)));
    let mut tasks = JoinSet::new();
    for (idx, animal) in args.animals.into_iter().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let permit = Arc::clone(&permits).acquire_owned().await?;
        tasks.spawn_blocking(move || {
            let _permit = permit;
            debug!(%animal, "handling");
            (idx, Report::new(animal, &pipeline))
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        reports.push(joined?);
    }
    reports.sort_by_key(|(idx, _)| *idx);

    for (_, report) in reports {
        if args.show_stack {
            println!("{}", serde_json::to_string(&report)?);
            continue;
        }
        match (&report.sound, &report.error) {
            (Some(sound), _) => println!("{}: {}", report.animal, sound),
            (None, Some(err)) => println!("{}: error: {}", report.animal, err),
            (None, None) => println!("{}: (no answer)", report.animal),
        }
    }
    Ok(())
}
