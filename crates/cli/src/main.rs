//! `dataset` — upload datasets and run the processing pipeline from the
//! terminal.
//!
//! The binary is a thin shell around dk-core: it uploads a file, hands the
//! resulting dataset descriptor to the orchestrator, and renders the event
//! stream as colored step lines.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use colored::Colorize;
use dk_core::config::load_config;
use dk_core::engine::UploadOrchestrator;
use dk_core::service::{DatasetService, HttpDatasetService};
use dk_core::state::run::RunGeneration;
use dk_protocol::dataset_models::DatasetDescriptor;
use dk_protocol::ipc::Event;
use dk_protocol::run_models::{RunOutcome, StepStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dataset", version, about = "Data observatory processing pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and run the full processing pipeline.
    Run {
        /// Dataset file to upload.
        file: PathBuf,

        /// Override the dataset service base URL.
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Upload a file without running the pipeline.
    Upload {
        /// Dataset file to upload.
        file: PathBuf,

        /// Override the dataset service base URL.
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { file, api_url } => run_pipeline(&file, api_url).await,
        Commands::Upload { file, api_url } => {
            let service = build_service(api_url).await?;
            let dataset = upload_file(&service, &file).await?;
            println!(
                "{} dataset {} ({} preview rows)",
                "Uploaded".green().bold(),
                dataset.id,
                dataset.preview.len()
            );
            Ok(())
        }
    }
}

async fn build_service(api_url: Option<String>) -> color_eyre::Result<HttpDatasetService> {
    let mut config = load_config(Path::new(".")).await?;
    if let Some(url) = api_url {
        config.service.base_url = url;
    }
    HttpDatasetService::new(&config.service).map_err(|e| eyre!("{e}"))
}

async fn upload_file(
    service: &HttpDatasetService,
    file: &Path,
) -> color_eyre::Result<DatasetDescriptor> {
    let bytes = tokio::fs::read(file)
        .await
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("Invalid file name: {}", file.display()))?;

    let response = service
        .upload(filename, bytes)
        .await
        .map_err(|e| eyre!("Upload failed: {e}"))?;

    Ok(response.into())
}

async fn run_pipeline(file: &Path, api_url: Option<String>) -> color_eyre::Result<()> {
    let service = Arc::new(build_service(api_url).await?);

    println!("{} {}", "Uploading".cyan().bold(), file.display());
    let dataset = upload_file(&service, file).await?;
    println!(
        "{} dataset {} ({} preview rows)",
        "Uploaded".green().bold(),
        dataset.id,
        dataset.preview.len()
    );

    let orchestrator = UploadOrchestrator::new(service);
    let generation = RunGeneration::new();
    let (events_tx, mut events_rx) = mpsc::channel(100);

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            render_event(&event);
        }
    });

    let run = orchestrator.run(&dataset, &generation.issue(), events_tx).await;
    printer.await.map_err(|e| eyre!("{e}"))?;

    match run.outcome {
        Some(RunOutcome::Report(report)) => {
            println!("{}", "Pipeline completed".green().bold());
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Some(RunOutcome::Error { error }) => {
            eprintln!("{} {error}", "Pipeline failed:".red().bold());
            std::process::exit(1);
        }
        None => Err(eyre!("Run ended without an outcome")),
    }
}

fn render_event(event: &Event) {
    match event {
        Event::RunStarted { dataset_id, .. } => {
            println!("{} processing {dataset_id}", "Started".cyan().bold());
        }
        Event::StepStatusUpdate {
            step_id,
            status,
            message,
            ..
        } => {
            let label = match status {
                StepStatus::Pending => "pending".dimmed(),
                StepStatus::Processing => "processing".cyan(),
                StepStatus::Completed => "completed".green(),
                StepStatus::Error => "error".red().bold(),
            };
            match message {
                Some(text) => println!("  {step_id:<10} {label}  {text}"),
                None => println!("  {step_id:<10} {label}"),
            }
        }
        Event::RunLogChunk { content, .. } => {
            println!("  {}", content.dimmed());
        }
        Event::RunCompleted { .. } | Event::RunError { .. } => {}
    }
}
