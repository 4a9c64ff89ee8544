//! CLI entrypoint for triad
//!
//! Wires the layers together with dependency injection: config resolution,
//! sandbox root, gateway credentials, tool executor, and the selected use
//! case. Only setup failures exit non-zero: a `needs_review` pipeline
//! outcome is a completed run.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use triad_application::ports::progress::{CompositeProgress, PipelineProgress};
use triad_application::{
    RunPipelineInput, RunPipelineUseCase, RunRequestInput, RunRequestUseCase,
};
use triad_infrastructure::{
    ConfigLoader, LocalToolExecutor, OpenAiGateway, SandboxRoot, TranscriptLogger,
    TranscriptProgress,
};
use triad_presentation::{Cli, ConsoleFormatter, ConsoleProgress, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };

    let mut params = config.pipeline_params();
    if let Some(max) = cli.max_iterations {
        params = params.with_max_fix_iterations(max);
    }

    let request = match cli.request {
        Some(ref r) => r.clone(),
        None => bail!("A request is required. See --help for usage."),
    };

    // === Setup (failures here are the only non-zero exits) ===
    let root = cli
        .root
        .clone()
        .or(config.sandbox.root.clone())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let sandbox = SandboxRoot::new(&root)
        .with_context(|| format!("sandbox root '{}' is not usable", root.display()))?;

    let model = cli.model.clone().or(Some(config.model.name.clone()));
    let gateway = Arc::new(
        OpenAiGateway::from_env(config.model.api_base.clone(), model)
            .context("missing model credentials")?,
    );
    let executor = Arc::new(LocalToolExecutor::new(sandbox.clone()));

    info!(
        root = %sandbox.root().display(),
        model = gateway.model(),
        multi_agent = cli.multi_agent,
        "starting triad"
    );

    // === Progress wiring ===
    let mut receivers: Vec<Arc<dyn PipelineProgress>> = Vec::new();
    if !cli.quiet {
        receivers.push(Arc::new(ConsoleProgress::new()));
    }
    if let Some(path) = &config.logging.transcript {
        if let Some(logger) = TranscriptLogger::new(path) {
            receivers.push(Arc::new(TranscriptProgress::new(Arc::new(logger))));
        }
    }
    let progress = CompositeProgress::new(receivers);

    // === Execute ===
    if cli.multi_agent {
        let use_case = RunPipelineUseCase::new(gateway, executor);
        let input = RunPipelineInput::new(request).with_params(params);
        let outcome = use_case
            .execute_with_progress(input, &progress)
            .await
            .context("pipeline interrupted")?;

        let rendered = match cli.output {
            OutputFormat::Text => ConsoleFormatter::format(&outcome),
            OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
        };
        println!("{}", rendered);
        // Exit 0 for approved and needs_review alike: both are completed runs.
    } else {
        let use_case = RunRequestUseCase::new(gateway, executor);
        let input = RunRequestInput::new(request).with_params(params);
        let output = use_case
            .execute_with_progress(input, &progress)
            .await
            .context("request interrupted")?;
        println!("{}", output.answer);
    }

    Ok(())
}
