//! locale-patcher binary entrypoint. The patching itself lives in `locale_patcher_core`.

mod args;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use locale_patcher_core::{LocalePatcher, PatchSummary, PatcherConfig, UpdateSpec};
use log::{error, info};

fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    // `log` records from the core crate are forwarded through tracing-log
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<PatcherConfig> {
    let mut config = match &args.config {
        Some(path) => PatcherConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PatcherConfig::default(),
    };
    args.apply_to(&mut config);
    Ok(config)
}

fn print_summary(summary: &PatchSummary) {
    println!("[{}] {}", summary.patch, summary.directory.display());
    for outcome in &summary.outcomes {
        println!("  {outcome}");
    }
    println!("{summary}");
}

fn run(args: &Args) -> Result<Vec<PatchSummary>> {
    let config = load_config(args)?;
    let directory: PathBuf = config
        .directory
        .clone()
        .context("no locale directory given; pass --dir or set `directory` in the config file")?;
    let patcher = LocalePatcher::new(config.to_patch_options())?;

    // every patch document is loaded before any file is touched
    let specs = args
        .patches
        .iter()
        .map(|path| {
            UpdateSpec::from_path(path)
                .with_context(|| format!("failed to load patch document {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summaries = Vec::with_capacity(specs.len());
    for spec in &specs {
        info!("applying patch '{}' to {}", spec.name(), directory.display());
        let summary = patcher
            .apply_updates(&directory, spec)
            .with_context(|| format!("patch '{}' aborted", spec.name()))?;
        if !args.json {
            print_summary(&summary);
        }
        summaries.push(summary);
    }
    Ok(summaries)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_filter());

    match run(&args) {
        Ok(summaries) => {
            if args.json {
                match serde_json::to_string_pretty(&summaries) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        error!("failed to render summaries: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
