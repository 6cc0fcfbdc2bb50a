use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use std::{process::ExitCode, sync::Arc};
use gavin::{
    args::{Args, Commands},
    blueprint::{Blueprint, PipelineResult},
    config::Manifest,
    error,
    process::SystemRunner,
    reporter::TerminalReporter,
    trace,
    transport::HttpArchive,
    version, warn,
};

/// Refuses to go on when the installed Node.js is too old for the blueprints.
async fn node_is_supported(manifest: &Manifest) -> bool {
    let current = match version::detect_node_major().await {
        Ok(major) => Some(major),
        Err(e) => {
            trace!("{e:#}");
            None
        }
    };

    if current.is_some_and(|c| version::is_runtime_supported(c, manifest.minimum_node_major)) {
        return true;
    }

    for line in version::refusal_message(manifest.minimum_node_major, current) {
        println!(
            "{}",
            line.if_supports_color(Stream::Stdout, |s| s.bright_red())
        );
    }
    false
}

async fn app(args: &Args, manifest: &Manifest) -> Result<ExitCode> {
    if !node_is_supported(manifest).await {
        return Ok(ExitCode::FAILURE);
    }

    match &args.command {
        Commands::Create { blueprint } => {
            let source = manifest.blueprint_source(blueprint.name())?;
            let cwd = std::env::current_dir().context("Failed to get current dir")?;
            trace!("Blueprint {} from {source} in {}", blueprint.name(), cwd.display());

            let pipeline = Blueprint::builder()
                .source(source)
                .cwd(cwd)
                .reporter(Arc::new(TerminalReporter::new()))
                .transport(Arc::new(HttpArchive::new()?))
                .runner(Arc::new(SystemRunner))
                .build()?;

            let options = blueprint.options(args.verbose);
            match pipeline.run(blueprint.app_name(), &options).await {
                PipelineResult::Success => Ok(ExitCode::SUCCESS),
                PipelineResult::Failure { leftover, .. } => {
                    if let Some(dir) = leftover {
                        warn!("Partially created project left at {}", dir.display());
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let manifest = match Manifest::load() {
        Ok(manifest) => manifest,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let args = Args::parse_with_version(&manifest.version);

    match app(&args, &manifest).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
