//! cello - Fast notebook to HTML converter

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;

use cello::{
    Notebook, Orientation, PageRenderer, RenderConfig, convert_file, convert_file_to_string,
};

#[derive(Parser)]
#[command(name = "cello")]
#[command(version, about = "Fast notebook to HTML converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    cello notes.ipynb                Convert to notes.html
    cello -o site a.ipynb b.ipynb    Convert both into site/
    cello --stdout notes.ipynb       Print the HTML instead of writing it")]
struct Cli {
    /// Input notebook files
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (default: next to each input)
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Write HTML to standard output instead of files
    #[arg(long)]
    stdout: bool,

    /// Settings notebook supplied to the renderer
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Disable editing affordances
    #[arg(long)]
    readonly: bool,

    /// Start with the navigation tree expanded
    #[arg(long)]
    expanded: bool,

    /// Cell layout: in-out, out-in, or no-source
    #[arg(long, value_name = "MODE", default_value = "in-out")]
    orientation: Orientation,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.settings.as_deref()).await {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = Arc::new(RenderConfig {
        readonly: cli.readonly,
        navigation_expanded: cli.expanded,
        orientation: cli.orientation,
        ..RenderConfig::default()
    });
    let renderer = Arc::new(PageRenderer::new());

    let failures = if cli.stdout {
        convert_to_stdout(&cli, &renderer, &settings, &config).await
    } else {
        convert_to_files(&cli, renderer, settings, config).await
    };

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn load_settings(path: Option<&std::path::Path>) -> cello::Result<Notebook> {
    match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| cello::Error::from(e).for_document(path))?;
            Notebook::parse(&json).map_err(|e| e.for_document(path))
        }
        None => Ok(Notebook::default()),
    }
}

async fn convert_to_stdout(
    cli: &Cli,
    renderer: &PageRenderer,
    settings: &Notebook,
    config: &RenderConfig,
) -> usize {
    let mut failures = 0;
    for input in &cli.inputs {
        match convert_file_to_string(renderer, input, settings, config).await {
            Ok(html) => print!("{html}"),
            Err(e) => {
                eprintln!("error: {e}");
                failures += 1;
            }
        }
    }
    failures
}

/// One task per document; a failing document reports its path and does not
/// abort its siblings.
async fn convert_to_files(
    cli: &Cli,
    renderer: Arc<PageRenderer>,
    settings: Arc<Notebook>,
    config: Arc<RenderConfig>,
) -> usize {
    let mut tasks = JoinSet::new();
    for input in cli.inputs.clone() {
        let renderer = Arc::clone(&renderer);
        let settings = Arc::clone(&settings);
        let config = Arc::clone(&config);
        let out_dir = cli.out_dir.clone();
        tasks.spawn(async move {
            convert_file(
                renderer.as_ref(),
                &input,
                out_dir.as_deref(),
                &settings,
                &config,
            )
            .await
        });
    }

    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(path)) => {
                if !cli.quiet {
                    println!("wrote {}", path.display());
                }
            }
            Ok(Err(e)) => {
                eprintln!("error: {e}");
                failures += 1;
            }
            Err(e) => {
                eprintln!("error: conversion task failed: {e}");
                failures += 1;
            }
        }
    }
    failures
}
