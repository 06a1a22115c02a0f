//! dfalang - DFA script interpreter
//!
//! Reads a script from a file (or stdin), runs it and writes the report
//! stream to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

use dfalang::{DfalangConfig, DfalangError, Interpreter, Output, ReportFormat};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "dfalang")]
#[command(author = "Sina Rabbani")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Define deterministic finite automata and test string acceptance", long_about = None)]
struct Cli {
    /// Script to run, or - for stdin
    #[arg(value_name = "FILE")]
    script: PathBuf,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "DFALANG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for rendered automata (reserved, nothing is written yet)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Report format (text, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Only parse the script and report syntax problems
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        // already reported on the output stream
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the script ran without a parse or runtime error.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;

    // Initialize logger
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Some(dir) = &config.output_dir {
        debug!("Output directory {} reserved for rendering", dir.display());
    }

    let source = read_script(&cli.script).await?;
    info!("Running {} ({} bytes)", cli.script.display(), source.len());

    let mut interpreter = Interpreter::new(Output::stdout(config.format));

    if cli.check {
        return Ok(match interpreter.parse(&source) {
            Ok(program) => {
                info!("{} modules parsed, nothing executed", program.len());
                true
            }
            Err(_) => false,
        });
    }

    match interpreter.run_source(&source).await {
        Ok(()) => {
            info!(
                "Finished with {} automata defined",
                interpreter.environment().len()
            );
            Ok(true)
        }
        Err(DfalangError::Parse(_)) | Err(DfalangError::Runtime(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn load_config(cli: &Cli) -> Result<DfalangConfig> {
    let mut config = match &cli.config {
        Some(path) => DfalangConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DfalangConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(format) = &cli.format {
        config.format = format.parse::<ReportFormat>().map_err(anyhow::Error::msg)?;
    }

    config.validate()?;
    Ok(config)
}

async fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .context("Failed to read script from stdin")?;
        return Ok(source);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script {}", path.display()))
}
