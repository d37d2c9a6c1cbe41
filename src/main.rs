//! pickfun - inspect and remove function checkpoint files
//!
//! The checkpoint wrapper itself lives in the library; this tool lists the
//! `.ckpnt` files a program has left behind and deletes them on request.

mod cli;

use clap::Parser;
use cli::{Action, Cli};
use pickfun::cache::{clear_checkpoints, list_checkpoints, CheckpointFile};
use pickfun::clock;
use pickfun::config::{Config, OutputFormat};
use pickfun::Result;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    // Convert to config
    let (action, config) = match cli.into_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // Initialize tracing, RUST_LOG wins over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(config.log_level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let result = match action {
        Action::List => run_list(&config),
        Action::Clear => run_clear(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run_list(config: &Config) -> Result<()> {
    let dir = config.resolve_dir()?;
    let checkpoints = list_checkpoints(&dir)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.output_format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &checkpoints)
                .map_err(io::Error::other)?;
            writeln!(out)?;
        }
        OutputFormat::Console => {
            let now = clock::now();
            for checkpoint in &checkpoints {
                writeln!(out, "{}", format_line(checkpoint, now))?;
            }
        }
    }

    info!(
        dir = %dir.display(),
        count = checkpoints.len(),
        "Listed checkpoint files"
    );
    Ok(())
}

fn run_clear(config: &Config) -> Result<()> {
    let dir = config.resolve_dir()?;
    let removed = clear_checkpoints(&dir, config.function.as_deref())?;

    info!(dir = %dir.display(), removed, "Cleared checkpoint files");
    println!("Removed {} checkpoint file(s)", removed);
    Ok(())
}

fn format_line(checkpoint: &CheckpointFile, now: chrono::DateTime<chrono::FixedOffset>) -> String {
    format!(
        "{}\t{} bytes\t{}",
        checkpoint.site,
        checkpoint.size,
        clock::time_ago(checkpoint.modified, now)
    )
}
