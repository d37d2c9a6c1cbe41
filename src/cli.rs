//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use pickfun::config::{Config, OutputFormat};
use pickfun::{CheckpointError, Result};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Inspect and remove function checkpoint files
#[derive(Parser, Debug)]
#[command(name = "pickfun")]
#[command(version)]
#[command(about = "Inspect and remove function checkpoint files", long_about = None)]
pub struct Cli {
    /// Minimum log level (error, warn, info, debug, trace, off)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List checkpoint files with their age
    List {
        /// Directory holding checkpoint files (default: current directory)
        #[arg(short = 'd', long = "dir", value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long = "json")]
        json: bool,
    },
    /// Delete checkpoint files
    Clear {
        /// Directory holding checkpoint files (default: current directory)
        #[arg(short = 'd', long = "dir", value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Only delete checkpoints of this function
        #[arg(short = 'f', long = "function", value_name = "NAME")]
        function: Option<String>,
    },
}

/// What the tool was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Clear,
}

impl Cli {
    /// Parse command line arguments into an action and its Config
    pub fn into_config(self) -> Result<(Action, Config)> {
        let log_level = self.log_level;

        match self.command {
            Command::List { dir, json } => Ok((
                Action::List,
                Config {
                    checkpoint_dir: dir,
                    output_format: if json {
                        OutputFormat::Json
                    } else {
                        OutputFormat::Console
                    },
                    function: None,
                    log_level,
                },
            )),
            Command::Clear { dir, function } => {
                if function.as_deref().is_some_and(str::is_empty) {
                    return Err(CheckpointError::InvalidConfig(
                        "--function must not be empty".to_string(),
                    ));
                }
                Ok((
                    Action::Clear,
                    Config {
                        checkpoint_dir: dir,
                        output_format: OutputFormat::Console,
                        function,
                        log_level,
                    },
                ))
            }
        }
    }
}
