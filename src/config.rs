//! Configuration types for pickfun

use crate::error::{CheckpointError, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Output format for checkpoint listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable console output
    #[default]
    Console,
    /// JSON output with structured data
    Json,
}

/// Configuration options for the pickfun tool
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding checkpoint files (default: current working directory)
    pub checkpoint_dir: Option<PathBuf>,

    /// Output format for listings (console or json)
    pub output_format: OutputFormat,

    /// Only act on checkpoints of this function
    pub function: Option<String>,

    /// Minimum severity written to the log
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checkpoint_dir: None,
            output_format: OutputFormat::Console,
            function: None,
            log_level: LevelFilter::INFO,
        }
    }
}

impl Config {
    /// Returns the directory checkpoint files live in
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        resolve_dir(self.checkpoint_dir.as_deref())
    }
}

/// Returns `dir`, or the current working directory when none is given
///
/// The working directory is looked up on every call, so a process that
/// changes directory writes later checkpoints into the new one.
pub fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => env::current_dir().map_err(|e| CheckpointError::CurrentDir(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.checkpoint_dir.is_none());
        assert_eq!(config.output_format, OutputFormat::Console);
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn test_resolve_dir_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(config.resolve_dir().unwrap(), env::current_dir().unwrap());
    }

    #[test]
    fn test_resolve_dir_explicit() {
        let config = Config {
            checkpoint_dir: Some(PathBuf::from("/tmp/checkpoints")),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_dir().unwrap(),
            PathBuf::from("/tmp/checkpoints")
        );
    }
}
