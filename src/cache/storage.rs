//! Checkpoint file storage implementation

use crate::clock;
use crate::error::{CheckpointError, Result};
use crate::site::CallSite;
use bincode::Options;
use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Leading bytes of every checkpoint file
const MAGIC: &[u8; 4] = b"CKPT";

/// Current checkpoint format version
const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + 4;

/// A checkpoint file found on disk
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointFile {
    /// Call site the file belongs to
    pub site: CallSite,
    /// Full path of the file
    pub path: PathBuf,
    /// Size of the file in bytes
    pub size: u64,
    /// Last modification time in the local timezone
    pub modified: DateTime<FixedOffset>,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Serialize a value into checkpoint file content
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let payload = codec().serialize(value)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize checkpoint file content back into a value
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(CheckpointError::Format(
            "missing checkpoint header".to_string(),
        ));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(CheckpointError::Format(format!(
            "version {} is not supported (expected {})",
            version, FORMAT_VERSION
        )));
    }

    Ok(codec().deserialize(&bytes[HEADER_LEN..])?)
}

/// Load a checkpointed value from `path`
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| CheckpointError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    decode(&bytes).map_err(|e| CheckpointError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Store a value at `path`, creating or truncating the file
pub fn store<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    // Encode first so a serialization failure leaves any old file untouched
    let bytes = encode(value).map_err(|e| CheckpointError::Store {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let file = File::create(path).map_err(|e| CheckpointError::Store {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| CheckpointError::Store {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(())
}

/// List the checkpoint files in `dir`, sorted by file name
pub fn list_checkpoints(dir: &Path) -> Result<Vec<CheckpointFile>> {
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let site = match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(CallSite::from_file_name)
        {
            Some(site) => site,
            None => continue,
        };

        let size = entry.metadata()?.len();
        let modified = clock::modified_in_local_tz(&path)?;
        found.push(CheckpointFile {
            site,
            path,
            size,
            modified,
        });
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

/// Remove checkpoint files from `dir`
///
/// When `function` is given only that function's checkpoints are removed.
/// Returns the number of files deleted.
pub fn clear_checkpoints(dir: &Path, function: Option<&str>) -> Result<usize> {
    let mut removed = 0;

    for checkpoint in list_checkpoints(dir)? {
        if function.map_or(true, |name| checkpoint.site.function == name) {
            fs::remove_file(&checkpoint.path)?;
            tracing::debug!(path = %checkpoint.path.display(), "Removed checkpoint file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Path of the checkpoint file for `site` inside `dir`
pub fn checkpoint_path(dir: &Path, site: &CallSite) -> PathBuf {
    dir.join(site.file_name())
}
