//! Checkpoint persistence
//!
//! This module reads and writes the per-call-site checkpoint files. Each file
//! holds one bincode-serialized value behind a small versioned header.

mod storage;

pub use storage::{
    checkpoint_path, clear_checkpoints, decode, encode, list_checkpoints, load, store,
    CheckpointFile,
};
