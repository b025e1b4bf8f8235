// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-18
// Author: Lukas Bower

//! Block-backed in-memory filesystem with a hierarchical namespace,
//! fixed-size cell pool and per-file reader/writer guards.

/// Block geometry configuration.
pub mod config;

/// Error types shared by every filesystem operation.
pub mod error;

/// Namespace, block map, guards, sessions and snapshots.
pub mod fs;

pub use config::FsConfig;
pub use error::{FsError, FsResult};
pub use fs::{
    DirEntry, EntryKind, FileState, FileSystem, FsStats, OpenMode, Session, SessionId, TreeRecord,
};
