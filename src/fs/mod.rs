// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! In-memory filesystem engine: namespace tree, block allocator and
//! per-file reader/writer guards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod block_map;
mod engine;
pub mod guard;
mod node;
mod path;
pub mod pool;
mod render;
mod session;
mod snapshot;

pub use block_map::BlockMap;
pub use engine::{DirEntry, FileSystem, FsStats};
pub use guard::FileGuard;
pub use node::EntryKind;
pub use path::MAX_DEPTH;
pub use pool::CellView;
pub use session::Session;
pub use snapshot::TreeRecord;

/// Identity of a caller holding files open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Mode requested when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    /// Shared access; any number of readers at once.
    Read,
    /// Exclusive access for appends and truncation.
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("reading"),
            Self::Write => f.write_str("writing"),
        }
    }
}

impl FromStr for OpenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "read" => Ok(Self::Read),
            "w" | "write" => Ok(Self::Write),
            other => Err(format!("unknown open mode '{other}'")),
        }
    }
}

/// Open state of a file as seen by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// The session holds nothing.
    Closed,
    /// The session is part of the reader group.
    Reading,
    /// The session is the exclusive writer.
    Writing,
}

impl From<Option<OpenMode>> for FileState {
    fn from(mode: Option<OpenMode>) -> Self {
        match mode {
            None => Self::Closed,
            Some(OpenMode::Read) => Self::Reading,
            Some(OpenMode::Write) => Self::Writing,
        }
    }
}
