// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Error kinds surfaced by the blockfs engine.

use thiserror::Error;

use crate::fs::OpenMode;

/// Errors returned by namespace, block map and snapshot operations.
///
/// Every variant names the path or operand that caused it so callers can
/// report failures without extra context.
#[derive(Debug, Error)]
pub enum FsError {
    /// Malformed path: a `.` in a directory segment, a file path without
    /// an extension, or an empty segment.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// Offending path as supplied by the caller.
        path: String,
        /// Short description of the violated rule.
        reason: &'static str,
    },
    /// Missing directory, file or block map entry.
    #[error("{path} not found")]
    NotFound {
        /// Path that failed to resolve.
        path: String,
    },
    /// Target directory, file or block map entry already exists.
    #[error("{path} already exists")]
    AlreadyExists {
        /// Path that is already taken.
        path: String,
    },
    /// The calling session already holds the file open.
    #[error("{path} is already open for {mode}")]
    AlreadyOpen {
        /// File path.
        path: String,
        /// Mode the session currently holds.
        mode: OpenMode,
    },
    /// The calling session does not hold the file in the required mode.
    #[error("{path} is not open{}", .expected.map(|m| format!(" for {m}")).unwrap_or_default())]
    NotOpen {
        /// File path.
        path: String,
        /// Mode the operation required, `None` for `close`.
        expected: Option<OpenMode>,
    },
    /// The block pool cannot hold the appended content.
    #[error("out of space appending to {path}: {needed} blocks needed, {free} free")]
    OutOfSpace {
        /// File path.
        path: String,
        /// Blocks required by the append.
        needed: usize,
        /// Blocks free at the time of the call.
        free: usize,
    },
    /// Truncate asked for more chunks than the file holds.
    #[error("cannot truncate {requested} blocks from {path}: only {held} held")]
    InsufficientLength {
        /// File path.
        path: String,
        /// Chunks requested for removal.
        requested: usize,
        /// Chunks currently held by the file.
        held: usize,
    },
    /// Rejected block geometry.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Snapshot record could not be encoded or decoded.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
    /// Snapshot file could not be read or written.
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason,
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "InvalidPath",
            Self::NotFound { .. } => "NotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::AlreadyOpen { .. } => "AlreadyOpen",
            Self::NotOpen { .. } => "NotOpen",
            Self::OutOfSpace { .. } => "OutOfSpace",
            Self::InsufficientLength { .. } => "InsufficientLength",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Snapshot(_) => "Snapshot",
            Self::Io(_) => "Io",
        }
    }
}

/// Result alias used throughout the crate.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_open_message_names_expected_mode() {
        let err = FsError::NotOpen {
            path: "/a.txt".into(),
            expected: Some(OpenMode::Write),
        };
        assert_eq!(err.to_string(), "/a.txt is not open for writing");
        let err = FsError::NotOpen {
            path: "/a.txt".into(),
            expected: None,
        };
        assert_eq!(err.to_string(), "/a.txt is not open");
    }

    #[test]
    fn kind_is_stable() {
        assert_eq!(FsError::not_found("/x").kind(), "NotFound");
        assert_eq!(FsError::already_exists("/x").kind(), "AlreadyExists");
    }
}
