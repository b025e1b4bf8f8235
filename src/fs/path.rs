// CLASSIFICATION: COMMUNITY
// Filename: path.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Path splitting and type discrimination.
//!
//! A final segment containing `.` names a file; no directory segment may
//! contain `.`. The leading `/` is optional and the root is the empty path.

use crate::error::{FsError, FsResult};

/// Deepest directory nesting below the root.
pub const MAX_DEPTH: usize = 128;

fn segments(path: &str) -> FsResult<Vec<&str>> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(FsError::invalid_path(path, "empty path segment"));
    }
    Ok(parts)
}

/// Segments of a directory path.
pub(crate) fn dir_segments(path: &str) -> FsResult<Vec<&str>> {
    let parts = segments(path)?;
    if parts.iter().any(|part| part.contains('.')) {
        return Err(FsError::invalid_path(
            path,
            "directory names cannot contain '.'",
        ));
    }
    Ok(parts)
}

/// Parent directory segments and file name of a file path.
pub(crate) fn file_segments(path: &str) -> FsResult<(Vec<&str>, &str)> {
    let mut parts = segments(path)?;
    let name = match parts.pop() {
        Some(name) if name.contains('.') => name,
        _ => {
            return Err(FsError::invalid_path(
                path,
                "file names need an extension",
            ))
        }
    };
    if parts.iter().any(|part| part.contains('.')) {
        return Err(FsError::invalid_path(
            path,
            "directory names cannot contain '.'",
        ));
    }
    Ok((parts, name))
}

/// Canonical absolute form of a segment list.
pub(crate) fn join(parts: &[&str]) -> String {
    parts.iter().fold(String::new(), |mut out, part| {
        out.push('/');
        out.push_str(part);
        out
    })
}

/// Canonical path of `name` inside the directory at `parent`.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}
