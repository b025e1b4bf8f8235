// CLASSIFICATION: COMMUNITY
// Filename: session.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Caller identity bound to a shared [`FileSystem`].

use std::fmt;
use std::sync::Arc;

use crate::error::FsResult;

use super::engine::{DirEntry, FileSystem};
use super::{FileState, OpenMode, SessionId};

/// Handle through which one caller opens, reads and writes files.
///
/// Dropping a session closes every file it still holds.
pub struct Session {
    fs: Arc<FileSystem>,
    id: SessionId,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Session {
    /// Start a new session on `fs`.
    #[must_use]
    pub fn new(fs: Arc<FileSystem>) -> Self {
        let id = fs.new_session_id();
        Self { fs, id }
    }

    /// Identity used for per-file open state.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Shared filesystem this session operates on.
    #[must_use]
    pub fn fs(&self) -> &Arc<FileSystem> {
        &self.fs
    }

    /// Open `path` in `mode`, blocking until the guard admits this session.
    pub fn open(&self, path: &str, mode: OpenMode) -> FsResult<()> {
        self.fs.open(self.id, path, mode)
    }

    /// Release the guard this session holds on `path`.
    pub fn close(&self, path: &str) -> FsResult<()> {
        self.fs.close(self.id, path)
    }

    /// Append `data` to a file held for writing.
    pub fn write(&self, path: &str, data: &str) -> FsResult<()> {
        self.fs.write(self.id, path, data)
    }

    /// Full content of a file held for reading.
    pub fn read(&self, path: &str) -> FsResult<String> {
        self.fs.read(self.id, path)
    }

    /// Drop the last `count` blocks of a file held for writing.
    pub fn truncate(&self, path: &str, count: usize) -> FsResult<()> {
        self.fs.truncate(self.id, path, count)
    }

    /// Open state of `path` for this session.
    pub fn state(&self, path: &str) -> FsResult<FileState> {
        self.fs.file_state(self.id, path)
    }

    /// Children of the directory at `path`.
    pub fn list(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        self.fs.list(path)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.fs.close_all(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_releases_held_files() {
        let fs = Arc::new(FileSystem::default());
        fs.touch("a.txt").expect("touch");
        {
            let writer = Session::new(Arc::clone(&fs));
            writer.open("a.txt", OpenMode::Write).expect("open");
            writer.write("a.txt", "abc").expect("write");
        }
        let reader = Session::new(Arc::clone(&fs));
        reader.open("a.txt", OpenMode::Read).expect("writer released on drop");
        assert_eq!(reader.read("a.txt").expect("read"), "abc");
        assert_eq!(reader.state("a.txt").expect("state"), FileState::Reading);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let fs = Arc::new(FileSystem::default());
        let a = Session::new(Arc::clone(&fs));
        let b = Session::new(Arc::clone(&fs));
        assert_ne!(a.id(), b.id());
    }
}
