// CLASSIFICATION: COMMUNITY
// Filename: engine.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Filesystem engine orchestrating namespace, block map and file guards.
//!
//! A single structural mutex covers the namespace tree and the block map.
//! File guards are the only fine-grained locks and are never waited on
//! while the structural mutex is held.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};

use super::block_map::BlockMap;
use super::guard::FileGuard;
use super::node::{EntryKind, FileNode, Namespace, Node, NodeId, NodeKind};
use super::path::{child_path, dir_segments, file_segments, join, MAX_DEPTH};
use super::{FileState, OpenMode, SessionId};

/// One entry of a directory listing or path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name.
    pub name: String,
    /// Canonical absolute path.
    pub path: String,
    /// Directory or file.
    pub kind: EntryKind,
}

/// Pool occupancy and namespace size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    /// Characters per block.
    pub block_size: usize,
    /// Blocks in the pool.
    pub block_count: usize,
    /// Unclaimed blocks.
    pub free_blocks: usize,
    /// Files in the namespace.
    pub files: usize,
    /// Directories in the namespace, root included.
    pub directories: usize,
}

/// Namespace and block map guarded together by the structural lock.
#[derive(Debug)]
pub(super) struct FsCore {
    pub(super) namespace: Namespace,
    pub(super) blocks: BlockMap,
}

impl FsCore {
    pub(super) fn new(cfg: FsConfig) -> Self {
        Self {
            namespace: Namespace::new(),
            blocks: BlockMap::new(cfg),
        }
    }

    fn walk_dirs(&self, parts: &[&str]) -> Option<NodeId> {
        let mut cursor = self.namespace.root();
        for part in parts {
            let child = self.namespace.get_child(cursor, part)?;
            if !self.namespace.is_dir(child) {
                return None;
            }
            cursor = child;
        }
        Some(cursor)
    }

    fn resolve_dir_id(&self, path: &str) -> FsResult<Option<NodeId>> {
        let parts = dir_segments(path)?;
        Ok(self.walk_dirs(&parts))
    }

    fn resolve_file_id(&self, path: &str) -> FsResult<Option<NodeId>> {
        let (parents, name) = file_segments(path)?;
        Ok(self
            .walk_dirs(&parents)
            .and_then(|dir| self.namespace.get_child(dir, name))
            .filter(|&id| !self.namespace.is_dir(id)))
    }

    fn require_file(&self, path: &str) -> FsResult<NodeId> {
        self.resolve_file_id(path)?
            .ok_or_else(|| FsError::not_found(canonical(path)))
    }

    fn require_dir(&self, path: &str) -> FsResult<NodeId> {
        self.resolve_dir_id(path)?
            .ok_or_else(|| FsError::not_found(canonical(path)))
    }

    fn entry(&self, id: NodeId) -> Option<DirEntry> {
        self.namespace.get(id).map(|node| DirEntry {
            name: node.name.clone(),
            path: self.namespace.get_path(id),
            kind: node.entry_kind(),
        })
    }

    /// Create and link a directory named `name` under `parent`.
    pub(super) fn create_dir(&mut self, parent: NodeId, name: &str) -> FsResult<NodeId> {
        let path = child_path(&self.namespace.get_path(parent), name);
        if self.namespace.get_child(parent, name).is_some() {
            return Err(FsError::already_exists(path));
        }
        let id = self.namespace.insert(
            name,
            NodeKind::Directory {
                children: Vec::new(),
            },
        );
        self.namespace.add_child(parent, id);
        Ok(id)
    }

    /// Create, link and register a file named `name` under `parent`.
    pub(super) fn create_file(&mut self, parent: NodeId, name: &str) -> FsResult<NodeId> {
        let path = child_path(&self.namespace.get_path(parent), name);
        if self.namespace.get_child(parent, name).is_some() {
            return Err(FsError::already_exists(path));
        }
        self.blocks.register(&path)?;
        let id = self.namespace.insert(name, NodeKind::File(FileNode::default()));
        self.namespace.add_child(parent, id);
        Ok(id)
    }

    /// Detach every holder of every file, returning what must be released.
    pub(super) fn drain_holders(&mut self) -> Vec<(Arc<FileGuard>, OpenMode)> {
        let ids: Vec<NodeId> = self.namespace.walk().into_iter().map(|(_, id)| id).collect();
        let mut released = Vec::new();
        for id in ids {
            if let Some(file) = self.namespace.file_mut(id) {
                for (_, mode) in file.holders.drain(..) {
                    released.push((Arc::clone(&file.guard), mode));
                }
            }
        }
        released
    }
}

fn canonical(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Hand back guard access held on behalf of sessions that lost their file.
pub(super) fn release_all(released: Vec<(Arc<FileGuard>, OpenMode)>) {
    for (guard, mode) in released {
        match mode {
            OpenMode::Read => guard.release_read(),
            OpenMode::Write => guard.release_write(),
        }
    }
}

fn removed_holders(removed: &[(String, Node)]) -> Vec<(Arc<FileGuard>, OpenMode)> {
    removed
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Directory { .. } => None,
        })
        .flat_map(|file| {
            file.holders
                .iter()
                .map(|(_, mode)| (Arc::clone(&file.guard), *mode))
        })
        .collect()
}

/// Thread-safe in-memory filesystem.
///
/// Structural operations (`mkdir`, `touch`, `move_file`, `delete`, `list`)
/// take the structural lock for their whole duration. Content operations
/// require the calling session to hold the file open through its guard.
#[derive(Debug)]
pub struct FileSystem {
    core: Mutex<FsCore>,
    persist: Mutex<()>,
    geometry: FsConfig,
    next_session: AtomicU64,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::with_core(FsCore::new(FsConfig::default()), FsConfig::default())
    }
}

impl FileSystem {
    /// Create an empty filesystem with the supplied block geometry.
    pub fn new(cfg: FsConfig) -> FsResult<Self> {
        cfg.validate()?;
        info!(
            "blockfs: {} blocks of {} characters",
            cfg.block_count, cfg.block_size
        );
        Ok(Self::with_core(FsCore::new(cfg), cfg))
    }

    fn with_core(core: FsCore, geometry: FsConfig) -> Self {
        Self {
            core: Mutex::new(core),
            persist: Mutex::new(()),
            geometry,
            next_session: AtomicU64::new(1),
        }
    }

    pub(super) fn lock_core(&self) -> MutexGuard<'_, FsCore> {
        match self.core.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Serialises snapshot writers so exports land on disk in order.
    pub(super) fn lock_persist(&self) -> MutexGuard<'_, ()> {
        match self.persist.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Block geometry of the pool.
    #[must_use]
    pub fn geometry(&self) -> FsConfig {
        self.geometry
    }

    /// Allocate a fresh session identity.
    pub fn new_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    /// Resolve a directory path.
    pub fn resolve_dir(&self, path: &str) -> FsResult<Option<DirEntry>> {
        let core = self.lock_core();
        Ok(core.resolve_dir_id(path)?.and_then(|id| core.entry(id)))
    }

    /// Resolve a file path.
    pub fn resolve_file(&self, path: &str) -> FsResult<Option<DirEntry>> {
        let core = self.lock_core();
        Ok(core.resolve_file_id(path)?.and_then(|id| core.entry(id)))
    }

    /// Create a directory whose parent already exists.
    ///
    /// Directories nest at most [`MAX_DEPTH`] levels below the root.
    pub fn mkdir(&self, path: &str) -> FsResult<()> {
        let parts = dir_segments(path)?;
        let Some((name, parents)) = parts.split_last() else {
            return Err(FsError::already_exists("/"));
        };
        if parts.len() > MAX_DEPTH {
            return Err(FsError::invalid_path(path, "directory nesting too deep"));
        }
        let mut core = self.lock_core();
        let parent = core
            .walk_dirs(parents)
            .ok_or_else(|| FsError::not_found(join(parents)))?;
        core.create_dir(parent, name)?;
        info!("mkdir {}", join(&parts));
        Ok(())
    }

    /// Create an empty file whose parent directory already exists.
    pub fn touch(&self, path: &str) -> FsResult<()> {
        let (parents, name) = file_segments(path)?;
        let mut core = self.lock_core();
        let parent = core
            .walk_dirs(&parents)
            .ok_or_else(|| FsError::not_found(join(&parents)))?;
        core.create_file(parent, name)?;
        info!("touch {}", child_path(&join(&parents), name));
        Ok(())
    }

    /// Open a file for `session`, blocking until the guard grants access.
    pub fn open(&self, session: SessionId, path: &str, mode: OpenMode) -> FsResult<()> {
        let (id, guard) = {
            let core = self.lock_core();
            let id = core.require_file(path)?;
            let file = core
                .namespace
                .file(id)
                .ok_or_else(|| FsError::not_found(canonical(path)))?;
            if let Some(held) = file.mode_for(session) {
                return Err(FsError::AlreadyOpen {
                    path: core.namespace.get_path(id),
                    mode: held,
                });
            }
            (id, Arc::clone(&file.guard))
        };

        debug!("{session} waiting for {mode} on {}", canonical(path));
        match mode {
            OpenMode::Read => guard.acquire_read(),
            OpenMode::Write => guard.acquire_write(),
        }

        let mut core = self.lock_core();
        let outcome = match core.namespace.file_mut(id) {
            Some(file) if Arc::ptr_eq(&file.guard, &guard) => match file.mode_for(session) {
                Some(held) => Err(FsError::AlreadyOpen {
                    path: canonical(path),
                    mode: held,
                }),
                None => {
                    file.holders.push((session, mode));
                    Ok(())
                }
            },
            // Deleted while this session was waiting.
            _ => Err(FsError::not_found(canonical(path))),
        };
        let path = core.namespace.get_path(id);
        drop(core);

        match outcome {
            Ok(()) => {
                info!("{session} opened {path} for {mode}");
                Ok(())
            }
            Err(err) => {
                release_all(vec![(guard, mode)]);
                warn!("{session} open failed: {err}");
                Err(err)
            }
        }
    }

    /// Release the guard `session` holds on a file.
    pub fn close(&self, session: SessionId, path: &str) -> FsResult<()> {
        let (guard, mode, canonical_path) = {
            let mut core = self.lock_core();
            let id = core.require_file(path)?;
            let canonical_path = core.namespace.get_path(id);
            let file = core
                .namespace
                .file_mut(id)
                .ok_or_else(|| FsError::not_found(canonical_path.clone()))?;
            let Some(slot) = file.holders.iter().position(|(holder, _)| *holder == session)
            else {
                return Err(FsError::NotOpen {
                    path: canonical_path,
                    expected: None,
                });
            };
            let (_, mode) = file.holders.remove(slot);
            (Arc::clone(&file.guard), mode, canonical_path)
        };
        release_all(vec![(guard, mode)]);
        info!("{session} closed {canonical_path}");
        Ok(())
    }

    /// Release every file `session` holds. Returns how many were closed.
    pub fn close_all(&self, session: SessionId) -> usize {
        let released = {
            let mut core = self.lock_core();
            let ids: Vec<NodeId> = core
                .namespace
                .walk()
                .into_iter()
                .map(|(_, id)| id)
                .collect();
            let mut released = Vec::new();
            for id in ids {
                if let Some(file) = core.namespace.file_mut(id) {
                    if let Some(slot) = file.holders.iter().position(|(holder, _)| *holder == session)
                    {
                        let (_, mode) = file.holders.remove(slot);
                        released.push((Arc::clone(&file.guard), mode));
                    }
                }
            }
            released
        };
        let count = released.len();
        release_all(released);
        if count > 0 {
            debug!("{session} released {count} open files");
        }
        count
    }

    /// Open state of a file as seen by `session`.
    pub fn file_state(&self, session: SessionId, path: &str) -> FsResult<FileState> {
        let core = self.lock_core();
        let id = core.require_file(path)?;
        Ok(FileState::from(
            core.namespace.file(id).and_then(|file| file.mode_for(session)),
        ))
    }

    fn with_open_file<T>(
        &self,
        session: SessionId,
        path: &str,
        required: OpenMode,
        op: impl FnOnce(&mut BlockMap, &str) -> FsResult<T>,
    ) -> FsResult<T> {
        let mut core = self.lock_core();
        let id = core.require_file(path)?;
        let canonical_path = core.namespace.get_path(id);
        let held = core.namespace.file(id).and_then(|file| file.mode_for(session));
        if held != Some(required) {
            return Err(FsError::NotOpen {
                path: canonical_path,
                expected: Some(required),
            });
        }
        op(&mut core.blocks, &canonical_path)
    }

    /// Append `data` to a file `session` holds open for writing.
    pub fn write(&self, session: SessionId, path: &str, data: &str) -> FsResult<()> {
        self.with_open_file(session, path, OpenMode::Write, |blocks, canonical_path| {
            blocks.append(canonical_path, data)?;
            debug!(
                "{session} appended {} characters to {canonical_path}",
                data.chars().count()
            );
            Ok(())
        })
    }

    /// Full content of a file `session` holds open for reading.
    pub fn read(&self, session: SessionId, path: &str) -> FsResult<String> {
        self.with_open_file(session, path, OpenMode::Read, |blocks, canonical_path| {
            blocks.read(canonical_path)
        })
    }

    /// Drop the last `count` blocks of a file `session` holds open for writing.
    pub fn truncate(&self, session: SessionId, path: &str, count: usize) -> FsResult<()> {
        self.with_open_file(session, path, OpenMode::Write, |blocks, canonical_path| {
            blocks.truncate(canonical_path, count)?;
            debug!("{session} truncated {count} blocks from {canonical_path}");
            Ok(())
        })
    }

    /// Delete a file and free its blocks.
    ///
    /// Open files may be deleted. Access held by their sessions is handed
    /// back to the guard so waiting openers wake up and observe `NotFound`.
    pub fn delete(&self, path: &str) -> FsResult<()> {
        let (released, canonical_path, freed) = {
            let mut core = self.lock_core();
            let id = core.require_file(path)?;
            let canonical_path = core.namespace.get_path(id);
            let freed = core.blocks.delete(&canonical_path)?;
            let removed = core.namespace.remove_subtree(id);
            (removed_holders(&removed), canonical_path, freed)
        };
        if !released.is_empty() {
            warn!(
                "deleted {canonical_path} while open by {} session(s)",
                released.len()
            );
        }
        release_all(released);
        info!("rm {canonical_path} ({freed} blocks freed)");
        Ok(())
    }

    /// Remove a directory and its whole subtree, purging every descendant
    /// file's blocks. Returns the number of files removed.
    pub fn rmdir(&self, path: &str) -> FsResult<usize> {
        let (released, canonical_path, files) = {
            let mut core = self.lock_core();
            let id = core.require_dir(path)?;
            if id == core.namespace.root() {
                return Err(FsError::invalid_path(path, "the root cannot be removed"));
            }
            let canonical_path = core.namespace.get_path(id);
            let removed = core.namespace.remove_subtree(id);
            let mut files = 0;
            for (file_path, node) in &removed {
                if node.entry_kind() == EntryKind::File {
                    files += 1;
                    if core.blocks.delete(file_path).is_err() {
                        warn!("rmdir: {file_path} had no block map entry");
                    }
                }
            }
            (removed_holders(&removed), canonical_path, files)
        };
        release_all(released);
        info!("rmdir {canonical_path} ({files} files purged)");
        Ok(files)
    }

    /// Move a file into another directory, keeping its content and guard.
    pub fn move_file(&self, src: &str, dest_dir: &str) -> FsResult<()> {
        let mut core = self.lock_core();
        let id = core.require_file(src)?;
        let dest = core.require_dir(dest_dir)?;
        let (name, parent) = match core.namespace.get(id) {
            Some(node) => (node.name.clone(), node.parent),
            None => return Err(FsError::not_found(canonical(src))),
        };
        if parent == Some(dest) {
            return Ok(());
        }
        let old_path = core.namespace.get_path(id);
        let new_path = child_path(&core.namespace.get_path(dest), &name);
        if core.namespace.get_child(dest, &name).is_some() {
            return Err(FsError::already_exists(new_path));
        }
        core.blocks.rekey(&old_path, &new_path)?;
        core.namespace.remove_child(id);
        core.namespace.add_child(dest, id);
        info!("mv {old_path} -> {new_path}");
        Ok(())
    }

    /// Children of a directory in creation order.
    pub fn list(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let core = self.lock_core();
        let id = core.require_dir(path)?;
        Ok(core
            .namespace
            .children(id)
            .iter()
            .filter_map(|&child| core.entry(child))
            .collect())
    }

    /// Pool occupancy and namespace counts.
    #[must_use]
    pub fn stats(&self) -> FsStats {
        let core = self.lock_core();
        let mut files = 0;
        let mut directories = 0;
        for (_, id) in core.namespace.walk() {
            if core.namespace.is_dir(id) {
                directories += 1;
            } else {
                files += 1;
            }
        }
        FsStats {
            block_size: core.blocks.cell_capacity(),
            block_count: core.blocks.cell_count(),
            free_blocks: core.blocks.free_cells(),
            files,
            directories,
        }
    }

    /// Cell indices currently held by a file, in append order.
    pub fn block_indices(&self, path: &str) -> FsResult<Vec<usize>> {
        let core = self.lock_core();
        let id = core.require_file(path)?;
        let canonical_path = core.namespace.get_path(id);
        core.blocks
            .indices(&canonical_path)
            .map(<[usize]>::to_vec)
            .ok_or_else(|| FsError::not_found(canonical_path))
    }
}
