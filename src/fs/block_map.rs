// CLASSIFICATION: COMMUNITY
// Filename: block_map.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Allocator mapping file paths to ordered pool indices.
//!
//! Content is split into chunks of at most `block_size` characters and each
//! chunk lands in the first free cell found by a linear scan from index 0.
//! An entry lists its cells in append order, so reading a file is the
//! concatenation of its cells in entry order.

use std::collections::HashMap;

use log::{debug, trace};

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};

use super::pool::{BlockPool, CellView};

/// Path-keyed allocation table over an exclusively owned [`BlockPool`].
#[derive(Debug, Clone)]
pub struct BlockMap {
    pool: BlockPool,
    entries: HashMap<String, Vec<usize>>,
}

impl BlockMap {
    /// Create an empty map over a fresh pool.
    #[must_use]
    pub fn new(cfg: FsConfig) -> Self {
        Self {
            pool: BlockPool::new(cfg.block_count, cfg.block_size),
            entries: HashMap::new(),
        }
    }

    /// Geometry of the underlying pool.
    #[must_use]
    pub fn geometry(&self) -> FsConfig {
        FsConfig {
            block_size: self.pool.cell_capacity(),
            block_count: self.pool.len(),
        }
    }

    /// Create an empty entry for `path`.
    pub fn register(&mut self, path: &str) -> FsResult<()> {
        if self.entries.contains_key(path) {
            return Err(FsError::already_exists(path));
        }
        self.entries.insert(path.to_owned(), Vec::new());
        trace!("block map: registered {path}");
        Ok(())
    }

    /// Whether an entry exists for `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Append `content` to the entry for `path`.
    ///
    /// Free capacity is checked before any cell is claimed, so an
    /// `OutOfSpace` failure leaves both the pool and the entry untouched.
    pub fn append(&mut self, path: &str, content: &str) -> FsResult<()> {
        if !self.entries.contains_key(path) {
            return Err(FsError::not_found(path));
        }
        let chunks = split_chunks(content, self.pool.cell_capacity());
        if chunks.is_empty() {
            return Ok(());
        }
        let free = self.pool.free_count();
        if chunks.len() > free {
            return Err(FsError::OutOfSpace {
                path: path.to_owned(),
                needed: chunks.len(),
                free,
            });
        }

        let mut claimed = Vec::with_capacity(chunks.len());
        let mut cursor = 0;
        for chunk in &chunks {
            let Some(index) = self.pool.first_free(cursor) else {
                // Unreachable after the capacity check; release what was taken.
                for index in claimed {
                    self.pool.cell_mut(index).clear();
                }
                return Err(FsError::OutOfSpace {
                    path: path.to_owned(),
                    needed: chunks.len(),
                    free,
                });
            };
            self.pool.cell_mut(index).write(chunk, path);
            claimed.push(index);
            cursor = index + 1;
        }
        debug!("block map: {path} claimed blocks {claimed:?}");
        if let Some(entry) = self.entries.get_mut(path) {
            entry.extend(claimed);
        }
        Ok(())
    }

    /// Full content of `path`.
    pub fn read(&self, path: &str) -> FsResult<String> {
        let entry = self
            .entries
            .get(path)
            .ok_or_else(|| FsError::not_found(path))?;
        Ok(entry
            .iter()
            .map(|&index| self.pool.cell(index).read())
            .collect())
    }

    /// Drop the last `count` chunks of `path`, most recent first.
    pub fn truncate(&mut self, path: &str, count: usize) -> FsResult<()> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| FsError::not_found(path))?;
        if entry.len() < count {
            return Err(FsError::InsufficientLength {
                path: path.to_owned(),
                requested: count,
                held: entry.len(),
            });
        }
        let keep = entry.len() - count;
        for index in entry.drain(keep..).rev() {
            self.pool.cell_mut(index).clear();
        }
        debug!("block map: truncated {count} blocks from {path}");
        Ok(())
    }

    /// Free every cell of `path` and remove its entry.
    ///
    /// Returns the number of cells released.
    pub fn delete(&mut self, path: &str) -> FsResult<usize> {
        let entry = self
            .entries
            .remove(path)
            .ok_or_else(|| FsError::not_found(path))?;
        for &index in &entry {
            self.pool.cell_mut(index).clear();
        }
        debug!("block map: deleted {path}, released {} blocks", entry.len());
        Ok(entry.len())
    }

    /// Move the entry of `old` to `new` without touching cell contents.
    pub fn rekey(&mut self, old: &str, new: &str) -> FsResult<()> {
        if old == new {
            return if self.entries.contains_key(old) {
                Ok(())
            } else {
                Err(FsError::not_found(old))
            };
        }
        if self.entries.contains_key(new) {
            return Err(FsError::already_exists(new));
        }
        let entry = self
            .entries
            .remove(old)
            .ok_or_else(|| FsError::not_found(old))?;
        for &index in &entry {
            self.pool.cell_mut(index).set_owner(new);
        }
        self.entries.insert(new.to_owned(), entry);
        trace!("block map: rekeyed {old} -> {new}");
        Ok(())
    }

    /// Cell indices held by `path`, in append order.
    #[must_use]
    pub fn indices(&self, path: &str) -> Option<&[usize]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Number of free cells.
    #[must_use]
    pub fn free_cells(&self) -> usize {
        self.pool.free_count()
    }

    /// Total cells in the pool.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.pool.len()
    }

    /// Characters per cell.
    #[must_use]
    pub fn cell_capacity(&self) -> usize {
        self.pool.cell_capacity()
    }

    /// Number of registered files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    /// Diagnostic view over every cell.
    pub fn cells(&self) -> impl Iterator<Item = CellView<'_>> {
        self.pool.views()
    }
}

/// Split `content` into chunks of at most `size` characters, keeping order.
fn split_chunks(content: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut taken = 0;
    for (offset, _) in content.char_indices() {
        if taken == size {
            chunks.push(&content[start..offset]);
            start = offset;
            taken = 0;
        }
        taken += 1;
    }
    if start < content.len() {
        chunks.push(&content[start..]);
    }
    chunks
}
