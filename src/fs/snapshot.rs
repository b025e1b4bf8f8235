// CLASSIFICATION: COMMUNITY
// Filename: snapshot.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Whole-tree snapshot export and import.
//!
//! A snapshot is a single recursive record; every persistence point writes
//! the entire tree. The JSON layout is
//! `{"type": "dir", "name", "path", "children": [...]}` for directories and
//! `{"type": "file", "name", "path", "data"}` for files.
//!
//! Snapshot files are replaced atomically: the record is written to a
//! sibling temporary file which is then renamed over the target.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{FsError, FsResult};

use super::engine::{release_all, FileSystem, FsCore};
use super::node::{NodeId, NodeKind};
use super::path::MAX_DEPTH;

/// Recursive snapshot record of a namespace subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeRecord {
    /// Directory with its children in creation order.
    #[serde(rename = "dir")]
    Directory {
        /// Directory name, `/` for the root.
        name: String,
        /// Canonical path, empty for the root.
        path: String,
        /// Child records.
        children: Vec<TreeRecord>,
    },
    /// File with its full content.
    File {
        /// File name.
        name: String,
        /// Canonical path.
        path: String,
        /// Concatenated content.
        data: String,
    },
}

impl TreeRecord {
    /// Name of the recorded node.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }
}

fn export_node(core: &FsCore, id: NodeId) -> FsResult<TreeRecord> {
    let path = core.namespace.get_path(id);
    let node = core
        .namespace
        .get(id)
        .ok_or_else(|| FsError::not_found(path.clone()))?;
    match &node.kind {
        NodeKind::Directory { children } => Ok(TreeRecord::Directory {
            name: node.name.clone(),
            children: children
                .iter()
                .map(|&child| export_node(core, child))
                .collect::<FsResult<_>>()?,
            path,
        }),
        NodeKind::File(_) => Ok(TreeRecord::File {
            name: node.name.clone(),
            data: core.blocks.read(&path)?,
            path,
        }),
    }
}

fn validate_name(record: &TreeRecord) -> FsResult<()> {
    let name = record.name();
    if name.is_empty() || name.contains('/') {
        return Err(FsError::invalid_path(name, "malformed name in snapshot"));
    }
    match record {
        TreeRecord::Directory { .. } if name.contains('.') => Err(FsError::invalid_path(
            name,
            "directory names cannot contain '.'",
        )),
        TreeRecord::File { .. } if !name.contains('.') => {
            Err(FsError::invalid_path(name, "file names need an extension"))
        }
        _ => Ok(()),
    }
}

fn import_children(
    core: &mut FsCore,
    parent: NodeId,
    depth: usize,
    children: &[TreeRecord],
) -> FsResult<()> {
    for child in children {
        validate_name(child)?;
        match child {
            TreeRecord::Directory { name, path, children } => {
                if depth >= MAX_DEPTH {
                    return Err(FsError::invalid_path(path, "directory nesting too deep"));
                }
                let id = core.create_dir(parent, name)?;
                import_children(core, id, depth + 1, children)?;
            }
            TreeRecord::File { name, data, .. } => {
                let id = core.create_file(parent, name)?;
                let path = core.namespace.get_path(id);
                core.blocks.append(&path, data)?;
            }
        }
    }
    Ok(())
}

impl FileSystem {
    /// Serialise the whole tree, reading every file's content.
    ///
    /// Files do not need to be open.
    pub fn export_tree(&self) -> FsResult<TreeRecord> {
        let core = self.lock_core();
        let root = core.namespace.root();
        export_node(&core, root)
    }

    /// Replace the tree with the contents of `record`.
    ///
    /// The tree is rebuilt into a fresh block map of the same geometry;
    /// when any node fails to import the current tree is left untouched.
    /// Files open in the replaced tree are released.
    pub fn import_tree(&self, record: &TreeRecord) -> FsResult<()> {
        let TreeRecord::Directory { children, .. } = record else {
            return Err(FsError::invalid_path(
                record.name(),
                "snapshot root must be a directory",
            ));
        };
        let mut fresh = FsCore::new(self.geometry());
        let root = fresh.namespace.root();
        import_children(&mut fresh, root, 0, children)?;

        let released = {
            let mut core = self.lock_core();
            let mut old = std::mem::replace(&mut *core, fresh);
            old.drain_holders()
        };
        release_all(released);
        info!("imported snapshot with {} top-level entries", children.len());
        Ok(())
    }

    /// Write the exported tree to `path` as JSON.
    ///
    /// Concurrent callers are serialised, so the file always holds the
    /// most recent export in full.
    pub fn save_snapshot(&self, path: &Path) -> FsResult<()> {
        let _persist = self.lock_persist();
        let record = self.export_tree()?;
        let json = serde_json::to_string_pretty(&record)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| err.error)?;
        info!("snapshot saved to {}", path.display());
        Ok(())
    }

    /// Replace the tree from a JSON snapshot at `path`.
    pub fn load_snapshot(&self, path: &Path) -> FsResult<()> {
        let text = fs::read_to_string(path)?;
        // Every directory level costs two JSON nesting levels; depth is
        // bounded by MAX_DEPTH on import instead.
        let mut de = serde_json::Deserializer::from_str(&text);
        de.disable_recursion_limit();
        let record = TreeRecord::deserialize(&mut de)?;
        de.end()?;
        self.import_tree(&record)?;
        info!("snapshot loaded from {}", path.display());
        Ok(())
    }
}
