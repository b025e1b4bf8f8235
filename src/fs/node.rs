// CLASSIFICATION: COMMUNITY
// Filename: node.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Arena-backed namespace tree.
//!
//! Directories own their children through [`NodeId`] handles and every node
//! stores a non-owning handle to its parent, so path reconstruction walks
//! upwards without reference cycles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::guard::FileGuard;
use super::{OpenMode, SessionId};

/// Stable handle of a node inside a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Kind of a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Directory.
    #[serde(rename = "dir")]
    Directory,
    /// Regular file.
    File,
}

/// Per-file state: the guard and the sessions currently holding it.
#[derive(Debug, Default)]
pub(crate) struct FileNode {
    pub(crate) guard: Arc<FileGuard>,
    pub(crate) holders: Vec<(SessionId, OpenMode)>,
}

impl FileNode {
    pub(crate) fn mode_for(&self, session: SessionId) -> Option<OpenMode> {
        self.holders
            .iter()
            .find(|(holder, _)| *holder == session)
            .map(|(_, mode)| *mode)
    }
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Directory { children: Vec<NodeId> },
    File(FileNode),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn entry_kind(&self) -> EntryKind {
        match self.kind {
            NodeKind::Directory { .. } => EntryKind::Directory,
            NodeKind::File(_) => EntryKind::File,
        }
    }
}

/// Tree of directories and files rooted at an unnamed directory.
#[derive(Debug)]
pub(crate) struct Namespace {
    slots: Vec<Option<Node>>,
    vacant: Vec<usize>,
}

impl Namespace {
    /// Display name of the root directory.
    pub(crate) const ROOT_NAME: &'static str = "/";

    pub(crate) fn new() -> Self {
        Self {
            slots: vec![Some(Node {
                name: Self::ROOT_NAME.to_owned(),
                parent: None,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
            })],
            vacant: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn file_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::File(file)) => Some(file),
            _ => None,
        }
    }

    pub(crate) fn file(&self, id: NodeId) -> Option<&FileNode> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::File(file)) => Some(file),
            _ => None,
        }
    }

    /// Children of a directory in creation order; empty for files.
    pub(crate) fn children(&self, dir: NodeId) -> &[NodeId] {
        match self.get(dir).map(|node| &node.kind) {
            Some(NodeKind::Directory { children }) => children,
            _ => &[],
        }
    }

    pub(crate) fn is_dir(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(|node| &node.kind),
            Some(NodeKind::Directory { .. })
        )
    }

    /// Lookup a direct child by name.
    pub(crate) fn get_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.children(dir)
            .iter()
            .copied()
            .find(|&child| self.get(child).is_some_and(|node| node.name == name))
    }

    /// Allocate a detached node.
    pub(crate) fn insert(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let node = Node {
            name: name.to_owned(),
            parent: None,
            kind,
        };
        match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Link `child` as the last child of `dir`.
    pub(crate) fn add_child(&mut self, dir: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(dir);
        }
        if let Some(Node {
            kind: NodeKind::Directory { children },
            ..
        }) = self.get_mut(dir)
        {
            children.push(child);
        }
    }

    /// Unlink `child` from its parent, keeping the node allocated.
    pub(crate) fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.get(child).and_then(|node| node.parent) else {
            return;
        };
        if let Some(Node {
            kind: NodeKind::Directory { children },
            ..
        }) = self.get_mut(parent)
        {
            children.retain(|&id| id != child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
    }

    /// Unlink and free `id` together with its whole subtree.
    ///
    /// Returns the removed nodes, parents before children, each paired with
    /// the path it had before removal.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Vec<(String, Node)> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push((next, self.get_path(next)));
            stack.extend(self.children(next).iter().rev().copied());
        }
        self.remove_child(id);
        let mut removed = Vec::with_capacity(order.len());
        for (node_id, path) in order {
            if let Some(node) = self.slots.get_mut(node_id.0).and_then(Option::take) {
                self.vacant.push(node_id.0);
                removed.push((path, node));
            }
        }
        removed
    }

    /// Absolute path of `id`; the root is the empty path.
    pub(crate) fn get_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.get(current) else {
                break;
            };
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push('/');
            path.push_str(name);
            path
        })
    }

    /// Pre-order walk yielding each node with its depth.
    pub(crate) fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self.root())];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            stack.extend(
                self.children(id)
                    .iter()
                    .rev()
                    .map(|&child| (depth + 1, child)),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> NodeKind {
        NodeKind::Directory {
            children: Vec::new(),
        }
    }

    #[test]
    fn paths_reconstruct_from_parents() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let a = ns.insert("a", dir());
        ns.add_child(root, a);
        let f = ns.insert("f.txt", NodeKind::File(FileNode::default()));
        ns.add_child(a, f);
        assert_eq!(ns.get_path(root), "");
        assert_eq!(ns.get_path(a), "/a");
        assert_eq!(ns.get_path(f), "/a/f.txt");
        assert_eq!(ns.get_child(a, "f.txt"), Some(f));
        assert_eq!(ns.get_child(a, "g.txt"), None);
    }

    #[test]
    fn children_keep_creation_order() {
        let mut ns = Namespace::new();
        let root = ns.root();
        for name in ["c", "a", "b"] {
            let id = ns.insert(name, dir());
            ns.add_child(root, id);
        }
        let names: Vec<_> = ns
            .children(root)
            .iter()
            .filter_map(|&id| ns.get(id).map(|node| node.name.clone()))
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn remove_subtree_frees_slots_for_reuse() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let a = ns.insert("a", dir());
        ns.add_child(root, a);
        let b = ns.insert("b", dir());
        ns.add_child(a, b);
        let f = ns.insert("f.txt", NodeKind::File(FileNode::default()));
        ns.add_child(b, f);

        let removed = ns.remove_subtree(a);
        let paths: Vec<_> = removed.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, ["/a", "/a/b", "/a/b/f.txt"]);
        assert!(ns.children(root).is_empty());
        assert!(ns.get(f).is_none());

        let reused = ns.insert("z", dir());
        assert!(ns.get(reused).is_some());
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let a = ns.insert("a", dir());
        ns.add_child(root, a);
        let b = ns.insert("b", dir());
        ns.add_child(a, b);
        let c = ns.insert("c", dir());
        ns.add_child(root, c);
        let walked: Vec<_> = ns.walk().into_iter().map(|(depth, _)| depth).collect();
        assert_eq!(walked, [0, 1, 2, 1]);
    }
}
