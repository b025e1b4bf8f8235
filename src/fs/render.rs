// CLASSIFICATION: COMMUNITY
// Filename: render.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Text renderings of the namespace tree and the cell pool.

use std::fmt::Write as _;

use super::engine::FileSystem;

const DEPTH_MARKER: &str = "---";

impl FileSystem {
    /// Pre-order tree listing; each line is `---` per depth level then the
    /// node name, starting with `/` for the root.
    #[must_use]
    pub fn render_tree(&self) -> String {
        let core = self.lock_core();
        let mut out = String::new();
        for (depth, id) in core.namespace.walk() {
            if let Some(node) = core.namespace.get(id) {
                let _ = writeln!(out, "{}{}", DEPTH_MARKER.repeat(depth), node.name);
            }
        }
        out
    }

    /// One line per cell: index, owner or `free`, used characters and chunk.
    #[must_use]
    pub fn render_block_map(&self) -> String {
        let core = self.lock_core();
        let capacity = core.blocks.cell_capacity();
        let mut out = String::new();
        for cell in core.blocks.cells() {
            let used = cell.chunk.chars().count();
            let _ = writeln!(
                out,
                "[{:>3}] {:<24} {used}/{capacity} {:?}",
                cell.index,
                cell.owner.unwrap_or("free"),
                cell.chunk
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::config::FsConfig;
    use crate::fs::{FileSystem, OpenMode};

    #[test]
    fn tree_marks_depth() {
        let fs = FileSystem::default();
        fs.mkdir("a").expect("mkdir");
        fs.mkdir("a/b").expect("mkdir");
        fs.touch("a/b/c.txt").expect("touch");
        fs.touch("d.txt").expect("touch");
        assert_eq!(fs.render_tree(), "/\n---a\n------b\n---------c.txt\n---d.txt\n");
    }

    #[test]
    fn block_map_lists_every_cell() {
        let fs = FileSystem::new(FsConfig::new(3, 3).expect("geometry")).expect("fs");
        let session = fs.new_session_id();
        fs.touch("a.txt").expect("touch");
        fs.open(session, "a.txt", OpenMode::Write).expect("open");
        fs.write(session, "a.txt", "abcd").expect("write");
        let rendered = fs.render_block_map();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("/a.txt") && lines[0].contains("3/3 \"abc\""));
        assert!(lines[1].contains("/a.txt") && lines[1].contains("1/3 \"d\""));
        assert!(lines[2].contains("free") && lines[2].contains("0/3"));
    }
}
