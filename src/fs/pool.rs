// CLASSIFICATION: COMMUNITY
// Filename: pool.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Fixed pool of fixed-capacity storage cells.
//!
//! Cells never fail: capacity and ownership rules are enforced by the
//! [`BlockMap`](super::block_map::BlockMap), which is the only owner of a
//! pool.

/// One storage cell holding a chunk of a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Cell {
    chunk: String,
    owner: Option<String>,
}

impl Cell {
    /// Overwrite the chunk and record the owning file path.
    pub(crate) fn write(&mut self, chunk: &str, owner: &str) {
        self.chunk.clear();
        self.chunk.push_str(chunk);
        self.owner = Some(owner.to_owned());
    }

    pub(crate) fn read(&self) -> &str {
        &self.chunk
    }

    /// Free the cell.
    pub(crate) fn clear(&mut self) {
        self.chunk.clear();
        self.owner = None;
    }

    pub(crate) fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    pub(crate) fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Re-point ownership after a rename without touching the chunk.
    pub(crate) fn set_owner(&mut self, owner: &str) {
        if self.owner.is_some() {
            self.owner = Some(owner.to_owned());
        }
    }
}

/// Read-only view of a cell for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView<'a> {
    /// Index of the cell in the pool.
    pub index: usize,
    /// Owning file path, `None` when free.
    pub owner: Option<&'a str>,
    /// Stored chunk.
    pub chunk: &'a str,
}

/// Fixed-length array of cells.
#[derive(Debug, Clone)]
pub(crate) struct BlockPool {
    cells: Vec<Cell>,
    cell_capacity: usize,
}

impl BlockPool {
    pub(crate) fn new(cell_count: usize, cell_capacity: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cell_count],
            cell_capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell_capacity(&self) -> usize {
        self.cell_capacity
    }

    pub(crate) fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    /// First free cell at or after `from`, scanning linearly.
    pub(crate) fn first_free(&self, from: usize) -> Option<usize> {
        self.cells
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, cell)| cell.is_free())
            .map(|(index, _)| index)
    }

    pub(crate) fn free_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_free()).count()
    }

    pub(crate) fn views(&self) -> impl Iterator<Item = CellView<'_>> {
        self.cells.iter().enumerate().map(|(index, cell)| CellView {
            index,
            owner: cell.owner(),
            chunk: cell.read(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_frees_cell() {
        let mut cell = Cell::default();
        assert!(cell.is_free());
        cell.write("abc", "/a.txt");
        assert!(!cell.is_free());
        assert_eq!(cell.read(), "abc");
        assert_eq!(cell.owner(), Some("/a.txt"));
        cell.clear();
        assert!(cell.is_free());
        assert_eq!(cell.read(), "");
    }

    #[test]
    fn first_free_skips_owned_cells() {
        let mut pool = BlockPool::new(4, 2);
        pool.cell_mut(0).write("ab", "/a.txt");
        pool.cell_mut(2).write("cd", "/a.txt");
        assert_eq!(pool.first_free(0), Some(1));
        assert_eq!(pool.first_free(2), Some(3));
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn set_owner_ignores_free_cells() {
        let mut cell = Cell::default();
        cell.set_owner("/b.txt");
        assert!(cell.is_free());
    }
}
