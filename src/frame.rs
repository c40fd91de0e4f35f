// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: None,
        bg: None,
    };
}

/// Terminal-sized cell grid that remembers which cells changed since the
/// last [`Frame::clear_dirty`].
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                if let Some(v) = self.dirty_map.get_mut(i) {
                    *v = false;
                }
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    /// Stores `cell`, recording the index only when the content changed.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(ch: char) -> Cell {
        Cell {
            ch,
            fg: Some(Color::Green),
            bg: None,
        }
    }

    #[test]
    fn only_changed_cells_are_tracked() {
        let mut f = Frame::new(3, 2);
        assert!(f.is_dirty_all());
        f.clear_dirty();
        assert!(!f.has_changes());

        f.set(1, 1, lit('x'));
        f.set(1, 1, lit('x'));
        f.set(0, 0, Cell::BLANK);
        f.set(9, 9, lit('y'));
        assert_eq!(f.dirty_indices(), &[4]);
        assert_eq!(f.cell_at_index(4).ch, 'x');

        f.clear_dirty();
        f.set(1, 1, lit('z'));
        assert_eq!(f.dirty_indices(), &[4]);
    }

    #[test]
    fn full_redraw_swallows_individual_marks() {
        let mut f = Frame::new(2, 2);
        f.set(0, 1, lit('a'));
        assert!(f.dirty_indices().is_empty());
        assert!(f.has_changes());
    }
}
