//! The tape of a single-tape machine.
//!
//! The tape is conceptually infinite in both directions. Only the cells the head has visited
//! (plus the input) are materialized; everything else is implicitly blank. Cells live in a
//! growable buffer with a live window `[start, end)`, so extending to the left does not shift
//! the whole tape on every step.

use crate::types::Symbol;
use std::fmt;

/// Minimum number of spare cells reserved in front of the live window when it has to grow left.
const MIN_HEADROOM: usize = 8;

#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<Symbol>,
    start: usize,
    end: usize,
    blank: Symbol,
}

impl Tape {
    /// Creates a tape holding one cell per character of `input`.
    pub fn new(input: &str, blank: Symbol) -> Self {
        let cells: Vec<Symbol> = input.chars().collect();
        let end = cells.len();

        Self {
            cells,
            start: 0,
            end,
            blank,
        }
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The materialized cells, leftmost first.
    pub fn cells(&self) -> &[Symbol] {
        &self.cells[self.start..self.end]
    }

    /// Returns the symbol at `index`, or `None` if the cell is not materialized.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.cells().get(index).copied()
    }

    /// Overwrites the cell at `index`, returning the previous symbol.
    ///
    /// Returns `None` and leaves the tape untouched if the cell is not materialized.
    pub fn set(&mut self, index: usize, symbol: Symbol) -> Option<Symbol> {
        let cell = self.cells[self.start..self.end].get_mut(index)?;
        Some(std::mem::replace(cell, symbol))
    }

    /// Prepends exactly one blank cell. Existing cells shift one index to the right.
    pub fn extend_left(&mut self) {
        if self.start == 0 {
            self.grow_left();
        }

        self.start -= 1;
        self.cells[self.start] = self.blank;
    }

    /// Appends exactly one blank cell.
    pub fn extend_right(&mut self) {
        if self.end == self.cells.len() {
            self.cells.push(self.blank);
        } else {
            self.cells[self.end] = self.blank;
        }

        self.end += 1;
    }

    /// Reserves room in front of the live window, doubling the buffer.
    fn grow_left(&mut self) {
        let headroom = self.cells.len().max(MIN_HEADROOM);
        let mut cells = Vec::with_capacity(headroom + self.end);
        cells.resize(headroom, self.blank);
        cells.extend_from_slice(&self.cells[..self.end]);

        self.cells = cells;
        self.start += headroom;
        self.end += headroom;
    }

    /// The tape contents with leading and trailing blanks removed. Interior blanks are kept.
    pub fn output(&self) -> String {
        self.to_string().trim_matches(self.blank).to_string()
    }
}

impl PartialEq for Tape {
    fn eq(&self, other: &Self) -> bool {
        self.blank == other.blank && self.cells() == other.cells()
    }
}

impl Eq for Tape {}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells().iter().try_for_each(|c| write!(f, "{c}"))
    }
}
