//! The machine tape: a two-way unbounded sequence of symbols of which only the visited part
//! is materialized.

use crate::types::{Direction, Symbol};

/// A single tape with its head.
///
/// The head may sit one cell outside the materialized cells right after a move;
/// [`Tape::normalize`] grows the tape by one blank cell to bring it back in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Symbol>,
    head: isize,
}

impl Tape {
    /// Creates a tape holding one cell per input character, or a single blank cell for an
    /// empty input. The head starts on the first cell.
    pub fn new(input: &str) -> Self {
        let mut cells: Vec<Symbol> = input.chars().map(Symbol::Mark).collect();
        if cells.is_empty() {
            cells.push(Symbol::Blank);
        }

        Self { cells, head: 0 }
    }

    /// Grows the tape by one blank cell if the head is outside it.
    ///
    /// Moving past the left end inserts the cell at position 0 and puts the head on it.
    pub fn normalize(&mut self) {
        if self.head < 0 {
            self.cells.insert(0, Symbol::Blank);
            self.head = 0;
        } else if self.head as usize >= self.cells.len() {
            self.cells.push(Symbol::Blank);
        }
    }

    /// Returns the symbol under the head; cells outside the tape read as blank.
    pub fn read(&self) -> Symbol {
        self.index()
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(Symbol::Blank)
    }

    /// Writes a symbol under the head. The head must be on the tape.
    pub fn write(&mut self, symbol: Symbol) {
        if let Some(cell) = self.index().and_then(|i| self.cells.get_mut(i)) {
            *cell = symbol;
        }
    }

    /// Moves the head one cell, or not at all for [`Direction::Stay`].
    pub fn shift(&mut self, direction: Direction) {
        self.head += direction.offset();
    }

    pub fn head(&self) -> isize {
        self.head
    }

    /// The number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// The materialized cells without trailing blanks.
    pub fn trimmed(&self) -> &[Symbol] {
        trim(&self.cells)
    }

    /// What the machine produced: the trimmed cells, blank cells contributing nothing.
    pub fn content(&self) -> String {
        render_cells(self.trimmed())
    }

    /// Renders an instantaneous description: `left[control]current right`.
    ///
    /// The cell under the head shows [`crate::types::BLANK_GLYPH`] when blank so the head
    /// stays visible. A head left of the tape reads as a blank cell before all cells.
    pub fn describe(&self, control: &str) -> String {
        let cells = self.trimmed();

        let (left, current, right) = match self.index() {
            None => (&[][..], Symbol::Blank, cells),
            Some(head) => {
                let left = &cells[..head.min(cells.len())];
                let current = cells.get(head).copied().unwrap_or(Symbol::Blank);
                let right = cells.get(head + 1..).unwrap_or(&[]);
                (left, current, right)
            }
        };

        format!(
            "{}[{}]{}{}",
            render_cells(left),
            control,
            current,
            render_cells(right)
        )
    }

    fn index(&self) -> Option<usize> {
        usize::try_from(self.head).ok()
    }
}

/// Drops trailing blank cells, keeping at least one cell.
pub fn trim(cells: &[Symbol]) -> &[Symbol] {
    let mut end = cells.len();
    while end > 1 && cells[end - 1].is_blank() {
        end -= 1;
    }
    &cells[..end]
}

fn render_cells(cells: &[Symbol]) -> String {
    cells.iter().filter_map(Symbol::as_char).collect()
}
