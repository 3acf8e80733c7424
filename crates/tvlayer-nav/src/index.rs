#![forbid(unsafe_code)]

//! Navigation index: `(row, column)` and flat lookup over clustered rows.
//!
//! # Invariants
//!
//! - Column indices within a row are `0..row_len`, contiguous.
//! - Flat indices are row-major positions in [`NavIndex::cards`]; the slot
//!   with flat index `i` is the card at `cards()[i]`.
//! - Building from the same rows always yields the same index.

use crate::candidate::CardElement;
use crate::cluster::Row;

/// A cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One card's entry in a row.
#[derive(Debug, Clone, PartialEq)]
pub struct NavSlot<C> {
    pub card: C,
    pub col: usize,
    pub flat: usize,
}

/// Row/column/flat lookup structure.
#[derive(Debug, Clone, PartialEq)]
pub struct NavIndex<C> {
    rows: Vec<Vec<NavSlot<C>>>,
    cards: Vec<C>,
    positions: Vec<GridPos>,
}

impl<C> Default for NavIndex<C> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cards: Vec::new(),
            positions: Vec::new(),
        }
    }
}

impl<C: CardElement> NavIndex<C> {
    /// Number rows and columns in the given (already sorted) order.
    #[must_use]
    pub fn from_rows(rows: Vec<Row<C>>) -> Self {
        let mut index = Self::default();
        for (row_idx, row) in rows.into_iter().enumerate() {
            let mut slots = Vec::with_capacity(row.cards.len());
            for (col, card) in row.cards.into_iter().enumerate() {
                let flat = index.cards.len();
                index.cards.push(card.clone());
                index.positions.push(GridPos::new(row_idx, col));
                slots.push(NavSlot { card, col, flat });
            }
            index.rows.push(slots);
        }
        index
    }

    /// Write row/column tags onto every card.
    ///
    /// Only called after a page-wide rebuild; focus moves never touch tags.
    pub fn apply_grid_tags(&self) {
        for (card, pos) in self.cards.iter().zip(&self.positions) {
            card.set_grid_position(pos.row, pos.col);
        }
    }

    /// Strip every decoration from every card.
    pub fn clear_decorations(&self) {
        for card in &self.cards {
            card.clear_decorations();
        }
    }
}

impl<C> NavIndex<C> {
    /// Total number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Members of `row`, left-to-right.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[NavSlot<C>]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Row lengths, top-to-bottom.
    #[must_use]
    pub fn row_lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// All cards in row-major order.
    #[must_use]
    pub fn cards(&self) -> &[C] {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, flat: usize) -> Option<&C> {
        self.cards.get(flat)
    }

    /// Grid position of the card at flat index `flat`.
    #[must_use]
    pub fn position(&self, flat: usize) -> Option<GridPos> {
        self.positions.get(flat).copied()
    }

    #[must_use]
    pub fn slot(&self, pos: GridPos) -> Option<&NavSlot<C>> {
        self.rows.get(pos.row)?.get(pos.col)
    }
}
