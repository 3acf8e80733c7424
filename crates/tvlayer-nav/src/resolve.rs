#![forbid(unsafe_code)]

//! Directional resolution: arrow-key moves over the card grid.
//!
//! # Algorithm
//!
//! - **Left/Right**: the card at `(row, col ± 1)`. Past either end of the
//!   row there is no target; moves never wrap into a neighbouring row.
//! - **Up/Down**: the row `row ± 1`. Among its members, pick the one whose
//!   column is closest to the current column. On a tie the member seen
//!   first in left-to-right order wins.
//!
//! Column distance stands in for pixel distance: rows are grids of roughly
//! uniform card width, so the column index is a good enough proxy.
//!
//! # Invariants
//!
//! - Any returned index is a valid flat index of the given [`NavIndex`].
//! - No move panics, whatever the origin.
//! - The algorithm is deterministic: same index → same navigation path.

use tvlayer_core::NavDirection;

use crate::index::{GridPos, NavIndex, NavSlot};

/// Resolve a move from `origin` in `dir`, returning the target flat index.
#[must_use]
pub fn resolve<C>(index: &NavIndex<C>, origin: GridPos, dir: NavDirection) -> Option<usize> {
    let target = if dir.is_horizontal() {
        let col = origin.col.checked_add_signed(dir.step())?;
        index.slot(GridPos::new(origin.row, col))?
    } else {
        let row = origin.row.checked_add_signed(dir.step())?;
        nearest_column(index.row(row)?, origin.col)?
    };
    Some(target.flat)
}

/// Resolve a move from the card at flat index `flat`.
#[must_use]
pub fn resolve_from<C>(index: &NavIndex<C>, flat: usize, dir: NavDirection) -> Option<usize> {
    let origin = index.position(flat)?;
    resolve(index, origin, dir)
}

/// First member with the minimal `|col - target|`.
fn nearest_column<C>(slots: &[NavSlot<C>], target: usize) -> Option<&NavSlot<C>> {
    let mut best: Option<(&NavSlot<C>, usize)> = None;
    for slot in slots {
        let score = slot.col.abs_diff(target);
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((slot, score));
        }
    }
    best.map(|(slot, _)| slot)
}

// =========================================================================
// Tests
// =========================================================================
