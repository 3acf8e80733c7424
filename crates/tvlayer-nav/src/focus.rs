#![forbid(unsafe_code)]

//! Focus controller: the single owner of the focus cursor.
//!
//! The cursor is a flat index into a [`NavIndex`], or `None` when nothing is
//! focused. The controller is the only code that writes focus decorations:
//! exactly one card is marked focused and keyboard reachable, every other
//! card is explicitly unreachable.
//!
//! # Invariants
//!
//! - The cursor is `None` or `< index.len()` for the index it was last
//!   applied to.
//! - Applying the same index twice leaves the same card decorated and the
//!   same cursor value.
//! - Grid tags are never touched here.

use crate::candidate::CardElement;
use crate::index::{GridPos, NavIndex};

/// Owns the focus cursor.
#[derive(Debug, Clone, Default)]
pub struct FocusController {
    cursor: Option<usize>,
}

impl FocusController {
    #[must_use]
    pub const fn new() -> Self {
        Self { cursor: None }
    }

    /// Current flat index, if any.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Grid position of the cursor within `index`.
    #[must_use]
    pub fn position<C>(&self, index: &NavIndex<C>) -> Option<GridPos> {
        index.position(self.cursor?)
    }

    /// The focused card within `index`.
    #[must_use]
    pub fn focused<'a, C>(&self, index: &'a NavIndex<C>) -> Option<&'a C> {
        index.card(self.cursor?)
    }

    /// Forget the cursor (route change).
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Focus the card at `target`, clamped into `[0, len - 1]`.
    ///
    /// Returns the applied flat index, or `None` for an empty index (in
    /// which case the cursor is cleared and nothing is written).
    pub fn set_focus<C: CardElement>(&mut self, index: &NavIndex<C>, target: usize) -> Option<usize> {
        if index.is_empty() {
            self.cursor = None;
            return None;
        }
        let bounded = target.min(index.len() - 1);
        self.cursor = Some(bounded);

        for (i, card) in index.cards().iter().enumerate() {
            card.set_focused(i == bounded);
        }

        let focused = &index.cards()[bounded];
        focused.focus_without_scroll();
        focused.scroll_into_view_nearest();

        tracing::trace!(message = "focus.set", requested = target, applied = bounded);
        Some(bounded)
    }

    /// Re-apply focus after `index` was rebuilt.
    ///
    /// Keeps the previous cursor when it is still in range, otherwise falls
    /// back to the first card. No-op (cursor cleared) when `index` is empty.
    pub fn ensure_focus<C: CardElement>(&mut self, index: &NavIndex<C>) -> Option<usize> {
        let target = self
            .cursor
            .filter(|&cursor| cursor < index.len())
            .unwrap_or(0);
        self.set_focus(index, target)
    }
}
