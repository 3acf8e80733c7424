#![forbid(unsafe_code)]

//! Spatial navigation over a page of cards.
//!
//! Turns a loose set of clickable page elements into a grid a remote control
//! can walk:
//!
//! 1. [`candidate`] decides which elements are cards.
//! 2. [`cluster`] groups cards into rows by vertical band.
//! 3. [`index`] numbers the rows into a `(row, column)` / flat lookup.
//! 4. [`resolve`] maps a direction to the next card.
//! 5. [`focus`] owns the focus cursor and writes focus decorations.
//!
//! Everything here is host-agnostic: elements are reached through the
//! [`CardElement`] and [`PageRoot`] traits, so the same code runs against
//! live DOM handles in the browser and against mocks in tests.

pub mod candidate;
pub mod cluster;
pub mod focus;
pub mod index;
pub mod resolve;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use candidate::{CandidateExtractor, CardElement, ExtractorConfig, LinkExtractor, PageRoot};
pub use cluster::{ClusterConfig, Row, cluster_rows};
pub use focus::FocusController;
pub use index::{GridPos, NavIndex, NavSlot};
pub use resolve::{resolve, resolve_from};
pub use tvlayer_core::{NavDirection, Rect};
