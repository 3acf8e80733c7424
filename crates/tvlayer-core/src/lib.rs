#![forbid(unsafe_code)]

//! Core: geometry and canonical input events for the TV layer.
//!
//! # Role in the TV layer
//! `tvlayer-core` is the vocabulary shared by every other crate. It has no
//! knowledge of the page, the DOM, or the navigation engine; it only defines
//! how a card's box is measured and how a key press is described.
//!
//! # Primary responsibilities
//! - **Rect**: bounding boxes in CSS pixels as reported by the host.
//! - **KeyEvent**: normalized key presses (arrows, activation, back).
//! - **NavDirection**: the four directions the resolver understands.

pub mod event;
pub mod geometry;

pub use event::{KeyCode, KeyEvent, Modifiers, NavDirection, normalize_dom_key};
pub use geometry::Rect;
