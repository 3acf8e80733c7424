#![forbid(unsafe_code)]

//! Browser host adapter for the TV layer.
//!
//! # Role in the TV layer
//! `tvlayer-web` binds the engine from `tvlayer-runtime` to a live page:
//! DOM elements become cards, `localStorage` holds the preference record,
//! and browser events drive the engine handlers. [`TvLayer`] is the
//! `wasm-bindgen` export a userscript loader instantiates.
//!
//! Non-wasm builds compile only the pure helpers (markup names, stylesheet
//! policy, key translation, config) so they can be tested natively.

pub mod config;
pub mod keys;
pub mod markup;
pub mod style;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{TvLayer, start_tv_layer};

pub use config::LayerConfig;
pub use style::{StyleConfig, StyleError};
