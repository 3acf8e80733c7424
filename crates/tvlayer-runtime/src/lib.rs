#![forbid(unsafe_code)]

//! Event-driven runtime for the TV layer.
//!
//! # Role in the TV layer
//! `tvlayer-runtime` owns the single [`Engine`] instance a page lives with.
//! The host adapter forwards four kinds of notifications to it (route
//! changes, content mutations, key presses, preference toggles) and the
//! engine drives clustering, indexing and focus from `tvlayer-nav`.
//!
//! # Primary responsibilities
//! - **Engine**: the Inactive/Active state machine and every handler.
//! - **RebuildScheduler**: coalesces mutation bursts into one rebuild per
//!   rendering frame.
//! - **Preferences**: the persisted hide-chat/sidebar/panels toggles.
//! - **EngineConfig**: every tunable, loadable from JSON.

pub mod config;
pub mod engine;
pub mod host;
pub mod prefs;
pub mod schedule;

pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineState, KeyContext, KeyOutcome};
pub use host::HostPage;
pub use prefs::{
    MemoryStorage, PreferenceKey, PreferenceStore, Preferences, StorageError, load_preferences,
    save_preferences,
};
pub use schedule::{FrameRequest, RebuildScheduler, SchedulerStats};
