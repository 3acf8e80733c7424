#![forbid(unsafe_code)]

//! Preference record: the user's hide/show toggles.
//!
//! # Format
//!
//! One string entry in local key-value storage, JSON encoded:
//!
//! ```json
//! { "hideChat": true, "hideSidebar": false, "hidePanels": true }
//! ```
//!
//! # Failure Modes
//!
//! - **Missing entry**: defaults (every toggle `true`).
//! - **Unparsable or non-object JSON**: defaults, never surfaced.
//! - **Partial record**: present fields override defaults, the rest keep them.
//! - **Non-boolean field**: coerced with JavaScript truthiness, so a record
//!   written by a script stays readable (`"no"` is on, `0` and `null` are off).
//! - **Write failure**: reported to the caller as [`StorageError`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub hide_chat: bool,
    pub hide_sidebar: bool,
    pub hide_panels: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            hide_chat: true,
            hide_sidebar: true,
            hide_panels: true,
        }
    }
}

impl Preferences {
    /// Decode a stored record.
    ///
    /// Each known field is merged over the defaults on its own; unparsable
    /// or non-object input yields the defaults.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        let fields = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::debug!(message = "prefs.not_an_object", kind = json_kind(&other));
                return Self::default();
            }
            Err(err) => {
                tracing::debug!(message = "prefs.decode_failed", error = %err);
                return Self::default();
            }
        };
        let mut prefs = Self::default();
        for key in PreferenceKey::ALL {
            if let Some(value) = fields.get(key.field()) {
                prefs.set(key, truthy(value));
            }
        }
        prefs
    }

    /// Encode for storage.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Encode(e.to_string()))
    }

    #[must_use]
    pub const fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::HideChat => self.hide_chat,
            PreferenceKey::HideSidebar => self.hide_sidebar,
            PreferenceKey::HidePanels => self.hide_panels,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        match key {
            PreferenceKey::HideChat => self.hide_chat = value,
            PreferenceKey::HideSidebar => self.hide_sidebar = value,
            PreferenceKey::HidePanels => self.hide_panels = value,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Names one toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    HideChat,
    HideSidebar,
    HidePanels,
}

impl PreferenceKey {
    /// Panel order.
    pub const ALL: [PreferenceKey; 3] = [Self::HideChat, Self::HideSidebar, Self::HidePanels];

    /// Field name in the stored record.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::HideChat => "hideChat",
            Self::HideSidebar => "hideSidebar",
            Self::HidePanels => "hidePanels",
        }
    }

    /// Checkbox label in the toggle panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HideChat => "Hide chat",
            Self::HideSidebar => "Hide sidebar",
            Self::HidePanels => "Hide panels",
        }
    }

    /// Class toggled on `<body>` while the preference is on.
    #[must_use]
    pub const fn body_class(self) -> &'static str {
        match self {
            Self::HideChat => "tv-hide-chat",
            Self::HideSidebar => "tv-hide-sidebar",
            Self::HidePanels => "tv-hide-panels",
        }
    }

    /// Reverse of [`field`](Self::field).
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.field() == field)
    }
}

/// Preference storage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage backend is missing or access was denied.
    Unavailable,
    /// The backend rejected a write (quota, private mode).
    Write(String),
    /// The record could not be encoded.
    Encode(String),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Write(msg) => write!(f, "storage write failed: {msg}"),
            Self::Encode(msg) => write!(f, "failed to encode preferences: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Flat string key-value storage.
pub trait PreferenceStore {
    /// Read the raw entry for `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the entry for `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_owned(), value.to_owned());
        storage
    }

    /// Storage that rejects every write.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl PreferenceStore for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Write("read-only storage".to_owned()));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Load the record stored under `key`.
///
/// Never fails: absent, unreadable or malformed data yields defaults.
pub fn load_preferences<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Preferences {
    match store.read(key) {
        Ok(Some(raw)) => Preferences::from_json(&raw),
        Ok(None) => Preferences::default(),
        Err(err) => {
            tracing::debug!(message = "prefs.read_failed", key, error = %err);
            Preferences::default()
        }
    }
}

/// Persist `prefs` under `key`.
pub fn save_preferences<S: PreferenceStore + ?Sized>(
    store: &mut S,
    key: &str,
    prefs: &Preferences,
) -> Result<(), StorageError> {
    let json = prefs.to_json()?;
    store.write(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "tvLayerSettings";

    struct BrokenStorage;

    impl PreferenceStore for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn defaults_are_all_true() {
        let prefs = Preferences::default();
        for key in PreferenceKey::ALL {
            assert!(prefs.get(key));
        }
    }

    #[test]
    fn missing_entry_loads_defaults() {
        assert_eq!(
            load_preferences(&MemoryStorage::new(), KEY),
            Preferences::default()
        );
    }

    #[test]
    fn malformed_json_loads_defaults() {
        for raw in ["{not json", "[]", "null", "42", r#""hideChat""#, ""] {
            let store = MemoryStorage::with_entry(KEY, raw);
            assert_eq!(load_preferences(&store, KEY), Preferences::default(), "{raw}");
        }
    }

    #[test]
    fn partial_record_merges_over_defaults() {
        let store = MemoryStorage::with_entry(KEY, r#"{"hideSidebar":false}"#);
        let prefs = load_preferences(&store, KEY);
        assert!(prefs.hide_chat);
        assert!(!prefs.hide_sidebar);
        assert!(prefs.hide_panels);
    }

    #[test]
    fn wrongly_typed_field_keeps_valid_siblings() {
        let store = MemoryStorage::with_entry(KEY, r#"{"hideChat":false,"hidePanels":"no"}"#);
        assert_eq!(
            load_preferences(&store, KEY),
            Preferences {
                hide_chat: false,
                hide_sidebar: true,
                hide_panels: true,
            }
        );

        let store = MemoryStorage::with_entry(KEY, r#"{"hideSidebar":false,"hideChat":null}"#);
        assert_eq!(
            load_preferences(&store, KEY),
            Preferences {
                hide_chat: false,
                hide_sidebar: false,
                hide_panels: true,
            }
        );
    }

    #[test]
    fn non_boolean_fields_follow_truthiness() {
        let cases = [
            (r#"{"hidePanels":0}"#, false),
            (r#"{"hidePanels":1}"#, true),
            (r#"{"hidePanels":""}"#, false),
            (r#"{"hidePanels":"false"}"#, true),
            (r#"{"hidePanels":[]}"#, true),
            (r#"{"hidePanels":{}}"#, true),
        ];
        for (raw, expected) in cases {
            let store = MemoryStorage::with_entry(KEY, raw);
            assert_eq!(load_preferences(&store, KEY).hide_panels, expected, "{raw}");
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let store = MemoryStorage::with_entry(KEY, r#"{"hidePanels":false,"theme":"dark"}"#);
        assert!(!load_preferences(&store, KEY).hide_panels);
    }

    #[test]
    fn unreadable_storage_loads_defaults() {
        assert_eq!(load_preferences(&BrokenStorage, KEY), Preferences::default());
    }

    #[test]
    fn save_then_load_keeps_toggle() {
        let mut store = MemoryStorage::new();
        let mut prefs = Preferences::default();
        prefs.set(PreferenceKey::HideChat, false);
        save_preferences(&mut store, KEY, &prefs).unwrap();

        let reloaded = load_preferences(&store, KEY);
        assert!(!reloaded.hide_chat);
        assert!(reloaded.hide_sidebar);
        assert!(reloaded.hide_panels);
    }

    #[test]
    fn stored_json_uses_camel_case_fields() {
        let mut store = MemoryStorage::new();
        save_preferences(&mut store, KEY, &Preferences::default()).unwrap();
        let raw: serde_json::Value = serde_json::from_str(store.get(KEY).unwrap()).unwrap();
        for key in PreferenceKey::ALL {
            assert_eq!(raw.get(key.field()), Some(&serde_json::Value::Bool(true)));
        }
    }

    #[test]
    fn write_failures_surface() {
        let mut store = MemoryStorage::read_only();
        let err = save_preferences(&mut store, KEY, &Preferences::default()).unwrap_err();
        assert!(matches!(err, StorageError::Write(_)));
        assert_eq!(
            save_preferences(&mut BrokenStorage, KEY, &Preferences::default()),
            Err(StorageError::Unavailable)
        );
    }

    #[test]
    fn field_names_round_trip() {
        for key in PreferenceKey::ALL {
            assert_eq!(PreferenceKey::from_field(key.field()), Some(key));
        }
        assert_eq!(PreferenceKey::from_field("hideEverything"), None);
    }
}
