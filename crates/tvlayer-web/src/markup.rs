#![forbid(unsafe_code)]

//! Names written into or queried from the host document.
//!
//! Everything here is plain data so the panel layout and the decoration
//! vocabulary can be tested without a browser.

use tvlayer_runtime::{PreferenceKey, Preferences};

/// Class on the focused card.
pub const FOCUSED_CLASS: &str = "tv-focused";

/// Attribute holding a card's row.
pub const ROW_ATTR: &str = "data-tv-row";

/// Attribute holding a card's column.
pub const COL_ATTR: &str = "data-tv-col";

/// Class of the toggle panel.
pub const CONTROLS_CLASS: &str = "tv-layer-controls";

/// Accessible name of the toggle panel.
pub const CONTROLS_LABEL: &str = "TV Layer Toggles";

/// Links that may become cards.
pub const LINK_SELECTOR: &str = "a[href]";

/// Content that marks a link as a card rather than a text link.
pub const MEDIA_SELECTOR: &str = "img, video, [data-a-target=\"preview-card-image-link\"]";

/// Where a card's human-readable title is looked up, in order.
pub const TITLE_SELECTOR: &str = "h3, h2, [title], p, span";

/// Primary content container.
pub const MAIN_SELECTOR: &str = "main";

/// Selector form of [`CONTROLS_CLASS`].
#[must_use]
pub fn controls_selector() -> String {
    format!(".{CONTROLS_CLASS}")
}

/// One checkbox of the toggle panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleSpec {
    pub key: PreferenceKey,
    pub label: &'static str,
    pub checked: bool,
}

/// Panel checkboxes in display order.
#[must_use]
pub fn toggle_specs(prefs: &Preferences) -> [ToggleSpec; 3] {
    PreferenceKey::ALL.map(|key| ToggleSpec {
        key,
        label: key.label(),
        checked: prefs.get(key),
    })
}

/// Element id of a panel checkbox.
#[must_use]
pub fn toggle_input_id(key: PreferenceKey) -> String {
    format!("tv-layer-toggle-{}", key.field())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn toggles_follow_preferences() {
        let mut prefs = Preferences::default();
        prefs.set(PreferenceKey::HideSidebar, false);
        let specs = toggle_specs(&prefs);

        let labels: Vec<&str> = specs.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Hide chat", "Hide sidebar", "Hide panels"]);
        let checked: Vec<bool> = specs.iter().map(|s| s.checked).collect();
        assert_eq!(checked, vec![true, false, true]);
    }

    #[test]
    fn input_ids_are_distinct() {
        let ids: Vec<String> = PreferenceKey::ALL.into_iter().map(toggle_input_id).collect();
        assert_eq!(
            ids,
            vec![
                "tv-layer-toggle-hideChat",
                "tv-layer-toggle-hideSidebar",
                "tv-layer-toggle-hidePanels"
            ]
        );
    }

    #[test]
    fn controls_selector_matches_class() {
        assert_eq!(controls_selector(), ".tv-layer-controls");
    }
}
