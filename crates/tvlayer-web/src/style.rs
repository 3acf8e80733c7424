#![forbid(unsafe_code)]

//! Stylesheet injection policy.
//!
//! The layer first tries the stylesheet at [`StyleConfig::stylesheet_url`].
//! If that fails for any reason the embedded [`FALLBACK_CSS`] is injected
//! instead. Either way a marker element with [`STYLE_MARKER_ID`] is added
//! so later boots skip the whole step.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Id of the element marking styles as installed.
pub const STYLE_MARKER_ID: &str = "tv-layer-style-inline-fallback";

/// Text content of the marker element.
pub const STYLE_MARKER_TEXT: &str = "/* style marker */";

/// Default stylesheet location.
pub const DEFAULT_STYLESHEET_URL: &str = "/userscripts/css/twitch-tv-layer.css";

/// Stylesheet used when the external one cannot be fetched.
pub const FALLBACK_CSS: &str = concat!(
    "[data-tv-row] { outline: none; transform: scale(1); ",
    "transition: transform .16s ease, box-shadow .16s ease; border-radius: 14px; }\n",
    "[data-tv-row]:focus-visible,\n",
    "[data-tv-row].tv-focused { transform: scale(1.06); ",
    "box-shadow: 0 0 0 3px rgba(124, 194, 255, .9), 0 12px 24px rgba(0, 0, 0, .45); }\n",
    ".tv-layer-controls { position: fixed; top: 1rem; right: 1rem; z-index: 9999; ",
    "display: grid; gap: .4rem; background: rgba(10,10,12,.7); ",
    "border: 1px solid rgba(255,255,255,.12); border-radius: 12px; padding: .7rem; ",
    "color: #fff; font: 500 12px/1.2 system-ui, sans-serif; }\n",
    ".tv-layer-controls label { display: flex; gap: .45rem; align-items: center; ",
    "white-space: nowrap; }\n",
);

/// Stylesheet settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// External stylesheet tried first.
    pub stylesheet_url: String,
    /// Inject [`FALLBACK_CSS`] when the fetch fails.
    pub inline_fallback: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_owned(),
            inline_fallback: true,
        }
    }
}

/// Why the external stylesheet was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// The server answered with a non-success status.
    Status(u16),
    /// The request itself failed.
    Network(String),
    /// The body could not be read as text.
    Body(String),
}

impl core::fmt::Display for StyleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "stylesheet request failed with status {code}"),
            Self::Network(msg) => write!(f, "stylesheet request failed: {msg}"),
            Self::Body(msg) => write!(f, "stylesheet body unreadable: {msg}"),
        }
    }
}

impl std::error::Error for StyleError {}

impl StyleConfig {
    /// The CSS to inject for a fetch outcome, or `None` to inject nothing.
    #[must_use]
    pub fn resolve(&self, fetched: Result<String, StyleError>) -> Option<Cow<'static, str>> {
        match fetched {
            Ok(css) => Some(Cow::Owned(css)),
            Err(err) => {
                tracing::debug!(
                    message = "style.fallback",
                    url = %self.stylesheet_url,
                    error = %err,
                    inline = self.inline_fallback
                );
                self.inline_fallback.then_some(Cow::Borrowed(FALLBACK_CSS))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{CONTROLS_CLASS, FOCUSED_CLASS, ROW_ATTR};

    #[test]
    fn fetched_css_wins() {
        let css = StyleConfig::default().resolve(Ok("body{}".to_owned()));
        assert_eq!(css.as_deref(), Some("body{}"));
    }

    #[test]
    fn failure_uses_fallback() {
        for err in [
            StyleError::Status(404),
            StyleError::Network("offline".to_owned()),
            StyleError::Body("bad utf-16".to_owned()),
        ] {
            let css = StyleConfig::default().resolve(Err(err));
            assert_eq!(css.as_deref(), Some(FALLBACK_CSS));
        }
    }

    #[test]
    fn fallback_can_be_disabled() {
        let config = StyleConfig {
            inline_fallback: false,
            ..StyleConfig::default()
        };
        assert_eq!(config.resolve(Err(StyleError::Status(500))), None);
    }

    #[test]
    fn fallback_targets_decorations() {
        assert!(FALLBACK_CSS.contains(&format!("[{ROW_ATTR}]")));
        assert!(FALLBACK_CSS.contains(&format!(".{FOCUSED_CLASS}")));
        assert!(FALLBACK_CSS.contains(&format!(".{CONTROLS_CLASS}")));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            StyleError::Status(404).to_string(),
            "stylesheet request failed with status 404"
        );
    }
}
