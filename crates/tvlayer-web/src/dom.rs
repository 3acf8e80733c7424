#![forbid(unsafe_code)]

//! DOM implementations of the host traits.
//!
//! Only compiled on `wasm32` targets.

use tvlayer_core::Rect;
use tvlayer_nav::{CardElement, PageRoot};
use tvlayer_runtime::{HostPage, PreferenceStore, StorageError};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, FocusOptions, HtmlElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Window,
};

use crate::markup::{
    COL_ATTR, FOCUSED_CLASS, LINK_SELECTOR, MAIN_SELECTOR, MEDIA_SELECTOR, ROW_ATTR,
    TITLE_SELECTOR,
};

/// A link element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomCard(HtmlElement);

impl CardElement for DomCard {
    fn bounds(&self) -> Rect {
        let r = self.0.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.width(), r.height())
    }

    fn href(&self) -> Option<String> {
        self.0.get_attribute("href")
    }

    fn label(&self) -> Option<String> {
        let title = self
            .0
            .query_selector(TITLE_SELECTOR)
            .ok()
            .flatten()
            .and_then(|node| node.text_content())
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        title.or_else(|| self.0.get_attribute("aria-label"))
    }

    fn has_preview_media(&self) -> bool {
        matches!(self.0.query_selector(MEDIA_SELECTOR), Ok(Some(_)))
    }

    fn is_attached(&self) -> bool {
        self.0.is_connected() && self.0.offset_parent().is_some()
    }

    fn set_grid_position(&self, row: usize, col: usize) {
        let _ = self.0.set_attribute(ROW_ATTR, &row.to_string());
        let _ = self.0.set_attribute(COL_ATTR, &col.to_string());
    }

    fn clear_decorations(&self) {
        let _ = self.0.remove_attribute(ROW_ATTR);
        let _ = self.0.remove_attribute(COL_ATTR);
        let _ = self.0.remove_attribute("tabindex");
        let _ = self.0.class_list().remove_1(FOCUSED_CLASS);
    }

    fn set_focused(&self, focused: bool) {
        let _ = self.0.class_list().toggle_with_force(FOCUSED_CLASS, focused);
        self.0.set_tab_index(if focused { 0 } else { -1 });
    }

    fn focus_without_scroll(&self) {
        let opts = FocusOptions::new();
        opts.set_prevent_scroll(true);
        if let Err(err) = self.0.focus_with_options(&opts) {
            tracing::trace!(message = "dom.focus_failed", error = ?err);
        }
    }

    fn scroll_into_view_nearest(&self) {
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(ScrollBehavior::Smooth);
        opts.set_block(ScrollLogicalPosition::Nearest);
        opts.set_inline(ScrollLogicalPosition::Nearest);
        self.0.scroll_into_view_with_scroll_into_view_options(&opts);
    }

    fn activate(&self) {
        self.0.click();
    }
}

/// The live document.
#[derive(Debug, Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    /// The page of the current global `window`, if there is one.
    #[must_use]
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `location.pathname`, or `""` when unavailable.
    #[must_use]
    pub fn path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    /// First element matching `selector`.
    #[must_use]
    pub fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// Whether the element matching `selector` contains the focused element.
    #[must_use]
    pub fn has_focus_within(&self, selector: &str) -> bool {
        self.query(selector)
            .is_some_and(|el| el.matches(":focus-within").unwrap_or(false))
    }
}

impl PageRoot for DomPage {
    type Card = DomCard;

    fn has_main_container(&self) -> bool {
        self.query(MAIN_SELECTOR).is_some()
    }

    fn link_candidates(&self) -> Vec<DomCard> {
        let Ok(nodes) = self.document.query_selector_all(LINK_SELECTOR) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(DomCard)
            .collect()
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }
}

impl HostPage for DomPage {
    fn set_body_class(&self, class: &str, on: bool) {
        if let Some(body) = self.document.body() {
            let _ = body.class_list().toggle_with_force(class, on);
        }
    }
}

/// `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    /// Access can throw (privacy settings, sandboxed frames); that case is
    /// remembered as unavailable.
    #[must_use]
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl PreferenceStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::Write(format!("{err:?}")))
    }
}
