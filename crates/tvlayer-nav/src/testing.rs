#![forbid(unsafe_code)]

//! In-memory host doubles for tests.
//!
//! [`MockCard`] records every decoration written to it so tests can assert
//! on focus and grid tags; [`MockPage`] serves a mutable list of cards.
//! Both are shared handles: clones observe the same state.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tvlayer_core::Rect;

use crate::candidate::{CardElement, PageRoot};

#[derive(Debug)]
struct CardState {
    href: String,
    label: Option<String>,
    bounds: Rect,
    media: bool,
    attached: bool,
    grid: Option<(usize, usize)>,
    focused: bool,
    reachable: Option<bool>,
    focus_calls: usize,
    scroll_calls: usize,
    clicks: usize,
}

/// A fake card element.
#[derive(Debug, Clone)]
pub struct MockCard {
    state: Rc<RefCell<CardState>>,
}

impl PartialEq for MockCard {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for MockCard {}

impl MockCard {
    /// A media-bearing, attached card.
    #[must_use]
    pub fn new(href: &str, bounds: Rect) -> Self {
        Self {
            state: Rc::new(RefCell::new(CardState {
                href: href.to_owned(),
                label: None,
                bounds,
                media: true,
                attached: true,
                grid: None,
                focused: false,
                reachable: None,
                focus_calls: 0,
                scroll_calls: 0,
                clicks: 0,
            })),
        }
    }

    /// Card at `(left, top)` with a standard 200x120 thumbnail box.
    #[must_use]
    pub fn at(href: &str, left: f64, top: f64) -> Self {
        Self::new(href, Rect::new(left, top, 200.0, 120.0))
    }

    #[must_use]
    pub fn without_media(self) -> Self {
        self.state.borrow_mut().media = false;
        self
    }

    #[must_use]
    pub fn with_label(self, label: &str) -> Self {
        self.state.borrow_mut().label = Some(label.to_owned());
        self
    }

    /// Simulate removal from the page.
    pub fn detach(&self) {
        let mut state = self.state.borrow_mut();
        state.attached = false;
        state.bounds = Rect::default();
    }

    /// Simulate a layout change.
    pub fn set_bounds(&self, bounds: Rect) {
        self.state.borrow_mut().bounds = bounds;
    }

    #[must_use]
    pub fn grid_position(&self) -> Option<(usize, usize)> {
        self.state.borrow().grid
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    /// `Some(true)` when keyboard reachable, `Some(false)` when explicitly
    /// excluded, `None` when never touched.
    #[must_use]
    pub fn keyboard_reachable(&self) -> Option<bool> {
        self.state.borrow().reachable
    }

    #[must_use]
    pub fn focus_calls(&self) -> usize {
        self.state.borrow().focus_calls
    }

    #[must_use]
    pub fn scroll_calls(&self) -> usize {
        self.state.borrow().scroll_calls
    }

    #[must_use]
    pub fn clicks(&self) -> usize {
        self.state.borrow().clicks
    }
}

impl CardElement for MockCard {
    fn bounds(&self) -> Rect {
        self.state.borrow().bounds
    }

    fn href(&self) -> Option<String> {
        Some(self.state.borrow().href.clone())
    }

    fn label(&self) -> Option<String> {
        self.state.borrow().label.clone()
    }

    fn has_preview_media(&self) -> bool {
        self.state.borrow().media
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    fn set_grid_position(&self, row: usize, col: usize) {
        self.state.borrow_mut().grid = Some((row, col));
    }

    fn clear_decorations(&self) {
        let mut state = self.state.borrow_mut();
        state.grid = None;
        state.focused = false;
        state.reachable = None;
    }

    fn set_focused(&self, focused: bool) {
        let mut state = self.state.borrow_mut();
        state.focused = focused;
        state.reachable = Some(focused);
    }

    fn focus_without_scroll(&self) {
        self.state.borrow_mut().focus_calls += 1;
    }

    fn scroll_into_view_nearest(&self) {
        self.state.borrow_mut().scroll_calls += 1;
    }

    fn activate(&self) {
        self.state.borrow_mut().clicks += 1;
    }
}

#[derive(Debug)]
struct PageState {
    links: Vec<MockCard>,
    has_main: bool,
    body_classes: BTreeMap<String, bool>,
}

/// A fake page.
#[derive(Debug, Clone)]
pub struct MockPage {
    state: Rc<RefCell<PageState>>,
    scroll_y: Rc<Cell<f64>>,
}

impl MockPage {
    /// A page with a main container and the given links.
    #[must_use]
    pub fn new(links: Vec<MockCard>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PageState {
                links,
                has_main: true,
                body_classes: BTreeMap::new(),
            })),
            scroll_y: Rc::new(Cell::new(0.0)),
        }
    }

    /// Build a page from `(left, top)` positions; hrefs are `/card/{i}`.
    #[must_use]
    pub fn grid(positions: &[(f64, f64)]) -> Self {
        let links = positions
            .iter()
            .enumerate()
            .map(|(i, &(left, top))| MockCard::at(&format!("/card/{i}"), left, top))
            .collect();
        Self::new(links)
    }

    /// Replace the page content.
    pub fn set_links(&self, links: Vec<MockCard>) {
        self.state.borrow_mut().links = links;
    }

    pub fn set_has_main(&self, has_main: bool) {
        self.state.borrow_mut().has_main = has_main;
    }

    pub fn set_scroll_y(&self, scroll_y: f64) {
        self.scroll_y.set(scroll_y);
    }

    /// Current links, including detached ones.
    #[must_use]
    pub fn links(&self) -> Vec<MockCard> {
        self.state.borrow().links.clone()
    }

    /// Toggle a class on the fake `<body>`.
    pub fn set_body_class(&self, class: &str, on: bool) {
        self.state
            .borrow_mut()
            .body_classes
            .insert(class.to_owned(), on);
    }

    #[must_use]
    pub fn has_body_class(&self, class: &str) -> bool {
        self.state
            .borrow()
            .body_classes
            .get(class)
            .copied()
            .unwrap_or(false)
    }
}

impl PageRoot for MockPage {
    type Card = MockCard;

    fn has_main_container(&self) -> bool {
        self.state.borrow().has_main
    }

    fn link_candidates(&self) -> Vec<MockCard> {
        self.state
            .borrow()
            .links
            .iter()
            .filter(|card| card.is_attached())
            .cloned()
            .collect()
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }
}
