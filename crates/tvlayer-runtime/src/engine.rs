#![forbid(unsafe_code)]

//! The navigation engine.
//!
//! One [`Engine`] exists per page lifetime. The host adapter owns it and
//! forwards every notification:
//!
//! | host event                  | engine call                       |
//! |-----------------------------|-----------------------------------|
//! | load / popstate / hashchange| [`Engine::on_route_change`]       |
//! | content mutation            | [`Engine::on_content_changed`]    |
//! | animation frame             | [`Engine::on_frame`]              |
//! | keydown                     | [`Engine::on_key`]                |
//! | toggle checkbox change      | [`Engine::set_preference`]        |
//!
//! # State machine
//!
//! ```text
//!            rebuild retains >= 1 row
//! Inactive ───────────────────────────▶ Active
//!    ▲                                     │
//!    └─────────────────────────────────────┘
//!      rebuild retains 0 rows / cards detached
//! ```
//!
//! In `Inactive` every key is ignored. Rows and the index are rebuilt from
//! scratch on every qualifying notification; the focus cursor survives a
//! rebuild when still in range and is reset on route change.

use tvlayer_core::{KeyCode, KeyEvent, NavDirection};
use tvlayer_nav::{
    CandidateExtractor, CardElement, FocusController, LinkExtractor, NavIndex, cluster_rows,
    resolve,
};

use crate::config::EngineConfig;
use crate::host::{HostPage, ROOT_CLASS};
use crate::prefs::{
    PreferenceKey, PreferenceStore, Preferences, load_preferences, save_preferences,
};
use crate::schedule::{FrameRequest, RebuildScheduler, SchedulerStats};

/// Macro-state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No navigable grid; directional input is a no-op.
    Inactive,
    /// A non-empty navigation index is live.
    Active,
}

/// Whether the host should suppress the key's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Consumed,
}

/// Host-side facts that affect key handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyContext {
    /// The toggle panel currently contains the focused element.
    pub panel_has_focus: bool,
}

/// Why a rebuild ran. Logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RebuildReason {
    RouteChange,
    Frame,
    EnsureFocus,
    StaleFocus,
    PendingContent,
}

impl RebuildReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::RouteChange => "route_change",
            Self::Frame => "frame",
            Self::EnsureFocus => "ensure_focus",
            Self::StaleFocus => "stale_focus",
            Self::PendingContent => "pending_content",
        }
    }
}

/// Navigation engine bound to one page.
pub struct Engine<H: HostPage, S: PreferenceStore, X = LinkExtractor> {
    host: H,
    store: S,
    extractor: X,
    config: EngineConfig,
    prefs: Preferences,
    index: NavIndex<H::Card>,
    focus: FocusController,
    state: EngineState,
    scheduler: RebuildScheduler,
    route: Option<String>,
}

impl<H: HostPage, S: PreferenceStore> Engine<H, S, LinkExtractor> {
    /// Engine with the default link extractor.
    pub fn new(host: H, store: S, config: EngineConfig) -> Self {
        let extractor = LinkExtractor::new(config.extractor.clone());
        Self::with_extractor(host, store, config, extractor)
    }
}

impl<H, S, X> Engine<H, S, X>
where
    H: HostPage,
    S: PreferenceStore,
    X: CandidateExtractor<H>,
{
    /// Engine with a custom extractor. Loads the preference record.
    pub fn with_extractor(host: H, store: S, config: EngineConfig, extractor: X) -> Self {
        let prefs = load_preferences(&store, &config.storage_key);
        Self {
            host,
            store,
            extractor,
            config,
            prefs,
            index: NavIndex::default(),
            focus: FocusController::new(),
            state: EngineState::Inactive,
            scheduler: RebuildScheduler::new(),
            route: None,
        }
    }

    // --- Accessors ---

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == EngineState::Active
    }

    #[must_use]
    pub const fn preferences(&self) -> Preferences {
        self.prefs
    }

    #[must_use]
    pub fn index(&self) -> &NavIndex<H::Card> {
        &self.index
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.focus.cursor()
    }

    #[must_use]
    pub fn focused_card(&self) -> Option<&H::Card> {
        self.focus.focused(&self.index)
    }

    /// Display label of the focused card, if it has one.
    #[must_use]
    pub fn focused_label(&self) -> Option<String> {
        self.focused_card().and_then(CardElement::label)
    }

    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    // --- Handlers ---

    /// The host navigated (or booted) to `path`.
    ///
    /// Resets the cursor and rebuilds immediately.
    pub fn on_route_change(&mut self, path: &str) -> Option<usize> {
        tracing::debug!(message = "engine.route", from = ?self.route, to = path);
        self.route = Some(path.to_owned());
        self.focus.reset();
        self.apply_preference_classes();
        self.rebuild(RebuildReason::RouteChange);
        self.focus.ensure_focus(&self.index)
    }

    /// The page content changed.
    ///
    /// Returns `true` when the host must schedule a frame callback that
    /// calls [`on_frame`](Self::on_frame); `false` when one is already
    /// pending.
    pub fn on_content_changed(&mut self) -> bool {
        let request = self.scheduler.request();
        tracing::trace!(message = "engine.content_changed", ?request);
        request == FrameRequest::Schedule
    }

    /// Rendering-frame callback. Runs the coalesced rebuild, if any.
    ///
    /// `path` is the current location path; a path different from the
    /// last known route counts as a route change.
    pub fn on_frame(&mut self, path: &str) {
        if !self.scheduler.take_pending() {
            return;
        }
        if self.route.as_deref() != Some(path) {
            self.on_route_change(path);
            return;
        }
        self.apply_preference_classes();
        self.rebuild(RebuildReason::Frame);
        self.focus.ensure_focus(&self.index);
    }

    /// Rebuild the index, then re-apply focus at the previous cursor if it
    /// is still valid, else at the first card.
    pub fn ensure_focus(&mut self) -> Option<usize> {
        self.rebuild(RebuildReason::EnsureFocus);
        self.focus.ensure_focus(&self.index)
    }

    /// Focus the card at flat index `index` (clamped).
    pub fn set_focus(&mut self, index: usize) -> Option<usize> {
        self.focus.set_focus(&self.index, index)
    }

    /// Move focus one step in `dir`.
    ///
    /// Returns the newly focused flat index, or `None` when there is no
    /// target (row edge, missing row, inactive engine). A focused card that
    /// left the page triggers a rebuild-and-reclamp instead of a move.
    ///
    /// Content changed since the last frame is scanned before resolving, so
    /// cards inserted ahead of the frame callback are already reachable.
    /// The pending frame still runs afterwards to pick up route changes.
    pub fn navigate(&mut self, dir: NavDirection) -> Option<usize> {
        if !self.is_active() {
            return None;
        }
        if self.scheduler.is_pending() {
            self.rebuild(RebuildReason::PendingContent);
            self.focus.ensure_focus(&self.index);
            if !self.is_active() {
                return None;
            }
        }
        let current_is_live = self
            .focus
            .focused(&self.index)
            .is_some_and(CardElement::is_attached);
        if !current_is_live {
            self.rebuild(RebuildReason::StaleFocus);
            self.focus.ensure_focus(&self.index);
            return None;
        }

        let origin = self.focus.position(&self.index)?;
        let Some(target) = resolve(&self.index, origin, dir) else {
            tracing::trace!(
                message = "engine.navigate.no_target",
                row = origin.row,
                col = origin.col,
                ?dir
            );
            return None;
        };

        if !self.index.card(target).is_some_and(CardElement::is_attached) {
            self.rebuild(RebuildReason::StaleFocus);
            self.focus.ensure_focus(&self.index);
            return None;
        }
        self.focus.set_focus(&self.index, target)
    }

    /// Keyboard input.
    pub fn on_key(&mut self, event: KeyEvent, ctx: KeyContext) -> KeyOutcome {
        if !self.is_active() || event.has_command_modifier() {
            return KeyOutcome::Ignored;
        }

        if let Some(dir) = event.direction() {
            self.navigate(dir);
            return KeyOutcome::Consumed;
        }

        match event.code {
            KeyCode::Enter => match self.focused_card() {
                Some(card) => {
                    card.activate();
                    tracing::debug!(
                        message = "engine.activate",
                        href = ?card.href(),
                        label = ?card.label()
                    );
                    KeyOutcome::Consumed
                }
                None => KeyOutcome::Ignored,
            },
            code if code.is_back() && ctx.panel_has_focus => {
                self.ensure_focus();
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Change one toggle, persist it and restyle the page.
    ///
    /// A failed save is logged; the in-memory value still applies.
    pub fn set_preference(&mut self, key: PreferenceKey, value: bool) {
        self.prefs.set(key, value);
        if let Err(err) = save_preferences(&mut self.store, &self.config.storage_key, &self.prefs) {
            tracing::warn!(message = "prefs.save_failed", field = key.field(), error = %err);
        }
        self.apply_preference_classes();
    }

    /// Re-read the preference record from storage.
    pub fn reload_preferences(&mut self) -> Preferences {
        self.prefs = load_preferences(&self.store, &self.config.storage_key);
        self.apply_preference_classes();
        self.prefs
    }

    // --- Internals ---

    fn apply_preference_classes(&self) {
        for key in PreferenceKey::ALL {
            self.host.set_body_class(key.body_class(), self.prefs.get(key));
        }
        self.host.set_body_class(ROOT_CLASS, true);
    }

    /// Rebuild rows and index from a page-wide scan.
    fn rebuild(&mut self, reason: RebuildReason) {
        let _span = tracing::debug_span!("engine.rebuild", reason = reason.as_str()).entered();

        let next = match self.scan() {
            Ok(index) => index,
            Err(why) => {
                tracing::debug!(message = "engine.rebuild.inactive", why);
                NavIndex::default()
            }
        };

        self.index.clear_decorations();
        next.apply_grid_tags();
        self.index = next;

        let state = if self.index.is_empty() {
            EngineState::Inactive
        } else {
            EngineState::Active
        };
        if state != self.state {
            tracing::debug!(message = "engine.state", from = ?self.state, to = ?state);
            self.state = state;
        }
        tracing::debug!(
            message = "engine.rebuild.done",
            rows = self.index.row_count(),
            cards = self.index.len()
        );
    }

    fn scan(&self) -> Result<NavIndex<H::Card>, &'static str> {
        let path = self.route.as_deref().unwrap_or_default();
        if !self.config.is_home_path(path) {
            return Err("not a home path");
        }
        if !self.host.has_main_container() {
            return Err("no main container");
        }
        let candidates = self.extractor.extract(&self.host);
        if candidates.len() < self.config.min_candidates {
            return Err("too few candidates");
        }
        let rows = cluster_rows(
            candidates,
            self.host.scroll_y(),
            &self.config.effective_cluster(),
        );
        Ok(NavIndex::from_rows(rows))
    }
}

impl<H, S, X> core::fmt::Debug for Engine<H, S, X>
where
    H: HostPage,
    S: PreferenceStore,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("route", &self.route)
            .field("cursor", &self.focus.cursor())
            .field("rows", &self.index.row_lengths())
            .field("prefs", &self.prefs)
            .finish_non_exhaustive()
    }
}
