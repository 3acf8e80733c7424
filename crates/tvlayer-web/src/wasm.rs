#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: the [`TvLayer`] handle.
//!
//! Wires the browser to the engine:
//!
//! - `keydown` (capture phase on `document`) → `Engine::on_key`
//! - `popstate` / `hashchange` / `load` on `window` → boot (styles, panel,
//!   route change)
//! - `MutationObserver` (child list, whole subtree) → `on_content_changed`,
//!   then one `requestAnimationFrame` callback → `on_frame`
//! - panel checkbox `change` → `set_preference`
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Array;
use tvlayer_runtime::{Engine, KeyContext, KeyOutcome, PreferenceKey};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlInputElement, KeyboardEvent, MutationObserver,
    MutationObserverInit, Response, Window,
};

use crate::config::LayerConfig;
use crate::dom::{DomPage, LocalStorage};
use crate::keys::{dom_key_event, pack_modifiers};
use crate::logging;
use crate::markup::{
    CONTROLS_CLASS, CONTROLS_LABEL, controls_selector, toggle_input_id, toggle_specs,
};
use crate::style::{STYLE_MARKER_ID, STYLE_MARKER_TEXT, StyleConfig, StyleError};

type WebEngine = Engine<DomPage, LocalStorage>;

/// An event listener that detaches itself on drop.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback_and_bool(
            kind,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// State reachable from every callback.
struct Shared {
    engine: RefCell<WebEngine>,
    page: DomPage,
    style: StyleConfig,
    panel: RefCell<Vec<Listener>>,
}

impl Shared {
    /// Run `f` on the engine unless a callback is already inside it.
    fn with_engine<R>(&self, f: impl FnOnce(&mut WebEngine) -> R) -> Option<R> {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            Some(f(&mut engine))
        } else {
            tracing::warn!(message = "engine.reentrant_call");
            None
        }
    }
}

fn style_parent(document: &Document) -> Option<Element> {
    document
        .query_selector("head")
        .ok()
        .flatten()
        .or_else(|| document.document_element())
}

fn inject_css(document: &Document, css: &str) -> Result<(), JsValue> {
    let Some(parent) = style_parent(document) else {
        return Ok(());
    };
    let style = document.create_element("style")?;
    style.set_text_content(Some(css));
    parent.append_child(&style)?;
    Ok(())
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

async fn fetch_text(window: &Window, url: &str) -> Result<String, StyleError> {
    let value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| StyleError::Network(js_error_text(&e)))?;
    let response: Response = value
        .dyn_into()
        .map_err(|e| StyleError::Network(js_error_text(&e)))?;
    if !response.ok() {
        return Err(StyleError::Status(response.status()));
    }
    let body = response
        .text()
        .map_err(|e| StyleError::Body(js_error_text(&e)))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| StyleError::Body(js_error_text(&e)))?;
    text.as_string()
        .ok_or_else(|| StyleError::Body("response text is not a string".to_owned()))
}

/// Install the stylesheet once per document.
///
/// The marker goes in first so overlapping boots never fetch twice.
fn ensure_styles(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.page.document().clone();
    if document.get_element_by_id(STYLE_MARKER_ID).is_some() {
        return Ok(());
    }
    let Some(parent) = style_parent(&document) else {
        return Ok(());
    };
    let marker = document.create_element("style")?;
    marker.set_id(STYLE_MARKER_ID);
    marker.set_text_content(Some(STYLE_MARKER_TEXT));
    parent.append_child(&marker)?;

    let window = shared.page.window().clone();
    let style = shared.style.clone();
    spawn_local(async move {
        let fetched = fetch_text(&window, &style.stylesheet_url).await;
        let Some(css) = style.resolve(fetched) else {
            return;
        };
        if let Err(err) = inject_css(&document, &css) {
            tracing::warn!(message = "style.inject_failed", error = %js_error_text(&err));
        }
    });
    Ok(())
}

/// Replace the toggle panel with a fresh one reflecting the preferences.
fn build_panel(shared: &Rc<Shared>) -> Result<(), JsValue> {
    let document = shared.page.document();
    let Some(body) = document.body() else {
        return Ok(());
    };
    if let Some(existing) = shared.page.query(&controls_selector()) {
        existing.remove();
    }
    shared.panel.borrow_mut().clear();

    let prefs = shared
        .engine
        .try_borrow()
        .map(|engine| engine.preferences())
        .unwrap_or_default();

    let controls = document.create_element("section")?;
    controls.set_class_name(CONTROLS_CLASS);
    controls.set_attribute("aria-label", CONTROLS_LABEL)?;

    let mut listeners = Vec::with_capacity(3);
    for spec in toggle_specs(&prefs) {
        let label = document.create_element("label")?;
        let input: HtmlInputElement = document
            .create_element("input")?
            .dyn_into()
            .map_err(JsValue::from)?;
        input.set_type("checkbox");
        input.set_id(&toggle_input_id(spec.key));
        input.set_checked(spec.checked);

        let text = document.create_element("span")?;
        text.set_text_content(Some(spec.label));
        label.append_child(&input)?;
        label.append_child(&text)?;
        controls.append_child(&label)?;

        let weak = Rc::downgrade(shared);
        let checkbox = input.clone();
        let key = spec.key;
        let on_change = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(shared) = weak.upgrade() {
                shared.with_engine(|engine| engine.set_preference(key, checkbox.checked()));
            }
        });
        listeners.push(Listener::attach(&input, "change", false, on_change)?);
    }

    body.append_child(&controls)?;
    *shared.panel.borrow_mut() = listeners;
    Ok(())
}

/// Styles, panel and a route-change rebuild.
fn boot(shared: &Rc<Shared>) {
    if shared.page.document().body().is_none() {
        return;
    }
    if let Err(err) = ensure_styles(shared) {
        tracing::warn!(message = "boot.styles_failed", error = %js_error_text(&err));
    }
    if let Err(err) = build_panel(shared) {
        tracing::warn!(message = "boot.panel_failed", error = %js_error_text(&err));
    }
    let path = shared.page.path();
    shared.with_engine(|engine| engine.on_route_change(&path));
}

fn on_keydown(shared: &Shared, event: &KeyboardEvent) {
    let key = dom_key_event(
        &event.key(),
        pack_modifiers(
            event.shift_key(),
            event.alt_key(),
            event.ctrl_key(),
            event.meta_key(),
        ),
    );
    let ctx = KeyContext {
        panel_has_focus: shared.page.has_focus_within(&controls_selector()),
    };
    if shared.with_engine(|engine| engine.on_key(key, ctx)) == Some(KeyOutcome::Consumed) {
        event.prevent_default();
    }
}

fn run_frame(shared: &Shared) {
    let started = web_time::Instant::now();
    let path = shared.page.path();
    shared.with_engine(|engine| engine.on_frame(&path));
    tracing::trace!(
        message = "frame.done",
        elapsed_us = started.elapsed().as_micros() as u64
    );
}

fn on_mutation(shared: &Rc<Shared>) {
    if shared.with_engine(|engine| engine.on_content_changed()) != Some(true) {
        return;
    }
    let weak: Weak<Shared> = Rc::downgrade(shared);
    let frame = Closure::once_into_js(move || {
        if let Some(shared) = weak.upgrade() {
            run_frame(&shared);
        }
    });
    if let Err(err) = shared
        .page
        .window()
        .request_animation_frame(frame.unchecked_ref())
    {
        // A stuck pending flag blocks every later rebuild.
        tracing::warn!(message = "frame.request_failed", error = %js_error_text(&err));
        run_frame(shared);
    }
}

/// The TV layer attached to the current page.
#[wasm_bindgen]
pub struct TvLayer {
    shared: Rc<Shared>,
    listeners: Vec<Listener>,
    observer: Option<(MutationObserver, Closure<dyn FnMut(Array, MutationObserver)>)>,
}

#[wasm_bindgen]
impl TvLayer {
    /// Create a detached layer. `config_json` is an optional JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<TvLayer, JsValue> {
        logging::install_panic_hook();
        let config = LayerConfig::from_json(config_json.as_deref())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        logging::init(config.max_level());

        let page =
            DomPage::current().ok_or_else(|| JsValue::from_str("tvlayer: no window or document"))?;
        let store = LocalStorage::new(page.window());
        let engine = Engine::new(page.clone(), store, config.engine);
        Ok(Self {
            shared: Rc::new(Shared {
                engine: RefCell::new(engine),
                page,
                style: config.style,
                panel: RefCell::new(Vec::new()),
            }),
            listeners: Vec::new(),
            observer: None,
        })
    }

    /// Attach listeners and the mutation observer, then boot. Idempotent.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.observer.is_some() {
            return Ok(());
        }

        let document: &EventTarget = self.shared.page.document();
        let weak = Rc::downgrade(&self.shared);
        let on_key = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let (Some(shared), Some(key)) = (weak.upgrade(), event.dyn_ref::<KeyboardEvent>())
            else {
                return;
            };
            on_keydown(&shared, key);
        });
        self.listeners
            .push(Listener::attach(document, "keydown", true, on_key)?);

        let window: &EventTarget = self.shared.page.window();
        for kind in ["popstate", "hashchange", "load"] {
            let weak = Rc::downgrade(&self.shared);
            let on_route = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(shared) = weak.upgrade() {
                    boot(&shared);
                }
            });
            self.listeners
                .push(Listener::attach(window, kind, false, on_route)?);
        }

        boot(&self.shared);

        let weak = Rc::downgrade(&self.shared);
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |_records: Array, _observer: MutationObserver| {
                if let Some(shared) = weak.upgrade() {
                    on_mutation(&shared);
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        if let Some(root) = self.shared.page.document().document_element() {
            observer.observe_with_options(&root, &init)?;
        }
        self.observer = Some((observer, callback));
        tracing::debug!(message = "layer.started");
        Ok(())
    }

    /// Detach everything and remove the panel. Decorations stay until the
    /// page replaces the cards.
    pub fn dispose(&mut self) {
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
        self.listeners.clear();
        self.shared.panel.borrow_mut().clear();
        if let Some(panel) = self.shared.page.query(&controls_selector()) {
            panel.remove();
        }
        tracing::debug!(message = "layer.disposed");
    }

    /// Rebuild and re-apply focus now.
    #[wasm_bindgen(js_name = ensureFocus)]
    pub fn ensure_focus(&self) -> Option<u32> {
        self.shared
            .with_engine(|engine| engine.ensure_focus())
            .flatten()
            .and_then(|flat| u32::try_from(flat).ok())
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.shared
            .engine
            .try_borrow()
            .is_ok_and(|engine| engine.is_active())
    }

    #[wasm_bindgen(js_name = focusedIndex)]
    pub fn focused_index(&self) -> Option<u32> {
        let engine = self.shared.engine.try_borrow().ok()?;
        u32::try_from(engine.cursor()?).ok()
    }

    /// Title of the focused card, for screen-reader announcements.
    #[wasm_bindgen(js_name = focusedLabel)]
    pub fn focused_label(&self) -> Option<String> {
        self.shared.engine.try_borrow().ok()?.focused_label()
    }

    /// Card count per retained row, top to bottom.
    #[wasm_bindgen(js_name = rowLengths)]
    pub fn row_lengths(&self) -> Vec<u32> {
        self.shared
            .engine
            .try_borrow()
            .map(|engine| {
                engine
                    .index()
                    .row_lengths()
                    .into_iter()
                    .filter_map(|len| u32::try_from(len).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set a toggle by its stored field name (`hideChat`, ...).
    ///
    /// Returns `false` for an unknown field.
    #[wasm_bindgen(js_name = setPreference)]
    pub fn set_preference(&self, field: &str, value: bool) -> bool {
        let Some(key) = PreferenceKey::from_field(field) else {
            return false;
        };
        self.shared
            .with_engine(|engine| engine.set_preference(key, value));
        if let Some(input) = self
            .shared
            .page
            .document()
            .get_element_by_id(&toggle_input_id(key))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_checked(value);
        }
        true
    }

    /// Current preferences as the stored JSON record.
    #[wasm_bindgen(js_name = preferencesJson)]
    pub fn preferences_json(&self) -> Result<String, JsValue> {
        let prefs = self
            .shared
            .engine
            .try_borrow()
            .map(|engine| engine.preferences())
            .map_err(|_| JsValue::from_str("tvlayer: engine busy"))?;
        prefs
            .to_json()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}

impl Drop for TvLayer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Create and start a layer in one call.
#[wasm_bindgen(js_name = startTvLayer)]
pub fn start_tv_layer(config_json: Option<String>) -> Result<TvLayer, JsValue> {
    let mut layer = TvLayer::new(config_json)?;
    layer.start()?;
    Ok(layer)
}
