#![forbid(unsafe_code)]

//! DOM key names and adapter config driving the engine end to end.
//!
//! Run:
//!   cargo test -p tvlayer-web --test dom_key_flow

use pretty_assertions::assert_eq;
use tvlayer_nav::testing::MockPage;
use tvlayer_runtime::{Engine, KeyContext, KeyOutcome, MemoryStorage};
use tvlayer_web::LayerConfig;
use tvlayer_web::keys::{dom_key_event, pack_modifiers};
use tvlayer_web::markup::toggle_specs;

fn page(lengths: &[usize]) -> MockPage {
    let positions: Vec<(f64, f64)> = lengths
        .iter()
        .enumerate()
        .flat_map(|(r, &len)| (0..len).map(move |c| (c as f64 * 240.0, 120.0 + r as f64 * 280.0)))
        .collect();
    MockPage::grid(&positions)
}

fn engine(page: &MockPage, json: Option<&str>) -> Engine<MockPage, MemoryStorage> {
    let config = LayerConfig::from_json(json).unwrap();
    Engine::new(page.clone(), MemoryStorage::new(), config.engine)
}

fn press(engine: &mut Engine<MockPage, MemoryStorage>, key: &str, bits: u8) -> KeyOutcome {
    engine.on_key(dom_key_event(key, bits), KeyContext::default())
}

#[test]
fn arrow_names_move_focus() {
    let p = page(&[3, 4]);
    let mut e = engine(&p, None);
    e.on_route_change("/");

    assert_eq!(press(&mut e, "ArrowRight", 0), KeyOutcome::Consumed);
    assert_eq!(press(&mut e, "ArrowDown", 0), KeyOutcome::Consumed);
    assert_eq!(e.cursor(), Some(4));
    assert_eq!(press(&mut e, "ArrowUp", 0), KeyOutcome::Consumed);
    assert_eq!(e.cursor(), Some(1));
}

#[test]
fn browser_shortcuts_pass_through() {
    let p = page(&[3, 4]);
    let mut e = engine(&p, None);
    e.on_route_change("/");

    let ctrl = pack_modifiers(false, false, true, false);
    assert_eq!(press(&mut e, "ArrowRight", ctrl), KeyOutcome::Ignored);
    let meta = pack_modifiers(false, false, false, true);
    assert_eq!(press(&mut e, "Enter", meta), KeyOutcome::Ignored);
    assert_eq!(e.cursor(), Some(0));
}

#[test]
fn configured_home_paths_gate_activation() {
    let p = page(&[3, 3]);
    let mut e = engine(&p, Some(r#"{"engine":{"home_paths":["/following"]}}"#));
    e.on_route_change("/");
    assert!(!e.is_active());
    e.on_route_change("/following");
    assert!(e.is_active());
}

#[test]
fn panel_reflects_engine_preferences() {
    let p = page(&[3, 3]);
    let mut e = engine(&p, None);
    e.set_preference(tvlayer_runtime::PreferenceKey::HidePanels, false);

    let checked: Vec<bool> = toggle_specs(&e.preferences()).iter().map(|s| s.checked).collect();
    assert_eq!(checked, vec![true, true, false]);
}
