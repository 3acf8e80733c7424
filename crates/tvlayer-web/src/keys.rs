#![forbid(unsafe_code)]

//! DOM keyboard event translation.

use tvlayer_core::{KeyEvent, Modifiers, normalize_dom_key};

/// Modifier bits as packed by [`pack_modifiers`]; same layout as [`Modifiers`].
#[must_use]
pub const fn modifiers_from_bits(bits: u8) -> Modifiers {
    Modifiers::from_bits_truncate(bits)
}

/// Pack DOM modifier flags.
#[must_use]
pub const fn pack_modifiers(shift: bool, alt: bool, ctrl: bool, meta: bool) -> u8 {
    (shift as u8) | ((alt as u8) << 1) | ((ctrl as u8) << 2) | ((meta as u8) << 3)
}

/// Canonical event for a DOM `KeyboardEvent.key` value.
#[must_use]
pub fn dom_key_event(key: &str, modifier_bits: u8) -> KeyEvent {
    KeyEvent::new(normalize_dom_key(key)).with_modifiers(modifiers_from_bits(modifier_bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvlayer_core::{KeyCode, NavDirection};

    #[test]
    fn arrows_map_to_directions() {
        let cases = [
            ("ArrowUp", NavDirection::Up),
            ("ArrowDown", NavDirection::Down),
            ("ArrowLeft", NavDirection::Left),
            ("ArrowRight", NavDirection::Right),
        ];
        for (key, dir) in cases {
            assert_eq!(dom_key_event(key, 0).direction(), Some(dir), "{key}");
        }
    }

    #[test]
    fn packed_bits_round_trip() {
        let bits = pack_modifiers(true, false, true, false);
        assert_eq!(modifiers_from_bits(bits), Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(modifiers_from_bits(pack_modifiers(false, false, false, true)), Modifiers::SUPER);
    }

    #[test]
    fn command_modifiers_detected() {
        let ev = dom_key_event("Enter", pack_modifiers(false, false, false, true));
        assert_eq!(ev.code, KeyCode::Enter);
        assert!(ev.has_command_modifier());
        assert!(!dom_key_event("ArrowDown", pack_modifiers(true, false, false, false)).has_command_modifier());
    }
}
