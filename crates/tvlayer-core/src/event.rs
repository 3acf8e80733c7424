#![forbid(unsafe_code)]

//! Canonical key events.
//!
//! The host page delivers DOM `KeyboardEvent`s; the adapter normalizes them
//! into [`KeyEvent`] values so the engine never deals with key name strings.
//!
//! # Design Notes
//!
//! - Only the keys a remote control can produce get dedicated variants.
//!   Everything else collapses to `Char` or `Unidentified`.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if a browser-shortcut modifier (Ctrl, Alt, Super) is held.
    ///
    /// Shift alone does not count.
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SUPER))
    }

    /// Direction for arrow keys, `None` for everything else.
    #[must_use]
    pub const fn direction(&self) -> Option<NavDirection> {
        self.code.direction()
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// Any other named key.
    Unidentified,
}

impl KeyCode {
    /// Map arrow keys to their navigation direction.
    #[must_use]
    pub const fn direction(self) -> Option<NavDirection> {
        match self {
            Self::Up => Some(NavDirection::Up),
            Self::Down => Some(NavDirection::Down),
            Self::Left => Some(NavDirection::Left),
            Self::Right => Some(NavDirection::Right),
            _ => None,
        }
    }

    /// Keys that return from the toggle panel to the grid.
    #[must_use]
    pub const fn is_back(self) -> bool {
        matches!(self, Self::Escape | Self::Backspace)
    }
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Direction of a spatial navigation move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

impl NavDirection {
    /// All four directions, in a fixed order.
    pub const ALL: [NavDirection; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// True for left/right moves within a row.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Signed step along the axis of movement (`-1` or `+1`).
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Up | Self::Left => -1,
            Self::Down | Self::Right => 1,
        }
    }
}

/// Normalize a DOM `KeyboardEvent.key` value into a [`KeyCode`].
#[must_use]
pub fn normalize_dom_key(dom_key: &str) -> KeyCode {
    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        return KeyCode::Char(first);
    }

    match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "ArrowUp" | "Up" => KeyCode::Up,
        "ArrowDown" | "Down" => KeyCode::Down,
        "ArrowLeft" | "Left" => KeyCode::Left,
        "ArrowRight" | "Right" => KeyCode::Right,
        "Spacebar" => KeyCode::Char(' '),
        _ => KeyCode::Unidentified,
    }
}
