//! Input events consumed by an emulation.
//!
//! The set is closed: a named key press with its modifiers, or a typed
//! character. Every event is tagged with the [`InputId`] of the target it
//! was addressed to, so one emulation can serve several independent inputs
//! (the main buffer, a prompt line, ...).

use std::fmt;

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// An input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A named key, possibly with modifiers.
    Key(KeyEvent),
    /// A printable character as typed.
    Character(char),
}

/// A key press with active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// An unmodified key press.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key pressed together with Ctrl.
    #[must_use]
    pub const fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A letter or symbol key, used with modifiers (`Ctrl-V`).
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl From<Key> for Event {
    fn from(key: Key) -> Self {
        Self::Key(KeyEvent::plain(key))
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

impl From<char> for Event {
    fn from(ch: char) -> Self {
        Self::Character(ch)
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Logical input target an event is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InputId(pub u32);

impl InputId {
    /// The main document input every emulation owns.
    pub const MAIN: Self = Self(0);
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input#{}", self.0)
    }
}

/// An event tagged with its target, as queued by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub source: InputId,
    pub event: Event,
}

impl InputEvent {
    #[must_use]
    pub fn new(source: InputId, event: impl Into<Event>) -> Self {
        Self {
            source,
            event: event.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
