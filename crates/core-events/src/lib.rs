//! Host-side input event types for chordwise.
//!
//! The engine itself only understands canonical chord text (`core-keymap`).
//! Hosts usually receive richer key events from a terminal or GUI toolkit;
//! this crate is the neutral shape those events take on their way in, plus the
//! synthetic timer event a host loop emits when an armed deadline elapses.

use std::time::Instant;

/// Normalized input events accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Logical key press with token model, timestamp, and repeat flag.
    ///
    /// Invariants:
    /// * `KeyEventExt::timestamp` is monotonic per input source.
    /// * `KeyEventExt::repeat` is `true` only for auto-repeat events reported
    ///   by the host (it must not be synthesized downstream).
    KeyPress(KeyEventExt),
    /// Mouse event (position + kind + modifiers). Only drag selections are
    /// interpreted; everything else is ignored by the dispatcher.
    Mouse(MouseEvent),
    /// The host loop slept until `next_deadline()` and the deadline elapsed.
    /// Equivalent to polling the timers at the carried instant.
    TimeoutElapsed(Instant),
}

// -------------------------------------------------------------------------------------------------
// Key Types
// -------------------------------------------------------------------------------------------------
/// Rich keypress metadata.
///
/// Fields:
/// * `token`: Logical key identity (character, named key, or chord).
/// * `repeat`: Whether this event was reported as an auto-repeat.
/// * `timestamp`: Instant captured when the host observed the event. The
///   dispatcher uses it as "now" for timer arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEventExt {
    pub token: KeyToken,
    pub repeat: bool,
    pub timestamp: Instant,
}

impl KeyEventExt {
    /// Create a `KeyEventExt` using the current instant and `repeat = false`.
    pub fn new(token: KeyToken) -> Self {
        Self::from_parts(token, false, Instant::now())
    }

    /// Create a `KeyEventExt` with caller supplied timestamp (primarily for tests).
    pub fn from_parts(token: KeyToken, repeat: bool, timestamp: Instant) -> Self {
        Self {
            token,
            repeat,
            timestamp,
        }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

/// Canonical logical key tokens.
///
/// `KeyToken::Chord` wraps a base token plus modifier mask so consumers can
/// reconstruct combinations such as `<C-d>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

impl KeyToken {
    /// Convenience constructor for a modified key.
    pub fn chord(base: KeyToken, mods: ModMask) -> Self {
        KeyToken::Chord {
            base: Box::new(base),
            mods,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Mouse Types
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub column: u16,
    pub row: u16,
    pub mods: ModMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
    Moved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseEvent {
    /// A left-button drag extends a selection.
    pub fn is_selection_drag(&self) -> bool {
        matches!(self.kind, MouseEventKind::Drag(MouseButton::Left))
    }
}
