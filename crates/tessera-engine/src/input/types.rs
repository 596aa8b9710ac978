use std::fmt;

/// Keyboard key identifier.
///
/// Covers the keys a grid simulation typically binds. Anything else arrives
/// as `Key::Unknown` carrying the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Modifiers as keys (useful for focus/navigation policies)
    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
///
/// This is stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer move event in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer button event.
///
/// Coordinates are included to make event processing independent from an external
/// "current pointer position" if desired.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Runtime translates window system events into these.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// Stable platform code when available (e.g. scancode).
        code: u32,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

impl Key {
    /// Legacy DOM `keyCode` for this key; `0` when there is none.
    pub fn legacy_code(self) -> u32 {
        use Key::*;
        match self {
            Backspace => 8,
            Tab => 9,
            Enter => 13,
            Shift => 16,
            Control => 17,
            Alt => 18,
            Escape => 27,
            Space => 32,
            PageUp => 33,
            PageDown => 34,
            End => 35,
            Home => 36,
            ArrowLeft => 37,
            ArrowUp => 38,
            ArrowRight => 39,
            ArrowDown => 40,
            Insert => 45,
            Delete => 46,
            Meta => 91,

            Digit0 => 48,
            Digit1 => 49,
            Digit2 => 50,
            Digit3 => 51,
            Digit4 => 52,
            Digit5 => 53,
            Digit6 => 54,
            Digit7 => 55,
            Digit8 => 56,
            Digit9 => 57,

            A => 65, B => 66, C => 67, D => 68, E => 69, F => 70, G => 71,
            H => 72, I => 73, J => 74, K => 75, L => 76, M => 77, N => 78,
            O => 79, P => 80, Q => 81, R => 82, S => 83, T => 84, U => 85,
            V => 86, W => 87, X => 88, Y => 89, Z => 90,

            F1 => 112,
            F2 => 113,
            F3 => 114,
            F4 => 115,
            F5 => 116,
            F6 => 117,
            F7 => 118,
            F8 => 119,
            F9 => 120,
            F10 => 121,
            F11 => 122,
            F12 => 123,

            Unknown(_) => 0,
        }
    }
}

/// The key's variant name, e.g. `ArrowLeft` or `Q`.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unknown(code) => write!(f, "Unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}
