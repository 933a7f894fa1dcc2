/// Keyboard key identifier.
///
/// Only the keys the host and the interactive module react to are named.
/// Everything else maps to `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    ShiftLeft,
    ShiftRight,
    /// Either shift key. Never produced by the platform layer; a query for
    /// `InputState::key_down`.
    Shift,

    W,
    A,
    S,
    D,

    /// Platform-dependent key not represented here.
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
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Pointer button event in logical pixels.
///
/// Coordinates travel with the event so handlers (surface hit-testing) do not
/// depend on a separately tracked pointer position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
}

impl PointerButtonEvent {
    /// Primary-button press at `(x, y)`: what a "click" on the surface means.
    pub fn click(x: f32, y: f32) -> Self {
        Self {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
            x,
            y,
        }
    }

    pub fn is_primary_press(&self) -> bool {
        self.button == MouseButton::Left && self.state == MouseButtonState::Pressed
    }
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, state: KeyState },

    PointerMoved { x: f32, y: f32 },
    PointerButton(PointerButtonEvent),

    /// Raw relative motion, reported even while the pointer is locked.
    MouseMotion { dx: f32, dy: f32 },

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}
