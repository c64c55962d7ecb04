use glam::Vec2;

/// Keys the camera controller and the games bind to.
///
/// Everything else arrives as `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    O,
    P,
    F9,
    F10,
    F11,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Tab,
    Escape,
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Back/forward and extra buttons, by platform index.
    Other(u16),
}

/// Edge of a key or button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Press {
    Down,
    Up,
}

/// Window input, already in engine terms.
///
/// Positions are logical pixels with a top-left origin; scroll is in lines,
/// positive away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, press: Press, repeat: bool },
    Button { button: MouseButton, press: Press },
    PointerMoved(Vec2),
    PointerLeft,
    Scroll(f32),
    Focused(bool),
}
