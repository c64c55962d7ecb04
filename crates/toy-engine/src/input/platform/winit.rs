use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::input::{InputEvent, Key, MouseButton, Press};

/// High-precision wheels report pixels; this many logical pixels make a line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Maps a window event to an [`InputEvent`], or `None` when input ignores it.
pub(crate) fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<InputEvent> {
    let scale = window.scale_factor();
    match event {
        WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
            key: map_key(event.physical_key),
            press: map_press(event.state),
            repeat: event.repeat,
        }),
        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::Button {
            button: map_button(*button),
            press: map_press(*state),
        }),
        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f32>(scale);
            Some(InputEvent::PointerMoved(Vec2::new(logical.x, logical.y)))
        }
        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll(scroll_lines(delta, scale))),
        WindowEvent::Focused(focused) => Some(InputEvent::Focused(*focused)),
        _ => None,
    }
}

fn map_press(state: ElementState) -> Press {
    match state {
        ElementState::Pressed => Press::Down,
        ElementState::Released => Press::Up,
    }
}

fn scroll_lines(delta: &MouseScrollDelta, scale: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(p) => p.to_logical::<f32>(scale).y / PIXELS_PER_LINE,
    }
}

fn map_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(index) => MouseButton::Other(index),
    }
}

fn map_key(key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = key else {
        return Key::Unknown(0);
    };
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::Escape => Key::Escape,
        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::keyboard::NativeKeyCode;

    use super::*;

    #[test]
    fn bound_keys_map_by_position() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::ArrowLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::F10)), Key::F10);
    }

    #[test]
    fn unbound_keys_are_unknown() {
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::Digit1)), Key::Unknown(_)));
        assert_eq!(map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)), Key::Unknown(0));
    }

    #[test]
    fn pixel_scroll_becomes_lines() {
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 160.0));
        // 160 physical pixels at 2x are 80 logical pixels.
        assert_eq!(scroll_lines(&pixels, 2.0), 2.0);
        assert_eq!(scroll_lines(&MouseScrollDelta::LineDelta(0.0, -1.0), 1.0), -1.0);
    }

    #[test]
    fn extra_buttons_keep_distinct_indices() {
        assert_eq!(map_button(WinitButton::Middle), MouseButton::Middle);
        assert_ne!(map_button(WinitButton::Back), map_button(WinitButton::Forward));
    }
}
