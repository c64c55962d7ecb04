use std::collections::HashSet;

use glam::Vec2;

use super::types::{Key, MouseButton};

/// What changed since the last frame. Cleared by the runtime after each redraw.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    /// Summed pointer motion, +Y down.
    pub pointer_delta: Vec2,
    pub scroll_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        self.pointer_delta = Vec2::ZERO;
        self.scroll_lines = 0.0;
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }
}
