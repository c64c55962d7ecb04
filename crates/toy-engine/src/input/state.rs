use std::collections::HashSet;

use glam::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, MouseButton, Press};

/// Held keys and buttons plus the pointer, for one window.
#[derive(Debug, Default)]
pub struct InputState {
    /// `None` while the pointer is outside the window.
    pub pointer: Option<Vec2>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `event` into the held state and records its edges in `frame`.
    ///
    /// Auto-repeat keeps a key held without pressing it again.
    pub fn apply_event(&mut self, frame: &mut InputFrame, event: InputEvent) {
        match event {
            InputEvent::Key { key, press, repeat } => match press {
                Press::Down => {
                    if self.keys_down.insert(key) && !repeat {
                        frame.keys_pressed.insert(key);
                    }
                }
                Press::Up => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::Button { button, press } => match press {
                Press::Down => {
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                Press::Up => {
                    self.buttons_down.remove(&button);
                }
            },

            InputEvent::PointerMoved(position) => {
                if let Some(previous) = self.pointer {
                    frame.pointer_delta += position - previous;
                }
                self.pointer = Some(position);
            }

            InputEvent::PointerLeft => self.pointer = None,

            InputEvent::Scroll(lines) => frame.scroll_lines += lines,

            // Releases are not delivered to unfocused windows.
            InputEvent::Focused(false) => {
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            InputEvent::Focused(true) => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn pointer_or_origin(&self) -> Vec2 {
        self.pointer.unwrap_or(Vec2::ZERO)
    }
}
