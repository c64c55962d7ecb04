use glam::{Quat, Vec2, Vec3};

use crate::input::{InputFrame, InputState, Key, MouseButton};

use super::view::{Camera, ProjectionMode};

const MIN_ORTHO_EXTENT: f32 = 0.1;
const ZOOM_IN: f32 = 0.9;
const ZOOM_OUT: f32 = 1.3;

/// Free-fly camera controller.
///
/// Keys: `W`/`S` forward and back, `A`/`D` strafe, `E`/`Q` up and down,
/// `O`/`P` switch to ortho/perspective, `F9`/`F10`/`F11` jump to the side,
/// top-down and front views. Middle drag pans, other drags rotate; when the
/// camera is top-down every drag pans. The wheel dollies in perspective and
/// zooms toward the pointer in ortho.
#[derive(Debug, Clone)]
pub struct FreeviewController {
    /// World units per second for key movement.
    pub move_speed: f32,
    /// Radians per pixel per second of drag.
    pub rotate_speed: f32,
    /// World units per scroll line in perspective.
    pub scroll_move_speed: f32,
    drag: Vec2,
    pan: Vec2,
}

impl Default for FreeviewController {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            rotate_speed: 0.3,
            scroll_move_speed: 2.0,
            drag: Vec2::ZERO,
            pan: Vec2::ZERO,
        }
    }
}

impl FreeviewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes this frame's input: mode/preset keys and the wheel act
    /// immediately, drags accumulate until [`update`](Self::update).
    pub fn handle_input(&mut self, camera: &mut Camera, input: &InputState, frame: &InputFrame) {
        for key in [Key::O, Key::P, Key::F9, Key::F10, Key::F11] {
            if frame.key_pressed(key) {
                self.on_key(camera, key);
            }
        }

        if frame.pointer_delta != Vec2::ZERO {
            // Pointer +Y is down; drags are accumulated +Y up.
            let delta = frame.pointer_delta * Vec2::new(1.0, -1.0);
            if input.button_down(MouseButton::Middle) {
                self.pan += delta;
            } else if input.button_down(MouseButton::Left) || input.button_down(MouseButton::Right) {
                self.drag += delta;
            }
        }

        if frame.scroll_lines != 0.0 {
            self.on_scroll(camera, frame.scroll_lines, input.pointer_or_origin());
        }
    }

    pub fn on_key(&mut self, camera: &mut Camera, key: Key) {
        match key {
            Key::O => camera.set_mode(ProjectionMode::Ortho),
            Key::P => camera.set_mode(ProjectionMode::Perspective),
            Key::F9 => camera.set_look_at(Vec3::new(-30.0, 0.0, 0.0), Vec3::ZERO, Vec3::Y),
            Key::F10 => camera.set_look_at(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, Vec3::Z),
            Key::F11 => camera.set_look_at(Vec3::new(0.0, 0.0, -30.0), Vec3::ZERO, Vec3::Y),
            _ => {}
        }
    }

    /// `scroll` is in lines, positive away from the user; `pointer` in window pixels.
    pub fn on_scroll(&mut self, camera: &mut Camera, scroll: f32, pointer: Vec2) {
        let (eye, _, up) = camera.look_at();
        match camera.mode() {
            ProjectionMode::Perspective => {
                let direction = camera.direction();
                let eye = eye + direction * self.scroll_move_speed * scroll;
                camera.set_look_at(eye, eye + direction, up);
            }
            ProjectionMode::Ortho => {
                let extent = camera.ortho_extent();
                let factor = if scroll > 0.0 { ZOOM_IN } else { ZOOM_OUT };
                let new_extent = (extent * factor).max(MIN_ORTHO_EXTENT);
                camera.set_ortho(new_extent);

                if camera.is_top_down() {
                    // Keep the ground point under the pointer fixed.
                    let pointer_world = camera.top_down_screen_to_world(pointer);
                    let mut shift = (pointer_world - eye) * (extent / new_extent - 1.0);
                    shift.y = 0.0;
                    let eye = eye + shift;
                    camera.set_look_at(eye, eye - Vec3::Y, up);
                }
            }
        }
    }

    /// Applies held movement keys and the drags accumulated since the last call.
    pub fn update(&mut self, camera: &mut Camera, input: &InputState, dt: f32) {
        let axis = |pos: Key, neg: Key| input.key_down(pos) as i32 as f32 - input.key_down(neg) as i32 as f32;
        let step = self.move_speed * dt;
        let mut going_up = axis(Key::E, Key::Q) * step;
        let mut going_right = axis(Key::D, Key::A) * step;
        let going_forward = axis(Key::W, Key::S) * step;

        let (mut eye, _, up) = camera.look_at();
        let mut direction = camera.direction();

        let mut pan = std::mem::take(&mut self.pan);
        let mut drag = std::mem::take(&mut self.drag);
        if camera.is_top_down() {
            pan += drag;
            drag = Vec2::ZERO;
        }

        let height = camera.viewport_size().y;
        let pan_scale = match camera.mode() {
            ProjectionMode::Perspective => eye.y * (camera.fov() * 0.5).tan() * 2.0 / height,
            ProjectionMode::Ortho => camera.ortho_extent() * 2.0 / height,
        };
        going_up -= pan.y * pan_scale;
        going_right -= pan.x * pan_scale;

        let right = direction.cross(up).normalize_or_zero();
        match camera.mode() {
            ProjectionMode::Perspective => {
                eye += up * going_up + direction * going_forward + right * going_right;
            }
            ProjectionMode::Ortho => {
                // No depth cue in ortho: forward moves along screen-up.
                eye += up * (going_up + going_forward) + right * going_right;
            }
        }

        if drag != Vec2::ZERO {
            let rotate = self.rotate_speed * dt;
            let axis_up = up.try_normalize().unwrap_or(Vec3::Y);
            direction = Quat::from_axis_angle(axis_up, -drag.x * rotate) * direction;
            if let Some(right) = direction.cross(up).try_normalize() {
                direction = Quat::from_axis_angle(right, drag.y * rotate) * direction;
            }
        }

        camera.set_look_at(eye, eye + direction, up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::input::{InputEvent, Press};

    fn press(state: &mut InputState, frame: &mut InputFrame, key: Key) {
        state.apply_event(
            frame,
            InputEvent::Key {
                key,
                press: Press::Down,
                repeat: false,
            },
        );
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn mode_and_preset_keys() {
        let mut camera = Camera::default();
        let mut controller = FreeviewController::new();
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        press(&mut state, &mut frame, Key::O);
        press(&mut state, &mut frame, Key::F10);
        controller.handle_input(&mut camera, &state, &frame);

        assert_eq!(camera.mode(), ProjectionMode::Ortho);
        assert_eq!(camera.eye(), Vec3::new(0.0, 50.0, 0.0));
        assert!(camera.is_top_down());

        frame.clear();
        press(&mut state, &mut frame, Key::P);
        controller.handle_input(&mut camera, &state, &frame);
        assert_eq!(camera.mode(), ProjectionMode::Perspective);
    }

    #[test]
    fn held_w_moves_forward_by_speed_times_dt() {
        let mut camera = Camera::default();
        let mut controller = FreeviewController::new();
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        press(&mut state, &mut frame, Key::W);

        let before = camera.eye();
        let direction = camera.direction();
        controller.update(&mut camera, &state, 0.5);

        assert!(close(camera.eye(), before + direction * 10.0));
        assert!(close(camera.direction(), direction));
    }

    #[test]
    fn ortho_forward_moves_along_up() {
        let mut camera = Camera::default();
        camera.set_mode(ProjectionMode::Ortho);
        let mut controller = FreeviewController::new();
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        press(&mut state, &mut frame, Key::W);

        let before = camera.eye();
        controller.update(&mut camera, &state, 0.1);
        assert!(close(camera.eye(), before + Vec3::Y * 2.0));
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn left_drag_rotates_without_moving() {
        let mut camera = Camera::default();
        let mut controller = FreeviewController::new();
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(100.0, 100.0)));
        state.apply_event(
            &mut frame,
            InputEvent::Button {
                button: MouseButton::Left,
                press: Press::Down,
            },
        );
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(140.0, 100.0)));
        controller.handle_input(&mut camera, &state, &frame);

        let eye = camera.eye();
        let direction = camera.direction();
        controller.update(&mut camera, &state, 0.1);

        assert!(close(camera.eye(), eye));
        assert!(!close(camera.direction(), direction));
        assert!((camera.direction().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ortho_scroll_zooms_and_clamps() {
        let mut camera = Camera::new(&CameraConfig::top_down(50.0, 10.0));
        let mut controller = FreeviewController::new();
        let center = camera.viewport_size() * 0.5;

        controller.on_scroll(&mut camera, 1.0, center);
        assert!((camera.ortho_extent() - 9.0).abs() < 1e-5);
        // Zooming at the center keeps the camera over the origin.
        assert!(close(camera.eye(), Vec3::new(0.0, 50.0, 0.0)));

        controller.on_scroll(&mut camera, -1.0, center);
        assert!((camera.ortho_extent() - 11.7).abs() < 1e-4);

        camera.set_ortho(0.1);
        controller.on_scroll(&mut camera, 1.0, center);
        assert_eq!(camera.ortho_extent(), MIN_ORTHO_EXTENT);
    }

    #[test]
    fn top_down_zoom_keeps_pointer_ground_point() {
        let mut camera = Camera::new(&CameraConfig::top_down(50.0, 10.0));
        let mut controller = FreeviewController::new();
        let pointer = Vec2::new(100.0, 400.0);

        let before = camera.top_down_screen_to_world(pointer);
        controller.on_scroll(&mut camera, 1.0, pointer);
        let after = camera.top_down_screen_to_world(pointer);

        assert!(close(before, after));
        assert_eq!(camera.at(), camera.eye() - Vec3::Y);
    }

    #[test]
    fn perspective_scroll_dollies() {
        let mut camera = Camera::default();
        let mut controller = FreeviewController::new();
        let eye = camera.eye();
        let direction = camera.direction();
        controller.on_scroll(&mut camera, 2.0, Vec2::ZERO);
        assert!(close(camera.eye(), eye + direction * 4.0));
    }
}
