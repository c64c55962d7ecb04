use glam::{Mat4, Vec2, Vec3};

/// Height of the text overlay in design units; width follows the aspect.
pub const OVERLAY_HEIGHT: f32 = 600.0;

const PERSPECTIVE_NEAR: f32 = 0.1;
const PERSPECTIVE_FAR: f32 = 1000.0;
const ORTHO_NEAR: f32 = 0.0;
const ORTHO_FAR: f32 = 1000.0;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Ortho,
}

/// Initial camera placement and projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Half-height of the ortho view volume in world units.
    pub ortho_extent: f32,
    pub mode: ProjectionMode,
    /// Viewport size in logical pixels, replaced on the first resize.
    pub viewport: (f32, f32),
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 4.0, -10.0),
            at: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            ortho_extent: 10.0,
            mode: ProjectionMode::Perspective,
            viewport: (512.0, 512.0),
        }
    }
}

impl CameraConfig {
    /// Looking straight down from `height` with +Z as screen-up, ortho.
    pub fn top_down(height: f32, ortho_extent: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, height, 0.0),
            at: Vec3::ZERO,
            up: Vec3::Z,
            ortho_extent,
            mode: ProjectionMode::Ortho,
            ..Self::default()
        }
    }
}

/// A half-line in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Where the ray meets the `y = 0` plane, if it does in front of the origin.
    pub fn intersect_ground(&self) -> Option<Vec3> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = -self.origin.y / self.direction.y;
        (t >= 0.0).then(|| {
            let mut hit = self.at(t);
            hit.y = 0.0;
            hit
        })
    }
}

/// Right-handed look-at camera.
///
/// Both projections are kept up to date; [`mode`](Self::mode) picks which
/// one [`view_projection`](Self::view_projection) uses. Screen coordinates
/// are logical pixels with a top-left origin, matching pointer input.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    at: Vec3,
    up: Vec3,
    fov: f32,
    ortho_extent: f32,
    width: f32,
    height: f32,
    aspect: f32,
    mode: ProjectionMode,
    view: Mat4,
    perspective: Mat4,
    ortho: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            eye: config.eye,
            at: config.at,
            up: config.up,
            fov: config.fov,
            ortho_extent: config.ortho_extent,
            width: 1.0,
            height: 1.0,
            aspect: 1.0,
            mode: config.mode,
            view: Mat4::IDENTITY,
            perspective: Mat4::IDENTITY,
            ortho: Mat4::IDENTITY,
        };
        camera.set_look_at(config.eye, config.at, config.up);
        camera.set_viewport_size(config.viewport.0, config.viewport.1);
        camera
    }

    // ── mode ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        if self.mode != mode {
            log::debug!("camera projection: {mode:?}");
        }
        self.mode = mode;
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    #[inline]
    pub fn at(&self) -> Vec3 {
        self.at
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// `(eye, at, up)`.
    pub fn look_at(&self) -> (Vec3, Vec3, Vec3) {
        (self.eye, self.at, self.up)
    }

    /// Moves the camera and rebuilds the view matrix immediately.
    pub fn set_look_at(&mut self, eye: Vec3, at: Vec3, up: Vec3) {
        self.eye = eye;
        self.at = at;
        self.up = up;
        self.view = Mat4::look_at_rh(eye, at, up);
    }

    /// Unit vector from eye to target, or `-Z` when they coincide.
    pub fn direction(&self) -> Vec3 {
        (self.at - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// True when looking straight down with +Z as screen-up.
    pub fn is_top_down(&self) -> bool {
        self.up.abs_diff_eq(Vec3::Z, 1e-6)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    // ── projection ────────────────────────────────────────────────────────

    /// Updates the aspect ratio and rebuilds both projections.
    ///
    /// Zero sizes (minimized windows) are clamped to one pixel.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.aspect = self.width / self.height;
        self.set_perspective(self.fov);
        self.set_ortho(self.ortho_extent);
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_perspective(&mut self, fov: f32) {
        self.fov = fov;
        self.perspective = Mat4::perspective_rh(fov, self.aspect, PERSPECTIVE_NEAR, PERSPECTIVE_FAR);
    }

    #[inline]
    pub fn ortho_extent(&self) -> f32 {
        self.ortho_extent
    }

    pub fn set_ortho(&mut self, extent: f32) {
        self.ortho_extent = extent;
        let half_width = extent * self.aspect;
        self.ortho = Mat4::orthographic_rh(-half_width, half_width, -extent, extent, ORTHO_NEAR, ORTHO_FAR);
    }

    pub fn perspective_projection(&self) -> Mat4 {
        self.perspective
    }

    pub fn ortho_projection(&self) -> Mat4 {
        self.ortho
    }

    pub fn projection(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => self.perspective,
            ProjectionMode::Ortho => self.ortho,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view
    }

    // ── overlay ───────────────────────────────────────────────────────────

    /// Overlay extent: `(OVERLAY_HEIGHT * aspect, OVERLAY_HEIGHT)`.
    pub fn overlay_size(&self) -> Vec2 {
        Vec2::new(OVERLAY_HEIGHT * self.aspect, OVERLAY_HEIGHT)
    }

    /// Projection for text: origin bottom-left, +Y up, 600 units high.
    pub fn overlay_view_projection(&self) -> Mat4 {
        let size = self.overlay_size();
        Mat4::orthographic_rh(0.0, size.x, 0.0, size.y, -1.0, 1.0)
    }

    // ── conversions ───────────────────────────────────────────────────────

    /// Projects `position` to window pixels (top-left origin); `z` is the
    /// normalized depth, `0` at the near plane.
    pub fn world_to_screen(&self, position: Vec3) -> Vec3 {
        let ndc = self.view_projection().project_point3(position);
        Vec3::new(
            (ndc.x + 1.0) * self.width * 0.5,
            (1.0 - ndc.y) * self.height * 0.5,
            ndc.z,
        )
    }

    /// Projects `position` into overlay units, ready for text placement;
    /// `z` grows toward the camera.
    pub fn world_to_overlay(&self, position: Vec3) -> Vec3 {
        let ndc = self.view_projection().project_point3(position);
        let size = self.overlay_size();
        Vec3::new((ndc.x + 1.0) * size.x * 0.5, (ndc.y + 1.0) * size.y * 0.5, 1.0 - ndc.z)
    }

    /// Ground-plane point under a window-pixel position.
    ///
    /// Inverts the ortho projection by hand and only holds for the top-down
    /// setup (`up = +Z`, looking along `-Y`); the result always has `y = 0`.
    /// Use [`screen_to_ray`](Self::screen_to_ray) for anything else.
    pub fn top_down_screen_to_world(&self, screen: Vec2) -> Vec3 {
        let ndc_x = screen.x / self.width * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / self.height * 2.0;

        let p = self.ortho;
        let view_x = (ndc_x - p.w_axis.x) / p.x_axis.x;
        let view_y = (ndc_y - p.w_axis.y) / p.y_axis.y;

        let forward = self.direction();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);

        let mut world = self.eye + right * view_x + up * view_y;
        world.y = 0.0;
        world
    }

    /// World-space ray through a window-pixel position for the current mode.
    pub fn screen_to_ray(&self, screen: Vec2) -> Ray {
        let ndc = Vec2::new(screen.x / self.width * 2.0 - 1.0, 1.0 - screen.y / self.height * 2.0);
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).try_normalize().unwrap_or(self.direction()),
        }
    }
}
