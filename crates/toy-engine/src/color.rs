//! Opaque RGB colors and the named palette the debug draw API uses.

/// Opaque RGB color, components in `[0, 1]`.
///
/// Vertex colors carry no alpha; text and primitives are drawn opaque and
/// the glyph atlas supplies coverage.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const LIGHT_GRAY: Color = Color::gray(0.827_451);
    pub const GRAY: Color = Color::gray(0.5);
    /// X11 "dark gray", which is lighter than `GRAY`.
    pub const DARK_GRAY: Color = Color::gray(0.662_745);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// `vec4` form used by shader uniforms; alpha is always 1.
    #[inline]
    pub const fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}

/// Role-based colors handed to games by reference.
///
/// Keeps scene code free of hard-coded color choices for things every demo
/// draws (background, grid, labels).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub text: Color,
    pub highlight: Color,
    pub friendly: Color,
    pub hostile: Color,
    pub obstacle: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            grid: Color::GRAY,
            text: Color::BLACK,
            highlight: Color::MAGENTA,
            friendly: Color::GREEN,
            hostile: Color::RED,
            obstacle: Color::BLACK,
        }
    }
}
