//! Free-camera playground: the draw vocabulary on display. Tab cycles scenes.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use toy_engine::draw::{Draw, LocalDraw};
use toy_engine::input::Key;
use toy_engine::{Color, Game, GameCtx};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Scene {
    #[default]
    Shapes,
    Vortex,
    Boxes,
}

impl Scene {
    pub fn next(self) -> Self {
        match self {
            Scene::Shapes => Scene::Vortex,
            Scene::Vortex => Scene::Boxes,
            Scene::Boxes => Scene::Shapes,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Scene::Shapes => "shapes",
            Scene::Vortex => "vortex",
            Scene::Boxes => "boxes",
        }
    }
}

/// One grid sample of the vortex field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VortexSample {
    pub position: Vec3,
    /// Tangential flow, magnitude `1 / r`.
    pub swirl: Vec3,
    /// Pull toward the center, magnitude `1 / r^3`.
    pub pull: Vec3,
}

/// Samples a vortex around the origin on a `2n x 2n` ground grid.
///
/// The center sample is skipped since the field is singular there.
pub fn vortex_field(n: i32, step: f32) -> impl Iterator<Item = VortexSample> {
    (-n..n).flat_map(move |i| (-n..n).map(move |j| Vec3::new(i as f32 * step, 0.0, j as f32 * step)))
        .filter_map(|position| {
            let r = position.length();
            let radial = position.try_normalize()?;
            let tangent = Vec3::Y.cross(radial);
            Some(VortexSample {
                position,
                swirl: tangent / r,
                pull: -radial / (r * r * r),
            })
        })
}

#[derive(Default)]
pub struct Sandbox {
    scene: Scene,
    time: f32,
}

impl Sandbox {
    fn shapes(&self, ctx: &mut GameCtx<'_>) {
        let t = self.time;
        let draw = &mut *ctx.draw;

        draw.draw_axis(&Mat4::IDENTITY, 10.0);
        draw.draw_grid(10.0, 5, Color::LIGHT_GRAY);
        draw.draw_grid(1.0, 10, ctx.palette.grid);

        // Screen corners and center, only meaningful looking straight down.
        if ctx.camera.is_top_down() {
            let size = ctx.camera.viewport_size();
            for (screen, color) in [
                (size * 0.5, Color::RED),
                (Vec2::ZERO, Color::GREEN),
                (size, Color::BLUE),
            ] {
                draw.draw_sphere(ctx.camera.top_down_screen_to_world(screen), 1.0, color);
            }
        }

        // Nested frame rising along +Y.
        let model = Mat4::IDENTITY;
        let rising = model * Mat4::from_translation(Vec3::new(0.0, 2.0 * t, 0.0));
        LocalDraw::new(&mut *draw, rising).draw_sphere(Vec3::ZERO, 5.0, Color::MAGENTA);

        let mut local = LocalDraw::new(&mut *draw, model);
        local.draw_point(Vec3::new(0.0, 2.0, 0.0), Color::RED);
        local.draw_line(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0), Color::RED);
        local.draw_sphere(Vec3::new(0.0, 3.0, 0.0), 2.0, Color::BLUE);

        let tilted = Mat4::from_rotation_translation(
            Quat::from_euler(EulerRot::XYZ, 0.8, 0.2, 0.0),
            Vec3::new(1.0, 2.0, 4.0),
        );
        local.draw_cone(&tilted, 1.0, 2.0, Color::RED);
        local.draw_axis(&tilted, 1.0);
        local.draw_cube(Vec3::ZERO, 1.0, Color::RED);
        local.draw_box(&tilted, Color::GREEN);

        let zigzag: Vec<Vec3> = (0..8)
            .map(|i| Vec3::new(-8.0 + i as f32, 0.5 + (i % 2) as f32, -6.0))
            .collect();
        local.draw_polyline(&zigzag, Color::CYAN);

        let (top, tip) = (Vec3::new(0.0, 100.0, 0.0), Vec3::new(3.0, 6.0, 9.0));
        local.draw_line(top, tip, Color::CYAN);
        let orbit = Vec3::new(t.cos(), t.sin(), 1.0) * 30.0;
        for (start, end, radius) in [(top, tip, 1.0), (Vec3::new(0.0, 10.0, 0.0), orbit, 3.0)] {
            if let Err(err) = local.draw_cylinder(start, end, radius, Color::RED) {
                log::warn!("{err}");
            }
        }
        local.draw_sphere(orbit, 3.0, Color::CYAN);

        // Label that follows a world point.
        let anchor = ctx.camera.world_to_overlay(Vec3::new(0.0, 3.0, 0.0));
        if (0.0..=1.0).contains(&anchor.z) {
            ctx.text.draw_text(anchor.truncate(), "sphere", 0.4, Color::BLUE);
        }
    }

    fn vortex(&self, ctx: &mut GameCtx<'_>) {
        let draw = &mut *ctx.draw;
        for sample in vortex_field(25, 0.5) {
            let p = sample.position;
            draw.draw_line(p, p + sample.swirl, Color::RED);
            draw.draw_line(p, p + sample.pull, Color::GREEN);
            draw.draw_point(p, Color::BLACK);
        }
    }

    fn boxes(&self, ctx: &mut GameCtx<'_>) {
        let draw = &mut *ctx.draw;
        draw.draw_axis(&Mat4::IDENTITY, 2.0);
        draw.draw_grid(1.0, 10, ctx.palette.grid);

        let r = Mat4::from_quat(Quat::from_rotation_y(self.time));
        let s = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        // Scale then rotate keeps the box rigid; rotate then scale shears it.
        draw.draw_box(&(r * s), Color::GREEN);
        draw.draw_box(&(s * r), Color::YELLOW);
    }
}

impl Game for Sandbox {
    fn update(&mut self, ctx: &mut GameCtx<'_>) {
        self.time += ctx.dt;
        if ctx.key_pressed(Key::Tab) {
            self.scene = self.scene.next();
            log::info!("scene: {}", self.scene.name());
        }
    }

    fn draw(&mut self, ctx: &mut GameCtx<'_>) {
        match self.scene {
            Scene::Shapes => self.shapes(ctx),
            Scene::Vortex => self.vortex(ctx),
            Scene::Boxes => self.boxes(ctx),
        }

        let hud = format!("{} (tab)\nt = {:.1}", self.scene.name(), self.time);
        ctx.draw_text(Vec2::new(10.0, 570.0), hud, 0.5, ctx.palette.text);
    }
}
