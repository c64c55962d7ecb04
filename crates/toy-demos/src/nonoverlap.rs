//! Bodies that push each other apart.
//!
//! The arrow keys move the character; overlapping spheres are separated
//! after every update, shared by mobility. Blocks never move.

use glam::{Mat4, Vec2, Vec3};
use toy_engine::draw::{Draw, LocalDraw};
use toy_engine::input::Key;
use toy_engine::world::{Registry, Step};
use toy_engine::{Camera, Color, Game, GameCtx, Palette, ProjectionMode};

use crate::actor::{Actor, Tick, draw_actors, update_actors};

const CHARACTER_SPEED: f32 = 5.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BodyKind {
    /// Keyboard controlled.
    Character,
    Enemy,
    /// Immovable obstacle.
    Block,
}

impl BodyKind {
    fn mobility(self) -> f32 {
        match self {
            BodyKind::Block => 0.0,
            BodyKind::Character | BodyKind::Enemy => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec3,
    pub radius: f32,
}

impl Body {
    pub fn character(position: Vec3) -> Self {
        Self {
            kind: BodyKind::Character,
            position,
            radius: 1.0,
        }
    }

    pub fn enemy(position: Vec3) -> Self {
        Self {
            kind: BodyKind::Enemy,
            position,
            radius: 1.0,
        }
    }

    pub fn block(position: Vec3) -> Self {
        Self {
            kind: BodyKind::Block,
            position,
            radius: 3.0,
        }
    }
}

/// Arrow keys to a ground-plane direction: up is +Z, left is +X.
fn steering(tick: &Tick<'_>) -> Vec3 {
    let input = tick.input;
    let mut axis = Vec2::ZERO;
    if input.key_down(Key::ArrowUp) {
        axis.y += 1.0;
    }
    if input.key_down(Key::ArrowDown) {
        axis.y -= 1.0;
    }
    if input.key_down(Key::ArrowLeft) {
        axis.x += 1.0;
    } else if input.key_down(Key::ArrowRight) {
        axis.x -= 1.0;
    }
    Vec3::new(axis.x, 0.0, axis.y).normalize_or_zero()
}

impl Actor for Body {
    fn update(&mut self, tick: &Tick<'_>, _world: &Registry<Self>) -> Step {
        if self.kind == BodyKind::Character {
            self.position += steering(tick) * CHARACTER_SPEED * tick.dt;
        }
        Step::Continue
    }

    fn draw(&self, draw: &mut dyn Draw, palette: &Palette) {
        let color = match self.kind {
            BodyKind::Character => palette.hostile,
            BodyKind::Enemy => Color::BLUE,
            BodyKind::Block => palette.obstacle,
        };
        LocalDraw::new(draw, Mat4::from_translation(self.position)).draw_sphere(Vec3::ZERO, self.radius, color);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Position corrections `(for a, for b)` that end the overlap of two
/// bodies, or `None` when they do not overlap or cannot be separated.
///
/// Penetration is split by mobility: a block against a mobile body pushes
/// the mobile one the full distance. Coincident centers have no contact
/// normal and are left alone.
pub fn separation(a: &Body, b: &Body) -> Option<(Vec3, Vec3)> {
    let delta = b.position() - a.position();
    let penetration = a.radius() + b.radius() - delta.length();
    if penetration <= 0.0 {
        return None;
    }
    let normal = delta.try_normalize()?;

    let (ma, mb) = (a.kind.mobility(), b.kind.mobility());
    let total = ma + mb;
    if total == 0.0 {
        return None;
    }

    let push = normal * penetration;
    Some((-push * (ma / total), push * (mb / total)))
}

/// Resolves every overlapping pair once, in handle order.
///
/// Corrections are applied immediately, so later pairs see earlier moves.
/// Returns how many pairs were adjusted.
pub fn resolve_overlaps(world: &mut Registry<Body>) -> usize {
    let handles = world.handles();
    let mut resolved = 0;

    for (i, &ha) in handles.iter().enumerate() {
        for &hb in &handles[i + 1..] {
            let (Some(a), Some(b)) = (world.get(ha), world.get(hb)) else {
                continue;
            };
            let Some((da, db)) = separation(a, b) else {
                continue;
            };
            if let Some(a) = world.get_mut(ha) {
                a.position += da;
            }
            if let Some(b) = world.get_mut(hb) {
                b.position += db;
            }
            resolved += 1;
        }
    }
    resolved
}

#[derive(Default)]
pub struct NonOverlap {
    world: Registry<Body>,
}

impl Game for NonOverlap {
    fn init(&mut self, camera: &mut Camera) {
        camera.set_mode(ProjectionMode::Ortho);
        camera.set_look_at(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, Vec3::Z);

        self.world.spawn(Body::character(Vec3::ZERO));
        self.world.spawn(Body::enemy(Vec3::new(0.0, 0.0, 5.0)));
        self.world.spawn(Body::block(Vec3::new(5.0, 0.0, 0.0)));
        self.world.spawn(Body::block(Vec3::new(4.0, 0.0, 4.0)));
    }

    fn update(&mut self, ctx: &mut GameCtx<'_>) {
        ctx.draw.draw_grid(1.0, 10, ctx.palette.grid);

        let tick = Tick {
            dt: ctx.dt,
            input: ctx.input,
        };
        update_actors(&mut self.world, &tick);
        let pushed = resolve_overlaps(&mut self.world);
        if pushed > 0 {
            log::trace!("separated {pushed} pair(s)");
        }
    }

    fn draw(&mut self, ctx: &mut GameCtx<'_>) {
        draw_actors(&self.world, &mut *ctx.draw, ctx.palette);
        ctx.draw_text(Vec2::new(10.0, 570.0), "arrows to move", 0.5, ctx.palette.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toy_engine::input::InputState;

    fn world(bodies: impl IntoIterator<Item = Body>) -> Registry<Body> {
        let mut world = Registry::new();
        for body in bodies {
            world.spawn(body);
        }
        world.commit();
        world
    }

    fn positions(world: &Registry<Body>) -> Vec<Vec3> {
        world.iter().map(|(_, b)| b.position).collect()
    }

    // ── separation ────────────────────────────────────────────────────────

    #[test]
    fn equal_bodies_split_the_penetration() {
        let a = Body::enemy(Vec3::ZERO);
        let b = Body::enemy(Vec3::new(1.0, 0.0, 0.0));
        let (da, db) = separation(&a, &b).expect("overlap");
        assert!(da.abs_diff_eq(Vec3::new(-0.5, 0.0, 0.0), 1e-6));
        assert!(db.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn touching_bodies_are_left_alone() {
        let a = Body::enemy(Vec3::ZERO);
        let b = Body::enemy(Vec3::new(2.0, 0.0, 0.0));
        assert!(separation(&a, &b).is_none());
    }

    #[test]
    fn block_pushes_the_mobile_body_all_the_way() {
        let block = Body::block(Vec3::ZERO);
        let character = Body::character(Vec3::new(0.0, 0.0, 3.0));
        let (d_block, d_char) = separation(&block, &character).expect("overlap");
        assert_eq!(d_block, Vec3::ZERO);
        assert!(d_char.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn two_blocks_never_move() {
        let a = Body::block(Vec3::ZERO);
        let b = Body::block(Vec3::new(1.0, 0.0, 0.0));
        assert!(separation(&a, &b).is_none());
    }

    #[test]
    fn coincident_centers_are_skipped() {
        let a = Body::enemy(Vec3::ONE);
        let b = Body::character(Vec3::ONE);
        assert!(separation(&a, &b).is_none());
    }

    // ── resolution pass ───────────────────────────────────────────────────

    #[test]
    fn resolve_moves_overlapping_pairs_apart() {
        let mut w = world([
            Body::enemy(Vec3::ZERO),
            Body::enemy(Vec3::new(1.0, 0.0, 0.0)),
            Body::enemy(Vec3::new(20.0, 0.0, 0.0)),
        ]);
        assert_eq!(resolve_overlaps(&mut w), 1);
        let p = positions(&w);
        assert!((p[1] - p[0]).length() >= 2.0 - 1e-5);
        assert_eq!(p[2], Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn pending_bodies_are_not_resolved() {
        let mut w = world([Body::enemy(Vec3::ZERO)]);
        w.spawn(Body::enemy(Vec3::ZERO + Vec3::X));
        assert_eq!(resolve_overlaps(&mut w), 0);
    }

    // ── character ─────────────────────────────────────────────────────────

    #[test]
    fn character_moves_with_held_arrows() {
        let mut input = InputState::default();
        input.keys_down.insert(Key::ArrowUp);
        input.keys_down.insert(Key::ArrowLeft);

        let mut w = world([Body::character(Vec3::ZERO), Body::enemy(Vec3::new(0.0, 0.0, 50.0))]);
        update_actors(&mut w, &Tick { dt: 1.0, input: &input });

        let p = positions(&w);
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize() * CHARACTER_SPEED;
        assert!(p[0].abs_diff_eq(expected, 1e-5));
        assert_eq!(p[1], Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn left_wins_over_right() {
        let mut input = InputState::default();
        input.keys_down.insert(Key::ArrowLeft);
        input.keys_down.insert(Key::ArrowRight);
        let tick = Tick { dt: 1.0, input: &input };
        assert_eq!(steering(&tick), Vec3::X);
    }
}
