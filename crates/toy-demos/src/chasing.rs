//! Missiles chasing a plane.
//!
//! Top-down view. The plane flies along -X; Space launches a missile from
//! `(0, 0, -5)` and a left click launches one from the ground point under
//! the pointer. Missiles steer toward the predicted intercept point every
//! frame and disappear when they hit, when the plane is gone, or when no
//! intercept exists.

use glam::{Mat4, Vec2, Vec3};
use toy_engine::draw::{Draw, LocalDraw};
use toy_engine::input::{Key, MouseButton};
use toy_engine::world::{Handle, Registry, Step};
use toy_engine::{Camera, Color, Game, GameCtx, Palette, ProjectionMode};

use crate::actor::{draw_actors, update_actors, Actor, Tick};

const PLANE_VELOCITY: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
const MISSILE_SPEED: f32 = 2.0;
const MISSILE_LAUNCH: Vec3 = Vec3::new(0.0, 0.0, -5.0);
const HIT_DISTANCE: f32 = 0.1;
const BODY_RADIUS: f32 = 0.5;
/// Velocity indicators are drawn this many times longer than one second of travel.
const VELOCITY_SCALE: f32 = 10.0;

/// Velocity that takes a pursuer at `pursuer` moving at `speed` to the
/// earliest meeting point with a target at `target` moving at constant
/// `target_velocity`.
///
/// Solves `|target + target_velocity * t - pursuer| = speed * t` for the
/// smallest root. `None` when there is no real root, the root lies in the
/// past, or the meeting point coincides with the pursuer.
pub fn intercept_velocity(target: Vec3, target_velocity: Vec3, pursuer: Vec3, speed: f32) -> Option<Vec3> {
    let offset = target - pursuer;
    let a = target_velocity.length_squared() - speed * speed;
    let b = 2.0 * offset.dot(target_velocity);
    let c = offset.length_squared();

    let t = if a.abs() < 1e-6 {
        // Equal speeds: the quadratic degenerates to `b t + c = 0`.
        if b.abs() < 1e-6 {
            return None;
        }
        -c / b
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        (-b - discriminant.sqrt()) / (2.0 * a)
    };
    if t < 0.0 {
        return None;
    }

    let meeting = target + target_velocity * t;
    (meeting - pursuer).try_normalize().map(|direction| direction * speed)
}

#[derive(Debug, Clone)]
pub enum Entity {
    Plane { position: Vec3, velocity: Vec3 },
    Missile(Missile),
}

#[derive(Debug, Clone)]
pub struct Missile {
    position: Vec3,
    velocity: Vec3,
    speed: f32,
    target: Handle,
}

impl Entity {
    pub fn plane() -> Self {
        Entity::Plane {
            position: Vec3::ZERO,
            velocity: PLANE_VELOCITY,
        }
    }

    pub fn missile(position: Vec3, target: Handle) -> Self {
        Entity::Missile(Missile {
            position,
            velocity: Vec3::ZERO,
            speed: MISSILE_SPEED,
            target,
        })
    }

    pub fn velocity(&self) -> Vec3 {
        match self {
            Entity::Plane { velocity, .. } => *velocity,
            Entity::Missile(m) => m.velocity,
        }
    }
}

impl Missile {
    fn steer(&mut self, dt: f32, world: &Registry<Entity>) -> Step {
        let Some(target) = world.get(self.target) else {
            log::debug!("missile lost its target {}", self.target);
            return Step::Destroy;
        };

        if target.position().distance(self.position) < HIT_DISTANCE {
            log::info!("missile hit {}", self.target);
            return Step::Destroy;
        }

        let Some(velocity) = intercept_velocity(target.position(), target.velocity(), self.position, self.speed)
        else {
            log::debug!("missile cannot reach {}", self.target);
            return Step::Destroy;
        };

        self.velocity = velocity;
        self.position += velocity * dt;
        Step::Continue
    }
}

impl Actor for Entity {
    fn update(&mut self, tick: &Tick<'_>, world: &Registry<Self>) -> Step {
        match self {
            Entity::Plane { position, velocity } => {
                *position += *velocity * tick.dt;
                Step::Continue
            }
            Entity::Missile(missile) => missile.steer(tick.dt, world),
        }
    }

    fn draw(&self, draw: &mut dyn Draw, palette: &Palette) {
        let mut local = LocalDraw::new(draw, Mat4::from_translation(self.position()));
        let indicator = self.velocity() * VELOCITY_SCALE;
        match self {
            Entity::Plane { .. } => {
                local.draw_sphere(Vec3::ZERO, BODY_RADIUS, palette.friendly);
                local.draw_line(Vec3::ZERO, indicator, palette.highlight);
            }
            Entity::Missile(_) => {
                local.draw_sphere(Vec3::ZERO, BODY_RADIUS, palette.hostile);
                local.draw_line(Vec3::ZERO, indicator, Color::BLUE);
            }
        }
    }

    fn position(&self) -> Vec3 {
        match self {
            Entity::Plane { position, .. } => *position,
            Entity::Missile(m) => m.position,
        }
    }

    fn radius(&self) -> f32 {
        BODY_RADIUS
    }
}

#[derive(Default)]
pub struct Chasing {
    world: Registry<Entity>,
    plane: Option<Handle>,
}

impl Chasing {
    fn launch(&mut self, from: Vec3) {
        let Some(plane) = self.plane.filter(|&h| self.world.contains(h)) else {
            return;
        };
        let handle = self.world.spawn(Entity::missile(from, plane));
        log::info!("missile {handle} launched from {from} at plane {plane}");
    }
}

impl Game for Chasing {
    fn init(&mut self, camera: &mut Camera) {
        camera.set_mode(ProjectionMode::Ortho);
        camera.set_look_at(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, Vec3::Z);

        self.plane = Some(self.world.spawn(Entity::plane()));
    }

    fn update(&mut self, ctx: &mut GameCtx<'_>) {
        ctx.draw.draw_grid(1.0, 100, ctx.palette.grid);

        if ctx.key_pressed(Key::Space) {
            self.launch(MISSILE_LAUNCH);
        }
        if ctx.button_pressed(MouseButton::Left) {
            let from = ctx.camera.top_down_screen_to_world(ctx.pointer());
            self.launch(from);
        }

        let tick = Tick {
            dt: ctx.dt,
            input: ctx.input,
        };
        update_actors(&mut self.world, &tick);
    }

    fn draw(&mut self, ctx: &mut GameCtx<'_>) {
        draw_actors(&self.world, &mut *ctx.draw, ctx.palette);

        let missiles = self
            .world
            .iter()
            .filter(|(_, e)| matches!(e, Entity::Missile(_)))
            .count();
        let text = format!("missiles: {missiles}\nspace / left click to launch");
        ctx.draw_text(Vec2::new(10.0, 570.0), text, 0.5, ctx.palette.text);
    }
}
