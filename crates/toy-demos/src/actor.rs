//! Shared entity plumbing for the demos.

use glam::Vec3;
use toy_engine::Palette;
use toy_engine::draw::Draw;
use toy_engine::input::InputState;
use toy_engine::world::{Registry, Step};

/// Per-frame inputs an actor may read while updating.
pub struct Tick<'a> {
    pub dt: f32,
    pub input: &'a InputState,
}

/// Something that lives in a [`Registry`], moves, and draws itself.
pub trait Actor: Sized {
    /// `world` holds every other actor; this one is not reachable through it.
    fn update(&mut self, tick: &Tick<'_>, world: &Registry<Self>) -> Step;

    fn draw(&self, draw: &mut dyn Draw, palette: &Palette);

    fn position(&self) -> Vec3;

    fn radius(&self) -> f32;
}

/// Applies pending spawns/despawns, then updates every actor.
///
/// Returns how many actors asked to be destroyed.
pub fn update_actors<A: Actor>(world: &mut Registry<A>, tick: &Tick<'_>) -> usize {
    world.commit();
    world.update_each(|_, actor, others| actor.update(tick, others))
}

pub fn draw_actors<A: Actor>(world: &Registry<A>, draw: &mut dyn Draw, palette: &Palette) {
    for (_, actor) in world.iter() {
        actor.draw(draw, palette);
    }
}
