//! Per-frame glue between the runtime and a game: input and camera control,
//! the game's update/draw calls, then one flush of every batch.

mod host;

pub use host::{run, Game, GameCtx, GameHost};
