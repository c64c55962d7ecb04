//! Toy engine crate.
//!
//! Immediate-mode debug rendering for small games: draw calls accumulate
//! points, lines and overlay text into per-frame batches, which are uploaded
//! to the GPU in fixed-size chunks and drawn once per frame. Also owns the
//! platform + GPU runtime pieces, the camera and a small entity registry.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod error;
pub mod color;
pub mod config;
pub mod render;
pub mod draw;
pub mod camera;
pub mod world;
pub mod game;

pub use camera::{Camera, CameraConfig, FreeviewController, ProjectionMode};
pub use color::{Color, Palette};
pub use config::{BatchConfig, EngineConfig, TextConfig};
pub use draw::{Draw, LocalDraw};
pub use error::{AtlasError, DegenerateGeometryError, ShaderError};
pub use game::{run, Game, GameCtx, GameHost};
pub use world::{Handle, Registry, Step};
