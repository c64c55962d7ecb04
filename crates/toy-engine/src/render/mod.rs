//! GPU rendering subsystem.
//!
//! Draw calls accumulate into CPU batches during the frame; renderers own
//! the GPU side (programs, pipelines, vertex slots) and flush each batch once
//! per frame in fixed-size chunks.
//!
//! Convention:
//! - Primitives are in world space and go through the camera's
//!   view-projection.
//! - Text is in overlay space: 600 units high, origin bottom-left, +Y up.

pub mod atlas;
pub mod chunk;
mod common;
mod ctx;
pub mod geometry;
pub mod primitive;
pub mod shader;
pub mod text;

pub use atlas::{AtlasSource, GlyphAtlas};
pub use ctx::{RenderCtx, RenderTarget};
pub use geometry::{ColorVertex, GeometryBuffer, TextVertex, Vertex};
pub use primitive::{FlushStats, PrimitiveBatch, PrimitiveRenderer};
pub use text::{GlyphGrid, TextBatch, TextRenderer, TextRequest};
