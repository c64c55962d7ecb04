//! Typed errors surfaced by the engine library.
//!
//! Runtime and device plumbing use `anyhow`; these are the failures callers
//! are expected to match on or report verbatim.

use std::path::PathBuf;

use glam::Vec3;
use thiserror::Error;

use crate::render::shader::ShaderStage;

/// Shader compilation or program linking failed.
///
/// The `log` carries the full compiler diagnostic, source spans included.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

/// A shape was requested along an axis of zero length.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
#[error("degenerate {shape}: axis from {start} to {end} has zero length")]
pub struct DegenerateGeometryError {
    pub shape: &'static str,
    pub start: Vec3,
    pub end: Vec3,
}

/// The glyph atlas could not be produced from its configured source.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode atlas image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to parse font: {0}")]
    Font(String),

    #[error("invalid glyph grid: {0}")]
    Grid(&'static str),

    #[error("atlas image is {width}x{height}, the glyph grid expects {expected_width}x{expected_height}")]
    Size {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}
