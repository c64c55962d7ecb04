//! Vertex + fragment program wrapper.
//!
//! WGSL is compiled and validated with naga (the front end wgpu itself uses)
//! so compile and link failures surface as [`ShaderError`](crate::error::ShaderError)s
//! carrying the diagnostic text, before any pipeline is built. Uniforms are
//! addressed by name through a lazily filled location cache.

mod compile;
mod program;
mod uniforms;

use std::fmt;

pub use compile::{compile, link, CompiledShader, LinkedProgram};
pub use program::ShaderProgram;
pub use uniforms::{UniformBlockLayout, UniformLocation, UniformMember, UniformTable};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}
