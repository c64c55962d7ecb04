//! CPU-side vertex formats and the per-frame geometry accumulator.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::color::Color;

/// A fixed-layout vertex that can be uploaded byte-for-byte.
pub trait Vertex: Pod {
    /// Number of `f32` components per vertex.
    const COMPONENTS: usize;

    /// Attribute layout, shader locations starting at 0.
    const ATTRIBUTES: &'static [wgpu::VertexAttribute];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }
}

// ── color vertex ──────────────────────────────────────────────────────────

/// Position + color, used for points and lines.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    #[inline]
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

impl Vertex for ColorVertex {
    const COMPONENTS: usize = 6;
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &Self::ATTRS;
}

// ── text vertex ───────────────────────────────────────────────────────────

/// Overlay position + atlas uv + color, used for glyph quads.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl TextVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // uv
        2 => Float32x3  // color
    ];

    #[inline]
    pub fn new(position: Vec2, uv: [f32; 2], color: Color) -> Self {
        Self {
            position: position.to_array(),
            uv,
            color: color.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }
}

impl Vertex for TextVertex {
    const COMPONENTS: usize = 7;
    const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &Self::ATTRS;
}

// ── accumulator ───────────────────────────────────────────────────────────

/// Ordered, append-only vertex list for one primitive kind.
///
/// Append order is draw order. The buffer grows without bound during a frame
/// and is emptied when flushed.
#[derive(Debug, Clone)]
pub struct GeometryBuffer<V> {
    vertices: Vec<V>,
}

impl<V> Default for GeometryBuffer<V> {
    fn default() -> Self {
        Self { vertices: Vec::new() }
    }
}

impl<V: Vertex> GeometryBuffer<V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, vertex: V) {
        self.vertices.push(vertex);
    }

    pub fn extend_from_slice(&mut self, vertices: &[V]) {
        self.vertices.extend_from_slice(vertices);
    }

    /// Number of vertices (not floats).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.vertices
    }

    /// Flat interleaved view; its length is always `len() * V::COMPONENTS`.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}
