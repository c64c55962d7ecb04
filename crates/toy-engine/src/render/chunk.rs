//! Splits accumulated geometry into fixed-size uploads into one reusable
//! GPU vertex slot, with one draw call per chunk.

use std::marker::PhantomData;

use anyhow::{ensure, Result};
use wgpu::util::StagingBelt;

use super::geometry::{GeometryBuffer, Vertex};

/// Chunk sizing for one primitive topology.
///
/// `capacity` is a positive multiple of the topology's vertices per
/// primitive, so a chunk boundary never splits a point, line or triangle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChunkLayout {
    capacity: usize,
    primitive_vertices: usize,
}

impl ChunkLayout {
    pub fn new(capacity: usize, primitive_vertices: usize) -> Result<Self> {
        ensure!(primitive_vertices > 0, "primitive vertex count must be positive");
        ensure!(
            capacity > 0 && capacity % primitive_vertices == 0,
            "chunk capacity {capacity} is not a positive multiple of {primitive_vertices}"
        );
        Ok(Self {
            capacity,
            primitive_vertices,
        })
    }

    /// Layout for a list topology (`PointList`, `LineList`, `TriangleList`).
    pub fn for_topology(capacity: usize, topology: wgpu::PrimitiveTopology) -> Result<Self> {
        let per_primitive = match topology {
            wgpu::PrimitiveTopology::PointList => 1,
            wgpu::PrimitiveTopology::LineList => 2,
            wgpu::PrimitiveTopology::TriangleList => 3,
            other => anyhow::bail!("chunked upload does not support {other:?}"),
        };
        Self::new(capacity, per_primitive)
    }

    /// Vertices per chunk.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn primitive_vertices(&self) -> usize {
        self.primitive_vertices
    }

    /// Draw calls needed for `len` vertices.
    #[inline]
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.capacity)
    }
}

/// Destination of a chunked upload: a slot that receives vertex data and
/// draws whatever it currently holds.
pub trait ChunkSink<V> {
    /// Overwrites the slot with `vertices` (never more than the layout capacity).
    fn upload(&mut self, vertices: &[V]);

    /// Draws the first `vertex_count` vertices of the slot.
    fn draw(&mut self, vertex_count: u32);
}

/// Uploads `buffer` to `sink` in chunks of `layout.capacity()` vertices,
/// drawing after each upload, then clears the buffer.
///
/// Full chunks go first in buffer order; a trailing partial chunk follows if
/// the length is not a multiple of the capacity. Returns the number of draw
/// calls issued, which is `ceil(len / capacity)`.
pub fn upload_chunked<V, S>(layout: &ChunkLayout, buffer: &mut GeometryBuffer<V>, sink: &mut S) -> usize
where
    V: Vertex,
    S: ChunkSink<V> + ?Sized,
{
    let mut draws = 0;
    for chunk in buffer.as_slice().chunks(layout.capacity()) {
        sink.upload(chunk);
        sink.draw(chunk.len() as u32);
        draws += 1;
    }

    log::trace!(
        "flushed {} vertices in {draws} chunk(s) of {}",
        buffer.len(),
        layout.capacity()
    );

    buffer.clear();
    draws
}

// ── GPU slot ──────────────────────────────────────────────────────────────

/// Bytes staged for `vertices`, `None` for an empty chunk.
///
/// Vertex strides are multiples of `COPY_BUFFER_ALIGNMENT`, so any whole
/// number of vertices is a valid copy size.
pub fn staged_size<V: Vertex>(vertices: &[V]) -> Option<wgpu::BufferSize> {
    wgpu::BufferSize::new(std::mem::size_of_val(vertices) as u64)
}

/// Preallocated vertex buffer sized for exactly one chunk, fed through a
/// staging belt whose buffers are recycled across frames.
///
/// Created once, reused for every chunk of every frame, never resized.
pub struct VertexSlot<V> {
    buffer: wgpu::Buffer,
    belt: StagingBelt,
    capacity: usize,
    _vertex: PhantomData<V>,
}

impl<V: Vertex> VertexSlot<V> {
    pub fn new(device: &wgpu::Device, label: &str, layout: &ChunkLayout) -> Self {
        let bytes = (layout.capacity() * std::mem::size_of::<V>()) as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            belt: StagingBelt::new(device.clone(), bytes),
            capacity: layout.capacity(),
            _vertex: PhantomData,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Records a copy of `vertices` into the slot at the encoder's current
    /// position.
    pub fn stage(&mut self, encoder: &mut wgpu::CommandEncoder, vertices: &[V]) {
        debug_assert!(vertices.len() <= self.capacity);
        let Some(size) = staged_size(vertices) else {
            return;
        };
        self.belt
            .write_buffer(encoder, &self.buffer, 0, size)
            .copy_from_slice(bytemuck::cast_slice(vertices));
    }

    /// Reclaims staging buffers from earlier submissions. Call before the
    /// first [`stage`](Self::stage) of a frame.
    pub fn recall(&mut self) {
        self.belt.recall();
    }

    /// Closes this frame's staging buffers. Call before the encoder is
    /// submitted.
    pub fn finish(&mut self) {
        self.belt.finish();
    }
}

/// Records chunk uploads and draws into a frame's command encoder.
///
/// `Queue::write_buffer` to the same range would collapse to the last write
/// within one submission, so every chunk is staged separately and copied
/// into the slot in command order, each followed by its own pass.
pub struct EncoderSink<'a, V> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub slot: &'a mut VertexSlot<V>,
    pub pipeline: &'a wgpu::RenderPipeline,
    pub bind_groups: &'a [&'a wgpu::BindGroup],
    pub label: &'static str,
}

impl<V: Vertex> ChunkSink<V> for EncoderSink<'_, V> {
    fn upload(&mut self, vertices: &[V]) {
        self.slot.stage(self.encoder, vertices);
    }

    fn draw(&mut self, vertex_count: u32) {
        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.pipeline);
        for (index, group) in self.bind_groups.iter().enumerate() {
            rpass.set_bind_group(index as u32, *group, &[]);
        }
        rpass.set_vertex_buffer(0, self.slot.buffer().slice(..));
        rpass.draw(0..vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::color::Color;
    use crate::render::geometry::{ColorVertex, TextVertex};

    /// Models the GPU slot: uploads overwrite, draws read back what is there.
    #[derive(Default)]
    struct RecordingSink {
        slot: Vec<ColorVertex>,
        uploads: Vec<usize>,
        drawn: Vec<ColorVertex>,
        draws: usize,
    }

    impl ChunkSink<ColorVertex> for RecordingSink {
        fn upload(&mut self, vertices: &[ColorVertex]) {
            self.slot.clear();
            self.slot.extend_from_slice(vertices);
            self.uploads.push(vertices.len());
        }

        fn draw(&mut self, vertex_count: u32) {
            self.drawn.extend_from_slice(&self.slot[..vertex_count as usize]);
            self.draws += 1;
        }
    }

    fn filled(n: usize) -> GeometryBuffer<ColorVertex> {
        let mut buf = GeometryBuffer::new();
        for i in 0..n {
            buf.push(ColorVertex::new(Vec3::splat(i as f32), Color::BLACK));
        }
        buf
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn capacity_must_hold_whole_primitives() {
        assert!(ChunkLayout::new(6000, 2).is_ok());
        assert!(ChunkLayout::new(21000, 3).is_ok());
        assert!(ChunkLayout::new(5, 2).is_err());
        assert!(ChunkLayout::new(0, 1).is_err());
        assert!(ChunkLayout::for_topology(8, wgpu::PrimitiveTopology::LineStrip).is_err());
    }

    // ── chunking ──────────────────────────────────────────────────────────

    #[test]
    fn draws_ceil_len_over_capacity() {
        let layout = ChunkLayout::new(4, 2).unwrap();
        for len in [0, 1, 3, 4, 5, 8, 9, 13] {
            let mut buf = filled(len);
            let expected: Vec<ColorVertex> = buf.as_slice().to_vec();
            let mut sink = RecordingSink::default();

            let draws = upload_chunked(&layout, &mut buf, &mut sink);

            assert_eq!(draws, len.div_ceil(4), "len {len}");
            assert_eq!(draws, layout.chunk_count(len));
            assert_eq!(sink.draws, draws);
            assert_eq!(sink.drawn, expected, "drawn vertices must match buffer order");
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn full_chunks_then_remainder() {
        let layout = ChunkLayout::new(6000, 2).unwrap();
        let mut buf = filled(6000 * 2 + 10);
        let mut sink = RecordingSink::default();

        upload_chunked(&layout, &mut buf, &mut sink);

        assert_eq!(sink.uploads, vec![6000, 6000, 10]);
    }

    #[test]
    fn empty_buffer_issues_no_draws() {
        let layout = ChunkLayout::new(6, 1).unwrap();
        let mut buf = GeometryBuffer::<ColorVertex>::new();
        let mut sink = RecordingSink::default();
        assert_eq!(upload_chunked(&layout, &mut buf, &mut sink), 0);
        assert!(sink.uploads.is_empty());
    }

    // ── staging ───────────────────────────────────────────────────────────

    #[test]
    fn vertex_strides_are_copy_aligned() {
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        assert_eq!(std::mem::size_of::<ColorVertex>() % align, 0);
        assert_eq!(std::mem::size_of::<TextVertex>() % align, 0);
    }

    #[test]
    fn staged_size_covers_whole_vertices() {
        assert_eq!(staged_size::<ColorVertex>(&[]), None);
        let buf = filled(3);
        let size = staged_size(buf.as_slice()).map(|s| s.get());
        assert_eq!(size, Some(3 * std::mem::size_of::<ColorVertex>() as u64));
    }
}
