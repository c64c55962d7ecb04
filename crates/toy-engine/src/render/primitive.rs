//! Points and lines: the CPU accumulator and its GPU renderer.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::draw::Draw;

use super::chunk::{upload_chunked, ChunkLayout, EncoderSink, VertexSlot};
use super::common::{list_pipeline, ListPipelineDesc};
use super::geometry::{ColorVertex, GeometryBuffer, Vertex};
use super::shader::ShaderProgram;
use super::{RenderCtx, RenderTarget};

/// Uniform the primitive shader reads its transform from.
pub const MVP_UNIFORM: &str = "model_view_projection";

/// Per-frame point and line accumulator.
///
/// Implements [`Draw`]; everything drawn lands here until the renderer
/// flushes it.
#[derive(Debug, Default)]
pub struct PrimitiveBatch {
    points: GeometryBuffer<ColorVertex>,
    lines: GeometryBuffer<ColorVertex>,
}

impl PrimitiveBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &GeometryBuffer<ColorVertex> {
        &self.points
    }

    pub fn lines(&self) -> &GeometryBuffer<ColorVertex> {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
    }
}

impl Draw for PrimitiveBatch {
    #[inline]
    fn draw_point(&mut self, position: Vec3, color: Color) {
        self.points.push(ColorVertex::new(position, color));
    }

    #[inline]
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Color) {
        self.lines.push(ColorVertex::new(start, color));
        self.lines.push(ColorVertex::new(end, color));
    }
}

/// Draw calls issued by one flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FlushStats {
    pub vertices: usize,
    pub draw_calls: usize,
}

impl std::ops::AddAssign for FlushStats {
    fn add_assign(&mut self, rhs: Self) {
        self.vertices += rhs.vertices;
        self.draw_calls += rhs.draw_calls;
    }
}

/// GPU side of [`PrimitiveBatch`]: one program, a point and a line pipeline,
/// and a single fixed-capacity vertex slot both share.
pub struct PrimitiveRenderer {
    program: ShaderProgram,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    point_layout: ChunkLayout,
    line_layout: ChunkLayout,
    slot: VertexSlot<ColorVertex>,
}

impl PrimitiveRenderer {
    pub fn new(ctx: &RenderCtx<'_>, chunk_vertices: usize) -> Result<Self> {
        let source = include_str!("shaders/primitive.wgsl");
        let program = ShaderProgram::new(ctx.device, "toy primitive program", source, source)?;

        let point_layout = ChunkLayout::for_topology(chunk_vertices, wgpu::PrimitiveTopology::PointList)
            .context("invalid primitive chunk size")?;
        let line_layout = ChunkLayout::for_topology(chunk_vertices, wgpu::PrimitiveTopology::LineList)
            .context("invalid primitive chunk size")?;

        let pipeline = |label, topology| {
            list_pipeline(
                ctx.device,
                ListPipelineDesc {
                    label,
                    program: &program,
                    extra_layouts: &[],
                    vertex_layout: ColorVertex::layout(),
                    topology,
                    format: ctx.surface_format,
                },
            )
        };
        let point_pipeline = pipeline("toy point pipeline", wgpu::PrimitiveTopology::PointList);
        let line_pipeline = pipeline("toy line pipeline", wgpu::PrimitiveTopology::LineList);

        let slot = VertexSlot::new(ctx.device, "toy primitive slot", &line_layout);

        log::debug!("primitive renderer ready, {chunk_vertices} vertices per chunk");

        Ok(Self {
            program,
            point_pipeline,
            line_pipeline,
            point_layout,
            line_layout,
            slot,
        })
    }

    /// Uploads and draws the batch (points, then lines), then empties it.
    pub fn flush(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batch: &mut PrimitiveBatch,
        view_projection: &Mat4,
    ) -> FlushStats {
        let mut stats = FlushStats::default();
        if batch.is_empty() {
            return stats;
        }

        self.program.set_uniform_matrix(MVP_UNIFORM, view_projection);
        self.program.upload(ctx.queue);

        self.slot.recall();
        let bind_groups = [self.program.bind_group()];
        let passes = [
            (&self.point_pipeline, &self.point_layout, &mut batch.points, "toy points"),
            (&self.line_pipeline, &self.line_layout, &mut batch.lines, "toy lines"),
        ];

        for (pipeline, layout, buffer, label) in passes {
            let vertices = buffer.len();
            let mut sink = EncoderSink {
                encoder: &mut *target.encoder,
                color_view: target.color_view,
                slot: &mut self.slot,
                pipeline,
                bind_groups: &bind_groups,
                label,
            };
            stats += FlushStats {
                vertices,
                draw_calls: upload_chunked(layout, buffer, &mut sink),
            };
        }
        self.slot.finish();

        log::trace!("primitives: {} vertices, {} draw calls", stats.vertices, stats.draw_calls);
        stats
    }
}
