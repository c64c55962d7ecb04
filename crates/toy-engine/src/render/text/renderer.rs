use anyhow::{Context, Result};
use glam::{Mat4, Vec2};

use crate::color::Color;

use crate::render::atlas::GlyphAtlas;
use crate::render::chunk::{upload_chunked, ChunkLayout, EncoderSink, VertexSlot};
use crate::render::common::{list_pipeline, ListPipelineDesc};
use crate::render::geometry::{GeometryBuffer, TextVertex, Vertex};
use crate::render::primitive::{FlushStats, MVP_UNIFORM};
use crate::render::shader::ShaderProgram;
use crate::render::{RenderCtx, RenderTarget};

use super::layout::{layout_text, GlyphGrid, TextRequest};

/// Text queued for the current frame.
///
/// Requests are laid out at flush time, in submission order.
#[derive(Debug, Default)]
pub struct TextBatch {
    requests: Vec<TextRequest>,
}

impl TextBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `text` with its first baseline at `position` (overlay units).
    pub fn draw_text(&mut self, position: Vec2, text: impl Into<String>, scale: f32, color: Color) {
        self.requests.push(TextRequest {
            position,
            text: text.into(),
            scale,
            color,
        });
    }

    pub fn requests(&self) -> &[TextRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Lays out and drains every queued request into `out`.
    pub fn layout_into(&mut self, grid: &GlyphGrid, out: &mut GeometryBuffer<TextVertex>) {
        for request in self.requests.drain(..) {
            layout_text(grid, &request, out);
        }
    }
}

/// GPU side of [`TextBatch`]: the atlas texture, a triangle pipeline and a
/// fixed-capacity vertex slot.
pub struct TextRenderer {
    grid: GlyphGrid,
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    atlas_bind_group: wgpu::BindGroup,
    layout: ChunkLayout,
    slot: VertexSlot<TextVertex>,
    vertices: GeometryBuffer<TextVertex>,
}

impl TextRenderer {
    pub fn new(ctx: &RenderCtx<'_>, grid: GlyphGrid, atlas: &GlyphAtlas, chunk_vertices: usize) -> Result<Self> {
        grid.validate()?;
        anyhow::ensure!(
            (atlas.width(), atlas.height()) == (grid.atlas_width, grid.atlas_height),
            "glyph atlas is {}x{}, the grid expects {}x{}",
            atlas.width(),
            atlas.height(),
            grid.atlas_width,
            grid.atlas_height
        );
        let source = include_str!("../shaders/text.wgsl");
        let program = ShaderProgram::new(ctx.device, "toy text program", source, source)?;

        let layout = ChunkLayout::for_topology(chunk_vertices, wgpu::PrimitiveTopology::TriangleList)
            .context("invalid text chunk size")?;

        let atlas_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("toy glyph atlas layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let size = wgpu::Extent3d {
            width: atlas.width(),
            height: atlas.height(),
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("toy glyph atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * atlas.width()),
                rows_per_image: Some(atlas.height()),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("toy glyph sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let atlas_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("toy glyph atlas"),
            layout: &atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline = list_pipeline(
            ctx.device,
            ListPipelineDesc {
                label: "toy text pipeline",
                program: &program,
                extra_layouts: &[&atlas_layout],
                vertex_layout: TextVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                format: ctx.surface_format,
            },
        );

        let slot = VertexSlot::new(ctx.device, "toy text slot", &layout);

        log::debug!(
            "text renderer ready, {}x{} atlas, {chunk_vertices} vertices per chunk",
            atlas.width(),
            atlas.height()
        );

        Ok(Self {
            grid,
            program,
            pipeline,
            atlas_bind_group,
            layout,
            slot,
            vertices: GeometryBuffer::new(),
        })
    }

    pub fn grid(&self) -> &GlyphGrid {
        &self.grid
    }

    /// Lays out every queued request, then uploads and draws the quads.
    pub fn flush(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batch: &mut TextBatch,
        overlay_projection: &Mat4,
    ) -> FlushStats {
        batch.layout_into(&self.grid, &mut self.vertices);
        if self.vertices.is_empty() {
            return FlushStats::default();
        }

        self.program.set_uniform_matrix(MVP_UNIFORM, overlay_projection);
        self.program.upload(ctx.queue);

        self.slot.recall();
        let vertices = self.vertices.len();
        let bind_groups = [self.program.bind_group(), &self.atlas_bind_group];
        let mut sink = EncoderSink {
            encoder: &mut *target.encoder,
            color_view: target.color_view,
            slot: &mut self.slot,
            pipeline: &self.pipeline,
            bind_groups: &bind_groups,
            label: "toy text",
        };
        let draw_calls = upload_chunked(&self.layout, &mut self.vertices, &mut sink);
        self.slot.finish();

        log::trace!("text: {vertices} vertices, {draw_calls} draw calls");
        FlushStats { vertices, draw_calls }
    }
}
