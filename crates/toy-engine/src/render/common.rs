//! Pipeline construction shared by the batch renderers.

use super::shader::ShaderProgram;

/// Straight-alpha blending (`src_alpha, 1 - src_alpha`).
///
/// Primitives are opaque; glyph coverage comes in through the atlas alpha.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState::ALPHA_BLENDING
}

/// Parameters for a list-topology pipeline around a [`ShaderProgram`].
pub(super) struct ListPipelineDesc<'a> {
    pub label: &'a str,
    pub program: &'a ShaderProgram,
    /// Layouts for groups 1.. (group 0 is the program's uniforms).
    pub extra_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub topology: wgpu::PrimitiveTopology,
    pub format: wgpu::TextureFormat,
}

pub(super) fn list_pipeline(device: &wgpu::Device, desc: ListPipelineDesc<'_>) -> wgpu::RenderPipeline {
    let mut layouts = Vec::with_capacity(1 + desc.extra_layouts.len());
    layouts.push(desc.program.bind_group_layout());
    layouts.extend_from_slice(desc.extra_layouts);

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &layouts,
        immediate_size: 0,
    });

    let buffers = [desc.vertex_layout];
    let targets = [Some(wgpu::ColorTargetState {
        format: desc.format,
        blend: Some(alpha_blend()),
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: desc.program.vertex_state(&buffers),
        fragment: Some(desc.program.fragment_state(&targets)),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
