use glam::Mat4;

use crate::color::Color;
use crate::error::ShaderError;

use super::compile::{compile, link};
use super::uniforms::{buffer_size, UniformLocation, UniformTable};
use super::ShaderStage;

/// A linked vertex + fragment program with its uniform buffers bound at group 0.
///
/// Setters write into a CPU mirror; [`upload`](Self::upload) pushes changed
/// blocks to the GPU before the frame's draws are submitted.
pub struct ShaderProgram {
    label: String,
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
    uniforms: UniformTable,
    uniform_buffers: Vec<wgpu::Buffer>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Compiles both stages, links them and allocates the uniform buffers.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let linked = link(
            compile(vertex_source, ShaderStage::Vertex)?,
            compile(fragment_source, ShaderStage::Fragment)?,
        )?;

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(linked.vertex.source().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(linked.fragment.source().into()),
        });

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = linked
            .uniforms
            .iter()
            .map(|block| wgpu::BindGroupLayoutEntry {
                binding: block.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(block.size as u64),
                },
                count: None,
            })
            .collect();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &layout_entries,
        });

        let uniform_buffers: Vec<wgpu::Buffer> = linked
            .uniforms
            .iter()
            .map(|block| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&block.name),
                    size: buffer_size(block),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let bind_entries: Vec<wgpu::BindGroupEntry> = linked
            .uniforms
            .iter()
            .zip(&uniform_buffers)
            .map(|(block, buffer)| wgpu::BindGroupEntry {
                binding: block.binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &bind_entries,
        });

        log::debug!(
            "shader program `{label}` linked ({} -> {}), {} uniform block(s)",
            linked.vertex.entry_point(),
            linked.fragment.entry_point(),
            linked.uniforms.len()
        );

        Ok(Self {
            label: label.to_owned(),
            vertex_entry: linked.vertex.entry_point().to_owned(),
            fragment_entry: linked.fragment.entry_point().to_owned(),
            uniforms: UniformTable::new(linked.uniforms),
            vertex_module,
            fragment_module,
            uniform_buffers,
            bind_group_layout,
            bind_group,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cached uniform lookup; see [`UniformTable::location`].
    pub fn uniform_location(&mut self, name: &str) -> UniformLocation {
        self.uniforms.location(name)
    }

    pub fn set_uniform_matrix(&mut self, name: &str, matrix: &Mat4) {
        self.uniforms.set_matrix(name, matrix);
    }

    pub fn set_uniform_color(&mut self, name: &str, color: Color) {
        self.uniforms.set_color(name, color);
    }

    /// Writes every modified uniform block to its GPU buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        let buffers = &self.uniform_buffers;
        self.uniforms.flush_dirty(|index, bytes| {
            queue.write_buffer(&buffers[index], 0, bytes);
        });
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn vertex_state<'a>(
        &'a self,
        buffers: &'a [wgpu::VertexBufferLayout<'a>],
    ) -> wgpu::VertexState<'a> {
        wgpu::VertexState {
            module: &self.vertex_module,
            entry_point: Some(&self.vertex_entry),
            compilation_options: Default::default(),
            buffers,
        }
    }

    pub fn fragment_state<'a>(
        &'a self,
        targets: &'a [Option<wgpu::ColorTargetState>],
    ) -> wgpu::FragmentState<'a> {
        wgpu::FragmentState {
            module: &self.fragment_module,
            entry_point: Some(&self.fragment_entry),
            compilation_options: Default::default(),
            targets,
        }
    }
}
