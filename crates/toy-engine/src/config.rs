//! Engine configuration: plain structs with defaults, filled by the binary.

use crate::camera::CameraConfig;
use crate::color::{Color, Palette};
use crate::device::GpuInit;
use crate::render::{AtlasSource, GlyphGrid};
use crate::window::RuntimeConfig;

/// Vertices per GPU upload chunk, per batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchConfig {
    /// Shared by points and lines; must be even.
    pub primitive_chunk_vertices: usize,
    /// Must be a multiple of 3.
    pub text_chunk_vertices: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            primitive_chunk_vertices: 6_000,
            text_chunk_vertices: 21_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextConfig {
    pub atlas: AtlasSource,
    pub grid: GlyphGrid,
}

/// Everything [`run`](crate::game::run) needs to open a window and host a game.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub window: RuntimeConfig,
    pub gpu: GpuInit,
    pub batch: BatchConfig,
    pub text: TextConfig,
    pub camera: CameraConfig,
    pub clear_color: Color,
    pub palette: Palette,
    /// Let the free-fly controller drive the camera.
    pub freeview: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            window: RuntimeConfig::default(),
            gpu: GpuInit::default(),
            batch: BatchConfig::default(),
            text: TextConfig::default(),
            camera: CameraConfig::default(),
            clear_color: palette.background,
            palette,
            freeview: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::chunk::ChunkLayout;

    #[test]
    fn default_chunk_sizes_fit_their_topologies() {
        let batch = BatchConfig::default();
        assert!(ChunkLayout::for_topology(batch.primitive_chunk_vertices, wgpu::PrimitiveTopology::LineList).is_ok());
        assert!(ChunkLayout::for_topology(batch.text_chunk_vertices, wgpu::PrimitiveTopology::TriangleList).is_ok());
    }

    #[test]
    fn defaults_clear_to_the_palette_background() {
        let config = EngineConfig::default();
        assert_eq!(config.clear_color, Color::WHITE);
        assert_eq!(config.text.atlas, AtlasSource::SystemFont);
        assert!(config.text.grid.fits_atlas());
    }
}
