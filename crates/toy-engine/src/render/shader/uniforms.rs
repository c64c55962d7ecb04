use std::collections::{HashMap, HashSet};

use glam::Mat4;

use crate::color::Color;

/// Reflected `var<uniform>` block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlockLayout {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Size in bytes, including trailing struct padding.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

/// Named member of a uniform struct.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

/// Where a uniform lives, or the sentinel for names the program lacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformLocation {
    Found { block: usize, offset: u32, size: u32 },
    NotFound,
}

impl UniformLocation {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, UniformLocation::Found { .. })
    }
}

struct UniformBlock {
    layout: UniformBlockLayout,
    data: Vec<u8>,
    dirty: bool,
}

/// CPU mirror of a program's uniform blocks with a name → location cache.
///
/// The first lookup of a name reflects over the blocks; every later lookup
/// returns the cached result, `NotFound` included. Writes to unknown names
/// or with the wrong size are dropped.
pub struct UniformTable {
    blocks: Vec<UniformBlock>,
    cache: HashMap<String, UniformLocation>,
    rejected: HashSet<String>,
    reflections: usize,
}

impl UniformTable {
    pub fn new(layouts: Vec<UniformBlockLayout>) -> Self {
        let blocks = layouts
            .into_iter()
            .map(|layout| UniformBlock {
                data: vec![0; buffer_size(&layout) as usize],
                layout,
                dirty: true,
            })
            .collect();

        Self {
            blocks,
            cache: HashMap::new(),
            rejected: HashSet::new(),
            reflections: 0,
        }
    }

    pub fn layouts(&self) -> impl Iterator<Item = &UniformBlockLayout> {
        self.blocks.iter().map(|b| &b.layout)
    }

    /// Resolves `name`, reflecting only on the first request.
    ///
    /// Matches a block's variable name (whole block) or a struct member name.
    pub fn location(&mut self, name: &str) -> UniformLocation {
        if let Some(loc) = self.cache.get(name) {
            return *loc;
        }

        self.reflections += 1;
        let loc = self.reflect(name);
        if !loc.is_found() {
            log::debug!("uniform `{name}` not found; writes to it are ignored");
        }
        self.cache.insert(name.to_owned(), loc);
        loc
    }

    /// Number of cache misses so far.
    pub fn reflections(&self) -> usize {
        self.reflections
    }

    fn reflect(&self, name: &str) -> UniformLocation {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.layout.name == name {
                return UniformLocation::Found {
                    block: index,
                    offset: 0,
                    size: block.layout.size,
                };
            }
            if let Some(m) = block.layout.members.iter().find(|m| m.name == name) {
                return UniformLocation::Found {
                    block: index,
                    offset: m.offset,
                    size: m.size,
                };
            }
        }
        UniformLocation::NotFound
    }

    /// Copies `bytes` into the uniform. Returns whether anything was written.
    pub fn set_bytes(&mut self, name: &str, bytes: &[u8]) -> bool {
        let UniformLocation::Found { block, offset, size } = self.location(name) else {
            return false;
        };

        if size as usize != bytes.len() {
            if self.rejected.insert(name.to_owned()) {
                log::debug!(
                    "uniform `{name}` is {size} bytes, ignoring a {}-byte write",
                    bytes.len()
                );
            }
            return false;
        }

        let block = &mut self.blocks[block];
        let start = offset as usize;
        block.data[start..start + bytes.len()].copy_from_slice(bytes);
        block.dirty = true;
        true
    }

    /// Writes a column-major 4x4 matrix.
    pub fn set_matrix(&mut self, name: &str, matrix: &Mat4) -> bool {
        self.set_bytes(name, bytemuck::cast_slice(&matrix.to_cols_array()))
    }

    /// Writes a color as `vec4<f32>` with alpha 1.
    pub fn set_color(&mut self, name: &str, color: Color) -> bool {
        self.set_bytes(name, bytemuck::cast_slice(&color.to_rgba()))
    }

    pub fn block_bytes(&self, block: usize) -> &[u8] {
        &self.blocks[block].data
    }

    /// Calls `f` for every block written since the last call.
    pub fn flush_dirty(&mut self, mut f: impl FnMut(usize, &[u8])) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            if block.dirty {
                f(index, &block.data);
                block.dirty = false;
            }
        }
    }
}

/// GPU buffer size for a block, rounded up to the 16-byte uniform alignment.
pub(super) fn buffer_size(layout: &UniformBlockLayout) -> u64 {
    (layout.size.max(16) as u64).next_multiple_of(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globals() -> UniformTable {
        UniformTable::new(vec![UniformBlockLayout {
            name: "globals".into(),
            group: 0,
            binding: 0,
            size: 80,
            members: vec![
                UniformMember {
                    name: "model_view_projection".into(),
                    offset: 0,
                    size: 64,
                },
                UniformMember {
                    name: "tint".into(),
                    offset: 64,
                    size: 16,
                },
            ],
        }])
    }

    // ── location cache ────────────────────────────────────────────────────

    #[test]
    fn lookups_reflect_once_per_name() {
        let mut table = globals();
        let first = table.location("tint");
        let second = table.location("tint");
        assert_eq!(first, second);
        assert_eq!(first, UniformLocation::Found { block: 0, offset: 64, size: 16 });
        assert_eq!(table.reflections(), 1);
    }

    #[test]
    fn missing_name_caches_the_sentinel() {
        let mut table = globals();
        assert_eq!(table.location("nope"), UniformLocation::NotFound);
        assert_eq!(table.location("nope"), UniformLocation::NotFound);
        assert_eq!(table.reflections(), 1);
    }

    #[test]
    fn block_name_addresses_the_whole_block() {
        let mut table = globals();
        assert_eq!(table.location("globals"), UniformLocation::Found { block: 0, offset: 0, size: 80 });
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn setting_unknown_uniform_is_a_no_op() {
        let mut table = globals();
        table.flush_dirty(|_, _| {});
        assert!(!table.set_color("missing", Color::RED));
        let mut flushed = 0;
        table.flush_dirty(|_, _| flushed += 1);
        assert_eq!(flushed, 0);
        assert!(table.block_bytes(0).iter().all(|b| *b == 0));
    }

    #[test]
    fn color_writes_rgb_with_unit_alpha_at_member_offset() {
        let mut table = globals();
        assert!(table.set_color("tint", Color::YELLOW));
        let floats: [f32; 4] = bytemuck::pod_read_unaligned(&table.block_bytes(0)[64..80]);
        assert_eq!(floats, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn matrix_is_stored_column_major() {
        let mut table = globals();
        let m = Mat4::from_translation(glam::Vec3::new(7.0, 8.0, 9.0));
        assert!(table.set_matrix("model_view_projection", &m));
        let floats: [f32; 16] = bytemuck::pod_read_unaligned(&table.block_bytes(0)[..64]);
        assert_eq!(&floats[12..15], &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut table = globals();
        assert!(!table.set_matrix("tint", &Mat4::IDENTITY));
    }

    #[test]
    fn dirty_blocks_flush_once() {
        let mut table = globals();
        let mut flushed = Vec::new();
        table.flush_dirty(|i, bytes| flushed.push((i, bytes.len())));
        assert_eq!(flushed, vec![(0, 80)]);

        flushed.clear();
        table.flush_dirty(|i, bytes| flushed.push((i, bytes.len())));
        assert!(flushed.is_empty());
    }
}
