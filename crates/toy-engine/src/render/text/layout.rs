use glam::Vec2;

use crate::color::Color;
use crate::error::AtlasError;
use crate::render::geometry::{GeometryBuffer, TextVertex};

/// Fixed glyph-grid atlas geometry.
///
/// Glyph `i` (codepoint `first + i`) sits in cell `(i % columns, i / columns)`,
/// row 0 at the top of the image. Codepoints outside `first..=last` are drawn
/// as [`GlyphGrid::fallback`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphGrid {
    pub first: char,
    pub last: char,
    pub fallback: char,
    pub columns: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub atlas_width: u32,
    pub atlas_height: u32,
}

impl Default for GlyphGrid {
    /// Printable ASCII in 16 columns of 22x41 cells on a 512x512 atlas.
    fn default() -> Self {
        Self {
            first: ' ',
            last: '~',
            fallback: '?',
            columns: 16,
            cell_width: 22,
            cell_height: 41,
            atlas_width: 512,
            atlas_height: 512,
        }
    }
}

/// Smallest cell edge; blank atlases inset a one-pixel outline by 3.
pub const MIN_CELL_SIZE: u32 = 4;

impl GlyphGrid {
    /// Rejects grids that cannot be laid out or rasterized.
    pub fn validate(&self) -> Result<(), AtlasError> {
        let problem = if self.first > self.last {
            "`first` is after `last`"
        } else if self.columns == 0 {
            "no columns"
        } else if !self.contains(self.fallback) {
            "fallback glyph is outside `first..=last`"
        } else if self.cell_width < MIN_CELL_SIZE || self.cell_height < MIN_CELL_SIZE {
            "cells are smaller than 4x4"
        } else if !self.fits_atlas() {
            "cells do not fit in the atlas"
        } else {
            return Ok(());
        };
        Err(AtlasError::Grid(problem))
    }

    /// Zero when `last` is before `first`.
    pub fn glyph_count(&self) -> u32 {
        (self.last as u32 + 1).saturating_sub(self.first as u32)
    }

    pub fn rows(&self) -> u32 {
        self.glyph_count().div_ceil(self.columns.max(1))
    }

    /// Whether every cell fits inside the atlas image.
    pub fn fits_atlas(&self) -> bool {
        let (columns, rows) = (self.columns as u64, self.rows() as u64);
        columns * self.cell_width as u64 <= self.atlas_width as u64
            && rows * self.cell_height as u64 <= self.atlas_height as u64
    }

    pub fn contains(&self, ch: char) -> bool {
        (self.first..=self.last).contains(&ch)
    }

    /// The character actually drawn for `ch`.
    pub fn resolve(&self, ch: char) -> char {
        if self.contains(ch) { ch } else { self.fallback }
    }

    /// `(column, row)` of the cell drawn for `ch`.
    ///
    /// On a grid that fails [`validate`](Self::validate) this is only
    /// guaranteed not to panic.
    pub fn cell(&self, ch: char) -> (u32, u32) {
        let index = (self.resolve(ch) as u32).saturating_sub(self.first as u32);
        let columns = self.columns.max(1);
        (index % columns, index / columns)
    }

    /// Top-left pixel of the cell drawn for `ch`.
    pub fn cell_origin(&self, ch: char) -> (u32, u32) {
        let (col, row) = self.cell(ch);
        (col * self.cell_width, row * self.cell_height)
    }

    /// `(uv_min, uv_max)` of the cell drawn for `ch`; `uv_min` is its top-left.
    pub fn uv_rect(&self, ch: char) -> ([f32; 2], [f32; 2]) {
        let (col, row) = self.cell(ch);
        let du = self.cell_width as f32 / self.atlas_width as f32;
        let dv = self.cell_height as f32 / self.atlas_height as f32;
        (
            [col as f32 * du, row as f32 * dv],
            [(col + 1) as f32 * du, (row + 1) as f32 * dv],
        )
    }
}

/// One string queued for this frame's text pass.
///
/// `position` is the bottom-left of the first glyph in overlay units
/// (600 units high, y up).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub position: Vec2,
    pub text: String,
    pub scale: f32,
    pub color: Color,
}

/// Appends one 6-vertex quad per character of `request` to `out`.
///
/// Glyphs advance by `cell_width * scale`. `'\n'` returns to the starting x
/// and moves down one line of `cell_height * scale`. Quads are wound as
/// triangles `(a, b, c)` and `(c, b, d)` with `a`/`b` the bottom corners.
pub fn layout_text(grid: &GlyphGrid, request: &TextRequest, out: &mut GeometryBuffer<TextVertex>) {
    let advance = grid.cell_width as f32 * request.scale;
    let line_height = grid.cell_height as f32 * request.scale;
    let color = request.color;

    let mut x = request.position.x;
    let mut y = request.position.y;

    for ch in request.text.chars() {
        if ch == '\n' {
            x = request.position.x;
            y -= line_height;
            continue;
        }

        let ([u0, v0], [u1, v1]) = grid.uv_rect(ch);
        let a = TextVertex::new(Vec2::new(x, y), [u0, v1], color);
        let b = TextVertex::new(Vec2::new(x + advance, y), [u1, v1], color);
        let c = TextVertex::new(Vec2::new(x, y + line_height), [u0, v0], color);
        let d = TextVertex::new(Vec2::new(x + advance, y + line_height), [u1, v0], color);
        out.extend_from_slice(&[a, b, c, c, b, d]);

        x += advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, scale: f32) -> TextRequest {
        TextRequest {
            position: Vec2::new(10.0, 500.0),
            text: text.to_owned(),
            scale,
            color: Color::BLACK,
        }
    }

    // ── grid ──────────────────────────────────────────────────────────────

    #[test]
    fn default_grid_fits_its_atlas() {
        let grid = GlyphGrid::default();
        assert_eq!(grid.glyph_count(), 95);
        assert_eq!(grid.rows(), 6);
        assert!(grid.fits_atlas());
    }

    #[test]
    fn cells_follow_codepoint_order() {
        let grid = GlyphGrid::default();
        assert_eq!(grid.cell(' '), (0, 0));
        assert_eq!(grid.cell('0'), (0, 1));
        assert_eq!(grid.cell('A'), (1, 2));
        assert_eq!(grid.cell_origin('A'), (22, 82));
    }

    #[test]
    fn out_of_range_codepoints_use_the_fallback_cell() {
        let grid = GlyphGrid::default();
        assert_eq!(grid.cell('é'), grid.cell('?'));
        assert_eq!(grid.cell('\t'), grid.cell('?'));
        assert_eq!(grid.uv_rect('\u{7f}'), grid.uv_rect('?'));
    }

    #[test]
    fn uv_rect_spans_one_cell() {
        let grid = GlyphGrid::default();
        let ([u0, v0], [u1, v1]) = grid.uv_rect('!');
        assert!((u0 - 22.0 / 512.0).abs() < 1e-6);
        assert!((u1 - 44.0 / 512.0).abs() < 1e-6);
        assert_eq!(v0, 0.0);
        assert!((v1 - 41.0 / 512.0).abs() < 1e-6);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn default_grid_is_valid() {
        assert!(GlyphGrid::default().validate().is_ok());
    }

    #[test]
    fn broken_grids_are_rejected() {
        let base = GlyphGrid::default();
        let broken = [
            GlyphGrid { first: 'A', fallback: ' ', ..base },
            GlyphGrid { first: 'z', last: 'a', fallback: 'm', ..base },
            GlyphGrid { columns: 0, ..base },
            GlyphGrid { cell_width: 3, ..base },
            GlyphGrid { cell_height: 41, atlas_height: 200, ..base },
        ];
        for grid in broken {
            assert!(matches!(grid.validate(), Err(AtlasError::Grid(_))), "{grid:?}");
        }
    }

    #[test]
    fn invalid_grid_lays_out_without_panicking() {
        let grid = GlyphGrid { first: 'A', fallback: ' ', ..GlyphGrid::default() };
        let mut out = GeometryBuffer::new();
        layout_text(&grid, &request("\u{1}A", 1.0), &mut out);
        assert_eq!(out.len(), 12);
        assert_eq!(grid.cell(' '), (0, 0));

        let no_columns = GlyphGrid { columns: 0, ..GlyphGrid::default() };
        assert_eq!(no_columns.cell('A'), (0, 33));
        assert_eq!(GlyphGrid { first: 'z', last: 'a', ..GlyphGrid::default() }.glyph_count(), 0);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn single_line_yields_six_vertices_per_char() {
        let grid = GlyphGrid::default();
        let mut out = GeometryBuffer::new();
        let req = request("Hello, toy!", 0.5);
        layout_text(&grid, &req, &mut out);

        assert_eq!(out.len(), req.text.len() * 6);

        let advance = 22.0 * 0.5;
        for (i, quad) in out.as_slice().chunks(6).enumerate() {
            let left = quad[0].position[0];
            assert!((left - (10.0 + i as f32 * advance)).abs() < 1e-4);
            assert!((quad[5].position[0] - left - advance).abs() < 1e-4);
            assert_eq!(quad[0].position[1], 500.0);
        }
    }

    #[test]
    fn quads_share_the_diagonal() {
        let grid = GlyphGrid::default();
        let mut out = GeometryBuffer::new();
        layout_text(&grid, &request("A", 1.0), &mut out);
        let q = out.as_slice();
        assert_eq!(q[2], q[3]);
        assert_eq!(q[1], q[4]);
        // Bottom edge samples the bottom of the cell.
        let (_, [_, v_bottom]) = grid.uv_rect('A');
        assert_eq!(q[0].uv[1], v_bottom);
        assert_eq!(q[5].position, [32.0, 541.0]);
    }

    #[test]
    fn newline_resets_x_and_moves_down() {
        let grid = GlyphGrid::default();
        let mut out = GeometryBuffer::new();
        layout_text(&grid, &request("ab\ncd", 1.0), &mut out);

        assert_eq!(out.len(), 4 * 6);
        let third = &out.as_slice()[12];
        assert_eq!(third.position, [10.0, 500.0 - 41.0]);
    }

    #[test]
    fn empty_text_emits_nothing() {
        let grid = GlyphGrid::default();
        let mut out = GeometryBuffer::new();
        layout_text(&grid, &request("", 1.0), &mut out);
        assert!(out.is_empty());
    }
}
