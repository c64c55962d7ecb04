//! RGBA glyph atlas images laid out on a [`GlyphGrid`].

use std::path::{Path, PathBuf};

use crate::error::AtlasError;

use super::text::{GlyphGrid, MIN_CELL_SIZE};

/// Font files tried by [`AtlasSource::SystemFont`], first readable one wins.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Where the glyph atlas comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AtlasSource {
    /// A pre-rendered grid image, exactly `atlas_width x atlas_height`.
    Image(PathBuf),
    /// A TrueType/OpenType font rasterized into the grid.
    Font(PathBuf),
    /// The first installed font from [`SYSTEM_FONT_PATHS`]; blank if none.
    #[default]
    SystemFont,
    /// Outlined empty cells.
    Blank,
}

impl AtlasSource {
    /// Picks `Font` for `.ttf`/`.otf`/`.ttc` paths and `Image` otherwise.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_font = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"));
        if is_font { Self::Font(path) } else { Self::Image(path) }
    }
}

/// CPU copy of the atlas, tightly packed RGBA8, row 0 at the top.
#[derive(Clone)]
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for GlyphAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl GlyphAtlas {
    /// Fails on an invalid grid before touching `source`.
    pub fn load(source: &AtlasSource, grid: &GlyphGrid) -> Result<Self, AtlasError> {
        grid.validate()?;
        match source {
            AtlasSource::Image(path) => Self::from_image_bytes(&read(path)?, grid),
            AtlasSource::Font(path) => Self::from_font_bytes(&read(path)?, grid),
            AtlasSource::SystemFont => {
                let found = SYSTEM_FONT_PATHS
                    .iter()
                    .find_map(|p| std::fs::read(p).ok().map(|bytes| (*p, bytes)));
                match found {
                    Some((path, bytes)) => {
                        log::info!("glyph atlas: rasterizing {path}");
                        Self::from_font_bytes(&bytes, grid)
                    }
                    None => {
                        log::warn!("glyph atlas: no system font found, text will render as boxes");
                        Ok(Self::blank(grid))
                    }
                }
            }
            AtlasSource::Blank => Ok(Self::blank(grid)),
        }
    }

    /// Decodes an encoded image whose size must match the grid's atlas size.
    pub fn from_image_bytes(bytes: &[u8], grid: &GlyphGrid) -> Result<Self, AtlasError> {
        grid.validate()?;
        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();
        if (width, height) != (grid.atlas_width, grid.atlas_height) {
            return Err(AtlasError::Size {
                width,
                height,
                expected_width: grid.atlas_width,
                expected_height: grid.atlas_height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// Rasterizes every glyph of the grid into its cell, white with coverage
    /// in alpha, horizontally centered and sitting on a shared baseline.
    pub fn from_font_bytes(bytes: &[u8], grid: &GlyphGrid) -> Result<Self, AtlasError> {
        grid.validate()?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| AtlasError::Font(e.to_string()))?;

        let px = grid.cell_height as f32 * 0.75;
        let ascent = font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8);
        // Center the ascent..descent band vertically in the cell.
        let baseline = ((grid.cell_height as f32 - px) * 0.5 + ascent).round() as i32;

        let mut atlas = Self::empty(grid);
        for code in grid.first as u32..=grid.last as u32 {
            let Some(ch) = char::from_u32(code) else { continue };
            let (metrics, coverage) = font.rasterize(ch, px);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }

            let (cell_x, cell_y) = grid.cell_origin(ch);
            let left = (grid.cell_width as i32 - metrics.width as i32) / 2;
            let top = baseline - metrics.ymin - metrics.height as i32;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let x = left + col as i32;
                    let y = top + row as i32;
                    if x < 0 || y < 0 || x >= grid.cell_width as i32 || y >= grid.cell_height as i32 {
                        continue;
                    }
                    let alpha = coverage[row * metrics.width + col];
                    atlas.put(cell_x + x as u32, cell_y + y as u32, [255, 255, 255, alpha]);
                }
            }
        }

        log::debug!("rasterized {} glyphs at {px:.1}px", grid.glyph_count());
        Ok(atlas)
    }

    /// Transparent atlas with a one-pixel outline in every glyph cell except
    /// the space. Cells smaller than [`MIN_CELL_SIZE`] stay empty.
    pub fn blank(grid: &GlyphGrid) -> Self {
        let mut atlas = Self::empty(grid);
        if grid.cell_width < MIN_CELL_SIZE || grid.cell_height < MIN_CELL_SIZE {
            return atlas;
        }
        let white = [255, 255, 255, 255];
        for code in grid.first as u32..=grid.last as u32 {
            let Some(ch) = char::from_u32(code) else { continue };
            if ch == ' ' {
                continue;
            }
            let (x0, y0) = grid.cell_origin(ch);
            let (x1, y1) = (x0 + grid.cell_width - 4, y0 + grid.cell_height - 4);
            for x in x0 + 3..=x1 {
                atlas.put(x, y0 + 3, white);
                atlas.put(x, y1, white);
            }
            for y in y0 + 3..=y1 {
                atlas.put(x0 + 3, y, white);
                atlas.put(x1, y, white);
            }
        }
        atlas
    }

    fn empty(grid: &GlyphGrid) -> Self {
        Self {
            width: grid.atlas_width,
            height: grid.atlas_height,
            pixels: vec![0; grid.atlas_width as usize * grid.atlas_height as usize * 4],
        }
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 rows, top to bottom.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[i..i + 4]);
        Some(out)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, AtlasError> {
    std::fs::read(path).map_err(|source| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 4]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("png encode");
        out.into_inner()
    }

    // ── source selection ──────────────────────────────────────────────────

    #[test]
    fn from_path_detects_fonts_by_extension() {
        assert_eq!(AtlasSource::from_path("a/Mono.TTF"), AtlasSource::Font("a/Mono.TTF".into()));
        assert_eq!(AtlasSource::from_path("ascii.png"), AtlasSource::Image("ascii.png".into()));
        assert_eq!(AtlasSource::from_path("noext"), AtlasSource::Image("noext".into()));
    }

    // ── image atlas ───────────────────────────────────────────────────────

    #[test]
    fn image_of_the_right_size_is_accepted() {
        let grid = GlyphGrid::default();
        let atlas = GlyphAtlas::from_image_bytes(&png(512, 512), &grid).expect("atlas");
        assert_eq!((atlas.width(), atlas.height()), (512, 512));
        assert_eq!(atlas.pixels().len(), 512 * 512 * 4);
        assert_eq!(atlas.pixel(511, 511), Some([1, 2, 3, 4]));
    }

    #[test]
    fn image_size_mismatch_is_rejected() {
        let grid = GlyphGrid::default();
        let err = GlyphAtlas::from_image_bytes(&png(256, 512), &grid).unwrap_err();
        assert!(matches!(
            err,
            AtlasError::Size {
                width: 256,
                height: 512,
                expected_width: 512,
                expected_height: 512
            }
        ));
    }

    #[test]
    fn undecodable_image_is_a_decode_error() {
        let grid = GlyphGrid::default();
        let err = GlyphAtlas::from_image_bytes(b"not an image", &grid).unwrap_err();
        assert!(matches!(err, AtlasError::Decode(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let grid = GlyphGrid::default();
        let source = AtlasSource::Image("/definitely/not/here.png".into());
        let err = GlyphAtlas::load(&source, &grid).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }

    // ── font atlas ────────────────────────────────────────────────────────

    #[test]
    fn garbage_font_is_a_font_error() {
        let grid = GlyphGrid::default();
        let err = GlyphAtlas::from_font_bytes(&[0u8; 64], &grid).unwrap_err();
        assert!(matches!(err, AtlasError::Font(_)));
    }

    // ── grid validation ───────────────────────────────────────────────────

    #[test]
    fn invalid_grid_fails_before_reading_the_source() {
        let grid = GlyphGrid { columns: 0, ..GlyphGrid::default() };
        let source = AtlasSource::Image("/definitely/not/here.png".into());
        assert!(matches!(GlyphAtlas::load(&source, &grid), Err(AtlasError::Grid(_))));
        assert!(matches!(GlyphAtlas::from_image_bytes(&png(512, 512), &grid), Err(AtlasError::Grid(_))));
    }

    #[test]
    fn blank_with_tiny_cells_stays_empty() {
        let grid = GlyphGrid { cell_width: 2, cell_height: 2, ..GlyphGrid::default() };
        let atlas = GlyphAtlas::blank(&grid);
        assert!(atlas.pixels().iter().all(|&b| b == 0));
    }

    // ── blank atlas ───────────────────────────────────────────────────────

    #[test]
    fn blank_outlines_cells_but_not_space() {
        let grid = GlyphGrid::default();
        let atlas = GlyphAtlas::blank(&grid);

        let (sx, sy) = grid.cell_origin(' ');
        assert_eq!(atlas.pixel(sx + 3, sy + 3), Some([0, 0, 0, 0]));

        let (ax, ay) = grid.cell_origin('A');
        assert_eq!(atlas.pixel(ax + 3, ay + 3), Some([255; 4]));
        assert_eq!(atlas.pixel(ax + 10, ay + 20), Some([0, 0, 0, 0]));
        assert_eq!(atlas.pixel(512, 0), None);
    }
}
