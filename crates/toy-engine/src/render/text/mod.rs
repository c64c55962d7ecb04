//! Overlay text: glyph-grid layout and the batched quad renderer.

mod layout;
mod renderer;

pub use layout::{layout_text, GlyphGrid, TextRequest, MIN_CELL_SIZE};
pub use renderer::{TextBatch, TextRenderer};
