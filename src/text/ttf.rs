use std::path::Path;

use rusttype::{PositionedGlyph, Scale, point};

use super::{Bitmap, LoadedFont, TextRasterizer};
use crate::error::{TextError, TextResult};
use crate::style::Rgb;

/// TrueType/OpenType rasterizer backed by `rusttype`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtfRasterizer;

impl TtfRasterizer {
    /// Create the rasterizer.
    pub fn new() -> Self {
        Self
    }
}

impl TextRasterizer for TtfRasterizer {
    fn open_font(&self, path: &Path, size: u32) -> TextResult<Box<dyn LoadedFont>> {
        let data = std::fs::read(path).map_err(|source| TextError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = rusttype::Font::try_from_vec(data).ok_or_else(|| TextError::InvalidFont {
            path: path.to_path_buf(),
        })?;
        Ok(Box::new(TtfFont {
            font,
            scale: Scale::uniform(size.max(1) as f32),
        }))
    }
}

struct TtfFont {
    font: rusttype::Font<'static>,
    scale: Scale,
}

impl LoadedFont for TtfFont {
    fn render(&self, text: &str, color: Rgb) -> TextResult<Bitmap> {
        let v_metrics = self.font.v_metrics(self.scale);
        let glyphs: Vec<PositionedGlyph<'_>> = self
            .font
            .layout(text, self.scale, point(0.0, v_metrics.ascent))
            .collect();

        // Advance-based width keeps leading spaces, so right-aligned labels
        // line up on their last digit.
        let width = glyphs
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil();
        let height = (v_metrics.ascent - v_metrics.descent).ceil();
        if width < 1.0 || height < 1.0 {
            return Err(TextError::EmptyText(text.to_string()));
        }

        let mut bitmap = Bitmap::new(width as u32, height as u32);
        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    bitmap.cover(bb.min.x + gx as i32, bb.min.y + gy as i32, color, coverage);
                });
            }
        }
        Ok(bitmap)
    }
}
