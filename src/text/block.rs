use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Bitmap, LoadedFont, TextRasterizer};
use crate::error::{TextError, TextResult};
use crate::style::Rgb;

/// Rasterizer that draws every non-space character as a solid block.
///
/// Needs no font files, so it backs the headless backend in tests and demos.
/// Glyph cells are `size / 2` wide and `size` tall. Opens for configured
/// paths fail, and the whole subsystem can be made to fail at init.
#[derive(Debug, Default)]
pub struct BlockRasterizer {
    failing: HashSet<PathBuf>,
    fail_init: bool,
    opens: AtomicUsize,
    failures: AtomicUsize,
    renders: Arc<AtomicUsize>,
}

impl BlockRasterizer {
    /// Create a rasterizer that opens every path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make opening `path` fail.
    pub fn with_failing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Make [`TextRasterizer::init`] fail.
    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Number of successful font opens.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    /// Number of failed font opens.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Number of strings rasterized by fonts from this rasterizer.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::Relaxed)
    }
}

impl TextRasterizer for BlockRasterizer {
    fn init(&self) -> TextResult<()> {
        if self.fail_init {
            return Err(TextError::Unavailable("block rasterizer disabled".into()));
        }
        Ok(())
    }

    fn open_font(&self, path: &Path, size: u32) -> TextResult<Box<dyn LoadedFont>> {
        if self.failing.contains(path) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(TextError::InvalidFont {
                path: path.to_path_buf(),
            });
        }
        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(BlockFont {
            cell: ((size / 2).max(1), size.max(1)),
            renders: Arc::clone(&self.renders),
        }))
    }
}

struct BlockFont {
    cell: (u32, u32),
    renders: Arc<AtomicUsize>,
}

impl LoadedFont for BlockFont {
    fn render(&self, text: &str, color: Rgb) -> TextResult<Bitmap> {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return Err(TextError::EmptyText(text.to_string()));
        }
        self.renders.fetch_add(1, Ordering::Relaxed);
        let (cell_w, cell_h) = self.cell;
        let mut bitmap = Bitmap::new(chars * cell_w, cell_h);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = i as u32 * cell_w;
            for y in 0..cell_h {
                for x in left..left + cell_w {
                    bitmap.cover(x as i32, y as i32, color, 1.0);
                }
            }
        }
        Ok(bitmap)
    }
}
