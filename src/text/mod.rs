//! Text rasterization boundary and the glyph cache built on it.
//!
//! A [`TextRasterizer`] opens fonts; a [`LoadedFont`] turns a string into a
//! [`Bitmap`]. The [`GlyphCache`] memoizes both so captions are rasterized
//! once per distinct (font, color, text) and then reused every frame.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TextResult;
use crate::style::Rgb;

mod block;
mod cache;
mod ttf;

pub use block::BlockRasterizer;
pub use cache::{FontKey, GlyphCache, LabelKey};
pub use ttf::TtfRasterizer;

static FONT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static TEXTURE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opens fonts from files.
pub trait TextRasterizer: Send + Sync {
    /// Initialize the font subsystem.
    ///
    /// Called once by [`Library::init`](crate::Library::init). A failure is
    /// soft: the library records it and graphs are built without captions.
    fn init(&self) -> TextResult<()> {
        Ok(())
    }

    /// Open the font at `path` at the given point size.
    fn open_font(&self, path: &Path, size: u32) -> TextResult<Box<dyn LoadedFont>>;
}

/// A font opened by a [`TextRasterizer`].
pub trait LoadedFont: Send + Sync {
    /// Rasterize a single line of text in a solid color.
    fn render(&self, text: &str, color: Rgb) -> TextResult<Bitmap>;
}

/// Straight-alpha RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA value at a pixel, if inside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[at..at + 4]);
        Some(out)
    }

    /// Paint `color` at a pixel with the given coverage (0.0..=1.0).
    ///
    /// Coverage only ever raises alpha, so overlapping glyph edges do not
    /// punch holes into each other. Out-of-bounds pixels are ignored.
    pub fn cover(&mut self, x: i32, y: i32, color: Rgb, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        let px = &mut self.pixels[at..at + 4];
        px[0] = color.r;
        px[1] = color.g;
        px[2] = color.b;
        px[3] = px[3].max(alpha);
    }
}

/// Identity of a cached font object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(u64);

impl FontId {
    fn next() -> Self {
        Self(FONT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An opened font together with the key it was opened under.
pub struct Font {
    id: FontId,
    path: PathBuf,
    size: u32,
    face: Box<dyn LoadedFont>,
}

impl Font {
    pub(crate) fn new(path: PathBuf, size: u32, face: Box<dyn LoadedFont>) -> Self {
        Self {
            id: FontId::next(),
            path,
            size,
            face,
        }
    }

    /// Unique id of this font object.
    pub fn id(&self) -> FontId {
        self.id
    }

    /// File the font was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rasterize text with this font.
    pub fn render(&self, text: &str, color: Rgb) -> TextResult<Bitmap> {
        self.face.render(text, color)
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Identity of a rendered label texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(TEXTURE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A rasterized label.
///
/// Keeps the text, color and point size it was rendered from, so backends
/// with their own text pipeline can draw the label natively instead of
/// uploading the bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    id: TextureId,
    text: String,
    color: Rgb,
    font_size: u32,
    bitmap: Bitmap,
}

impl Texture {
    pub(crate) fn new(text: &str, color: Rgb, font_size: u32, bitmap: Bitmap) -> Self {
        Self {
            id: TextureId::next(),
            text: text.to_string(),
            color,
            font_size,
            bitmap,
        }
    }

    /// Unique id of this texture.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// The text that was rendered.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text color.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Point size of the font used.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Rendered pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}
