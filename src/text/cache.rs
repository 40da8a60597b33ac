use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use super::{Font, FontId, TextRasterizer, Texture};
use crate::error::{TextError, TextResult};
use crate::setup::DEFAULT_FONT_PATH;
use crate::style::Rgb;

/// Key of the font cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Font file path.
    pub path: PathBuf,
    /// Point size.
    pub size: u32,
}

/// Key of the label cache.
///
/// Any difference in font identity, any color channel, or the exact text
/// is a miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelKey {
    /// Font the label is rendered with.
    pub font: FontId,
    /// Text color.
    pub color: Rgb,
    /// Formatted label text.
    pub text: String,
}

/// Memoized fonts and rendered labels.
///
/// Entries are created lazily and never evicted; [`GlyphCache::clear`]
/// releases everything at library shutdown. Handed-out `Arc`s stay valid
/// after a clear, they are simply no longer shared with new lookups.
pub struct GlyphCache {
    rasterizer: Arc<dyn TextRasterizer>,
    fonts: Mutex<HashMap<FontKey, Arc<Font>>>,
    labels: Mutex<HashMap<LabelKey, Arc<Texture>>>,
}

impl GlyphCache {
    /// Create an empty cache over a rasterizer.
    pub fn new(rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self {
            rasterizer,
            fonts: Mutex::new(HashMap::new()),
            labels: Mutex::new(HashMap::new()),
        }
    }

    /// The rasterizer fonts are opened with.
    pub fn rasterizer(&self) -> &Arc<dyn TextRasterizer> {
        &self.rasterizer
    }

    /// Fetch or open a font.
    ///
    /// Fonts are keyed by path *and* size, so two graphs asking for the same
    /// file at different sizes get different font objects. Failed opens are
    /// not cached.
    pub fn font(&self, path: &Path, size: u32) -> TextResult<Arc<Font>> {
        let key = FontKey {
            path: path.to_path_buf(),
            size,
        };
        if let Some(font) = self.fonts.lock().expect("font cache lock").get(&key) {
            return Ok(Arc::clone(font));
        }

        let face = self.rasterizer.open_font(path, size)?;
        debug!("opened font {} at {size}pt", path.display());
        let font = Arc::new(Font::new(key.path.clone(), size, face));
        let mut fonts = self.fonts.lock().expect("font cache lock");
        Ok(Arc::clone(fonts.entry(key).or_insert(font)))
    }

    /// Fetch or open a font, falling back once to [`DEFAULT_FONT_PATH`].
    ///
    /// Returns `None` when neither the requested font nor the default can be
    /// opened; the caller then goes without captions.
    pub fn font_with_fallback(&self, path: &Path, size: u32) -> Option<Arc<Font>> {
        match self.font(path, size) {
            Ok(font) => Some(font),
            Err(err) => {
                let default = Path::new(DEFAULT_FONT_PATH);
                if path == default {
                    warn!("{err}; captions disabled");
                    return None;
                }
                warn!("{err}; falling back to {DEFAULT_FONT_PATH}");
                match self.font(default, size) {
                    Ok(font) => Some(font),
                    Err(err) => {
                        warn!("{err}; captions disabled");
                        None
                    }
                }
            }
        }
    }

    /// Fetch or render a label texture.
    pub fn label(&self, font: &Font, color: Rgb, text: &str) -> TextResult<Arc<Texture>> {
        let key = LabelKey {
            font: font.id(),
            color,
            text: text.to_string(),
        };
        if let Some(texture) = self.labels.lock().expect("label cache lock").get(&key) {
            return Ok(Arc::clone(texture));
        }

        let bitmap = font.render(text, color)?;
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(TextError::EmptyText(text.to_string()));
        }
        let texture = Arc::new(Texture::new(text, color, font.size(), bitmap));
        let mut labels = self.labels.lock().expect("label cache lock");
        Ok(Arc::clone(labels.entry(key).or_insert(texture)))
    }

    /// Number of cached fonts.
    pub fn font_count(&self) -> usize {
        self.fonts.lock().expect("font cache lock").len()
    }

    /// Number of cached label textures.
    pub fn label_count(&self) -> usize {
        self.labels.lock().expect("label cache lock").len()
    }

    /// Release every cached texture and font, returning how many of each
    /// were dropped.
    pub fn clear(&self) -> (usize, usize) {
        let labels = std::mem::take(&mut *self.labels.lock().expect("label cache lock"));
        let fonts = std::mem::take(&mut *self.fonts.lock().expect("font cache lock"));
        (fonts.len(), labels.len())
    }
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("fonts", &self.font_count())
            .field("labels", &self.label_count())
            .finish()
    }
}
