//! Setup descriptors: the value objects graphs are built from.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::axis::TickFormatter;
use crate::samples::SyncStrategy;
use crate::style::{Rgb, Theme};

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "--";
/// Font file opened when none is given, and the fallback for failed opens.
pub const DEFAULT_FONT_PATH: &str = "selawk.ttf";
/// Default caption font size in points.
pub const DEFAULT_FONT_SIZE: u32 = 12;
/// Default window width in pixels.
pub const DEFAULT_WIDTH: u32 = 640;
/// Default window height in pixels.
pub const DEFAULT_HEIGHT: u32 = 480;
/// Default amplitude (max |y| represented by the plot area).
pub const DEFAULT_AMPLITUDE: u32 = 1000;
/// Default number of samples kept per graph.
pub const DEFAULT_CAPACITY: usize = 500;
/// Default number of y-axis segments on each side of the zero line.
pub const DEFAULT_YSEGMENTS: u32 = 2;
/// Default number of x-axis segments.
pub const DEFAULT_XSEGMENTS: u32 = 5;
/// Default horizontal margin.
pub const DEFAULT_XMARGIN: u32 = 50;
/// Default vertical margin.
pub const DEFAULT_YMARGIN: u32 = 10;
/// Default extra vertical inset reserved for captions.
pub const DEFAULT_EXTENDED_YMARGIN: u32 = 20;
/// Window titles longer than this are truncated.
pub const MAX_TITLE_CHARS: usize = 128;

static SETUP_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_setup_id() -> u64 {
    SETUP_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Where a new window is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPlacement {
    /// Let the windowing system decide.
    #[default]
    Unspecified,
    /// Place the top-left corner at the given screen position.
    At {
        /// Screen X in pixels.
        x: i32,
        /// Screen Y in pixels.
        y: i32,
    },
}

impl WindowPlacement {
    /// Tile windows column-major across the screen.
    ///
    /// Window `index` goes into column `index / per_column`, row
    /// `index % per_column`. `title_offset` leaves room for the title bar
    /// above every row. Positions wrap around the screen size.
    pub fn grid(
        index: u32,
        per_column: u32,
        cell: (u32, u32),
        title_offset: u32,
        screen: (u32, u32),
    ) -> Self {
        let per_column = per_column.max(1);
        let (screen_w, screen_h) = (screen.0.max(1), screen.1.max(1));
        let x = ((index / per_column) * cell.0) % screen_w;
        let y = ((index % per_column) * (cell.1 + title_offset) + title_offset) % screen_h;
        Self::At {
            x: x as i32,
            y: y as i32,
        }
    }
}

/// Margins around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    /// Left and right margin.
    pub x: u32,
    /// Top and bottom margin.
    pub y: u32,
    /// Extra top and bottom inset reserved for axis captions.
    pub extended_y: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            x: DEFAULT_XMARGIN,
            y: DEFAULT_YMARGIN,
            extended_y: DEFAULT_EXTENDED_YMARGIN,
        }
    }
}

bitflags! {
    /// Fields [`SetupDescriptor::finish`] must reset even when they look valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Need: u8 {
        /// Regenerate the id.
        const ID = 0x8;
        /// Reset the plot color.
        const COLOR = 0x4;
        /// Reset the title.
        const TITLE = 0x2;
        /// Reset the font path.
        const FONT = 0x1;
    }
}

/// Describes how to build one graph and its window.
///
/// Descriptors are plain values: cloning one yields an independent template,
/// and [`Library::create_graph_from`](crate::Library::create_graph_from)
/// builds from a borrowed descriptor so the same template can produce
/// several graphs.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupDescriptor {
    /// Unique id.
    pub id: u64,
    /// Window title.
    pub title: String,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
    /// Window position.
    pub placement: WindowPlacement,
    /// Max |y| represented by the plot area.
    pub amplitude: u32,
    /// Number of samples kept.
    pub capacity: usize,
    /// Y-axis segments on each side of the zero line.
    pub ysegments: u32,
    /// X-axis segments.
    pub xsegments: u32,
    /// Plot-area margins.
    pub margins: Margins,
    /// Caption font file.
    pub font_path: PathBuf,
    /// Caption font size in points.
    pub font_size: u32,
    /// Drawing colors.
    pub theme: Theme,
    /// Y-axis caption formatter.
    pub formatter: TickFormatter,
    /// How the sample buffer is shared between ingestion and rendering.
    pub sync: SyncStrategy,
    /// Whether building a graph releases the descriptor.
    ///
    /// Only consulted by [`Library::build`](crate::Library::build); the
    /// by-value and by-reference constructors make the choice statically.
    pub consume: bool,
}

impl Default for SetupDescriptor {
    fn default() -> Self {
        Self {
            id: next_setup_id(),
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            placement: WindowPlacement::Unspecified,
            amplitude: DEFAULT_AMPLITUDE,
            capacity: DEFAULT_CAPACITY,
            ysegments: DEFAULT_YSEGMENTS,
            xsegments: DEFAULT_XSEGMENTS,
            margins: Margins::default(),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
            theme: Theme::default(),
            formatter: TickFormatter::default(),
            sync: SyncStrategy::default(),
            consume: true,
        }
    }
}

impl SetupDescriptor {
    /// Create a descriptor populated with library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the window size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the window placement.
    pub fn with_placement(mut self, placement: WindowPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the amplitude.
    pub fn with_amplitude(mut self, amplitude: u32) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the sample capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the y and x segment counts.
    pub fn with_segments(mut self, ysegments: u32, xsegments: u32) -> Self {
        self.ysegments = ysegments;
        self.xsegments = xsegments;
        self
    }

    /// Set the margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the caption font.
    pub fn with_font(mut self, path: impl Into<PathBuf>, size: u32) -> Self {
        self.font_path = path.into();
        self.font_size = size;
        self
    }

    /// Set the colors.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the foreground color only.
    pub fn with_foreground(mut self, color: Rgb) -> Self {
        self.theme.foreground = color;
        self
    }

    /// Set the y-axis caption formatter.
    pub fn with_formatter(mut self, formatter: TickFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Set the sample buffer synchronization strategy.
    pub fn with_sync(mut self, sync: SyncStrategy) -> Self {
        self.sync = sync;
        self
    }

    /// Set whether [`Library::build`](crate::Library::build) consumes the descriptor.
    pub fn with_consume(mut self, consume: bool) -> Self {
        self.consume = consume;
        self
    }

    /// Window title truncated to [`MAX_TITLE_CHARS`].
    pub fn window_title(&self) -> &str {
        match self.title.char_indices().nth(MAX_TITLE_CHARS) {
            Some((end, _)) => &self.title[..end],
            None => &self.title,
        }
    }

    /// Replace invalid fields with defaults.
    ///
    /// Fields that would make a graph unbuildable (zero sizes, zero segment
    /// counts, empty font path) are always repaired; `need` forces fields that
    /// cannot be detected as invalid back to their defaults. Returns the
    /// number of fields replaced.
    pub fn finish(&mut self, need: Need) -> usize {
        let blank = Self::default();
        let mut replaced = 0;
        let mut replace = |hit: bool| {
            if hit {
                replaced += 1;
            }
            hit
        };

        if replace(need.contains(Need::ID)) {
            self.id = blank.id;
        }
        if replace(need.contains(Need::TITLE) || self.title.is_empty()) {
            self.title = blank.title;
        }
        if replace(self.width == 0) {
            self.width = blank.width;
        }
        if replace(self.height == 0) {
            self.height = blank.height;
        }
        if replace(self.amplitude == 0) {
            self.amplitude = blank.amplitude;
        }
        if replace(self.capacity == 0) {
            self.capacity = blank.capacity;
        }
        if replace(self.ysegments == 0) {
            self.ysegments = blank.ysegments;
        }
        if replace(self.xsegments == 0) {
            self.xsegments = blank.xsegments;
        }
        if replace(need.contains(Need::FONT) || self.font_path.as_os_str().is_empty()) {
            self.font_path = blank.font_path;
        }
        if replace(self.font_size == 0) {
            self.font_size = blank.font_size;
        }
        if replace(need.contains(Need::COLOR)) {
            self.theme.plot = blank.theme.plot;
        }
        replaced
    }
}
