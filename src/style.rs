//! Colors and theming.
//!
//! Configuration only exposes three 8-bit channels per color. The alpha used
//! when drawing each role is a fixed library constant. Draw calls are issued
//! without blending, so alpha only matters to backends that composite.

/// Alpha used when clearing the plot background.
pub const BACKGROUND_ALPHA: u8 = 0xFF;
/// Alpha used for guide lines.
pub const FOREGROUND_ALPHA: u8 = 0x00;
/// Alpha used for the plotted series.
pub const PLOT_ALPHA: u8 = 0xFF;

/// An opaque 8-bit RGB color as it appears in a [`SetupDescriptor`](crate::SetupDescriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a new color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an alpha channel for drawing.
    pub const fn with_alpha(self, a: u8) -> Color {
        Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Black.
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00);
    /// White.
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);
    /// Red.
    pub const RED: Self = Self::new(0xD0, 0x00, 0x00);
    /// Green.
    pub const GREEN: Self = Self::new(0x00, 0xD0, 0x00);
    /// Blue.
    pub const BLUE: Self = Self::new(0x00, 0x00, 0xF0);
    /// Yellow.
    pub const YELLOW: Self = Self::new(0xFF, 0xFF, 0x00);
    /// Light gray, the default background.
    pub const LIGHT_GRAY: Self = Self::new(0xF0, 0xF0, 0xF0);
    /// Purple, the default plot color.
    pub const PURPLE: Self = Self::new(0xD0, 0x00, 0xD0);
    /// Gold.
    pub const GOLD: Self = Self::new(0xD1, 0x8B, 0x00);
    /// Teal.
    pub const TEAL: Self = Self::new(0x00, 0xDB, 0xD2);
}

/// An RGBA draw color handed to backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Drop the alpha channel.
    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Colors for the three drawing roles of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Guide lines and axis captions.
    pub foreground: Rgb,
    /// Plot-area background.
    pub background: Rgb,
    /// The plotted series.
    pub plot: Rgb,
}

impl Theme {
    /// Background draw color with its fixed alpha.
    pub fn background_color(&self) -> Color {
        self.background.with_alpha(BACKGROUND_ALPHA)
    }

    /// Foreground draw color with its fixed alpha.
    pub fn foreground_color(&self) -> Color {
        self.foreground.with_alpha(FOREGROUND_ALPHA)
    }

    /// Plot draw color with its fixed alpha.
    pub fn plot_color(&self) -> Color {
        self.plot.with_alpha(PLOT_ALPHA)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Rgb::BLACK,
            background: Rgb::LIGHT_GRAY,
            plot: Rgb::PURPLE,
        }
    }
}
