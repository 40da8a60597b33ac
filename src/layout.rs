//! Screen-space layout of a graph, derived once from its descriptor.

use crate::axis::tick_values;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::setup::SetupDescriptor;

/// Horizontal offset of captions from the axis, as a fraction of the x margin.
const CAPTION_GAP_FRAC: f32 = 0.10;
/// Length of x-segment tick marks drawn on the zero line.
const X_TICK_LENGTH: f32 = 4.0;

/// Fixed geometry of one graph window.
///
/// Everything here depends only on the descriptor, so it is computed at
/// construction and never touched again.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLayout {
    window_size: (u32, u32),
    x_margin: f32,
    extended_y_margin: f32,
    plot: ScreenRect,
    zero_y: f32,
    amplitude: u32,
    capacity: usize,
    ysegments: u32,
    xsegments: u32,
    y_segment_value: f64,
    x_segment_value: f64,
    y_segment_px: f32,
    x_segment_px: f32,
}

impl PlotLayout {
    /// Derive the layout for a descriptor.
    ///
    /// The plot area is the window minus its margins, with the extended y
    /// margin taken off both the top and the bottom to leave room for
    /// captions. Zero segment counts are treated as one.
    pub fn new(setup: &SetupDescriptor) -> Self {
        let width = setup.width as f32;
        let height = setup.height as f32;
        let margins = setup.margins;
        let x_margin = margins.x as f32;
        let extended = margins.extended_y as f32;

        let x_start = x_margin;
        let y_start = margins.y as f32 + extended;
        let x_end = (width - x_margin).max(x_start);
        let y_end = (height - margins.y as f32 - extended).max(y_start);
        let plot = ScreenRect::new(
            ScreenPoint::new(x_start, y_start),
            ScreenPoint::new(x_end, y_end),
        );

        let ysegments = setup.ysegments.max(1);
        let xsegments = setup.xsegments.max(1);
        let capacity = setup.capacity.max(1);

        Self {
            window_size: (setup.width, setup.height),
            x_margin,
            extended_y_margin: extended,
            plot,
            zero_y: y_start + plot.height() / 2.0,
            amplitude: setup.amplitude,
            capacity,
            ysegments,
            xsegments,
            y_segment_value: f64::from(setup.amplitude) / f64::from(ysegments),
            x_segment_value: capacity as f64 / f64::from(xsegments),
            y_segment_px: plot.height() / (2.0 * ysegments as f32),
            x_segment_px: plot.width() / xsegments as f32,
        }
    }

    /// Window size in pixels.
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// The plot area.
    pub fn plot_rect(&self) -> ScreenRect {
        self.plot
    }

    /// Screen Y of the zero line.
    pub fn zero_y(&self) -> f32 {
        self.zero_y
    }

    /// Amplitude represented by half the plot height.
    pub fn amplitude(&self) -> u32 {
        self.amplitude
    }

    /// Number of samples spread across the plot width.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Y-axis segments on each side of the zero line.
    pub fn ysegments(&self) -> u32 {
        self.ysegments
    }

    /// X-axis segments.
    pub fn xsegments(&self) -> u32 {
        self.xsegments
    }

    /// Value covered by one y segment.
    pub fn y_segment_value(&self) -> f64 {
        self.y_segment_value
    }

    /// Number of samples covered by one x segment.
    pub fn x_segment_value(&self) -> f64 {
        self.x_segment_value
    }

    /// Height of one y segment in pixels.
    pub fn y_segment_px(&self) -> f32 {
        self.y_segment_px
    }

    /// Width of one x segment in pixels.
    pub fn x_segment_px(&self) -> f32 {
        self.x_segment_px
    }

    /// Number of y-axis ticks (`2 * ysegments + 1`).
    pub fn y_tick_count(&self) -> usize {
        (self.ysegments as usize).saturating_mul(2).saturating_add(1)
    }

    /// Tick values paired with their screen Y, top to bottom.
    pub fn y_ticks(&self) -> impl Iterator<Item = (f64, f32)> + '_ {
        tick_values(self.amplitude, self.ysegments)
            .enumerate()
            .map(|(i, value)| (value, self.plot.min.y + i as f32 * self.y_segment_px))
    }

    /// Screen X of every x-segment boundary, left to right.
    pub fn x_ticks(&self) -> impl Iterator<Item = f32> + '_ {
        (0..=self.xsegments).map(|i| self.plot.min.x + i as f32 * self.x_segment_px)
    }

    /// Pixels per unit of sample value.
    pub fn y_scale(&self) -> f32 {
        if self.amplitude == 0 {
            return 0.0;
        }
        self.plot.height() / (2.0 * self.amplitude as f32)
    }

    /// Pixels between consecutive samples.
    pub fn x_step(&self) -> f32 {
        self.plot.width() / self.capacity as f32
    }

    /// The vertical axis and zero line as one polyline.
    ///
    /// Runs from the top of the caption band down the left edge to the
    /// bottom of the caption band, back up to the zero line, then across.
    pub fn sidebar(&self) -> [ScreenPoint; 4] {
        let x_start = self.plot.min.x;
        [
            ScreenPoint::new(x_start, self.plot.min.y - self.extended_y_margin),
            ScreenPoint::new(x_start, self.plot.max.y + self.extended_y_margin),
            ScreenPoint::new(x_start, self.zero_y),
            ScreenPoint::new(self.plot.max.x, self.zero_y),
        ]
    }

    /// Short vertical marks on the zero line at every x-segment boundary.
    pub fn x_tick_marks(&self) -> impl Iterator<Item = [ScreenPoint; 2]> + '_ {
        self.x_ticks().map(|x| {
            [
                ScreenPoint::new(x, self.zero_y - X_TICK_LENGTH / 2.0),
                ScreenPoint::new(x, self.zero_y + X_TICK_LENGTH / 2.0),
            ]
        })
    }

    /// Placement of a caption of the given size for the tick at `tick_y`.
    ///
    /// Captions sit left of the axis, vertically centered on their tick.
    pub fn caption_rect(&self, tick_y: f32, width: f32, height: f32) -> ScreenRect {
        let x = self.plot.min.x - width - CAPTION_GAP_FRAC * self.x_margin;
        let y = tick_y - height / 2.0;
        ScreenRect::from_origin_size(ScreenPoint::new(x.round(), y.round()), width, height)
    }

    /// Region cleared at the start of every frame.
    pub fn clear_rect(&self) -> ScreenRect {
        self.plot.inflate(1.0)
    }
}
