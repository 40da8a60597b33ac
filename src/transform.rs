//! Mapping from samples to screen coordinates.

use crate::geom::ScreenPoint;
use crate::layout::PlotLayout;

/// Transform from (chronological index, sample value) into screen space.
///
/// X positions are evenly spaced across the plot width and never change;
/// Y positions are `zero_y - value * y_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTransform {
    x_origin: f32,
    x_step: f32,
    zero_y: f32,
    y_scale: f32,
}

impl SampleTransform {
    /// Build the transform for a layout.
    pub fn new(layout: &PlotLayout) -> Self {
        Self {
            x_origin: layout.plot_rect().min.x + 1.0,
            x_step: layout.x_step(),
            zero_y: layout.zero_y(),
            y_scale: layout.y_scale(),
        }
    }

    /// Screen X of the sample at a chronological position.
    pub fn x(&self, index: usize) -> f32 {
        self.x_origin + self.x_step * index as f32
    }

    /// Screen Y of a sample value.
    pub fn y(&self, value: f32) -> f32 {
        self.zero_y - value * self.y_scale
    }

    /// Map a sample into screen space.
    pub fn to_screen(&self, index: usize, value: f32) -> ScreenPoint {
        ScreenPoint::new(self.x(index), self.y(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::SetupDescriptor;

    #[test]
    fn amplitude_maps_to_plot_edges() {
        let layout = PlotLayout::new(&SetupDescriptor::default());
        let transform = SampleTransform::new(&layout);
        assert_eq!(transform.y(0.0), layout.zero_y());
        assert!((transform.y(1000.0) - layout.plot_rect().min.y).abs() < 1e-3);
        assert!((transform.y(-1000.0) - layout.plot_rect().max.y).abs() < 1e-3);
    }

    #[test]
    fn x_positions_are_evenly_spaced() {
        let layout = PlotLayout::new(&SetupDescriptor::default().with_capacity(540));
        let transform = SampleTransform::new(&layout);
        assert_eq!(transform.x(0), 51.0);
        assert_eq!(transform.x(10) - transform.x(9), 1.0);
    }
}
