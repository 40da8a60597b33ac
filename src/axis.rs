//! Y-axis tick values and caption formatting.

use std::sync::Arc;

/// Width of a formatted caption in characters.
pub const LABEL_WIDTH: usize = 11;

/// Formatter for y-axis captions.
#[derive(Clone, Default)]
pub enum TickFormatter {
    /// Right-aligned decimal integer, [`LABEL_WIDTH`] characters wide.
    #[default]
    FixedWidth,
    /// Custom formatter callback. Output is capped at [`LABEL_WIDTH`] characters.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl TickFormatter {
    /// Format a tick value for display.
    pub fn format(&self, value: f64) -> String {
        let mut label = match self {
            Self::FixedWidth => format!("{:>width$}", value.round() as i64, width = LABEL_WIDTH),
            Self::Custom(formatter) => formatter(value),
        };
        if let Some((end, _)) = label.char_indices().nth(LABEL_WIDTH) {
            label.truncate(end);
        }
        label
    }
}

impl PartialEq for TickFormatter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::FixedWidth, Self::FixedWidth) => true,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for TickFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedWidth => write!(f, "TickFormatter::FixedWidth"),
            Self::Custom(_) => write!(f, "TickFormatter::Custom(..)"),
        }
    }
}

/// Tick values from `+amplitude` down to `-amplitude`.
///
/// Always yields exactly `2 * ysegments + 1` values; the step is recomputed
/// as a float so amplitudes that do not divide evenly still land on both
/// endpoints.
pub fn tick_values(amplitude: u32, ysegments: u32) -> impl Iterator<Item = f64> {
    let ysegments = ysegments.max(1);
    let amplitude = f64::from(amplitude);
    let step = amplitude / f64::from(ysegments);
    let count = 2 * u64::from(ysegments) + 1;
    (0..count).map(move |i| {
        if i == count - 1 {
            -amplitude
        } else {
            amplitude - step * i as f64
        }
    })
}
