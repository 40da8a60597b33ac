//! Geometric primitives used by the drawing pipeline.
//!
//! All coordinates are window-relative pixels with the origin at the top-left
//! corner and Y growing downwards.

/// A point in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// X value in screen pixels.
    pub x: f32,
    /// Y value in screen pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub const fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from its top-left corner and size.
    pub fn from_origin_size(origin: ScreenPoint, width: f32, height: f32) -> Self {
        Self::new(
            origin,
            ScreenPoint::new(origin.x + width, origin.y + height),
        )
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Grow the rectangle by `amount` pixels on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(
            ScreenPoint::new(self.min.x - amount, self.min.y - amount),
            ScreenPoint::new(self.max.x + amount, self.max.y + amount),
        )
    }

    /// Check whether a point lies inside the rectangle (edges inclusive).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflate_grows_all_sides() {
        let rect = ScreenRect::new(ScreenPoint::new(10.0, 20.0), ScreenPoint::new(30.0, 40.0));
        let grown = rect.inflate(1.0);
        assert_eq!(grown.min, ScreenPoint::new(9.0, 19.0));
        assert_eq!(grown.max, ScreenPoint::new(31.0, 41.0));
        assert_eq!(grown.width(), 22.0);
    }

    #[test]
    fn degenerate_rect_is_invalid() {
        let rect = ScreenRect::from_origin_size(ScreenPoint::new(5.0, 5.0), 0.0, 3.0);
        assert!(!rect.is_valid());
        assert!(rect.contains(ScreenPoint::new(5.0, 6.0)));
    }
}
