#![forbid(unsafe_code)]

//! Geometric primitives.

/// A bounding box in CSS pixels.
///
/// Coordinates are viewport-relative (origin at the top-left of the visible
/// page), exactly as `getBoundingClientRect` reports them. Values may be
/// fractional and may be negative for boxes scrolled above the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Check if the rectangle has no area.
    ///
    /// Detached or `display: none` elements report all-zero boxes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Top edge in document coordinates, rounded to whole pixels.
    ///
    /// `scroll_y` is the page's vertical scroll offset at measurement time.
    /// Rounding absorbs sub-pixel layout jitter so two cards in the same
    /// visual band compare as integers.
    #[inline]
    pub fn document_top(&self, scroll_y: f64) -> i64 {
        (self.y + scroll_y).round() as i64
    }
}
