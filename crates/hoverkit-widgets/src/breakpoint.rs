#![forbid(unsafe_code)]

//! Breakpoint indicator.

use hoverkit_core::geometry::{Point, Rect};

/// Side length of the indicator square.
pub const BREAKPOINT_SIZE: f32 = 14.0;

/// Marker drawn on the top-right corner of a statement that has a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakpointIndicator {
    bounds: Rect,
}

impl BreakpointIndicator {
    /// Centre the marker on the right edge of `decorator_box`, at the top
    /// edge of `statement_box`.
    #[must_use]
    pub fn place(decorator_box: Rect, statement_box: Rect) -> Self {
        let center = Point::new(decorator_box.right(), statement_box.y);
        Self {
            bounds: Rect::square_around(center, BREAKPOINT_SIZE),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether a click at `point` lands on the marker.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }
}
