#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Coordinates are diagram user-space units (origin at top-left, y grows
//! downward), matching the SVG coordinate system the editor draws into.

/// A point in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle for bounding boxes and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f32,
    /// Top edge (inclusive).
    pub y: f32,
    /// Width in diagram units.
    pub width: f32,
    /// Height in diagram units.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle whose top edge is centred on `anchor`.
    #[inline]
    pub fn centered_below(anchor: Point, width: f32, height: f32) -> Self {
        Self::new(anchor.x - width / 2.0, anchor.y, width, height)
    }

    /// Create a square centred on `center`.
    #[inline]
    pub fn square_around(center: Point, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area in square units.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Create a new rectangle inside the current one with the given margin.
    ///
    /// Dimensions never go negative.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x + margin.left,
            y: self.y + margin.top,
            width: (self.width - margin.left - margin.right).max(0.0),
            height: (self.height - margin.top - margin.bottom).max(0.0),
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Split horizontally into `parts` equal columns, left to right.
    pub fn columns(&self, parts: usize) -> Vec<Rect> {
        if parts == 0 {
            return Vec::new();
        }
        let step = self.width / parts as f32;
        (0..parts)
            .map(|i| Rect::new(self.x + step * i as f32, self.y, step, self.height))
            .collect()
    }
}

/// Margins on four sides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Sides {
    /// Create margins from explicit values.
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same margin on every side.
    #[inline]
    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}
