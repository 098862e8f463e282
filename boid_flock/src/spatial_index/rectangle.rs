use crate::error::IndexError;
use crate::Point;

/// Axis aligned rectangle anchored at its minimum corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle, rejecting non-finite values and empty extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, IndexError> {
        let finite = x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite();
        if !finite || width <= 0f64 || height <= 0f64 {
            return Err(IndexError::InvalidBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Square of side `2 * half_extent` centred on `center`.
    pub fn centered(center: Point, half_extent: f64) -> Result<Self, IndexError> {
        Self::new(
            center.x - half_extent,
            center.y - half_extent,
            2f64 * half_extent,
            2f64 * half_extent,
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2f64, self.y + self.height / 2f64)
    }

    /// Open interval test: points on the edge are outside.
    pub fn contains(&self, point: &Point) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }

    /// Boundary inclusive overlap test. Touching edges count as intersecting.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(other.x > self.right()
            || other.right() < self.x
            || other.y > self.bottom()
            || other.bottom() < self.y)
    }

    /// Splits into equal quadrants in NW, NE, SW, SE order.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        let half_w = self.width / 2f64;
        let half_h = self.height / 2f64;
        let quadrant = |x, y| Rectangle {
            x,
            y,
            width: half_w,
            height: half_h,
        };
        [
            quadrant(self.x, self.y),
            quadrant(self.x + half_w, self.y),
            quadrant(self.x, self.y + half_h),
            quadrant(self.x + half_w, self.y + half_h),
        ]
    }
}
