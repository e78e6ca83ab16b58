//! Query regions: axis-aligned rectangles and circles.

use glam::DVec2;

/// A shape that can be tested against points and quadtree node bounds.
pub trait Region {
    /// Returns `true` if `point` lies inside or exactly on the region boundary.
    fn contains(&self, point: DVec2) -> bool;

    /// Returns `true` if the region overlaps `rect` (touching counts).
    fn intersects(&self, rect: &Rect) -> bool;
}

/// Axis-aligned rectangle, closed on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner.
    pub min: DVec2,
    /// Maximum corner.
    pub max: DVec2,
}

impl Rect {
    /// Rectangle with origin `(x, y)` and the given width and height.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: DVec2::new(x, y),
            max: DVec2::new(x + width, y + height),
        }
    }

    /// Rectangle spanning two corners.
    pub fn from_corners(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height.
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Splits into four quadrants ordered
    /// \[bottom-left, bottom-right, top-left, top-right\].
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid = self.center();
        [
            Rect::from_corners(self.min, mid),
            Rect::from_corners(DVec2::new(mid.x, self.min.y), DVec2::new(self.max.x, mid.y)),
            Rect::from_corners(DVec2::new(self.min.x, mid.y), DVec2::new(mid.x, self.max.y)),
            Rect::from_corners(mid, self.max),
        ]
    }

    /// Index into [`Rect::quadrants`] of the quadrant that owns `point`.
    ///
    /// Points on a midline go to the upper/right quadrant so each point has
    /// exactly one owner.
    pub fn quadrant_of(&self, point: DVec2) -> usize {
        let mid = self.center();
        match (point.x >= mid.x, point.y >= mid.y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }
}

impl Region for Rect {
    fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    fn intersects(&self, rect: &Rect) -> bool {
        self.min.x <= rect.max.x
            && self.max.x >= rect.min.x
            && self.min.y <= rect.max.y
            && self.max.y >= rect.min.y
    }
}

/// Circle defined by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point.
    pub center: DVec2,
    /// Radius (non-negative).
    pub radius: f64,
}

impl Circle {
    /// Circle at `(x, y)` with the given radius.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            center: DVec2::new(x, y),
            radius,
        }
    }
}

impl Region for Circle {
    fn contains(&self, point: DVec2) -> bool {
        // Squared comparison avoids the root and keeps zero-radius queries exact.
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    fn intersects(&self, rect: &Rect) -> bool {
        let closest = self.center.clamp(rect.min, rect.max);
        self.center.distance_squared(closest) <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(DVec2::new(0.0, 0.0)));
        assert!(rect.contains(DVec2::new(10.0, 10.0)));
        assert!(rect.contains(DVec2::new(10.0, 5.0)));
        assert!(!rect.contains(DVec2::new(10.01, 5.0)));
    }

    #[test]
    fn test_quadrants_cover_parent() {
        let rect = Rect::new(0.0, 0.0, 8.0, 4.0);
        let quads = rect.quadrants();
        assert_eq!(quads[0], Rect::new(0.0, 0.0, 4.0, 2.0));
        assert_eq!(quads[3], Rect::new(4.0, 2.0, 4.0, 2.0));
        let area: f64 = quads.iter().map(|q| q.size().x * q.size().y).sum();
        assert!((area - 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadrant_of_midline_goes_up_right() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect.quadrant_of(DVec2::new(5.0, 5.0)), 3);
        assert_eq!(rect.quadrant_of(DVec2::new(4.9, 5.0)), 2);
        assert_eq!(rect.quadrant_of(DVec2::new(5.0, 4.9)), 1);
        assert_eq!(rect.quadrant_of(DVec2::new(1.0, 1.0)), 0);
    }

    #[test]
    fn test_circle_boundary_is_inclusive() {
        let circle = Circle::new(0.0, 0.0, 5.0);
        assert!(circle.contains(DVec2::new(5.0, 0.0)));
        assert!(circle.contains(DVec2::new(3.0, 4.0)));
        assert!(!circle.contains(DVec2::new(5.0, 0.001)));
    }

    #[test]
    fn test_zero_radius_circle_contains_only_center() {
        let circle = Circle::new(2.0, 3.0, 0.0);
        assert!(circle.contains(DVec2::new(2.0, 3.0)));
        assert!(!circle.contains(DVec2::new(2.0, 3.000_001)));
    }

    #[test]
    fn test_circle_rect_intersection() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0);
        assert!(Circle::new(0.0, 15.0, 10.0).intersects(&rect));
        assert!(!Circle::new(0.0, 15.0, 9.9).intersects(&rect));
        // Diagonal corner touch.
        assert!(Circle::new(7.0, 6.0, 5.0).intersects(&rect));
        // Center inside the rect.
        assert!(Circle::new(15.0, 15.0, 0.0).intersects(&rect));
    }
}
