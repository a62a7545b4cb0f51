//! 2D geometry primitives in scene pixel space
//!
//! Scene coordinates follow the host canvas: x grows to the right, y grows
//! downward, and angles are measured in degrees clockwise from +x.

use serde::{Deserialize, Serialize};

/// A point in scene pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from `self` along `degrees`
    pub fn project(self, degrees: f64, distance: f64) -> Self {
        let radians = degrees.to_radians();
        Self::new(
            self.x + distance * radians.cos(),
            self.y + distance * radians.sin(),
        )
    }

    /// Rotate around `pivot` by `degrees`
    pub fn rotate_about(self, pivot: Point, degrees: f64) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Self::new(
            pivot.x + dx * cos - dy * sin,
            pivot.y + dx * sin + dy * cos,
        )
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Grid scale of a scene
///
/// Template measurements are in game units (`distance` per square) while
/// token positions are in pixels (`size` per square).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Pixels per grid square
    pub size: f64,
    /// Game units per grid square
    pub distance: f64,
}

impl GridConfig {
    pub fn new(size: f64, distance: f64) -> Self {
        Self { size, distance }
    }

    /// One pixel per unit
    #[cfg(test)]
    pub fn unit() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn pixels_per_unit(&self) -> f64 {
        if self.distance <= 0.0 {
            return self.size;
        }
        self.size / self.distance
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(100.0, 5.0)
    }
}

/// Whether `point` lies on segment `a`-`b` within `tolerance` pixels
fn on_segment(point: Point, a: Point, b: Point, tolerance: f64) -> bool {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let length_sq = abx * abx + aby * aby;
    if length_sq == 0.0 {
        return point.distance_to(a) <= tolerance;
    }
    let t = (((point.x - a.x) * abx + (point.y - a.y) * aby) / length_sq).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * abx, a.y + t * aby);
    point.distance_to(closest) <= tolerance
}

/// Inclusive point-in-polygon: edges count as inside, then even-odd casting
pub(super) fn polygon_contains(vertices: &[Point], point: Point, tolerance: f64) -> bool {
    if vertices.len() < 3 {
        return vertices
            .windows(2)
            .any(|edge| on_segment(point, edge[0], edge[1], tolerance))
            || vertices.first().is_some_and(|v| v.distance_to(point) <= tolerance);
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        if on_segment(point, a, b, tolerance) {
            return true;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let crossing_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = Point::new(1.0, 0.0).rotate_about(Point::default(), 90.0);
        assert!((rotated.x - 0.0).abs() < EPS);
        assert!((rotated.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_polygon_interior_and_exterior() {
        assert!(polygon_contains(&square(), Point::new(5.0, 5.0), EPS));
        assert!(!polygon_contains(&square(), Point::new(15.0, 5.0), EPS));
        assert!(!polygon_contains(&square(), Point::new(-0.5, 5.0), EPS));
    }

    #[test]
    fn test_polygon_boundary_is_inclusive() {
        assert!(polygon_contains(&square(), Point::new(10.0, 5.0), EPS));
        assert!(polygon_contains(&square(), Point::new(0.0, 0.0), EPS));
        assert!(polygon_contains(&square(), Point::new(5.0, 10.0), EPS));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upward
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 6.0),
            Point::new(6.0, 6.0),
            Point::new(6.0, 0.0),
            Point::new(9.0, 0.0),
            Point::new(9.0, 9.0),
            Point::new(0.0, 9.0),
        ];
        assert!(polygon_contains(&u, Point::new(1.5, 3.0), EPS));
        assert!(!polygon_contains(&u, Point::new(4.5, 3.0), EPS));
        assert!(polygon_contains(&u, Point::new(4.5, 7.5), EPS));
    }

    #[test]
    fn test_grid_scale() {
        assert_eq!(GridConfig::default().pixels_per_unit(), 20.0);
        assert_eq!(GridConfig::unit().pixels_per_unit(), 1.0);
    }
}
