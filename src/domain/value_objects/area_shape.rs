//! Resolved area geometry
//!
//! Templates are resolved into one of these shapes before containment is
//! tested. Rays and cones both become polygons, circles become ellipses.

use serde::{Deserialize, Serialize};

use super::geometry::{polygon_contains, Point};

/// A region in scene pixel space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AreaShape {
    /// Rectangle anchored at one corner, rotated about that corner.
    /// Width and height may be negative when the diagonal points up or left.
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        rotation: f64,
    },
    Polygon {
        vertices: Vec<Point>,
    },
    Ellipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
    },
    /// A template kind this engine does not understand
    Unsupported {
        kind: String,
    },
}

impl AreaShape {
    #[cfg(test)]
    pub fn is_supported(&self) -> bool {
        !matches!(self, AreaShape::Unsupported { .. })
    }

    /// Inclusive containment test; unsupported shapes contain nothing
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        match self {
            AreaShape::Rect {
                origin,
                width,
                height,
                rotation,
            } => {
                let local = point.rotate_about(*origin, -rotation);
                let dx = local.x - origin.x;
                let dy = local.y - origin.y;
                within(dx, 0.0_f64.min(*width), 0.0_f64.max(*width), tolerance)
                    && within(dy, 0.0_f64.min(*height), 0.0_f64.max(*height), tolerance)
            }
            AreaShape::Polygon { vertices } => polygon_contains(vertices, point, tolerance),
            AreaShape::Ellipse {
                center,
                radius_x,
                radius_y,
            } => {
                if *radius_x <= 0.0 || *radius_y <= 0.0 {
                    return point.distance_to(*center) <= tolerance;
                }
                let nx = (point.x - center.x) / radius_x;
                let ny = (point.y - center.y) / radius_y;
                nx * nx + ny * ny <= 1.0 + tolerance
            }
            AreaShape::Unsupported { .. } => false,
        }
    }
}

fn within(value: f64, min: f64, max: f64, tolerance: f64) -> bool {
    value >= min - tolerance && value <= max + tolerance
}
