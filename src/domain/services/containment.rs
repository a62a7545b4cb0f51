//! Containment - Which points and tokens fall inside an area
//!
//! Pure functions over resolved shapes. Boundaries are inclusive so a token
//! sitting exactly on a template's edge still counts as caught in it.

use crate::domain::entities::{Area, Scene, Token};
use crate::domain::value_objects::{AreaShape, Point};

/// Whether `point` lies inside `shape`, edges included
///
/// Unsupported shapes are never contained and never error.
pub fn is_contained(point: Point, shape: &AreaShape, tolerance: f64) -> bool {
    if let AreaShape::Unsupported { kind } = shape {
        tracing::trace!(kind = %kind, "Unsupported area shape, treating as empty");
        return false;
    }
    shape.contains(point, tolerance)
}

/// All tokens in `scene` whose center lies inside `area`
pub fn tokens_in_area<'a>(scene: &'a Scene, area: &Area, tolerance: f64) -> Vec<&'a Token> {
    scene
        .tokens
        .iter()
        .filter(|token| is_contained(token.center, &area.shape, tolerance))
        .collect()
}
