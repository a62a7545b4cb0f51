//! Value objects - Immutable objects defined by their attributes

mod area_shape;
mod geometry;
mod ids;
mod settings;

pub use area_shape::AreaShape;
pub use geometry::{GridConfig, Point};
pub use ids::*;
pub use settings::EngineSettings;
