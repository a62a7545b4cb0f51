//! Engine tuning settings value object

use serde::{Deserialize, Serialize};

/// Tunables for shape resolution and aura materialization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Straight segments used to approximate a cone's arc
    pub cone_arc_segments: usize,
    /// Distance in pixels within which a point counts as on a boundary
    pub boundary_tolerance: f64,
    /// Fill color given to synthetic aura templates
    pub aura_fill_color: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cone_arc_segments: 32,
            boundary_tolerance: 1e-6,
            aura_fill_color: "#4d8fcc".to_string(),
        }
    }
}

impl EngineSettings {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cone_arc_segments: env_or("AREAFX_CONE_ARC_SEGMENTS", defaults.cone_arc_segments).max(1),
            boundary_tolerance: env_or("AREAFX_BOUNDARY_TOLERANCE", defaults.boundary_tolerance),
            aura_fill_color: env_or("AREAFX_AURA_FILL_COLOR", defaults.aura_fill_color),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
