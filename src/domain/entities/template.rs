//! Measured template entity - A placed area on a scene

use serde::{Deserialize, Serialize};

use crate::domain::entities::EffectPayload;
use crate::domain::value_objects::{
    AreaShape, DocumentUuid, EngineSettings, GridConfig, MessageId, Point, TemplateId, UserId,
};

/// Default cone spread in degrees
const DEFAULT_CONE_ANGLE: f64 = 53.13;

/// Shape kind of a template (`t` on the host document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Circle,
    Cone,
    Rect,
    Ray,
    /// Anything the host may add later
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::Circle => write!(f, "circle"),
            TemplateKind::Cone => write!(f, "cone"),
            TemplateKind::Rect => write!(f, "rect"),
            TemplateKind::Ray => write!(f, "ray"),
            TemplateKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Effect a placed template hands out to tokens inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AreaEffectSource {
    /// Effect data stored on the template itself
    Inline(EffectPayload),
    /// Reference to an effect document elsewhere
    Reference(DocumentUuid),
}

/// System flags stored on a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateFlags {
    /// Effects from this template are never removed on leaving it
    pub instantaneous: bool,
    /// Chat message of the test that placed this template
    pub message_id: Option<MessageId>,
    /// Set on synthetic aura templates: the radiating effect
    pub effect_uuid: Option<DocumentUuid>,
    pub area_effect: Option<AreaEffectSource>,
}

/// A measured template document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredTemplate {
    pub id: TemplateId,
    #[serde(rename = "t")]
    pub kind: TemplateKind,
    pub x: f64,
    pub y: f64,
    /// Length or radius in game units
    pub distance: f64,
    /// Degrees clockwise from +x
    #[serde(default)]
    pub direction: f64,
    /// Cone spread in degrees
    #[serde(default = "default_cone_angle")]
    pub angle: f64,
    /// Ray width in game units
    #[serde(default = "default_ray_width")]
    pub width: f64,
    /// Rectangle rotation in degrees about the anchor
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub flags: TemplateFlags,
}

fn default_cone_angle() -> f64 {
    DEFAULT_CONE_ANGLE
}

fn default_ray_width() -> f64 {
    1.0
}

impl MeasuredTemplate {
    pub fn new(kind: TemplateKind, origin: Point, distance: f64) -> Self {
        Self {
            id: TemplateId::new(),
            kind,
            x: origin.x,
            y: origin.y,
            distance,
            direction: 0.0,
            angle: DEFAULT_CONE_ANGLE,
            width: default_ray_width(),
            rotation: 0.0,
            fill_color: None,
            user: None,
            flags: TemplateFlags::default(),
        }
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(TemplateKind::Circle, center, radius)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Resolve this template into scene-space geometry
    pub fn resolve_shape(&self, grid: &GridConfig, settings: &EngineSettings) -> AreaShape {
        let scale = grid.pixels_per_unit();
        let length = self.distance * scale;
        let origin = self.origin();

        match self.kind {
            TemplateKind::Circle => AreaShape::Ellipse {
                center: origin,
                radius_x: length,
                radius_y: length,
            },
            TemplateKind::Rect => {
                let far = origin.project(self.direction, length);
                AreaShape::Rect {
                    origin,
                    width: far.x - origin.x,
                    height: far.y - origin.y,
                    rotation: self.rotation,
                }
            }
            TemplateKind::Ray => {
                let half_width = self.width * scale / 2.0;
                let end = origin.project(self.direction, length);
                let left = self.direction - 90.0;
                let right = self.direction + 90.0;
                AreaShape::Polygon {
                    vertices: vec![
                        origin.project(left, half_width),
                        end.project(left, half_width),
                        end.project(right, half_width),
                        origin.project(right, half_width),
                    ],
                }
            }
            TemplateKind::Cone => {
                let segments = settings.cone_arc_segments.max(1);
                let start = self.direction - self.angle / 2.0;
                let step = self.angle / segments as f64;
                let mut vertices = Vec::with_capacity(segments + 2);
                vertices.push(origin);
                vertices.extend((0..=segments).map(|i| origin.project(start + step * i as f64, length)));
                AreaShape::Polygon { vertices }
            }
            TemplateKind::Unknown => AreaShape::Unsupported {
                kind: self.kind.to_string(),
            },
        }
    }
}

/// Builders for scenes assembled in tests
#[cfg(test)]
impl MeasuredTemplate {
    pub fn cone(origin: Point, direction: f64, angle: f64, distance: f64) -> Self {
        Self::new(TemplateKind::Cone, origin, distance)
            .with_direction(direction)
            .with_angle(angle)
    }

    pub fn ray(origin: Point, direction: f64, distance: f64, width: f64) -> Self {
        let mut template = Self::new(TemplateKind::Ray, origin, distance).with_direction(direction);
        template.width = width;
        template
    }

    /// Rectangle given by its diagonal from the anchor corner
    pub fn rect(origin: Point, direction: f64, diagonal: f64) -> Self {
        Self::new(TemplateKind::Rect, origin, diagonal).with_direction(direction)
    }

    pub fn with_direction(mut self, direction: f64) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_area_effect(mut self, source: AreaEffectSource) -> Self {
        self.flags.area_effect = Some(source);
        self
    }

    pub fn with_message(mut self, message_id: MessageId) -> Self {
        self.flags.message_id = Some(message_id);
        self
    }

    pub fn instantaneous(mut self) -> Self {
        self.flags.instantaneous = true;
        self
    }
}
