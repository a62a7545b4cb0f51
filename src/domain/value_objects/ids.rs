//! Strongly-typed identifiers for host documents

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(SceneId);
define_id!(TokenId);
define_id!(ActorId);
define_id!(TemplateId);
define_id!(EffectId);
define_id!(MessageId);
define_id!(UserId);

/// Host-style document path, e.g. `Scene.<id>.MeasuredTemplate.<id>`
///
/// Areas are identified by one of these: placed templates by their own
/// document path, auras by the path of the effect that radiates them.
/// Applied effects carry the same value in their `from_area` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentUuid(String);

impl DocumentUuid {
    pub fn for_template(scene_id: SceneId, template_id: TemplateId) -> Self {
        Self(format!("Scene.{}.MeasuredTemplate.{}", scene_id, template_id))
    }

    pub fn for_effect(actor_id: ActorId, effect_id: EffectId) -> Self {
        Self(format!("Actor.{}.ActiveEffect.{}", actor_id, effect_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split an effect path back into its actor and effect ids
    pub fn effect_parts(&self) -> Option<(ActorId, EffectId)> {
        let mut parts = self.as_str().split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("Actor"), Some(actor), Some("ActiveEffect"), Some(effect), None) => {
                Some((actor.parse().ok()?, effect.parse().ok()?))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentUuid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentUuid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
