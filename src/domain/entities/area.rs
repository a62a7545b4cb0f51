//! Area entity - A region tested for containment during reconciliation

use crate::domain::entities::{ActiveEffect, MeasuredTemplate, Scene};
use crate::domain::value_objects::{ActorId, AreaShape, DocumentUuid, EngineSettings, MessageId};

/// Where an area came from
#[derive(Debug, Clone, PartialEq)]
pub enum AreaSource {
    /// A template document placed on the scene
    Placed,
    /// Synthesized for one pass from an actor's aura effect
    Aura { effect: ActiveEffect, owner: ActorId },
}

/// A template resolved against its scene, ready for containment tests
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub uuid: DocumentUuid,
    pub shape: AreaShape,
    pub template: MeasuredTemplate,
    pub source: AreaSource,
}

impl Area {
    pub fn placed(scene: &Scene, template: &MeasuredTemplate, settings: &EngineSettings) -> Self {
        Self {
            uuid: scene.template_uuid(template.id),
            shape: template.resolve_shape(&scene.grid, settings),
            template: template.clone(),
            source: AreaSource::Placed,
        }
    }

    pub fn aura(
        scene: &Scene,
        template: MeasuredTemplate,
        effect: ActiveEffect,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            uuid: effect.uuid(),
            shape: template.resolve_shape(&scene.grid, settings),
            template,
            source: AreaSource::Aura {
                owner: effect.actor_id,
                effect,
            },
        }
    }

    pub fn instantaneous(&self) -> bool {
        self.template.flags.instantaneous
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.template.flags.message_id
    }

    /// Actor radiating this area, for auras
    pub fn owner(&self) -> Option<ActorId> {
        match &self.source {
            AreaSource::Aura { owner, .. } => Some(*owner),
            AreaSource::Placed => None,
        }
    }

    pub fn aura_effect(&self) -> Option<&ActiveEffect> {
        match &self.source {
            AreaSource::Aura { effect, .. } => Some(effect),
            AreaSource::Placed => None,
        }
    }
}
