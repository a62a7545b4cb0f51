//! Actor entity - Owner of effects and auras

use serde::{Deserialize, Serialize};

use crate::domain::entities::ActiveEffect;
use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId};

/// A character or creature sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            effects: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_effect(mut self, effect: ActiveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn effect(&self, id: EffectId) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Auras radiating from this actor
    pub fn auras(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter().filter(|e| e.is_aura())
    }

    /// Effects that were applied by some area
    pub fn current_area_effects(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter().filter(|e| e.from_area().is_some())
    }

    /// Existing effect applied by the given area, if any
    pub fn effect_from_area(&self, area: &DocumentUuid) -> Option<&ActiveEffect> {
        self.current_area_effects()
            .find(|e| e.from_area() == Some(area))
    }

    /// Existing effect applied by the given area that may be auto-removed
    pub fn removable_effect_from_area(&self, area: &DocumentUuid) -> Option<&ActiveEffect> {
        self.current_area_effects()
            .find(|e| e.from_area() == Some(area) && !e.keep())
    }

    pub fn remove_effect(&mut self, id: EffectId) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EffectPayload, TransferKind};

    #[test]
    fn test_auras_exclude_disabled_and_received() {
        let mut actor = Actor::new("Witch Hunter");
        let id = actor.id;
        let aura = EffectPayload::new("Zeal").with_transfer(TransferKind::Aura).with_radius(2.0);

        let mut disabled = aura.clone();
        disabled.disabled = true;

        let mut received = aura.clone();
        received.flags.from_area = Some(DocumentUuid::from("Actor.x.ActiveEffect.y"));

        actor.effects.push(aura.into_effect(id));
        actor.effects.push(disabled.into_effect(id));
        actor.effects.push(received.into_effect(id));

        assert_eq!(actor.auras().count(), 1);
        assert_eq!(actor.current_area_effects().count(), 1);
    }

    #[test]
    fn test_removable_lookup_skips_kept_effects() {
        let mut actor = Actor::new("Dwarf");
        let id = actor.id;
        let area = DocumentUuid::from("Scene.a.MeasuredTemplate.b");

        let mut kept = EffectPayload::new("Frightened").with_keep(true);
        kept.flags.from_area = Some(area.clone());
        actor.effects.push(kept.into_effect(id));

        assert!(actor.effect_from_area(&area).is_some());
        assert!(actor.removable_effect_from_area(&area).is_none());
    }
}
