//! Aura Service - Turns actor auras into temporary circular areas
//!
//! Auras are effects that radiate from a token. Each pass they are rebuilt
//! as synthetic circle templates centered on their token so they can be
//! tested exactly like templates placed on the scene. Nothing built here is
//! ever persisted.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::{ActorRepositoryPort, DocumentError};
use crate::domain::entities::{ActiveEffect, Area, MeasuredTemplate, Scene, Token};
use crate::domain::value_objects::{EngineSettings, TemplateId, UserId};

/// Builds the aura areas present on a scene
pub struct AuraMaterializer {
    actors: Arc<dyn ActorRepositoryPort>,
    settings: EngineSettings,
}

impl AuraMaterializer {
    pub fn new(actors: Arc<dyn ActorRepositoryPort>, settings: EngineSettings) -> Self {
        Self { actors, settings }
    }

    /// Materialize every aura of every actor with a token on the scene
    ///
    /// Each aura exists once, centered on the first of its actor's tokens.
    /// Fails as a whole if an actor cannot be read: a partial aura set would
    /// make the reconciler prune effects whose aura still exists.
    #[instrument(skip(self, scene), fields(scene_id = %scene.id))]
    pub async fn materialize(
        &self,
        scene: &Scene,
        user: Option<UserId>,
    ) -> Result<Vec<Area>, DocumentError> {
        let mut seen = HashSet::new();
        let lookups = scene.tokens.iter().filter_map(|token| {
            let actor_id = token.actor_id?;
            if !seen.insert(actor_id) {
                return None;
            }
            Some(async move {
                self.actors
                    .get(actor_id)
                    .await
                    .map(|actor| (token, actor))
            })
        });

        let mut areas = Vec::new();
        for (token, actor) in try_join_all(lookups).await? {
            let Some(actor) = actor else {
                debug!(token_id = %token.id, "Token actor missing, no auras");
                continue;
            };
            for effect in actor.auras() {
                match self.effect_to_area(scene, token, effect, user) {
                    Ok(Some(area)) => areas.push(area),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(effect = %effect.uuid(), error = %e, "Skipping malformed aura");
                    }
                }
            }
        }

        debug!(count = areas.len(), "Auras materialized");
        Ok(areas)
    }

    /// Build the synthetic template for one aura
    ///
    /// Returns `None` for auras without a radius.
    pub fn effect_to_area(
        &self,
        scene: &Scene,
        token: &Token,
        effect: &ActiveEffect,
        user: Option<UserId>,
    ) -> Result<Option<Area>, DocumentError> {
        let Some(radius) = effect.radius() else {
            warn!(effect = %effect.uuid(), "Aura has no radius");
            return Ok(None);
        };

        let mut template = MeasuredTemplate::circle(token.center, radius);
        template.id = TemplateId::from_uuid(*effect.id.as_uuid());
        template.user = user;
        template.fill_color = Some(self.settings.aura_fill_color.clone());
        template.flags.effect_uuid = Some(effect.uuid());

        if let Some(overrides) = effect.template_data() {
            let mut value = serde_json::to_value(&template)?;
            merge_json(&mut value, overrides);
            template = serde_json::from_value(value)?;
        }

        // Overrides and deserialization must not move the aura off its token
        template.x = token.center.x;
        template.y = token.center.y;

        Ok(Some(Area::aura(scene, template, effect.clone(), &self.settings)))
    }
}

/// Recursively merge `overrides` into `base`; objects merge, everything else replaces
fn merge_json(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}
