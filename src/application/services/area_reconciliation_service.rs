//! Area Reconciliation Service - Applies and removes area effects
//!
//! On every scene refresh this service compares where tokens stand against
//! every placed template and aura on the scene, then creates or deletes the
//! effects those areas hand out. It keeps no memory between passes: the
//! effects already on each actor, tagged with the area that applied them,
//! are the only record of earlier decisions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, trace, warn};

use crate::application::dto::{AreaFailure, ReconcileError, ReconcileReport};
use crate::application::ports::inbound::AreaEffectsUseCase;
use crate::application::ports::outbound::{
    ActorRepositoryPort, EffectStorePort, MessageRepositoryPort, Notification,
    NotificationPort, SceneRepositoryPort,
};
use crate::application::services::{AuraMaterializer, SceneLocks};
use crate::domain::entities::{Actor, Area, AreaEffectSource, EffectPayload, Scene, Token};
use crate::domain::events::{DomainEvent, EventMetadata, RemovalReason};
use crate::domain::services::{is_contained, tokens_in_area};
use crate::domain::value_objects::{
    DocumentUuid, EffectId, EngineSettings, SceneId, TemplateId, UserId,
};

/// Host collaborators the engine works through
#[derive(Clone)]
pub struct AreaPorts {
    pub scenes: Arc<dyn SceneRepositoryPort>,
    pub actors: Arc<dyn ActorRepositoryPort>,
    pub effects: Arc<dyn EffectStorePort>,
    pub messages: Arc<dyn MessageRepositoryPort>,
    pub notifier: Arc<dyn NotificationPort>,
}

/// Service reconciling area effects for scenes
pub struct AreaReconciliationService {
    ports: AreaPorts,
    auras: AuraMaterializer,
    settings: EngineSettings,
    user: Option<UserId>,
    scene_locks: SceneLocks,
}

impl AreaReconciliationService {
    pub fn new(ports: AreaPorts, settings: EngineSettings) -> Self {
        let auras = AuraMaterializer::new(ports.actors.clone(), settings.clone());
        Self {
            ports,
            auras,
            settings,
            user: None,
            scene_locks: SceneLocks::default(),
        }
    }

    /// User recorded as the author of synthetic aura templates
    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Placed templates plus the auras materialized for this pass
    pub async fn areas_in_scene(&self, scene: &Scene) -> Result<Vec<Area>, ReconcileError> {
        let mut areas: Vec<Area> = scene
            .templates
            .iter()
            .map(|template| Area::placed(scene, template, &self.settings))
            .collect();
        areas.extend(self.auras.materialize(scene, self.user).await?);
        Ok(areas)
    }

    /// Run one reconciliation pass over a scene
    ///
    /// Passes on the same scene are serialized; the scene is read only once
    /// the lock is held so each pass sees the effects of the one before it.
    #[instrument(skip(self))]
    pub async fn reconcile(
        &self,
        scene_id: Option<SceneId>,
    ) -> Result<ReconcileReport, ReconcileError> {
        let scene_id = match scene_id {
            Some(id) => Some(id),
            None => self.ports.scenes.current_scene_id().await?,
        };
        let Some(scene_id) = scene_id else {
            debug!("No scene to reconcile");
            return Ok(ReconcileReport::new(None).finish());
        };

        let _guard = self.scene_locks.acquire(scene_id).await;

        let scene = self
            .ports
            .scenes
            .get(scene_id)
            .await?
            .ok_or(ReconcileError::SceneNotFound(scene_id))?;
        let areas = self.areas_in_scene(&scene).await?;

        let mut report = ReconcileReport::new(Some(scene_id));
        report.areas_evaluated = areas.len();
        report.tokens_evaluated = scene.tokens.len();

        for token in &scene.tokens {
            self.reconcile_token(&scene, token, &areas, &mut report).await;
        }

        info!(
            applied = report.applied_count(),
            removed = report.removed_count(),
            failures = report.failures.len(),
            "Reconciliation pass complete"
        );
        Ok(report.finish())
    }

    /// Tokens whose centers lie inside a placed template
    pub async fn tokens_in_template(
        &self,
        scene_id: SceneId,
        template_id: TemplateId,
    ) -> Result<Vec<Token>, ReconcileError> {
        let scene = self
            .ports
            .scenes
            .get(scene_id)
            .await?
            .ok_or(ReconcileError::SceneNotFound(scene_id))?;
        let template = scene
            .template(template_id)
            .ok_or_else(|| ReconcileError::TemplateNotFound(template_id.to_string()))?;
        let area = Area::placed(&scene, template, &self.settings);

        Ok(tokens_in_area(&scene, &area, self.settings.boundary_tolerance)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Evaluate every area for one token, then prune its orphaned effects
    ///
    /// Areas are handled one after another against a local copy of the
    /// actor that is updated as effects are created and deleted.
    async fn reconcile_token(
        &self,
        scene: &Scene,
        token: &Token,
        areas: &[Area],
        report: &mut ReconcileReport,
    ) {
        let Some(actor_id) = token.actor_id else {
            return;
        };

        let mut actor = match self.ports.actors.get(actor_id).await {
            Ok(Some(actor)) => actor,
            Ok(None) => {
                debug!(token_id = %token.id, actor_id = %actor_id, "Token actor not found");
                return;
            }
            Err(e) => {
                self.record_failure(
                    report,
                    AreaFailure::ActorLookup {
                        token_id: token.id,
                        reason: e.to_string(),
                    },
                );
                return;
            }
        };

        for area in areas {
            let contained = is_contained(token.center, &area.shape, self.settings.boundary_tolerance);

            if contained && actor.effect_from_area(&area.uuid).is_none() {
                self.apply_area_effect(scene, token, &mut actor, area, report)
                    .await;
            } else if !contained && !area.instantaneous() {
                let existing = actor.removable_effect_from_area(&area.uuid).map(|e| e.id);
                if let Some(effect_id) = existing {
                    self.remove_effect(
                        scene,
                        token,
                        &mut actor,
                        effect_id,
                        area.uuid.clone(),
                        RemovalReason::LeftArea,
                        report,
                    )
                    .await;
                }
            }
        }

        self.prune_orphans(scene, token, &mut actor, areas, report)
            .await;
    }

    /// Delete effects whose area no longer exists; kept effects survive
    async fn prune_orphans(
        &self,
        scene: &Scene,
        token: &Token,
        actor: &mut Actor,
        areas: &[Area],
        report: &mut ReconcileReport,
    ) {
        let orphans: Vec<(EffectId, DocumentUuid)> = actor
            .current_area_effects()
            .filter(|effect| !effect.keep())
            .filter_map(|effect| {
                let from = effect.from_area()?;
                (!areas.iter().any(|area| &area.uuid == from)).then(|| (effect.id, from.clone()))
            })
            .collect();

        for (effect_id, from) in orphans {
            self.remove_effect(
                scene,
                token,
                actor,
                effect_id,
                from,
                RemovalReason::SourceMissing,
                report,
            )
            .await;
        }
    }

    async fn apply_area_effect(
        &self,
        scene: &Scene,
        token: &Token,
        actor: &mut Actor,
        area: &Area,
        report: &mut ReconcileReport,
    ) {
        if area.owner() == Some(actor.id) {
            trace!(area = %area.uuid, "Not applying an aura to its own actor");
            return;
        }

        let effect = match self.resolve_area_effect(area).await {
            Ok(Some(effect)) => effect,
            Ok(None) => return,
            Err(reason) => {
                self.record_failure(
                    report,
                    AreaFailure::EffectResolution {
                        token_id: token.id,
                        area: area.uuid.clone(),
                        reason,
                    },
                );
                return;
            }
        };

        let message_id = area.message_id();
        let test = match message_id {
            Some(id) => self.ports.messages.get_test(id).await.unwrap_or_else(|e| {
                warn!(message_id = %id, error = %e, "Could not load triggering test");
                None
            }),
            None => None,
        };

        let mut payload = effect.convert_to_applied(test.as_ref());
        payload.flags.from_area = Some(area.uuid.clone());

        match self
            .ports
            .effects
            .create_effects(actor.id, vec![payload], message_id)
            .await
        {
            Ok(created) => {
                for effect in created {
                    debug!(token = %token.name, effect = %effect.name(), area = %area.uuid, "Area effect applied");
                    report.events.push(DomainEvent::EffectApplied {
                        metadata: EventMetadata::new(scene.id),
                        token_id: token.id,
                        actor_id: actor.id,
                        area: area.uuid.clone(),
                        effect_id: effect.id,
                        effect_name: effect.name().to_string(),
                    });
                    actor.effects.push(effect);
                }
            }
            Err(e) => self.record_failure(
                report,
                AreaFailure::DocumentOperation {
                    token_id: token.id,
                    area: Some(area.uuid.clone()),
                    operation: "create",
                    reason: e.to_string(),
                },
            ),
        }
    }

    /// The effect an area hands out: the template's own, else the aura's
    async fn resolve_area_effect(&self, area: &Area) -> Result<Option<EffectPayload>, String> {
        match &area.template.flags.area_effect {
            Some(AreaEffectSource::Inline(payload)) => Ok(Some(payload.clone())),
            Some(AreaEffectSource::Reference(uuid)) => {
                match self.ports.effects.resolve_effect(uuid).await {
                    Ok(Some(effect)) => Ok(Some(effect.data)),
                    Ok(None) => Err(format!("Effect {} does not exist", uuid)),
                    Err(e) => Err(e.to_string()),
                }
            }
            None => Ok(area.aura_effect().map(|effect| effect.data.clone())),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn remove_effect(
        &self,
        scene: &Scene,
        token: &Token,
        actor: &mut Actor,
        effect_id: EffectId,
        area: DocumentUuid,
        reason: RemovalReason,
        report: &mut ReconcileReport,
    ) {
        match self.ports.effects.delete_effect(actor.id, effect_id).await {
            Ok(()) => {
                debug!(token = %token.name, effect_id = %effect_id, area = %area, ?reason, "Area effect removed");
                actor.remove_effect(effect_id);
                report.events.push(DomainEvent::EffectRemoved {
                    metadata: EventMetadata::new(scene.id),
                    token_id: token.id,
                    actor_id: actor.id,
                    area,
                    effect_id,
                    reason,
                });
            }
            Err(e) => self.record_failure(
                report,
                AreaFailure::DocumentOperation {
                    token_id: token.id,
                    area: Some(area),
                    operation: "delete",
                    reason: e.to_string(),
                },
            ),
        }
    }

    fn record_failure(&self, report: &mut ReconcileReport, failure: AreaFailure) {
        warn!(error = %failure, "Area reconciliation step failed");
        match &failure {
            AreaFailure::EffectResolution { .. } => {}
            AreaFailure::DocumentOperation { .. } => {
                self.ports.notifier.notify(Notification::error(failure.to_string()));
            }
            AreaFailure::ActorLookup { .. } => {
                self.ports.notifier.notify(Notification::warning(failure.to_string()));
            }
        }
        report.failures.push(failure);
    }
}

#[async_trait]
impl AreaEffectsUseCase for AreaReconciliationService {
    async fn reconcile(&self, scene_id: Option<SceneId>) -> Result<ReconcileReport, ReconcileError> {
        AreaReconciliationService::reconcile(self, scene_id).await
    }

    async fn tokens_in_template(
        &self,
        scene_id: SceneId,
        template_id: TemplateId,
    ) -> Result<Vec<Token>, ReconcileError> {
        AreaReconciliationService::tokens_in_template(self, scene_id, template_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::DocumentError;
    use crate::domain::entities::{
        ActiveEffect, ChatMessage, MeasuredTemplate, TemplateKind, TransferKind,
    };
    use crate::domain::value_objects::{ActorId, GridConfig, MessageId, Point};
    use crate::infrastructure::notifications::NotificationLog;
    use crate::infrastructure::persistence::InMemoryDocumentStore;

    /// Effect store that refuses to create effects on one actor
    struct RefusingEffectStore {
        inner: Arc<InMemoryDocumentStore>,
        refused: ActorId,
    }

    #[async_trait]
    impl EffectStorePort for RefusingEffectStore {
        async fn create_effects(
            &self,
            actor_id: ActorId,
            effects: Vec<EffectPayload>,
            message_id: Option<MessageId>,
        ) -> Result<Vec<ActiveEffect>, DocumentError> {
            if actor_id == self.refused {
                return Err(DocumentError::Storage("permission denied".to_string()));
            }
            self.inner.create_effects(actor_id, effects, message_id).await
        }

        async fn delete_effect(&self, actor_id: ActorId, effect_id: EffectId) -> Result<(), DocumentError> {
            self.inner.delete_effect(actor_id, effect_id).await
        }

        async fn resolve_effect(&self, uuid: &DocumentUuid) -> Result<Option<ActiveEffect>, DocumentError> {
            self.inner.resolve_effect(uuid).await
        }
    }

    struct Fixture {
        store: Arc<InMemoryDocumentStore>,
        notifications: Arc<NotificationLog>,
        service: AreaReconciliationService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryDocumentStore::new());
            Self::with_effects(store.clone(), store)
        }

        fn with_effects(store: Arc<InMemoryDocumentStore>, effects: Arc<dyn EffectStorePort>) -> Self {
            let notifications = Arc::new(NotificationLog::new(16));
            let ports = AreaPorts {
                scenes: store.clone(),
                actors: store.clone(),
                effects,
                messages: store.clone(),
                notifier: notifications.clone(),
            };
            Self {
                store,
                notifications,
                service: AreaReconciliationService::new(ports, EngineSettings::default()),
            }
        }

        async fn actor(&self, id: ActorId) -> Actor {
            self.store.get_actor(id).await.unwrap()
        }

        async fn move_token(&self, scene_id: SceneId, token: crate::domain::value_objects::TokenId, to: Point) {
            let mut scene = self.store.get_scene(scene_id).await.unwrap();
            scene.token_mut(token).unwrap().move_to(to);
            self.store.insert_scene(scene).await;
        }

        async fn remove_template(&self, scene_id: SceneId, template: TemplateId) {
            let mut scene = self.store.get_scene(scene_id).await.unwrap();
            scene.remove_template(template).unwrap();
            self.store.insert_scene(scene).await;
        }
    }

    fn blinding_cloud(center: Point, radius: f64) -> MeasuredTemplate {
        MeasuredTemplate::circle(center, radius)
            .with_area_effect(AreaEffectSource::Inline(EffectPayload::new("Blinded")))
    }

    fn unit_scene() -> Scene {
        Scene::new("Bögenhafen").with_grid(GridConfig::unit())
    }

    fn aura_effect(actor: &Actor, radius: f64) -> ActiveEffect {
        EffectPayload::new("Unsettling Presence")
            .with_transfer(TransferKind::Aura)
            .with_radius(radius)
            .into_effect(actor.id)
    }

    #[tokio::test]
    async fn test_effect_applied_on_entry_and_removed_on_exit() {
        let fx = Fixture::new();
        let actor = Actor::new("Gunther");
        let token = Token::new("Gunther", Some(actor.id), Point::new(0.0, 0.0));
        let template = blinding_cloud(Point::new(0.0, 0.0), 5.0);
        let scene = unit_scene().with_token(token.clone()).with_template(template.clone());
        let area_uuid = scene.template_uuid(template.id);
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(report.applied_count(), 1);
        let applied = fx.actor(actor.id).await;
        assert_eq!(applied.effects.len(), 1);
        assert_eq!(applied.effects[0].from_area(), Some(&area_uuid));
        assert_eq!(applied.effects[0].name(), "Blinded");

        fx.move_token(scene.id, token.id, Point::new(10.0, 0.0)).await;
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert_eq!(report.removed_count(), 1);
        assert!(matches!(
            &report.events[0],
            DomainEvent::EffectRemoved { reason: RemovalReason::LeftArea, .. }
        ));
        assert!(fx.actor(actor.id).await.effects.is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_is_idempotent() {
        let fx = Fixture::new();
        let actor = Actor::new("Elsa");
        let scene = unit_scene()
            .with_token(Token::new("Elsa", Some(actor.id), Point::new(1.0, 1.0)))
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 5.0))
            .with_template(
                MeasuredTemplate::cone(Point::new(0.0, 0.0), 0.0, 90.0, 10.0)
                    .with_area_effect(AreaEffectSource::Inline(EffectPayload::new("Burning"))),
            );
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let first = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(first.applied_count(), 2);
        let operations = fx.store.operation_counts().await;

        let second = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(fx.store.operation_counts().await, operations);
        assert_eq!(fx.actor(actor.id).await.effects.len(), 2);
    }

    #[tokio::test]
    async fn test_aura_reaches_others_but_never_its_owner() {
        let fx = Fixture::new();
        let mut owner = Actor::new("Sorcerer");
        let aura = aura_effect(&owner, 3.0);
        owner.effects.push(aura.clone());
        let other = Actor::new("Victim");

        let victim = Token::new("Victim", Some(other.id), Point::new(10.0, 0.0));
        let scene = unit_scene()
            .with_token(Token::new("Sorcerer", Some(owner.id), Point::new(0.0, 0.0)))
            .with_token(victim.clone());
        fx.store.insert_actor(owner.clone()).await;
        fx.store.insert_actor(other.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert!(report.is_noop());

        fx.move_token(scene.id, victim.id, Point::new(2.0, 0.0)).await;
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(report.applied_count(), 1);

        let victim_actor = fx.actor(other.id).await;
        assert_eq!(victim_actor.effects.len(), 1);
        assert_eq!(victim_actor.effects[0].from_area(), Some(&aura.uuid()));
        assert_eq!(victim_actor.effects[0].data.transfer.kind, TransferKind::Document);

        let owner_actor = fx.actor(owner.id).await;
        assert_eq!(owner_actor.effects.len(), 1);
        assert_eq!(owner_actor.effects[0].id, aura.id);
    }

    #[tokio::test]
    async fn test_aura_effect_follows_owner_movement() {
        let fx = Fixture::new();
        let mut owner = Actor::new("Banner Bearer");
        owner.effects.push(aura_effect(&owner, 3.0));
        let ally = Actor::new("Soldier");
        let owner_token = Token::new("Banner Bearer", Some(owner.id), Point::new(0.0, 0.0));
        let scene = unit_scene()
            .with_token(owner_token.clone())
            .with_token(Token::new("Soldier", Some(ally.id), Point::new(2.0, 0.0)));
        fx.store.insert_actor(owner).await;
        fx.store.insert_actor(ally.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(fx.actor(ally.id).await.effects.len(), 1);

        fx.move_token(scene.id, owner_token.id, Point::new(20.0, 0.0)).await;
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(report.removed_count(), 1);
        assert!(fx.actor(ally.id).await.effects.is_empty());
    }

    #[tokio::test]
    async fn test_aura_of_actor_with_two_tokens_stays_applied() {
        let fx = Fixture::new();
        let mut owner = Actor::new("Twin Witch");
        let aura = aura_effect(&owner, 3.0);
        owner.effects.push(aura.clone());
        let victim = Actor::new("Villager");
        let scene = unit_scene()
            .with_token(Token::new("Twin Witch", Some(owner.id), Point::new(0.0, 0.0)))
            .with_token(Token::new("Twin Witch (mirror)", Some(owner.id), Point::new(100.0, 0.0)))
            .with_token(Token::new("Villager", Some(victim.id), Point::new(2.0, 0.0)));
        fx.store.insert_actor(owner).await;
        fx.store.insert_actor(victim.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let first = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(first.applied_count(), 1);
        assert_eq!(first.removed_count(), 0);

        for _ in 0..2 {
            let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
            assert!(report.is_noop());
        }

        let effects = fx.actor(victim.id).await.effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].from_area(), Some(&aura.uuid()));
    }

    #[tokio::test]
    async fn test_effect_pruned_when_aura_is_deleted_from_owner() {
        let fx = Fixture::new();
        let mut owner = Actor::new("Necromancer");
        let aura = aura_effect(&owner, 3.0);
        owner.effects.push(aura.clone());
        let victim = Actor::new("Militiaman");
        let scene = unit_scene()
            .with_token(Token::new("Necromancer", Some(owner.id), Point::new(0.0, 0.0)))
            .with_token(Token::new("Militiaman", Some(victim.id), Point::new(1.0, 0.0)));
        fx.store.insert_actor(owner.clone()).await;
        fx.store.insert_actor(victim.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(fx.actor(victim.id).await.effects.len(), 1);

        fx.store.delete_effect(owner.id, aura.id).await.unwrap();
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert_eq!(report.removed_count(), 1);
        assert!(matches!(
            &report.events[0],
            DomainEvent::EffectRemoved { reason: RemovalReason::SourceMissing, .. }
        ));
        assert!(fx.actor(victim.id).await.effects.is_empty());
    }

    #[tokio::test]
    async fn test_kept_effect_survives_leaving_and_is_not_duplicated() {
        let fx = Fixture::new();
        let actor = Actor::new("Rudi");
        let token = Token::new("Rudi", Some(actor.id), Point::new(0.0, 0.0));
        let template = MeasuredTemplate::circle(Point::new(0.0, 0.0), 5.0).with_area_effect(
            AreaEffectSource::Inline(EffectPayload::new("Poisoned").with_keep(true)),
        );
        let scene = unit_scene().with_token(token.clone()).with_template(template);
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert!(fx.service.reconcile(Some(scene.id)).await.unwrap().is_noop());

        fx.move_token(scene.id, token.id, Point::new(50.0, 0.0)).await;
        assert!(fx.service.reconcile(Some(scene.id)).await.unwrap().is_noop());

        fx.move_token(scene.id, token.id, Point::new(1.0, 0.0)).await;
        assert!(fx.service.reconcile(Some(scene.id)).await.unwrap().is_noop());

        let effects = fx.actor(actor.id).await.effects;
        assert_eq!(effects.len(), 1);
        assert!(effects[0].keep());
    }

    #[tokio::test]
    async fn test_instantaneous_area_never_removes() {
        let fx = Fixture::new();
        let actor = Actor::new("Klaus");
        let token = Token::new("Klaus", Some(actor.id), Point::new(0.0, 0.0));
        let scene = unit_scene()
            .with_token(token.clone())
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 5.0).instantaneous());
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();
        fx.move_token(scene.id, token.id, Point::new(30.0, 30.0)).await;
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert!(report.is_noop());
        assert_eq!(fx.actor(actor.id).await.effects.len(), 1);
    }

    #[tokio::test]
    async fn test_orphaned_effects_are_pruned_but_kept_ones_survive() {
        let fx = Fixture::new();
        let actor = Actor::new("Magda");
        let plain = blinding_cloud(Point::new(0.0, 0.0), 5.0);
        let kept = MeasuredTemplate::circle(Point::new(0.0, 0.0), 5.0).with_area_effect(
            AreaEffectSource::Inline(EffectPayload::new("Cursed").with_keep(true)),
        );
        let scene = unit_scene()
            .with_token(Token::new("Magda", Some(actor.id), Point::new(0.0, 0.0)))
            .with_template(plain.clone())
            .with_template(kept.clone());
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert_eq!(fx.actor(actor.id).await.effects.len(), 2);

        fx.remove_template(scene.id, plain.id).await;
        fx.remove_template(scene.id, kept.id).await;
        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert_eq!(report.removed_count(), 1);
        assert!(matches!(
            &report.events[0],
            DomainEvent::EffectRemoved { reason: RemovalReason::SourceMissing, .. }
        ));
        let remaining = fx.actor(actor.id).await.effects;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name(), "Cursed");
    }

    #[tokio::test]
    async fn test_missing_current_scene_is_a_noop() {
        let fx = Fixture::new();
        let report = fx.service.reconcile(None).await.unwrap();
        assert_eq!(report.scene_id, None);
        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn test_current_scene_is_used_when_none_given() {
        let fx = Fixture::new();
        let actor = Actor::new("Lena");
        let scene = unit_scene()
            .with_token(Token::new("Lena", Some(actor.id), Point::new(0.0, 0.0)))
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 2.0));
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;
        fx.store.set_current(scene.id).await.unwrap();

        let report = fx.service.reconcile(None).await.unwrap();
        assert_eq!(report.scene_id, Some(scene.id));
        assert_eq!(report.applied_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scene_is_an_error() {
        let fx = Fixture::new();
        let result = fx.service.reconcile(Some(SceneId::new())).await;
        assert!(matches!(result, Err(ReconcileError::SceneNotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_isolated_and_notified() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let refused = Actor::new("Refused");
        let accepted = Actor::new("Accepted");
        let fx = Fixture::with_effects(
            store.clone(),
            Arc::new(RefusingEffectStore {
                inner: store.clone(),
                refused: refused.id,
            }),
        );
        let scene = unit_scene()
            .with_token(Token::new("Refused", Some(refused.id), Point::new(0.0, 0.0)))
            .with_token(Token::new("Accepted", Some(accepted.id), Point::new(1.0, 0.0)))
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 5.0));
        fx.store.insert_actor(refused.clone()).await;
        fx.store.insert_actor(accepted.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            AreaFailure::DocumentOperation { operation: "create", .. }
        ));
        assert!(fx.actor(refused.id).await.effects.is_empty());
        assert_eq!(fx.actor(accepted.id).await.effects.len(), 1);
        assert_eq!(fx.notifications.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_effect_is_skipped_without_aborting() {
        let fx = Fixture::new();
        let actor = Actor::new("Ottilie");
        let broken = MeasuredTemplate::circle(Point::new(0.0, 0.0), 5.0).with_area_effect(
            AreaEffectSource::Reference(DocumentUuid::for_effect(ActorId::new(), EffectId::new())),
        );
        let scene = unit_scene()
            .with_token(Token::new("Ottilie", Some(actor.id), Point::new(0.0, 0.0)))
            .with_template(broken)
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 5.0));
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();

        assert_eq!(report.applied_count(), 1);
        assert!(matches!(&report.failures[0], AreaFailure::EffectResolution { .. }));
        assert!(fx.notifications.recent().is_empty());
    }

    #[tokio::test]
    async fn test_referenced_effect_and_triggering_test_are_applied() {
        let fx = Fixture::new();
        let caster = Actor::new("Wizard");
        let source = EffectPayload::new("Flames")
            .with_transfer(TransferKind::Area)
            .with_change("system.characteristics.ag.modifier", 2, "-10")
            .into_effect(caster.id);
        let caster = caster.with_effect(source.clone());
        let target = Actor::new("Beastman");
        let message = ChatMessage::with_test("Casting Test", Some(caster.id), 4);

        let scene = unit_scene()
            .with_token(Token::new("Beastman", Some(target.id), Point::new(3.0, 0.0)))
            .with_template(
                MeasuredTemplate::circle(Point::new(0.0, 0.0), 5.0)
                    .with_area_effect(AreaEffectSource::Reference(source.uuid()))
                    .with_message(message.id),
            );
        fx.store.insert_actor(caster).await;
        fx.store.insert_actor(target.clone()).await;
        fx.store.insert_message(message.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        fx.service.reconcile(Some(scene.id)).await.unwrap();

        let effects = fx.actor(target.id).await.effects;
        assert_eq!(effects.len(), 1);
        let applied = &effects[0];
        assert_eq!(applied.name(), "Flames");
        assert_eq!(applied.data.transfer.kind, TransferKind::Document);
        assert_eq!(applied.data.changes, source.data.changes);
        assert_eq!(applied.data.flags.source_message, Some(message.id));
        assert_eq!(
            applied.data.flags.source_test.as_ref().map(|t| t.success_level),
            Some(4)
        );
    }

    #[tokio::test]
    async fn test_unknown_template_kind_applies_nothing() {
        let fx = Fixture::new();
        let actor = Actor::new("Hans");
        let scene = unit_scene()
            .with_token(Token::new("Hans", Some(actor.id), Point::new(0.0, 0.0)))
            .with_template(
                MeasuredTemplate::new(TemplateKind::Unknown, Point::new(0.0, 0.0), 100.0)
                    .with_area_effect(AreaEffectSource::Inline(EffectPayload::new("Never"))),
            );
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let report = fx.service.reconcile(Some(scene.id)).await.unwrap();
        assert!(report.is_noop());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_passes_do_not_duplicate_effects() {
        let fx = Fixture::new();
        let actor = Actor::new("Wilhelm");
        let scene = unit_scene()
            .with_token(Token::new("Wilhelm", Some(actor.id), Point::new(0.0, 0.0)))
            .with_template(blinding_cloud(Point::new(0.0, 0.0), 5.0));
        fx.store.insert_actor(actor.clone()).await;
        fx.store.insert_scene(scene.clone()).await;

        let (a, b) = tokio::join!(
            fx.service.reconcile(Some(scene.id)),
            fx.service.reconcile(Some(scene.id))
        );

        assert_eq!(a.unwrap().applied_count() + b.unwrap().applied_count(), 1);
        assert_eq!(fx.actor(actor.id).await.effects.len(), 1);
    }

    #[tokio::test]
    async fn test_tokens_in_template() {
        let fx = Fixture::new();
        let template = MeasuredTemplate::rect(Point::new(0.0, 0.0), 45.0, 2.0_f64.sqrt() * 10.0);
        let scene = unit_scene()
            .with_token(Token::new("Inside", None, Point::new(5.0, 5.0)))
            .with_token(Token::new("Edge", None, Point::new(10.0, 0.0)))
            .with_token(Token::new("Outside", None, Point::new(15.0, 5.0)))
            .with_template(template.clone());
        fx.store.insert_scene(scene.clone()).await;

        let names: Vec<String> = fx
            .service
            .tokens_in_template(scene.id, template.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["Inside".to_string(), "Edge".to_string()]);
    }
}
