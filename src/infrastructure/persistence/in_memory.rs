//! In-memory document store
//!
//! Holds scenes, actors and chat messages in process memory. Used when no
//! database is configured and as the store behind service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{
    ActorRepositoryPort, DocumentError, EffectStorePort, MessageRepositoryPort,
    SceneRepositoryPort,
};
use crate::domain::entities::{ActiveEffect, Actor, ChatMessage, EffectPayload, Scene, TestSnapshot};
use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId, MessageId, SceneId};

#[derive(Default)]
struct StoreState {
    scenes: HashMap<SceneId, Scene>,
    actors: HashMap<ActorId, Actor>,
    messages: HashMap<MessageId, ChatMessage>,
    current_scene: Option<SceneId>,
    effects_created: usize,
    effects_deleted: usize,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<StoreState>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_scene(&self, scene: Scene) {
        self.state.write().await.scenes.insert(scene.id, scene);
    }

    pub async fn insert_actor(&self, actor: Actor) {
        self.state.write().await.actors.insert(actor.id, actor);
    }

    pub async fn insert_message(&self, message: ChatMessage) {
        self.state.write().await.messages.insert(message.id, message);
    }

    pub async fn get_scene(&self, id: SceneId) -> Option<Scene> {
        self.state.read().await.scenes.get(&id).cloned()
    }

    pub async fn get_actor(&self, id: ActorId) -> Option<Actor> {
        self.state.read().await.actors.get(&id).cloned()
    }

    /// Effects created and deleted so far, in that order
    #[cfg(test)]
    pub async fn operation_counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.effects_created, state.effects_deleted)
    }
}

#[async_trait]
impl SceneRepositoryPort for InMemoryDocumentStore {
    async fn current_scene_id(&self) -> Result<Option<SceneId>, DocumentError> {
        Ok(self.state.read().await.current_scene)
    }

    async fn set_current(&self, id: SceneId) -> Result<(), DocumentError> {
        let mut state = self.state.write().await;
        if !state.scenes.contains_key(&id) {
            return Err(DocumentError::not_found("Scene", id));
        }
        state.current_scene = Some(id);
        Ok(())
    }

    async fn get(&self, id: SceneId) -> Result<Option<Scene>, DocumentError> {
        Ok(self.get_scene(id).await)
    }

    async fn save(&self, scene: &Scene) -> Result<(), DocumentError> {
        self.insert_scene(scene.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl ActorRepositoryPort for InMemoryDocumentStore {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, DocumentError> {
        Ok(self.get_actor(id).await)
    }

    async fn save(&self, actor: &Actor) -> Result<(), DocumentError> {
        self.insert_actor(actor.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl EffectStorePort for InMemoryDocumentStore {
    async fn create_effects(
        &self,
        actor_id: ActorId,
        effects: Vec<EffectPayload>,
        _message_id: Option<MessageId>,
    ) -> Result<Vec<ActiveEffect>, DocumentError> {
        let mut state = self.state.write().await;
        let actor = state
            .actors
            .get_mut(&actor_id)
            .ok_or_else(|| DocumentError::not_found("Actor", actor_id))?;

        let created: Vec<ActiveEffect> = effects
            .into_iter()
            .map(|payload| payload.into_effect(actor_id))
            .collect();
        actor.effects.extend(created.iter().cloned());
        state.effects_created += created.len();
        Ok(created)
    }

    async fn delete_effect(&self, actor_id: ActorId, effect_id: EffectId) -> Result<(), DocumentError> {
        let mut state = self.state.write().await;
        let actor = state
            .actors
            .get_mut(&actor_id)
            .ok_or_else(|| DocumentError::not_found("Actor", actor_id))?;
        actor
            .remove_effect(effect_id)
            .ok_or_else(|| DocumentError::not_found("ActiveEffect", effect_id))?;
        state.effects_deleted += 1;
        Ok(())
    }

    async fn resolve_effect(&self, uuid: &DocumentUuid) -> Result<Option<ActiveEffect>, DocumentError> {
        let (actor_id, effect_id) = uuid
            .effect_parts()
            .ok_or_else(|| DocumentError::InvalidUuid(uuid.to_string()))?;
        let state = self.state.read().await;
        Ok(state
            .actors
            .get(&actor_id)
            .and_then(|actor| actor.effect(effect_id))
            .cloned())
    }
}

#[async_trait]
impl MessageRepositoryPort for InMemoryDocumentStore {
    async fn get_test(&self, id: MessageId) -> Result<Option<TestSnapshot>, DocumentError> {
        let state = self.state.read().await;
        Ok(state.messages.get(&id).and_then(|m| m.test.clone()))
    }

    async fn save(&self, message: &ChatMessage) -> Result<(), DocumentError> {
        self.insert_message(message.clone()).await;
        Ok(())
    }
}
