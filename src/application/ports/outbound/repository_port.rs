//! Repository ports - Interfaces to the host's document store
//!
//! These traits define the contracts the host (or a standalone store) must
//! implement. Application services depend on these traits, never on a
//! concrete store.

use async_trait::async_trait;

use crate::domain::entities::{
    ActiveEffect, Actor, ChatMessage, EffectPayload, Scene, TestSnapshot,
};
use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId, MessageId, SceneId};

/// Failure of a document store operation
#[derive(Debug, Clone, thiserror::Error)]
pub enum DocumentError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid document uuid: {0}")]
    InvalidUuid(String),
}

impl DocumentError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

// =============================================================================
// Scene Repository Port
// =============================================================================

/// Repository port for scenes with their tokens and placed templates
#[async_trait]
pub trait SceneRepositoryPort: Send + Sync {
    /// The scene currently being viewed, if any
    async fn current_scene_id(&self) -> Result<Option<SceneId>, DocumentError>;

    /// Mark a scene as the current one
    async fn set_current(&self, id: SceneId) -> Result<(), DocumentError>;

    /// Get a scene by ID
    async fn get(&self, id: SceneId) -> Result<Option<Scene>, DocumentError>;

    /// Create or replace a scene
    async fn save(&self, scene: &Scene) -> Result<(), DocumentError>;
}

// =============================================================================
// Actor Repository Port
// =============================================================================

/// Repository port for actors and the effects living on them
#[async_trait]
pub trait ActorRepositoryPort: Send + Sync {
    /// Get an actor by ID, including its effects
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, DocumentError>;

    /// Create or replace an actor
    async fn save(&self, actor: &Actor) -> Result<(), DocumentError>;
}

// =============================================================================
// Effect Store Port
// =============================================================================

/// Create and delete effect documents on actors
#[async_trait]
pub trait EffectStorePort: Send + Sync {
    /// Create effects on an actor, returning the created documents
    async fn create_effects(
        &self,
        actor_id: ActorId,
        effects: Vec<EffectPayload>,
        message_id: Option<MessageId>,
    ) -> Result<Vec<ActiveEffect>, DocumentError>;

    /// Delete an effect from an actor
    async fn delete_effect(&self, actor_id: ActorId, effect_id: EffectId) -> Result<(), DocumentError>;

    /// Look up an effect document by its uuid
    async fn resolve_effect(&self, uuid: &DocumentUuid) -> Result<Option<ActiveEffect>, DocumentError>;
}

// =============================================================================
// Message Repository Port
// =============================================================================

/// Chat messages carrying completed tests
#[async_trait]
pub trait MessageRepositoryPort: Send + Sync {
    /// The test attached to a message, if the message exists and has one
    async fn get_test(&self, id: MessageId) -> Result<Option<TestSnapshot>, DocumentError>;

    async fn save(&self, message: &ChatMessage) -> Result<(), DocumentError>;
}
