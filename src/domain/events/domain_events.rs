//! Domain events - Effect changes made by a reconciliation pass
//!
//! Every create or delete the engine performs against the effect store is
//! recorded as one of these, so callers can audit a pass or forward the
//! changes to connected clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId, SceneId, TokenId};

/// Base data for all events
#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    pub scene_id: SceneId,
}

impl EventMetadata {
    pub fn new(scene_id: SceneId) -> Self {
        Self {
            timestamp: Utc::now(),
            scene_id,
        }
    }
}

/// Why an applied effect was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// The token's center is no longer inside the area
    LeftArea,
    /// The area that applied the effect no longer exists
    SourceMissing,
}

/// All domain events emitted by the engine
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// An effect was applied to a token's actor because it entered an area
    EffectApplied {
        metadata: EventMetadata,
        token_id: TokenId,
        actor_id: ActorId,
        area: DocumentUuid,
        effect_id: EffectId,
        effect_name: String,
    },

    /// An area-applied effect was deleted from a token's actor
    EffectRemoved {
        metadata: EventMetadata,
        token_id: TokenId,
        actor_id: ActorId,
        area: DocumentUuid,
        effect_id: EffectId,
        reason: RemovalReason,
    },
}

impl DomainEvent {
    /// Get the metadata for this event
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::EffectApplied { metadata, .. } => metadata,
            DomainEvent::EffectRemoved { metadata, .. } => metadata,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::EffectApplied { .. } => "EffectApplied",
            DomainEvent::EffectRemoved { .. } => "EffectRemoved",
        }
    }

    pub fn token_id(&self) -> TokenId {
        match self {
            DomainEvent::EffectApplied { token_id, .. } => *token_id,
            DomainEvent::EffectRemoved { token_id, .. } => *token_id,
        }
    }

    pub fn area(&self) -> &DocumentUuid {
        match self {
            DomainEvent::EffectApplied { area, .. } => area,
            DomainEvent::EffectRemoved { area, .. } => area,
        }
    }
}
