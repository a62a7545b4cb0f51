use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::DocumentError;
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{DocumentUuid, Point, SceneId, TokenId};

// ============================================================================
// Pass outcome
// ============================================================================

/// A failure contained to a single token or (token, area) decision
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AreaFailure {
    /// The effect an area should apply could not be determined
    #[error("Could not resolve effect for area {area}: {reason}")]
    EffectResolution {
        token_id: TokenId,
        area: DocumentUuid,
        reason: String,
    },

    /// The store rejected a create or delete
    #[error("Effect {operation} failed for token {token_id}: {reason}")]
    DocumentOperation {
        token_id: TokenId,
        area: Option<DocumentUuid>,
        operation: &'static str,
        reason: String,
    },

    /// The token's actor could not be read
    #[error("Could not load actor for token {token_id}: {reason}")]
    ActorLookup { token_id: TokenId, reason: String },
}

/// Errors that abort a whole pass before any effect is touched
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Scene not found: {0}")]
    SceneNotFound(SceneId),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What a single reconciliation pass did
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// `None` when there was no scene to reconcile
    pub scene_id: Option<SceneId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub areas_evaluated: usize,
    pub tokens_evaluated: usize,
    pub events: Vec<DomainEvent>,
    pub failures: Vec<AreaFailure>,
}

impl ReconcileReport {
    pub fn new(scene_id: Option<SceneId>) -> Self {
        let now = Utc::now();
        Self {
            scene_id,
            started_at: now,
            finished_at: now,
            areas_evaluated: 0,
            tokens_evaluated: 0,
            events: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn applied_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DomainEvent::EffectApplied { .. }))
            .count()
    }

    pub fn removed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DomainEvent::EffectRemoved { .. }))
            .count()
    }

    /// True when the pass created or deleted nothing
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }
}

// ============================================================================
// Request/Response DTOs for the host bridge
// ============================================================================

/// Request to move a token
#[derive(Debug, Deserialize)]
pub struct MoveTokenRequestDto {
    pub x: f64,
    pub y: f64,
}

impl From<MoveTokenRequestDto> for Point {
    fn from(value: MoveTokenRequestDto) -> Self {
        Point::new(value.x, value.y)
    }
}

/// Summary of a token, used by area queries
#[derive(Debug, Serialize)]
pub struct TokenSummaryDto {
    pub id: String,
    pub name: String,
    pub actor_id: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl From<&crate::domain::entities::Token> for TokenSummaryDto {
    fn from(token: &crate::domain::entities::Token) -> Self {
        Self {
            id: token.id.to_string(),
            name: token.name.clone(),
            actor_id: token.actor_id.map(|id| id.to_string()),
            x: token.center.x,
            y: token.center.y,
        }
    }
}
