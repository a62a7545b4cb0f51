//! Actor and chat message API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::scene_routes::store_error;
use crate::domain::entities::{Actor, ChatMessage};
use crate::domain::value_objects::ActorId;
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub name: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub success_level: i32,
}

fn parse_actor_id(id: &str) -> Result<ActorId, (StatusCode, String)> {
    id.parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid actor ID".to_string()))
}

/// Create an actor with no effects
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateActorRequest>,
) -> Result<(StatusCode, Json<Actor>), (StatusCode, String)> {
    let actor = Actor::new(req.name);
    state.actors.save(&actor).await.map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(actor)))
}

/// Replace an actor document as synced from the host
///
/// Auras live on actors, so the current scene is refreshed.
pub async fn replace_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(actor): Json<Actor>,
) -> Result<Json<Actor>, (StatusCode, String)> {
    if actor.id != parse_actor_id(&id)? {
        return Err((StatusCode::BAD_REQUEST, "Actor ID mismatch".to_string()));
    }

    state.actors.save(&actor).await.map_err(store_error)?;
    state.refresh.request(None);

    Ok(Json(actor))
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Actor>, (StatusCode, String)> {
    let id = parse_actor_id(&id)?;
    let actor = state
        .actors
        .get(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Actor not found".to_string()))?;

    Ok(Json(actor))
}

/// Record the outcome of a test so templates can reference its message
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), (StatusCode, String)> {
    let actor_id = req.actor_id.as_deref().map(parse_actor_id).transpose()?;
    let message = ChatMessage::with_test(req.name, actor_id, req.success_level);
    state.messages.save(&message).await.map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(message)))
}
