//! Area effect API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{ReconcileError, ReconcileReport, TokenSummaryDto};
use crate::application::ports::outbound::Notification;
use crate::domain::value_objects::{SceneId, TemplateId};
use crate::infrastructure::state::AppState;

fn reconcile_error(e: ReconcileError) -> (StatusCode, String) {
    match e {
        ReconcileError::SceneNotFound(_) | ReconcileError::TemplateNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string())
        }
        ReconcileError::Document(inner) => super::scene_routes::store_error(inner),
    }
}

/// Reconcile a scene now and return what changed
pub async fn refresh_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ReconcileReport>, (StatusCode, String)> {
    let id: SceneId = id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid scene ID".to_string()))?;

    let report = state
        .area_effects
        .reconcile(Some(id))
        .await
        .map_err(reconcile_error)?;

    Ok(Json(report))
}

/// Reconcile the current scene, if any
pub async fn refresh_current(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReconcileReport>, (StatusCode, String)> {
    let report = state
        .area_effects
        .reconcile(None)
        .await
        .map_err(reconcile_error)?;

    Ok(Json(report))
}

/// Tokens standing inside a placed template
pub async fn tokens_in_template(
    State(state): State<Arc<AppState>>,
    Path((scene_id, template_id)): Path<(String, String)>,
) -> Result<Json<Vec<TokenSummaryDto>>, (StatusCode, String)> {
    let scene_id: SceneId = scene_id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid scene ID".to_string()))?;
    let template_id: TemplateId = template_id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid template ID".to_string()))?;

    let tokens = state
        .area_effects
        .tokens_in_template(scene_id, template_id)
        .await
        .map_err(reconcile_error)?;

    Ok(Json(tokens.iter().map(TokenSummaryDto::from).collect()))
}

pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.recent())
}
