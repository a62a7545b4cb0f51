//! Scene API routes
//!
//! Every edit that can change which tokens stand in which area queues a
//! refresh of the scene. Edits run under the scene's edit lock so concurrent
//! read-modify-write cycles never overwrite each other.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::dto::{MoveTokenRequestDto, TokenSummaryDto};
use crate::application::ports::outbound::DocumentError;
use crate::domain::entities::{MeasuredTemplate, Scene, Token};
use crate::domain::value_objects::{ActorId, GridConfig, Point, SceneId, TemplateId, TokenId};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSceneRequest {
    pub name: String,
    #[serde(default)]
    pub grid: Option<GridConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub name: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct SetCurrentSceneRequest {
    pub scene_id: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentSceneResponse {
    pub scene_id: Option<String>,
}

pub(super) fn store_error(e: DocumentError) -> (StatusCode, String) {
    match e {
        DocumentError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        DocumentError::InvalidUuid(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn parse_scene_id(id: &str) -> Result<SceneId, (StatusCode, String)> {
    id.parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid scene ID".to_string()))
}

async fn load_scene(state: &AppState, id: SceneId) -> Result<Scene, (StatusCode, String)> {
    state
        .scenes
        .get(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Scene not found".to_string()))
}

/// Create an empty scene
pub async fn create_scene(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSceneRequest>,
) -> Result<(StatusCode, Json<Scene>), (StatusCode, String)> {
    let mut scene = Scene::new(req.name);
    if let Some(grid) = req.grid {
        scene = scene.with_grid(grid);
    }

    state.scenes.save(&scene).await.map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(scene)))
}

/// Replace a scene document as synced from the host
pub async fn replace_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(scene): Json<Scene>,
) -> Result<Json<Scene>, (StatusCode, String)> {
    let scene_id = parse_scene_id(&id)?;
    if scene.id != scene_id {
        return Err((StatusCode::BAD_REQUEST, "Scene ID mismatch".to_string()));
    }

    let _edit = state.scene_edits.acquire(scene_id).await;
    state.scenes.save(&scene).await.map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok(Json(scene))
}

/// Get a scene by ID
pub async fn get_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Scene>, (StatusCode, String)> {
    let scene = load_scene(&state, parse_scene_id(&id)?).await?;
    Ok(Json(scene))
}

pub async fn get_current_scene(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentSceneResponse>, (StatusCode, String)> {
    let scene_id = state
        .scenes
        .current_scene_id()
        .await
        .map_err(store_error)?;

    Ok(Json(CurrentSceneResponse {
        scene_id: scene_id.map(|id| id.to_string()),
    }))
}

/// Activate a scene
pub async fn set_current_scene(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCurrentSceneRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let scene_id = parse_scene_id(&req.scene_id)?;
    state
        .scenes
        .set_current(scene_id)
        .await
        .map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok(StatusCode::NO_CONTENT)
}

/// Add a token to a scene
pub async fn add_token(
    State(state): State<Arc<AppState>>,
    Path(scene_id): Path<String>,
    Json(req): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<TokenSummaryDto>), (StatusCode, String)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let actor_id = req
        .actor_id
        .map(|id| id.parse::<ActorId>())
        .transpose()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid actor ID".to_string()))?;
    let token = Token::new(req.name, actor_id, Point::new(req.x, req.y));
    let summary = TokenSummaryDto::from(&token);

    let _edit = state.scene_edits.acquire(scene_id).await;
    let mut scene = load_scene(&state, scene_id).await?;
    scene.tokens.push(token);

    state.scenes.save(&scene).await.map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Move a token
pub async fn move_token(
    State(state): State<Arc<AppState>>,
    Path((scene_id, token_id)): Path<(String, String)>,
    Json(req): Json<MoveTokenRequestDto>,
) -> Result<Json<TokenSummaryDto>, (StatusCode, String)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let token_id: TokenId = token_id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid token ID".to_string()))?;

    let _edit = state.scene_edits.acquire(scene_id).await;
    let mut scene = load_scene(&state, scene_id).await?;
    let token = scene
        .token_mut(token_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Token not found".to_string()))?;
    token.move_to(req.into());
    let summary = TokenSummaryDto::from(&*token);

    state.scenes.save(&scene).await.map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok(Json(summary))
}

/// Place a template on a scene
pub async fn place_template(
    State(state): State<Arc<AppState>>,
    Path(scene_id): Path<String>,
    Json(template): Json<MeasuredTemplate>,
) -> Result<(StatusCode, Json<MeasuredTemplate>), (StatusCode, String)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let _edit = state.scene_edits.acquire(scene_id).await;
    let mut scene = load_scene(&state, scene_id).await?;

    if scene.template(template.id).is_some() {
        scene.remove_template(template.id);
    }
    scene.templates.push(template.clone());

    state.scenes.save(&scene).await.map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok((StatusCode::CREATED, Json(template)))
}

/// Remove a template from a scene
pub async fn remove_template(
    State(state): State<Arc<AppState>>,
    Path((scene_id, template_id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let template_id: TemplateId = template_id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid template ID".to_string()))?;

    let _edit = state.scene_edits.acquire(scene_id).await;
    let mut scene = load_scene(&state, scene_id).await?;
    scene
        .remove_template(template_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Template not found".to_string()))?;

    state.scenes.save(&scene).await.map_err(store_error)?;
    state.refresh.request(Some(scene_id));

    Ok(StatusCode::NO_CONTENT)
}
