//! HTTP REST API routes

mod actor_routes;
mod area_routes;
mod scene_routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Scene routes
        .route("/api/scenes", post(scene_routes::create_scene))
        .route("/api/scenes/current", get(scene_routes::get_current_scene))
        .route("/api/scenes/current", put(scene_routes::set_current_scene))
        .route("/api/scenes/{scene_id}", get(scene_routes::get_scene))
        .route("/api/scenes/{scene_id}", put(scene_routes::replace_scene))
        .route("/api/scenes/{scene_id}/tokens", post(scene_routes::add_token))
        .route(
            "/api/scenes/{scene_id}/tokens/{token_id}/position",
            put(scene_routes::move_token),
        )
        .route(
            "/api/scenes/{scene_id}/templates",
            post(scene_routes::place_template),
        )
        .route(
            "/api/scenes/{scene_id}/templates/{template_id}",
            delete(scene_routes::remove_template),
        )
        // Actor and message routes
        .route("/api/actors", post(actor_routes::create_actor))
        .route("/api/actors/{id}", get(actor_routes::get_actor))
        .route("/api/actors/{id}", put(actor_routes::replace_actor))
        .route("/api/messages", post(actor_routes::create_message))
        // Area effect routes
        .route("/api/refresh", post(area_routes::refresh_current))
        .route("/api/scenes/{scene_id}/refresh", post(area_routes::refresh_scene))
        .route(
            "/api/scenes/{scene_id}/templates/{template_id}/tokens",
            get(area_routes::tokens_in_template),
        )
        .route("/api/notifications", get(area_routes::list_notifications))
}
