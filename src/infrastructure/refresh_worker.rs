//! Scene refresh worker
//!
//! Host edits (token moves, template placement) enqueue a refresh instead of
//! reconciling inline. The worker drains the queue, collapses duplicate
//! requests for the same scene and runs one pass per scene.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::inbound::AreaEffectsUseCase;
use crate::domain::value_objects::SceneId;

/// Handle used to request a refresh; `None` targets the current scene
#[derive(Clone)]
pub struct RefreshSender {
    tx: mpsc::UnboundedSender<Option<SceneId>>,
}

impl RefreshSender {
    pub fn request(&self, scene_id: Option<SceneId>) {
        if self.tx.send(scene_id).is_err() {
            tracing::warn!("Refresh worker stopped, dropping refresh request");
        }
    }
}

pub type RefreshReceiver = mpsc::UnboundedReceiver<Option<SceneId>>;

pub fn refresh_channel() -> (RefreshSender, RefreshReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RefreshSender { tx }, rx)
}

/// Run until every sender is dropped
pub async fn refresh_worker(area_effects: Arc<dyn AreaEffectsUseCase>, mut rx: RefreshReceiver) {
    tracing::info!("Starting scene refresh worker");

    while let Some(first) = rx.recv().await {
        let mut pending = vec![first];
        while let Ok(next) = rx.try_recv() {
            if !pending.contains(&next) {
                pending.push(next);
            }
        }

        for scene_id in pending {
            match area_effects.reconcile(scene_id).await {
                Ok(report) if report.is_noop() => {
                    tracing::debug!("Refresh of {:?} changed nothing", report.scene_id);
                }
                Ok(report) => {
                    tracing::debug!(
                        "Refresh of {:?}: {} applied, {} removed",
                        report.scene_id,
                        report.applied_count(),
                        report.removed_count()
                    );
                    for event in &report.events {
                        tracing::trace!(
                            "{} on token {} from {} at {}",
                            event.event_type(),
                            event.token_id(),
                            event.area(),
                            event.metadata().timestamp
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Scene refresh failed: {}", e);
                }
            }
        }
    }

    tracing::info!("Scene refresh worker stopped");
}
