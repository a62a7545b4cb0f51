//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::inbound::AreaEffectsUseCase;
use crate::application::ports::outbound::{
    ActorRepositoryPort, MessageRepositoryPort, SceneRepositoryPort,
};
use crate::application::services::{AreaPorts, AreaReconciliationService, SceneLocks};
use crate::domain::value_objects::{EngineSettings, UserId};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::notifications::NotificationLog;
use crate::infrastructure::persistence::{InMemoryDocumentStore, SqliteDocumentStore};
use crate::infrastructure::refresh_worker::{refresh_channel, RefreshReceiver, RefreshSender};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub settings: EngineSettings,
    pub scenes: Arc<dyn SceneRepositoryPort>,
    pub actors: Arc<dyn ActorRepositoryPort>,
    pub messages: Arc<dyn MessageRepositoryPort>,
    pub area_effects: Arc<dyn AreaEffectsUseCase>,
    pub notifications: Arc<NotificationLog>,
    pub refresh: RefreshSender,
    /// Serializes read-modify-write edits of a scene document
    pub scene_edits: SceneLocks,
}

impl AppState {
    /// Build the state and the receiving end of the refresh queue
    pub async fn new(config: AppConfig) -> Result<(Self, RefreshReceiver)> {
        let settings = EngineSettings::from_env();
        let notifications = Arc::new(NotificationLog::new(config.notification_capacity));

        let ports = match &config.database_url {
            Some(url) => {
                let store = Arc::new(
                    SqliteDocumentStore::connect(url)
                        .await
                        .with_context(|| format!("Failed to open document store at {}", url))?,
                );
                tracing::info!("Using SQLite document store");
                AreaPorts {
                    scenes: store.clone(),
                    actors: store.clone(),
                    effects: store.clone(),
                    messages: store,
                    notifier: notifications.clone(),
                }
            }
            None => {
                let store = Arc::new(InMemoryDocumentStore::new());
                tracing::info!("Using in-memory document store");
                AreaPorts {
                    scenes: store.clone(),
                    actors: store.clone(),
                    effects: store.clone(),
                    messages: store,
                    notifier: notifications.clone(),
                }
            }
        };

        Ok(Self::from_ports(config, settings, ports, notifications))
    }

    pub fn from_ports(
        config: AppConfig,
        settings: EngineSettings,
        ports: AreaPorts,
        notifications: Arc<NotificationLog>,
    ) -> (Self, RefreshReceiver) {
        let (refresh, rx) = refresh_channel();
        let mut area_effects = AreaReconciliationService::new(ports.clone(), settings.clone());
        if let Some(user) = config.user_id {
            area_effects = area_effects.with_user(UserId::from_uuid(user));
        }
        let state = Self {
            config,
            scenes: ports.scenes,
            actors: ports.actors,
            messages: ports.messages,
            area_effects: Arc::new(area_effects),
            settings,
            notifications,
            refresh,
            scene_edits: SceneLocks::new(),
        };
        (state, rx)
    }
}
