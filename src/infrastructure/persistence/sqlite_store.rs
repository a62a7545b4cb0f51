//! SQLite document store
//!
//! Persists scenes, actors and chat messages as JSON documents so applied
//! effects survive restarts when the engine runs standalone.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::application::ports::outbound::{
    ActorRepositoryPort, DocumentError, EffectStorePort, MessageRepositoryPort,
    SceneRepositoryPort,
};
use crate::domain::entities::{ActiveEffect, Actor, ChatMessage, EffectPayload, Scene, TestSnapshot};
use crate::domain::value_objects::{ActorId, DocumentUuid, EffectId, MessageId, SceneId};

const CURRENT_SCENE_KEY: &str = "current_scene";

fn storage(e: sqlx::Error) -> DocumentError {
    DocumentError::Storage(e.to_string())
}

fn decode<T: DeserializeOwned>(data: &str) -> Result<T, DocumentError> {
    Ok(serde_json::from_str(data)?)
}

fn encode<T: Serialize>(value: &T) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(value)?)
}

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        for table in ["scenes", "actors", "messages"] {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id TEXT PRIMARY KEY,
                    data TEXT NOT NULL,
                    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                table
            ))
            .execute(&pool)
            .await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Open (creating if needed) the database at `url`
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Self::new(pool).await
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, id: &str) -> Result<Option<T>, DocumentError> {
        let row: Option<(String,)> = sqlx::query_as(&format!("SELECT data FROM {} WHERE id = ?", table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        row.map(|(data,)| decode(&data)).transpose()
    }

    async fn put<T: Serialize>(&self, table: &str, id: &str, value: &T) -> Result<(), DocumentError> {
        sqlx::query(&format!(
            "INSERT OR REPLACE INTO {} (id, data, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            table
        ))
        .bind(id)
        .bind(encode(value)?)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    /// Read-modify-write an actor inside one transaction
    async fn update_actor<R: Send>(
        &self,
        actor_id: ActorId,
        change: impl FnOnce(&mut Actor) -> Result<R, DocumentError> + Send,
    ) -> Result<R, DocumentError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM actors WHERE id = ?")
            .bind(actor_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage)?;
        let (data,) = row.ok_or_else(|| DocumentError::not_found("Actor", actor_id))?;
        let mut actor: Actor = decode(&data)?;

        let result = change(&mut actor)?;

        sqlx::query("UPDATE actors SET data = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(encode(&actor)?)
            .bind(actor_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;

        Ok(result)
    }
}

#[async_trait]
impl SceneRepositoryPort for SqliteDocumentStore {
    async fn current_scene_id(&self) -> Result<Option<SceneId>, DocumentError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM meta WHERE key = ?")
            .bind(CURRENT_SCENE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.map(|(value,)| {
            value
                .parse()
                .map_err(|_| DocumentError::Serialization(format!("Invalid scene id: {}", value)))
        })
        .transpose()
    }

    async fn set_current(&self, id: SceneId) -> Result<(), DocumentError> {
        if SceneRepositoryPort::get(self, id).await?.is_none() {
            return Err(DocumentError::not_found("Scene", id));
        }
        sqlx::query("INSERT OR REPLACE INTO meta (key, value) VALUES (?, ?)")
            .bind(CURRENT_SCENE_KEY)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get(&self, id: SceneId) -> Result<Option<Scene>, DocumentError> {
        self.fetch("scenes", &id.to_string()).await
    }

    async fn save(&self, scene: &Scene) -> Result<(), DocumentError> {
        self.put("scenes", &scene.id.to_string(), scene).await
    }
}

#[async_trait]
impl ActorRepositoryPort for SqliteDocumentStore {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, DocumentError> {
        self.fetch("actors", &id.to_string()).await
    }

    async fn save(&self, actor: &Actor) -> Result<(), DocumentError> {
        self.put("actors", &actor.id.to_string(), actor).await
    }
}

#[async_trait]
impl EffectStorePort for SqliteDocumentStore {
    async fn create_effects(
        &self,
        actor_id: ActorId,
        effects: Vec<EffectPayload>,
        _message_id: Option<MessageId>,
    ) -> Result<Vec<ActiveEffect>, DocumentError> {
        self.update_actor(actor_id, move |actor| {
            let created: Vec<ActiveEffect> = effects
                .into_iter()
                .map(|payload| payload.into_effect(actor_id))
                .collect();
            actor.effects.extend(created.iter().cloned());
            Ok(created)
        })
        .await
    }

    async fn delete_effect(&self, actor_id: ActorId, effect_id: EffectId) -> Result<(), DocumentError> {
        self.update_actor(actor_id, |actor| {
            actor
                .remove_effect(effect_id)
                .map(|_| ())
                .ok_or_else(|| DocumentError::not_found("ActiveEffect", effect_id))
        })
        .await
    }

    async fn resolve_effect(&self, uuid: &DocumentUuid) -> Result<Option<ActiveEffect>, DocumentError> {
        let (actor_id, effect_id) = uuid
            .effect_parts()
            .ok_or_else(|| DocumentError::InvalidUuid(uuid.to_string()))?;
        let actor: Option<Actor> = self.fetch("actors", &actor_id.to_string()).await?;
        Ok(actor.and_then(|actor| actor.effect(effect_id).cloned()))
    }
}

#[async_trait]
impl MessageRepositoryPort for SqliteDocumentStore {
    async fn get_test(&self, id: MessageId) -> Result<Option<TestSnapshot>, DocumentError> {
        let message: Option<ChatMessage> = self.fetch("messages", &id.to_string()).await?;
        Ok(message.and_then(|m| m.test))
    }

    async fn save(&self, message: &ChatMessage) -> Result<(), DocumentError> {
        self.put("messages", &message.id.to_string(), message).await
    }
}
