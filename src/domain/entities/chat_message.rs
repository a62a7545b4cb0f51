//! Chat message entity - Carries the result of a completed test

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActorId, MessageId};

/// Summary of a completed test, copied onto effects it causes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSnapshot {
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub actor_id: Option<ActorId>,
    pub name: String,
    #[serde(default)]
    pub success_level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(default)]
    pub test: Option<TestSnapshot>,
}

impl ChatMessage {
    pub fn with_test(name: impl Into<String>, actor_id: Option<ActorId>, success_level: i32) -> Self {
        let id = MessageId::new();
        Self {
            id,
            test: Some(TestSnapshot {
                message_id: Some(id),
                actor_id,
                name: name.into(),
                success_level,
            }),
        }
    }
}
