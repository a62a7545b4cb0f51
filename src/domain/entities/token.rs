//! Token entity - An actor's presence on a scene

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActorId, Point, TokenId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    /// Tokens without an actor are decoration and never receive effects
    #[serde(default)]
    pub actor_id: Option<ActorId>,
    /// Center of the token in scene pixels
    pub center: Point,
}

impl Token {
    pub fn new(name: impl Into<String>, actor_id: Option<ActorId>, center: Point) -> Self {
        Self {
            id: TokenId::new(),
            name: name.into(),
            actor_id,
            center,
        }
    }

    pub fn move_to(&mut self, center: Point) {
        self.center = center;
    }
}
