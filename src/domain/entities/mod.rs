//! Domain entities - Host documents the engine reads and writes

mod actor;
mod area;
mod chat_message;
mod effect;
mod scene;
mod template;
mod token;

pub use actor::Actor;
pub use area::Area;
pub use chat_message::{ChatMessage, TestSnapshot};
pub use effect::{ActiveEffect, EffectPayload, TransferKind};
pub use scene::Scene;
pub use template::{AreaEffectSource, MeasuredTemplate, TemplateKind};
pub use token::Token;
