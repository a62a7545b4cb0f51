//! Outbound ports - Interfaces that the application requires from the host

mod notification_port;
mod repository_port;

pub use notification_port::{Notification, NotificationLevel, NotificationPort};
pub use repository_port::{
    ActorRepositoryPort, DocumentError, EffectStorePort, MessageRepositoryPort,
    SceneRepositoryPort,
};
