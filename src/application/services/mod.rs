//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting port
//! dependencies and returning domain entities or DTOs.

pub mod area_reconciliation_service;
pub mod aura_service;
pub mod scene_locks;

pub use area_reconciliation_service::{AreaPorts, AreaReconciliationService};
pub use aura_service::AuraMaterializer;
pub use scene_locks::SceneLocks;
