//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: in-memory and SQLite document stores
//! - HTTP: REST bridge for the host
//! - Notifications: log of user-facing messages
//! - Refresh worker: queued scene reconciliation
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod notifications;
pub mod persistence;
pub mod refresh_worker;
pub mod state;
