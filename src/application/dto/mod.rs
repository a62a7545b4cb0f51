//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the host bridge can serialize
//! pass reports and requests without reaching into services.

pub mod reconcile;

pub use reconcile::*;
