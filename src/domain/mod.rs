//! Domain layer - Core rules with no knowledge of the host platform
//!
//! This layer contains:
//! - Entities: Scene, Token, MeasuredTemplate, Actor, ActiveEffect, Area
//! - Value Objects: ids, geometry, resolved area shapes, engine settings
//! - Domain Events: effect applications and removals
//! - Domain Services: pure containment testing

pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;
