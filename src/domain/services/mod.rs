//! Domain services - Pure operations over domain entities

pub mod containment;

pub use containment::{is_contained, tokens_in_area};
