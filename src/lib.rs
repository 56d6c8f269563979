//! Haunted House - structure-scoped spawn replacement for game servers

pub mod core;
pub mod haunt;
pub mod rules;
pub mod spawn;
pub mod tracking;
pub mod world;
