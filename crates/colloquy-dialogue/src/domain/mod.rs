//! Dialogue domain: graph data, conditions and effects, templating,
//! navigation, relationships, reveal timing, and session events.

pub mod conditions;
pub mod effects;
pub mod events;
pub mod graph;
pub mod navigator;
pub mod relationships;
pub mod reveal;
pub mod template;
