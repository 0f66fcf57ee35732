//! Colloquy: interactive dialogue engine.
//!
//! Responsible for the dialogue graph model, choice conditions and actions,
//! `{variable}` text templating, graph navigation, and the session controller
//! that drives a conversation from its start node to completion.

pub mod application;
pub mod config;
pub mod domain;

pub use application::session::{DialogueSession, IgnoreReason, Outcome, SessionStatus};
pub use config::SessionConfig;
pub use domain::graph::{Character, Choice, DialogueGraph, DialogueNode, RelationshipChange};
