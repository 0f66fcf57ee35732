//! Colloquy Core: shared abstractions for the dialogue engine.
//!
//! This crate defines the types every other crate depends on: the clock used
//! for timed behavior, scalar values and the immutable variable store, the
//! error taxonomy, and the presenter port through which a session publishes
//! its state. It contains no dialogue traversal logic.

pub mod clock;
pub mod error;
pub mod presenter;
pub mod value;
pub mod variables;
