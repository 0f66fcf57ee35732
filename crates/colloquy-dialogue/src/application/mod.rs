//! Application layer: the session controller and the snapshots it publishes.

pub mod session;
mod snapshot;
