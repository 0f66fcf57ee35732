//! Shared test doubles for the Colloquy dialogue engine.

mod clock;
mod presenter;

pub use clock::ManualClock;
pub use presenter::RecordingPresenter;
