//! Test presenter: records everything a session publishes.

use std::sync::{Arc, Mutex};

use colloquy_core::error::DialogueError;
use colloquy_core::presenter::{DialogueSnapshot, Presenter};
use colloquy_core::variables::VariableStore;

#[derive(Debug, Default)]
struct Recorded {
    snapshots: Vec<DialogueSnapshot>,
    completions: Vec<VariableStore>,
    closes: usize,
    failures: Vec<DialogueError>,
}

/// A presenter that records all snapshots, completions, closes and failures.
///
/// Clones share the same recording, so a test can hand one clone to a session
/// and inspect another afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingPresenter {
    /// Create an empty recording presenter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every snapshot presented so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn snapshots(&self) -> Vec<DialogueSnapshot> {
        self.inner.lock().unwrap().snapshots.clone()
    }

    /// Returns the most recent snapshot, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<DialogueSnapshot> {
        self.inner.lock().unwrap().snapshots.last().cloned()
    }

    /// Returns the final stores passed to `completed`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn completions(&self) -> Vec<VariableStore> {
        self.inner.lock().unwrap().completions.clone()
    }

    /// Returns how many times `closed` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.inner.lock().unwrap().closes
    }

    /// Returns every error passed to `failed`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn failures(&self) -> Vec<DialogueError> {
        self.inner.lock().unwrap().failures.clone()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, snapshot: &DialogueSnapshot) {
        self.inner.lock().unwrap().snapshots.push(snapshot.clone());
    }

    fn completed(&mut self, final_store: &VariableStore) {
        self.inner
            .lock()
            .unwrap()
            .completions
            .push(final_store.clone());
    }

    fn closed(&mut self) {
        self.inner.lock().unwrap().closes += 1;
    }

    fn failed(&mut self, error: &DialogueError) {
        self.inner.lock().unwrap().failures.push(error.clone());
    }
}
