//! Relationship ledgers: the one piece of mutable character state.
//!
//! Base character data is never modified. A ledger holds the scores produced
//! by choice deltas and is merged over the base score at read time.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::graph::Character;

/// Lowest relationship score.
pub const RELATIONSHIP_MIN: i32 = -100;
/// Highest relationship score.
pub const RELATIONSHIP_MAX: i32 = 100;

/// Clamps a raw score into `[RELATIONSHIP_MIN, RELATIONSHIP_MAX]`.
#[must_use]
pub fn clamp_relationship(value: i64) -> i32 {
    let clamped = value.clamp(i64::from(RELATIONSHIP_MIN), i64::from(RELATIONSHIP_MAX));
    i32::try_from(clamped).unwrap_or(RELATIONSHIP_MAX)
}

fn adjusted(base: Option<i32>, amount: i32) -> i32 {
    clamp_relationship(i64::from(base.unwrap_or(0)) + i64::from(amount))
}

/// Storage for relationship scores changed during a session.
pub trait RelationshipLedger: Send + fmt::Debug {
    /// The effective score for `character`, falling back to its base score.
    fn current(&self, character: &Character) -> Option<i32>;

    /// Adds `amount` to the effective score, clamps, stores, and returns the
    /// new score as one read-modify-write step.
    fn adjust(&mut self, character: &Character, amount: i32) -> i32;

    /// Called when a session opens.
    fn reset(&mut self) {}
}

/// A ledger owned by one session and cleared each time it opens.
#[derive(Debug, Clone, Default)]
pub struct SessionRelationships {
    scores: HashMap<String, i32>,
}

impl SessionRelationships {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelationshipLedger for SessionRelationships {
    fn current(&self, character: &Character) -> Option<i32> {
        self.scores
            .get(&character.id)
            .copied()
            .or(character.relationship)
    }

    fn adjust(&mut self, character: &Character, amount: i32) -> i32 {
        let value = adjusted(self.current(character), amount);
        self.scores.insert(character.id.clone(), value);
        value
    }

    fn reset(&mut self) {
        self.scores.clear();
    }
}

/// A ledger shared between sessions that reference the same characters.
///
/// Clones share storage. Each adjustment holds the lock across its read and
/// write, so concurrent sessions never lose an update. It is not cleared
/// when a session opens.
#[derive(Debug, Clone, Default)]
pub struct SharedRelationships {
    scores: Arc<Mutex<HashMap<String, i32>>>,
}

impl SharedRelationships {
    /// Creates an empty shared ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored score for `character_id`, ignoring base data.
    #[must_use]
    pub fn get(&self, character_id: &str) -> Option<i32> {
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(character_id)
            .copied()
    }
}

impl RelationshipLedger for SharedRelationships {
    fn current(&self, character: &Character) -> Option<i32> {
        self.get(&character.id).or(character.relationship)
    }

    fn adjust(&mut self, character: &Character, amount: i32) -> i32 {
        let mut scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        let base = scores.get(&character.id).copied().or(character.relationship);
        let value = adjusted(base, amount);
        scores.insert(character.id.clone(), value);
        value
    }
}
