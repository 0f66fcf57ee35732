//! Session events: a replayable log of every transition.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEventKind {
    /// The session opened at `start_id`.
    Opened {
        /// The start node.
        start_id: String,
    },
    /// A node became current.
    NodeEntered {
        /// The entered node.
        node_id: String,
        /// Per-session entry counter; re-entering a node gets a new number.
        entry: u64,
    },
    /// An auto-advance was scheduled for the current entry.
    AutoAdvanceScheduled {
        /// Target node.
        target: String,
        /// When it will fire.
        due_at: DateTime<Utc>,
    },
    /// A pending auto-advance fired.
    AutoAdvanced {
        /// The node that was current.
        from: String,
        /// The node advanced to.
        to: String,
    },
    /// A choice was taken.
    ChoiceSelected {
        /// The node offering the choice.
        node_id: String,
        /// The choice taken.
        choice_id: String,
    },
    /// A relationship score changed.
    RelationshipChanged {
        /// The character affected.
        character_id: String,
        /// The new, clamped score.
        value: i32,
    },
    /// The history overlay was shown or hidden.
    HistoryToggled {
        /// Whether the overlay is now shown.
        showing: bool,
    },
    /// A terminal node was reached.
    Completed,
    /// The session was closed without completing.
    Closed,
    /// The session ended on a fatal error.
    Aborted {
        /// The node id that could not be resolved.
        missing_node: String,
    },
}

/// A recorded event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueEvent {
    /// The session that produced the event.
    pub session_id: Uuid,
    /// Monotonically increasing number within the session.
    pub sequence: u64,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
    /// Event payload.
    pub kind: DialogueEventKind,
}

impl DialogueEvent {
    /// The event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match &self.kind {
            DialogueEventKind::Opened { .. } => "dialogue.opened",
            DialogueEventKind::NodeEntered { .. } => "dialogue.node_entered",
            DialogueEventKind::AutoAdvanceScheduled { .. } => "dialogue.auto_advance_scheduled",
            DialogueEventKind::AutoAdvanced { .. } => "dialogue.auto_advanced",
            DialogueEventKind::ChoiceSelected { .. } => "dialogue.choice_selected",
            DialogueEventKind::RelationshipChanged { .. } => "dialogue.relationship_changed",
            DialogueEventKind::HistoryToggled { .. } => "dialogue.history_toggled",
            DialogueEventKind::Completed => "dialogue.completed",
            DialogueEventKind::Closed => "dialogue.closed",
            DialogueEventKind::Aborted { .. } => "dialogue.aborted",
        }
    }
}
