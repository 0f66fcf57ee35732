//! Presenter port and the read-only views a session publishes through it.
//!
//! A session never renders anything. After every transition it hands a
//! [`DialogueSnapshot`] to its presenter, and it reports the end of the
//! conversation through exactly one of `completed`, `closed`, or `failed`.

use serde::Serialize;
use uuid::Uuid;

use crate::error::DialogueError;
use crate::variables::VariableStore;

/// Progress of the reveal sequence for the current node entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    /// The previous node's text is still being hidden.
    HidingPrevious,
    /// The new text is fading in.
    RevealingText,
    /// Text is visible; choices are still appearing and are inert.
    RevealingChoices,
    /// Everything is visible and choices accept input.
    Complete,
}

impl RevealPhase {
    /// Returns `true` once the node's text may be shown.
    #[must_use]
    pub fn text_visible(self) -> bool {
        !matches!(self, Self::HidingPrevious)
    }
}

/// The speaking character, with relationship merged from the session ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    /// Character identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque avatar reference.
    pub avatar: String,
    /// Optional role label.
    pub role: Option<String>,
    /// Effective relationship score, if known.
    pub relationship: Option<i32>,
}

/// The current node with its text already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// Node identifier.
    pub id: String,
    /// Text with placeholders substituted.
    pub text: String,
    /// Advisory emotion tag.
    pub emotion: Option<String>,
    /// Advisory animation tag.
    pub animation: Option<String>,
    /// Advisory background reference.
    pub background: Option<String>,
    /// The authored show-once flag. Not enforced by the engine.
    pub show_once: bool,
    /// Whether this node was already visited earlier in the session.
    pub seen_before: bool,
}

/// A choice that passed its condition.
///
/// Choices hidden by a condition never appear in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// Choice identifier.
    pub id: String,
    /// Text with placeholders substituted.
    pub text: String,
    /// `false` when the choice is explicitly disabled (shown but inert).
    pub available: bool,
    /// `true` when the choice is available and its reveal has completed.
    pub selectable: bool,
}

/// One visited node as shown in the history overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The visited node.
    pub node_id: String,
    /// Display name of the speaker.
    pub speaker: String,
    /// Node text resolved against the current store.
    pub text: String,
}

/// Everything a presenter needs to draw the current state of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueSnapshot {
    /// Session identifier.
    pub session_id: Uuid,
    /// Conversation title.
    pub title: String,
    /// The current node.
    pub node: NodeView,
    /// The speaking character.
    pub character: CharacterView,
    /// Choices whose conditions hold, in authoring order.
    pub choices: Vec<ChoiceView>,
    /// Visited nodes, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Whether the history overlay is shown.
    pub showing_history: bool,
    /// Reveal progress for this node entry.
    pub reveal: RevealPhase,
    /// `true` when the node has no choices but does have a next node, so a
    /// "continue" affordance applies.
    pub can_continue: bool,
}

/// Consumer of session output.
pub trait Presenter: Send {
    /// Called with a fresh snapshot after every transition.
    fn present(&mut self, snapshot: &DialogueSnapshot);

    /// Called once when the dialogue reaches a terminal node.
    fn completed(&mut self, final_store: &VariableStore);

    /// Called when the session is closed without completing.
    fn closed(&mut self) {}

    /// Called when an entry point fails. Fatal errors are followed by no
    /// further calls for the session.
    fn failed(&mut self, _error: &DialogueError) {}
}

/// A presenter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &DialogueSnapshot) {}

    fn completed(&mut self, _final_store: &VariableStore) {}
}
