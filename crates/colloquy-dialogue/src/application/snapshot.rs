//! Snapshot assembly: the read side of a session.
//!
//! Builds the read-only [`DialogueSnapshot`] a presenter renders from the
//! session's current node, store, history, and relationship ledger.

use colloquy_core::error::DialogueError;
use colloquy_core::presenter::{
    CharacterView, ChoiceView, DialogueSnapshot, HistoryEntry, NodeView, RevealPhase,
};
use colloquy_core::variables::VariableStore;
use uuid::Uuid;

use crate::domain::graph::{DialogueGraph, DialogueNode};
use crate::domain::navigator;
use crate::domain::relationships::RelationshipLedger;
use crate::domain::template;

/// Borrowed session state a snapshot is built from.
pub(crate) struct SnapshotSource<'a> {
    pub session_id: Uuid,
    pub title: &'a str,
    pub graph: &'a DialogueGraph,
    pub node: &'a DialogueNode,
    pub store: &'a VariableStore,
    pub history: &'a [String],
    pub relationships: &'a dyn RelationshipLedger,
    pub reveal: RevealPhase,
    pub choices_ready: bool,
    pub showing_history: bool,
}

fn history_entries(source: &SnapshotSource<'_>) -> Vec<HistoryEntry> {
    source
        .history
        .iter()
        .filter_map(|node_id| {
            let node = source.graph.node(node_id)?;
            let speaker = source
                .graph
                .character(&node.character_id)
                .map_or_else(|| node.character_id.clone(), |c| c.name.clone());
            Some(HistoryEntry {
                node_id: node_id.clone(),
                speaker,
                text: template::resolve(&node.text, source.store),
            })
        })
        .collect()
}

/// Builds the snapshot for the current node.
///
/// # Errors
///
/// Returns `DialogueError::CharacterNotFound` if the speaker is unknown and
/// `DialogueError::Content` if a choice condition fails.
pub(crate) fn build(source: &SnapshotSource<'_>) -> Result<DialogueSnapshot, DialogueError> {
    let node = source.node;
    let character = source
        .graph
        .character(&node.character_id)
        .ok_or_else(|| DialogueError::CharacterNotFound(node.character_id.clone()))?;

    let choices = navigator::visible_choices(node, source.store)?
        .into_iter()
        .map(|choice| {
            let available = !choice.disabled;
            ChoiceView {
                id: choice.id.clone(),
                text: template::resolve(&choice.text, source.store),
                available,
                selectable: available && source.choices_ready,
            }
        })
        .collect();

    let earlier = source.history.len().saturating_sub(1);
    let seen_before = source.history[..earlier].iter().any(|id| *id == node.id);

    Ok(DialogueSnapshot {
        session_id: source.session_id,
        title: source.title.to_owned(),
        node: NodeView {
            id: node.id.clone(),
            text: template::resolve(&node.text, source.store),
            emotion: node.emotion.clone(),
            animation: node.animation.clone(),
            background: node.background.clone(),
            show_once: node.show_once,
            seen_before,
        },
        character: CharacterView {
            id: character.id.clone(),
            name: character.name.clone(),
            avatar: character.avatar.clone(),
            role: character.role.clone(),
            relationship: source.relationships.current(character),
        },
        choices,
        history: history_entries(source),
        showing_history: source.showing_history,
        reveal: source.reveal,
        can_continue: !node.has_choices() && node.next.is_some(),
    })
}
