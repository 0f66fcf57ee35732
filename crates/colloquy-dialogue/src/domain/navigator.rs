//! Graph navigation: current node lookup, choice filtering, and next-node
//! resolution. Pure functions over the graph and the store.

use colloquy_core::error::{ContentError, DialogueError};
use colloquy_core::variables::VariableStore;

use super::graph::{Choice, DialogueGraph, DialogueNode};

/// Resolves `node_id` against `graph`.
///
/// # Errors
///
/// Returns `DialogueError::NodeNotFound` if the graph has no such node.
pub fn current_node<'g>(
    graph: &'g DialogueGraph,
    node_id: &str,
) -> Result<&'g DialogueNode, DialogueError> {
    graph
        .node(node_id)
        .ok_or_else(|| DialogueError::NodeNotFound(node_id.to_owned()))
}

fn condition_holds(choice: &Choice, store: &VariableStore) -> Result<bool, ContentError> {
    match &choice.condition {
        Some(condition) => condition.evaluate(store),
        None => Ok(true),
    }
}

/// Choices whose condition is absent or true, in authoring order.
///
/// # Errors
///
/// Returns the first `ContentError` raised by a condition.
pub fn visible_choices<'n>(
    node: &'n DialogueNode,
    store: &VariableStore,
) -> Result<Vec<&'n Choice>, ContentError> {
    let mut visible = Vec::with_capacity(node.choices.len());
    for choice in &node.choices {
        if condition_holds(choice, store)? {
            visible.push(choice);
        }
    }
    Ok(visible)
}

/// `false` if the choice is disabled or its condition is false.
///
/// # Errors
///
/// Returns the `ContentError` raised by the choice's condition.
pub fn is_selectable(choice: &Choice, store: &VariableStore) -> Result<bool, ContentError> {
    if choice.disabled {
        return Ok(false);
    }
    condition_holds(choice, store)
}

/// The selected choice's target if a choice was taken, otherwise the node's
/// own `next`. `None` means the dialogue ends.
#[must_use]
pub fn resolve_next<'n>(node: &'n DialogueNode, selected: Option<&'n Choice>) -> Option<&'n str> {
    match selected {
        Some(choice) => choice.next.as_deref(),
        None => node.next.as_deref(),
    }
}
