//! Error types for the dialogue engine.

use thiserror::Error;

/// Errors surfaced by a dialogue session's entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogueError {
    /// A referenced node id is absent from the graph. Fatal to the session.
    #[error("dialogue node not found: {0}")]
    NodeNotFound(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("cannot {operation} while the session is {state}")]
    InvalidTransition {
        /// The rejected operation.
        operation: &'static str,
        /// The state the session was in.
        state: &'static str,
    },

    /// The selected choice id does not belong to the current node.
    #[error("node {node_id} has no choice {choice_id}")]
    UnknownChoice {
        /// The node that was current.
        node_id: String,
        /// The choice id that was requested.
        choice_id: String,
    },

    /// A node is spoken by a character the graph does not know.
    #[error("character not found: {0}")]
    CharacterNotFound(String),

    /// A choice condition or action failed while being evaluated.
    #[error("content error: {0}")]
    Content(#[from] ContentError),
}

impl DialogueError {
    /// Returns `true` for errors that end the session.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NodeNotFound(_))
    }
}

/// Errors raised by choice conditions and actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    /// A variable held a value of the wrong kind for the operation.
    #[error("variable {key} is {found}, expected {expected}")]
    TypeMismatch {
        /// The variable involved.
        key: String,
        /// The kind the operation needed.
        expected: &'static str,
        /// The kind actually stored.
        found: &'static str,
    },

    /// An operation required a variable that is not set.
    #[error("variable {0} is not set")]
    MissingVariable(String),

    /// Custom content logic refused to produce a result.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Malformed `{placeholder}` tokens found in dialogue text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{name` token is never closed.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening brace.
        offset: usize,
    },

    /// A `{}` token with no variable name.
    #[error("empty placeholder at byte {offset}")]
    Empty {
        /// Byte offset of the opening brace.
        offset: usize,
    },
}

/// Structural problems detected while assembling a dialogue graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// Two characters share an id.
    #[error("duplicate character id: {0}")]
    DuplicateCharacter(String),

    /// A node or choice points at a node that does not exist.
    #[error("{from} points to missing node {target}")]
    DanglingNext {
        /// The node (or `node/choice`) holding the reference.
        from: String,
        /// The missing target id.
        target: String,
    },

    /// A node is spoken by a character that does not exist.
    #[error("node {node_id} is spoken by unknown character {character_id}")]
    UnknownSpeaker {
        /// The node.
        node_id: String,
        /// The missing character id.
        character_id: String,
    },

    /// A choice adjusts the relationship of a character that does not exist.
    #[error("choice {location} changes relationship of unknown character {character_id}")]
    UnknownRelationshipTarget {
        /// `node/choice` location of the choice.
        location: String,
        /// The missing character id.
        character_id: String,
    },

    /// Node or choice text contains a malformed placeholder.
    #[error("malformed template in {location}: {source}")]
    MalformedTemplate {
        /// `node` or `node/choice` location of the text.
        location: String,
        /// The underlying template problem.
        source: TemplateError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_node_not_found_is_fatal() {
        assert!(DialogueError::NodeNotFound("ghost".into()).is_fatal());
        assert!(
            !DialogueError::InvalidTransition {
                operation: "select_choice",
                state: "closed",
            }
            .is_fatal()
        );
        assert!(!DialogueError::Content(ContentError::MissingVariable("x".into())).is_fatal());
    }

    #[test]
    fn test_content_error_converts_into_dialogue_error() {
        // Act
        let err: DialogueError = ContentError::Rejected("nope".into()).into();

        // Assert
        assert_eq!(err.to_string(), "content error: rejected: nope");
    }

    #[test]
    fn test_malformed_template_reports_source() {
        // Arrange
        let err = GraphError::MalformedTemplate {
            location: "intro".into(),
            source: TemplateError::Unterminated { offset: 6 },
        };

        // Act
        let message = err.to_string();

        // Assert
        assert_eq!(
            message,
            "malformed template in intro: unterminated placeholder at byte 6"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
