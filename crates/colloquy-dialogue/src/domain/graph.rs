//! Dialogue graph data: characters, nodes, and choices.
//!
//! A [`DialogueGraph`] is assembled once from plain data and validated on
//! construction, so a session never meets a dangling reference at runtime
//! except through an explicit node id supplied by its caller.

use std::collections::HashMap;
use std::sync::Arc;

use colloquy_core::error::GraphError;
use serde::{Deserialize, Serialize};

use super::conditions::Condition;
use super::effects::Action;
use super::relationships::clamp_relationship;
use super::template;

/// A participant in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque avatar reference for the presenter.
    pub avatar: String,
    /// Optional role label ("merchant", "villain", ...).
    #[serde(default)]
    pub role: Option<String>,
    /// Relationship with the player in `[-100, 100]`.
    #[serde(default)]
    pub relationship: Option<i32>,
}

impl Character {
    /// Creates a character with no role and no relationship score.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
            role: None,
            relationship: None,
        }
    }

    /// Sets the role label.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the starting relationship score.
    #[must_use]
    pub fn with_relationship(mut self, relationship: i32) -> Self {
        self.relationship = Some(relationship);
        self
    }
}

/// A signed adjustment to one character's relationship score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipChange<'a> {
    /// The character whose score changes.
    pub character_id: &'a str,
    /// Signed amount to add before clamping.
    pub amount: i32,
}

/// A player-selectable branch out of a node.
#[derive(Debug, Clone)]
pub struct Choice {
    /// Identifier, unique within its node.
    pub id: String,
    /// Display text; may contain placeholders.
    pub text: String,
    /// Node to continue with; `None` ends the dialogue.
    pub next: Option<String>,
    /// Hides the choice when it evaluates false.
    pub condition: Option<Arc<dyn Condition>>,
    /// Store transformation applied when the choice is taken.
    pub action: Option<Arc<dyn Action>>,
    /// Relationship adjustment applied when the choice is taken.
    pub relationship_change: Option<(String, i32)>,
    /// Shows the choice but makes it inert.
    pub disabled: bool,
}

impl Choice {
    /// Creates an unconditional terminal choice.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next: None,
            condition: None,
            action: None,
            relationship_change: None,
            disabled: false,
        }
    }

    /// Continues with `next` when taken.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Gates the choice behind `condition`.
    #[must_use]
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Applies `action` to the store when taken.
    #[must_use]
    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Adjusts `character_id`'s relationship by `amount` when taken.
    #[must_use]
    pub fn changes_relationship(mut self, character_id: impl Into<String>, amount: i32) -> Self {
        self.relationship_change = Some((character_id.into(), amount));
        self
    }

    /// Marks the choice as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The relationship adjustment, if any.
    #[must_use]
    pub fn relationship(&self) -> Option<RelationshipChange<'_>> {
        self.relationship_change
            .as_ref()
            .map(|(character_id, amount)| RelationshipChange {
                character_id,
                amount: *amount,
            })
    }
}

/// One beat of dialogue.
#[derive(Debug, Clone)]
pub struct DialogueNode {
    /// Identifier, unique within the graph.
    pub id: String,
    /// The speaking character.
    pub character_id: String,
    /// Raw text; may contain placeholders.
    pub text: String,
    /// Advisory emotion tag.
    pub emotion: Option<String>,
    /// Advisory animation tag.
    pub animation: Option<String>,
    /// Advisory background reference.
    pub background: Option<String>,
    /// Choices in authoring order.
    pub choices: Vec<Choice>,
    /// Advance to `next` automatically after a delay.
    pub auto_advance: bool,
    /// Auto-advance delay; the session default applies when `None`.
    pub auto_advance_delay_ms: Option<u64>,
    /// Node to continue with when no choice is taken.
    pub next: Option<String>,
    /// Authored "show once" flag. Advisory only.
    pub show_once: bool,
}

impl DialogueNode {
    /// Creates a terminal node with no choices.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        character_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            character_id: character_id.into(),
            text: text.into(),
            emotion: None,
            animation: None,
            background: None,
            choices: Vec::new(),
            auto_advance: false,
            auto_advance_delay_ms: None,
            next: None,
            show_once: false,
        }
    }

    /// Continues with `next`.
    #[must_use]
    pub fn then(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Appends a choice.
    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Enables auto-advance, optionally with an explicit delay.
    #[must_use]
    pub fn auto_advance(mut self, delay_ms: Option<u64>) -> Self {
        self.auto_advance = true;
        self.auto_advance_delay_ms = delay_ms;
        self
    }

    /// Sets the emotion tag.
    #[must_use]
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    /// Sets the animation tag.
    #[must_use]
    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    /// Sets the background reference.
    #[must_use]
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Sets the show-once flag.
    #[must_use]
    pub fn show_once(mut self) -> Self {
        self.show_once = true;
        self
    }

    /// Returns `true` if the node offers choices.
    #[must_use]
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// A validated set of characters and nodes.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    characters: HashMap<String, Character>,
    nodes: HashMap<String, DialogueNode>,
}

impl DialogueGraph {
    /// Assembles and validates a graph.
    ///
    /// Starting relationship scores are clamped into range.
    ///
    /// Every node and choice text is checked with [`template::lint`]. Prose
    /// that opens a brace directly before a word and never closes it on the
    /// same line, such as `"She mutters {something"`, reads as a broken
    /// placeholder and rejects the graph. Braces around anything other than a
    /// bare name (`"{ aside }"`, `"{a b}"`) are accepted as prose.
    ///
    /// # Errors
    ///
    /// Returns `GraphError` for duplicate ids, references to missing nodes or
    /// characters, and malformed placeholders (`{}` or an unclosed `{name`)
    /// in node or choice text.
    pub fn new(
        characters: impl IntoIterator<Item = Character>,
        nodes: impl IntoIterator<Item = DialogueNode>,
    ) -> Result<Self, GraphError> {
        let mut by_id = HashMap::new();
        for mut character in characters {
            character.relationship = character
                .relationship
                .map(|value| clamp_relationship(i64::from(value)));
            if by_id.contains_key(&character.id) {
                return Err(GraphError::DuplicateCharacter(character.id));
            }
            by_id.insert(character.id.clone(), character);
        }

        let mut node_map = HashMap::new();
        for node in nodes {
            if node_map.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            node_map.insert(node.id.clone(), node);
        }

        let graph = Self {
            characters: by_id,
            nodes: node_map,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), GraphError> {
        for node in self.nodes.values() {
            if !self.characters.contains_key(&node.character_id) {
                return Err(GraphError::UnknownSpeaker {
                    node_id: node.id.clone(),
                    character_id: node.character_id.clone(),
                });
            }
            self.check_target(&node.id, node.next.as_deref())?;
            template::lint(&node.text).map_err(|source| GraphError::MalformedTemplate {
                location: node.id.clone(),
                source,
            })?;

            for choice in &node.choices {
                let location = format!("{}/{}", node.id, choice.id);
                self.check_target(&location, choice.next.as_deref())?;
                if let Some(change) = choice.relationship() {
                    if !self.characters.contains_key(change.character_id) {
                        return Err(GraphError::UnknownRelationshipTarget {
                            location,
                            character_id: change.character_id.to_owned(),
                        });
                    }
                }
                template::lint(&choice.text)
                    .map_err(|source| GraphError::MalformedTemplate { location, source })?;
            }
        }
        Ok(())
    }

    fn check_target(&self, from: &str, target: Option<&str>) -> Result<(), GraphError> {
        match target {
            Some(target) if !self.nodes.contains_key(target) => Err(GraphError::DanglingNext {
                from: from.to_owned(),
                target: target.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    /// Looks up a character.
    #[must_use]
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
