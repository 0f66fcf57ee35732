//! The built-in sample conversation: a night at the Crooked Lantern.

use colloquy_core::error::GraphError;
use colloquy_core::value::Value;
use colloquy_core::variables::VariableStore;
use colloquy_dialogue::domain::conditions::Predicate;
use colloquy_dialogue::domain::effects::Effect;
use colloquy_dialogue::{Character, Choice, DialogueGraph, DialogueNode};

/// The node every run starts from.
pub const START: &str = "arrival";

/// Builds the sample graph.
///
/// # Errors
///
/// Returns `GraphError` if the scene data is inconsistent.
pub fn graph() -> Result<DialogueGraph, GraphError> {
    let characters = vec![
        Character::new("bram", "Bram", "avatars/bram.png")
            .with_role("innkeeper")
            .with_relationship(10),
        Character::new("wren", "Wren", "avatars/wren.png").with_role("bard"),
        Character::new("player", "You", "avatars/player.png"),
    ];

    let nodes = vec![
        DialogueNode::new(START, "player", "Rain hammers the shutters as you push inside.")
            .with_background("tavern_night")
            .auto_advance(Some(1_500))
            .then("greeting"),
        DialogueNode::new(
            "greeting",
            "bram",
            "Evening, {name}. Cold out there. You look like you've {gold} coins and no bed.",
        )
        .with_emotion("friendly")
        .with_choice(
            Choice::new("room", "I'll take a room. (10 gold)")
                .when(Predicate::AtLeast("gold".into(), 10.0))
                .with_action(Effect::Sequence(vec![
                    Effect::Increment("gold".into(), Value::Int(-10)),
                    Effect::Set("has_room".into(), Value::Bool(true)),
                ]))
                .changes_relationship("bram", 10)
                .then("room"),
        )
        .with_choice(
            Choice::new("rumours", "Heard any rumours?")
                .with_action(Effect::Set("asked_rumours".into(), Value::Bool(true)))
                .then("rumours"),
        )
        .with_choice(
            Choice::new("password", "The lantern burns crooked.")
                .when(Predicate::IsTruthy("knows_password".into()))
                .then("cellar"),
        )
        .with_choice(
            Choice::new("rude", "Just pour the ale, old man.")
                .changes_relationship("bram", -25)
                .then("offended"),
        ),
        DialogueNode::new("rumours", "bram", "Wren over there hears more than I do.")
            .with_animation("nod")
            .then("bard"),
        DialogueNode::new("bard", "wren", "A song for a secret, friend. The lantern burns crooked.")
            .with_emotion("sly")
            .show_once()
            .with_choice(
                Choice::new("remember", "I'll remember that.")
                    .with_action(Effect::Set("knows_password".into(), Value::Bool(true)))
                    .changes_relationship("wren", 15)
                    .then("greeting"),
            )
            .with_choice(Choice::new("ignore", "Not interested.").then("greeting")),
        DialogueNode::new("offended", "bram", "Manners cost nothing, {name}.")
            .with_emotion("annoyed")
            .then("greeting"),
        DialogueNode::new("room", "bram", "Top of the stairs. That leaves you {gold} coins.")
            .auto_advance(None)
            .then("sleep"),
        DialogueNode::new("sleep", "player", "You fall asleep to the sound of rain."),
        DialogueNode::new("cellar", "bram", "...Follow me. Quietly.")
            .with_emotion("serious")
            .with_background("cellar")
            .with_choice(Choice::new("follow", "Follow him down.").disabled())
            .with_choice(Choice::new("later", "Another night.")),
    ];

    DialogueGraph::new(characters, nodes)
}

/// The starting variables for a player called `name`.
#[must_use]
pub fn initial_store(name: &str) -> VariableStore {
    VariableStore::new().with("name", name).with("gold", 25)
}
