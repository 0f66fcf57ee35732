//! Shared fixtures for dialogue integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use colloquy_core::value::Value;
use colloquy_dialogue::domain::conditions::Predicate;
use colloquy_dialogue::domain::effects::Effect;
use colloquy_dialogue::domain::reveal::RevealTiming;
use colloquy_dialogue::{Character, Choice, DialogueGraph, DialogueNode, DialogueSession, SessionConfig};
use colloquy_test_support::{ManualClock, RecordingPresenter};

/// A session wired to a manual clock and a recording presenter.
pub struct Harness {
    pub session: DialogueSession,
    pub clock: ManualClock,
    pub presenter: RecordingPresenter,
}

/// Builds a harness over `graph` with the given reveal timing.
pub fn harness(graph: DialogueGraph, reveal: RevealTiming) -> Harness {
    let clock = ManualClock::at_fixed_epoch();
    let presenter = RecordingPresenter::new();
    let session = DialogueSession::new(Arc::new(graph), Box::new(presenter.clone()))
        .with_clock(Arc::new(clock.clone()))
        .with_config(SessionConfig::default().with_reveal(reveal));
    Harness {
        session,
        clock,
        presenter,
    }
}

/// Builds a harness whose nodes are revealed immediately.
pub fn instant_harness(graph: DialogueGraph) -> Harness {
    harness(graph, RevealTiming::instant())
}

pub fn cast() -> Vec<Character> {
    vec![
        Character::new("innkeeper", "Bram", "avatars/bram.png")
            .with_role("innkeeper")
            .with_relationship(10),
        Character::new("player", "You", "avatars/player.png"),
    ]
}

/// A → B → c1 (terminal).
pub fn linear_graph() -> DialogueGraph {
    DialogueGraph::new(
        cast(),
        vec![
            DialogueNode::new("A", "innkeeper", "Welcome to the Crooked Lantern.").then("B"),
            DialogueNode::new("B", "innkeeper", "Room or drink?")
                .with_choice(Choice::new("c1", "Just passing through.")),
        ],
    )
    .unwrap()
}

/// A tavern conversation exercising conditions, actions, relationships and
/// auto-advance.
pub fn tavern_graph() -> DialogueGraph {
    DialogueGraph::new(
        cast(),
        vec![
            DialogueNode::new("greet", "innkeeper", "Evening, {name}. You've {gold} coins on you.")
                .with_emotion("friendly")
                .with_background("tavern")
                .with_choice(
                    Choice::new("room", "A room, please. (10 gold)")
                        .when(Predicate::AtLeast("gold".into(), 10.0))
                        .with_action(Effect::Sequence(vec![
                            Effect::Increment("gold".into(), Value::Int(-10)),
                            Effect::Set("has_room".into(), Value::Bool(true)),
                        ]))
                        .changes_relationship("innkeeper", 5)
                        .then("room"),
                )
                .with_choice(
                    Choice::new("vip", "Secret password.")
                        .when(Predicate::IsTruthy("knows_password".into()))
                        .then("cellar"),
                )
                .with_choice(
                    Choice::new("insult", "This place is a dump.")
                        .changes_relationship("innkeeper", -40)
                        .then("angry"),
                )
                .with_choice(Choice::new("leave", "Never mind.")),
            DialogueNode::new("room", "innkeeper", "Up the stairs. {gold} coins left.")
                .auto_advance(Some(500))
                .then("night"),
            DialogueNode::new("night", "player", "You sleep soundly."),
            DialogueNode::new("cellar", "innkeeper", "Follow me."),
            DialogueNode::new("angry", "innkeeper", "Then drink elsewhere.")
                .with_emotion("angry")
                .then("greet"),
        ],
    )
    .unwrap()
}
