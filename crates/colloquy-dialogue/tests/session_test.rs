//! Integration tests for full conversations driven through a session.

mod common;

use std::sync::Arc;

use colloquy_core::error::DialogueError;
use colloquy_core::presenter::RevealPhase;
use colloquy_core::value::Value;
use colloquy_core::variables::VariableStore;
use colloquy_dialogue::domain::events::DialogueEventKind;
use colloquy_dialogue::domain::relationships::SharedRelationships;
use colloquy_dialogue::domain::reveal::RevealTiming;
use colloquy_dialogue::{DialogueSession, IgnoreReason, Outcome, SessionStatus};
use colloquy_test_support::RecordingPresenter;

fn traveller() -> VariableStore {
    VariableStore::new().with("name", "Ayla").with("gold", 25)
}

#[test]
fn test_linear_conversation_completes_with_initial_store() {
    // Arrange
    let mut h = common::instant_harness(common::linear_graph());
    let initial = traveller();

    // Act
    h.session.open("A", initial.clone()).unwrap();
    h.session.advance(None).unwrap();
    let outcome = h.session.select_choice("c1").unwrap();

    // Assert
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(h.session.status(), SessionStatus::Closed);
    assert_eq!(h.presenter.completions(), vec![initial]);
    assert_eq!(h.session.history(), ["A".to_owned(), "B".to_owned()]);
    assert_eq!(h.presenter.close_count(), 0);
}

#[test]
fn test_history_starts_at_start_and_never_shrinks() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();
    let mut lengths = vec![h.session.history().len()];

    // Act
    h.session.select_choice("insult").unwrap();
    lengths.push(h.session.history().len());
    h.session.advance(None).unwrap();
    lengths.push(h.session.history().len());
    h.session.toggle_history().unwrap();
    lengths.push(h.session.history().len());

    // Assert
    assert_eq!(h.session.history()[0], "greet");
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(h.session.history(), ["greet", "angry", "greet"]);
    let snapshot = h.presenter.last_snapshot().unwrap();
    assert!(snapshot.showing_history);
    assert!(snapshot.node.seen_before);
    assert_eq!(snapshot.history[1].speaker, "Bram");
    assert_eq!(snapshot.history[1].text, "Then drink elsewhere.");
}

#[test]
fn test_choice_with_false_condition_changes_nothing() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    let initial = traveller();
    h.session.open("greet", initial.clone()).unwrap();

    // Act
    let outcome = h.session.select_choice("vip").unwrap();

    // Assert
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Unselectable));
    assert_eq!(h.session.current_node_id(), Some("greet"));
    assert_eq!(h.session.history(), ["greet".to_owned()]);
    assert_eq!(h.session.store(), &initial);
}

#[test]
fn test_room_purchase_updates_store_relationship_and_auto_advances() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();

    // Act
    let bought = h.session.select_choice("room").unwrap();
    let room_text = h.presenter.last_snapshot().unwrap().node.text;
    h.clock.advance_ms(500);
    let advanced = h.session.tick().unwrap();
    let finished = h.session.advance(None).unwrap();

    // Assert
    assert_eq!(bought, Outcome::Entered("room".into()));
    assert_eq!(room_text, "Up the stairs. 15 coins left.");
    assert_eq!(advanced, Some(Outcome::Entered("night".into())));
    assert_eq!(finished, Outcome::Completed);
    let final_store = &h.presenter.completions()[0];
    assert_eq!(final_store.get("gold"), Some(&Value::Int(15)));
    assert_eq!(final_store.get("has_room"), Some(&Value::Bool(true)));
    assert_eq!(h.session.relationship("innkeeper"), Some(15));
}

#[test]
fn test_relationship_stays_clamped_after_repeated_insults() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();

    // Act
    for _ in 0..5 {
        h.session.select_choice("insult").unwrap();
        h.session.advance(None).unwrap();
    }

    // Assert
    assert_eq!(h.session.relationship("innkeeper"), Some(-100));
    let snapshot = h.presenter.last_snapshot().unwrap();
    assert_eq!(snapshot.character.relationship, Some(-100));
}

#[test]
fn test_close_before_auto_advance_prevents_firing() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();
    h.session.select_choice("room").unwrap();

    // Act
    h.clock.advance_ms(100);
    h.session.close();
    h.clock.advance_ms(400);
    let fired = h.session.tick().unwrap();

    // Assert
    assert_eq!(fired, None);
    assert_eq!(h.session.status(), SessionStatus::Closed);
    assert_eq!(h.session.history(), ["greet".to_owned(), "room".to_owned()]);
    assert!(h.presenter.completions().is_empty());
    assert_eq!(h.presenter.close_count(), 1);
    assert_eq!(h.session.next_deadline(), None);
}

#[test]
fn test_open_unknown_start_is_fatal_without_completion() {
    // Arrange
    let mut h = common::instant_harness(common::linear_graph());

    // Act
    let result = h.session.open("ghost", VariableStore::new());

    // Assert
    assert_eq!(result, Err(DialogueError::NodeNotFound("ghost".into())));
    assert!(result.unwrap_err().is_fatal());
    assert_eq!(h.session.status(), SessionStatus::Closed);
    assert!(h.presenter.completions().is_empty());
    assert_eq!(h.presenter.failures().len(), 1);
    assert!(h.presenter.snapshots().is_empty());
}

#[test]
fn test_reveal_sequence_gates_choices_with_default_timing() {
    // Arrange
    let mut h = common::harness(common::tavern_graph(), RevealTiming::default());
    h.session.open("greet", traveller()).unwrap();

    // Act
    let mut phases = Vec::new();
    for step in [0, 150, 300, 250] {
        h.clock.advance_ms(step);
        h.session.tick().unwrap();
        phases.push(h.session.reveal_phase());
    }

    // Assert
    assert_eq!(
        phases,
        vec![
            Some(RevealPhase::HidingPrevious),
            Some(RevealPhase::RevealingText),
            Some(RevealPhase::RevealingChoices),
            Some(RevealPhase::Complete),
        ]
    );
    let published: Vec<_> = h.presenter.snapshots().iter().map(|s| s.reveal).collect();
    assert_eq!(
        published,
        vec![
            RevealPhase::HidingPrevious,
            RevealPhase::RevealingText,
            RevealPhase::RevealingChoices,
            RevealPhase::Complete,
        ]
    );
    assert_eq!(h.session.select_choice("leave").unwrap(), Outcome::Completed);
}

#[test]
fn test_shared_relationships_accumulate_across_sessions() {
    // Arrange
    let graph = Arc::new(common::tavern_graph());
    let ledger = SharedRelationships::new();
    let mut sessions: Vec<DialogueSession> = (0..2)
        .map(|_| {
            DialogueSession::new(Arc::clone(&graph), Box::new(RecordingPresenter::new()))
                .with_config(
                    colloquy_dialogue::SessionConfig::default().with_reveal(RevealTiming::instant()),
                )
                .with_relationships(Box::new(ledger.clone()))
        })
        .collect();

    // Act
    for session in &mut sessions {
        session.open("greet", traveller()).unwrap();
        session.select_choice("room").unwrap();
    }

    // Assert
    assert_eq!(ledger.get("innkeeper"), Some(20));
    assert_eq!(sessions[0].relationship("innkeeper"), Some(20));
}

#[test]
fn test_event_log_replays_the_conversation() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();
    h.session.select_choice("room").unwrap();
    h.clock.advance_ms(500);
    h.session.tick().unwrap();
    h.session.close();

    // Act
    let kinds: Vec<_> = h.session.take_events().into_iter().map(|e| e.kind).collect();

    // Assert
    assert_eq!(kinds[0], DialogueEventKind::Opened { start_id: "greet".into() });
    assert!(kinds.contains(&DialogueEventKind::ChoiceSelected {
        node_id: "greet".into(),
        choice_id: "room".into(),
    }));
    assert!(kinds.contains(&DialogueEventKind::RelationshipChanged {
        character_id: "innkeeper".into(),
        value: 15,
    }));
    assert!(kinds.contains(&DialogueEventKind::AutoAdvanced {
        from: "room".into(),
        to: "night".into(),
    }));
    assert_eq!(kinds.last(), Some(&DialogueEventKind::Closed));
}

#[test]
fn test_snapshot_serializes_for_presenters() {
    // Arrange
    let mut h = common::instant_harness(common::tavern_graph());
    h.session.open("greet", traveller()).unwrap();

    // Act
    let json = serde_json::to_value(h.session.snapshot().unwrap()).unwrap();

    // Assert
    assert_eq!(json["title"], "Conversation");
    assert_eq!(json["node"]["text"], "Evening, Ayla. You've 25 coins on you.");
    assert_eq!(json["node"]["background"], "tavern");
    assert_eq!(json["character"]["name"], "Bram");
    assert_eq!(json["choices"].as_array().unwrap().len(), 3);
}
