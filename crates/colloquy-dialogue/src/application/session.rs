//! The dialogue session controller.
//!
//! A [`DialogueSession`] walks one conversation through a [`DialogueGraph`].
//! It owns the variable store, visit history, relationship ledger, reveal
//! state, and the single pending auto-advance timer, and it is the only way
//! to change any of them. All entry points are synchronous; timers fire when
//! the host calls [`DialogueSession::tick`].
//!
//! ```text
//! Closed --open--> Open(id) --advance/select--> Open(next)
//!                     |  ^                          |
//!        toggle_history  toggle_history            terminal
//!                     v  |                          v
//!               ShowingHistory                 Completed -> Closed
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colloquy_core::clock::{Clock, SystemClock};
use colloquy_core::error::{ContentError, DialogueError};
use colloquy_core::presenter::{DialogueSnapshot, Presenter, RevealPhase};
use colloquy_core::variables::VariableStore;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::snapshot::{self, SnapshotSource};
use crate::config::SessionConfig;
use crate::domain::events::{DialogueEvent, DialogueEventKind};
use crate::domain::graph::DialogueGraph;
use crate::domain::navigator;
use crate::domain::relationships::{RelationshipLedger, SessionRelationships};
use crate::domain::reveal::Reveal;

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No conversation is running.
    Closed,
    /// A node is current and accepts input.
    Open,
    /// A node is current and the history overlay is shown.
    ShowingHistory,
}

impl SessionStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::ShowingHistory => "showing history",
        }
    }
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The choice is disabled or its condition is false.
    Unselectable,
    /// The node's choices have not finished revealing.
    ChoicesNotRevealed,
}

/// Result of a successful transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session moved to the named node.
    Entered(String),
    /// A terminal node was reached; completion fired and the session closed.
    Completed,
    /// The request was valid but had no effect.
    Ignored(IgnoreReason),
}

#[derive(Debug)]
enum Phase {
    Closed,
    Open { node_id: String, showing_history: bool },
}

#[derive(Debug, Clone)]
struct PendingAdvance {
    entry: u64,
    target: String,
    due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct NodeEntry {
    seq: u64,
    reveal: Reveal,
}

/// One conversation over a dialogue graph.
pub struct DialogueSession {
    id: Uuid,
    graph: Arc<DialogueGraph>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    presenter: Box<dyn Presenter>,
    relationships: Box<dyn RelationshipLedger>,
    phase: Phase,
    store: VariableStore,
    history: Vec<String>,
    entry: Option<NodeEntry>,
    entries: u64,
    pending: Option<PendingAdvance>,
    last_reveal: Option<RevealPhase>,
    events: Vec<DialogueEvent>,
    event_seq: u64,
}

impl std::fmt::Debug for DialogueSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("history", &self.history)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl DialogueSession {
    /// Creates a closed session over `graph` reporting to `presenter`.
    ///
    /// Uses the system clock, default configuration, and a per-session
    /// relationship ledger.
    #[must_use]
    pub fn new(graph: Arc<DialogueGraph>, presenter: Box<dyn Presenter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph,
            config: SessionConfig::default(),
            clock: Arc::new(SystemClock),
            presenter,
            relationships: Box::new(SessionRelationships::new()),
            phase: Phase::Closed,
            store: VariableStore::new(),
            history: Vec::new(),
            entry: None,
            entries: 0,
            pending: None,
            last_reveal: None,
            events: Vec::new(),
            event_seq: 0,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the relationship ledger, for example with a shared one.
    #[must_use]
    pub fn with_relationships(mut self, relationships: Box<dyn RelationshipLedger>) -> Self {
        self.relationships = relationships;
        self
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current coarse state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Closed => SessionStatus::Closed,
            Phase::Open {
                showing_history: false,
                ..
            } => SessionStatus::Open,
            Phase::Open {
                showing_history: true,
                ..
            } => SessionStatus::ShowingHistory,
        }
    }

    /// Returns `true` unless the session is closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.phase, Phase::Closed)
    }

    /// The current node id while open.
    #[must_use]
    pub fn current_node_id(&self) -> Option<&str> {
        match &self.phase {
            Phase::Open { node_id, .. } => Some(node_id),
            Phase::Closed => None,
        }
    }

    /// The current variable store.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Visited node ids, oldest first. Retained after the session closes
    /// until it is opened again.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Effective relationship score for `character_id`.
    #[must_use]
    pub fn relationship(&self, character_id: &str) -> Option<i32> {
        let character = self.graph.character(character_id)?;
        self.relationships.current(character)
    }

    /// Drains recorded events.
    pub fn take_events(&mut self) -> Vec<DialogueEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reveal phase of the current node entry.
    #[must_use]
    pub fn reveal_phase(&self) -> Option<RevealPhase> {
        let entry = self.entry.as_ref()?;
        Some(entry.reveal.phase(self.config.reveal, self.clock.now()))
    }

    /// The earliest instant at which [`tick`](Self::tick) has work to do: a
    /// pending auto-advance or a reveal phase change.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        let reveal = self
            .entry
            .as_ref()
            .and_then(|entry| entry.reveal.next_change(self.config.reveal, now));
        let timer = self.pending.as_ref().map(|p| p.due_at);
        match (reveal, timer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Opens the conversation at `start_id` with `initial_store`.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` if the session is already
    /// open, `DialogueError::NodeNotFound` (fatal; the session stays closed
    /// and completion never fires) if `start_id` is not in the graph, and
    /// `DialogueError::Content` if a choice condition on the start node fails
    /// against `initial_store` (the session stays closed).
    #[instrument(skip(self, initial_store), fields(session_id = %self.id))]
    pub fn open(&mut self, start_id: &str, initial_store: VariableStore) -> Result<Outcome, DialogueError> {
        if self.is_open() {
            return Err(self.rejected("open"));
        }
        if self.graph.node(start_id).is_none() {
            return Err(self.abort(DialogueError::NodeNotFound(start_id.to_owned())));
        }
        if let Err(err) = preflight(&self.graph, Some(start_id), &initial_store) {
            return Err(self.content_failure(err));
        }

        info!(start_id, "opening dialogue");
        self.store = initial_store;
        self.history.clear();
        self.relationships.reset();
        self.record(DialogueEventKind::Opened {
            start_id: start_id.to_owned(),
        });
        self.phase = Phase::Open {
            node_id: start_id.to_owned(),
            showing_history: false,
        };
        self.enter(start_id)
    }

    /// Advances past the current node, to `explicit_next` if given or else
    /// to the node's own `next`. With neither, the dialogue completes.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` unless the session is open
    /// with the history overlay hidden, `DialogueError::Content` if a choice
    /// condition on the target fails (the session stays where it is), and
    /// `DialogueError::NodeNotFound` (fatal; the session closes without
    /// completing) for an unknown target.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn advance(&mut self, explicit_next: Option<&str>) -> Result<Outcome, DialogueError> {
        let current = match &self.phase {
            Phase::Open {
                node_id,
                showing_history: false,
            } => node_id.clone(),
            _ => return Err(self.rejected("advance")),
        };
        let graph = Arc::clone(&self.graph);
        let node = match navigator::current_node(&graph, &current) {
            Ok(node) => node,
            Err(err) => return Err(self.abort(err)),
        };
        let target = explicit_next.or_else(|| navigator::resolve_next(node, None));
        if let Err(err) = preflight(&graph, target, &self.store) {
            return Err(self.content_failure(err));
        }
        self.move_to(target.map(str::to_owned))
    }

    /// Takes the choice `choice_id` on the current node.
    ///
    /// Choices that are disabled, hidden by their condition, or not yet
    /// revealed are ignored and leave the session unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` unless the session is open
    /// with the history overlay hidden, `DialogueError::UnknownChoice` if the
    /// node has no such choice, `DialogueError::Content` if its condition, its
    /// action, or a condition on the target node fails (store, relationships,
    /// and current node are left untouched), and
    /// `DialogueError::NodeNotFound` if its target cannot be resolved.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn select_choice(&mut self, choice_id: &str) -> Result<Outcome, DialogueError> {
        let current = match &self.phase {
            Phase::Open {
                node_id,
                showing_history: false,
            } => node_id.clone(),
            _ => return Err(self.rejected("select a choice")),
        };
        let graph = Arc::clone(&self.graph);
        let node = match navigator::current_node(&graph, &current) {
            Ok(node) => node,
            Err(err) => return Err(self.abort(err)),
        };
        let Some(choice) = node.choices.iter().find(|c| c.id == choice_id) else {
            debug!(node_id = %current, choice_id, "unknown choice");
            return Err(DialogueError::UnknownChoice {
                node_id: current,
                choice_id: choice_id.to_owned(),
            });
        };

        let selectable = navigator::is_selectable(choice, &self.store);
        match selectable {
            Err(err) => return Err(self.content_failure(err)),
            Ok(false) => {
                debug!(choice_id, "ignoring unselectable choice");
                return Ok(Outcome::Ignored(IgnoreReason::Unselectable));
            }
            Ok(true) => {}
        }
        if !self.choices_ready() {
            debug!(choice_id, "ignoring choice before reveal completed");
            return Ok(Outcome::Ignored(IgnoreReason::ChoicesNotRevealed));
        }

        let staged = match &choice.action {
            Some(action) => match self.store.with_update(action.as_ref()) {
                Ok(store) => store,
                Err(err) => return Err(self.content_failure(err)),
            },
            None => self.store.clone(),
        };
        let target = navigator::resolve_next(node, Some(choice));
        if let Err(err) = preflight(&graph, target, &staged) {
            return Err(self.content_failure(err));
        }

        self.store = staged;
        self.record(DialogueEventKind::ChoiceSelected {
            node_id: current.clone(),
            choice_id: choice_id.to_owned(),
        });

        if let Some(change) = choice.relationship() {
            if let Some(character) = graph.character(change.character_id) {
                let value = self.relationships.adjust(character, change.amount);
                debug!(character_id = change.character_id, value, "relationship changed");
                self.record(DialogueEventKind::RelationshipChanged {
                    character_id: change.character_id.to_owned(),
                    value,
                });
            }
        }

        self.move_to(target.map(str::to_owned))
    }

    /// Shows or hides the history overlay. Returns whether it is now shown.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` while closed.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn toggle_history(&mut self) -> Result<bool, DialogueError> {
        let showing = match &mut self.phase {
            Phase::Open {
                showing_history, ..
            } => {
                *showing_history = !*showing_history;
                *showing_history
            }
            Phase::Closed => return Err(self.rejected("toggle history")),
        };
        self.record(DialogueEventKind::HistoryToggled { showing });
        self.publish()?;
        Ok(showing)
    }

    /// Marks the current node's reveal sequence as finished.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` while closed.
    pub fn skip_reveal(&mut self) -> Result<(), DialogueError> {
        if !self.is_open() {
            return Err(self.rejected("skip the reveal"));
        }
        if let Some(entry) = self.entry.as_mut() {
            entry.reveal.skip();
        }
        self.publish()
    }

    /// Closes the session without firing completion. Cancels any pending
    /// auto-advance before returning. Closing a closed session does nothing.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.cancel_pending("close");
        self.shut();
        self.record(DialogueEventKind::Closed);
        info!("dialogue closed");
        self.presenter.closed();
    }

    /// Fires the pending auto-advance if it is due and republishes the
    /// snapshot when the reveal phase has moved on.
    ///
    /// Returns the outcome of the auto-advance, if one fired.
    ///
    /// # Errors
    ///
    /// Propagates the errors of the transition the timer triggers. A timer
    /// whose transition fails with `DialogueError::Content` is dropped and the
    /// session stays on the current node.
    pub fn tick(&mut self) -> Result<Option<Outcome>, DialogueError> {
        let now = self.clock.now();
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.due_at <= now);

        if due {
            if let Some(pending) = self.pending.take() {
                if let Some(outcome) = self.fire(pending)? {
                    return Ok(Some(outcome));
                }
            }
        }

        if self.is_open() && self.reveal_phase() != self.last_reveal {
            self.publish()?;
        }
        Ok(None)
    }

    /// Builds a snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns `DialogueError::InvalidTransition` while closed and
    /// `DialogueError::Content` if a choice condition fails.
    pub fn snapshot(&self) -> Result<DialogueSnapshot, DialogueError> {
        let (node_id, showing_history) = match &self.phase {
            Phase::Open {
                node_id,
                showing_history,
            } => (node_id.as_str(), *showing_history),
            Phase::Closed => {
                return Err(DialogueError::InvalidTransition {
                    operation: "take a snapshot",
                    state: SessionStatus::Closed.label(),
                });
            }
        };
        let node = navigator::current_node(&self.graph, node_id)?;
        let now = self.clock.now();
        let (reveal, choices_ready) = match &self.entry {
            Some(entry) => (
                entry.reveal.phase(self.config.reveal, now),
                entry.reveal.choices_ready(self.config.reveal, now),
            ),
            None => (RevealPhase::Complete, true),
        };

        snapshot::build(&SnapshotSource {
            session_id: self.id,
            title: &self.config.title,
            graph: &self.graph,
            node,
            store: &self.store,
            history: &self.history,
            relationships: &*self.relationships,
            reveal,
            choices_ready,
            showing_history,
        })
    }

    fn fire(&mut self, pending: PendingAdvance) -> Result<Option<Outcome>, DialogueError> {
        let current = match (&self.phase, &self.entry) {
            (Phase::Open { node_id, .. }, Some(entry)) if entry.seq == pending.entry => {
                node_id.clone()
            }
            _ => {
                debug!(entry = pending.entry, "discarding stale auto-advance");
                return Ok(None);
            }
        };
        let graph = Arc::clone(&self.graph);
        if let Err(err) = preflight(&graph, Some(pending.target.as_str()), &self.store) {
            return Err(self.content_failure(err));
        }
        debug!(from = %current, to = %pending.target, "auto-advancing");
        self.record(DialogueEventKind::AutoAdvanced {
            from: current,
            to: pending.target.clone(),
        });
        self.move_to(Some(pending.target)).map(Some)
    }

    fn move_to(&mut self, target: Option<String>) -> Result<Outcome, DialogueError> {
        match target {
            None => {
                self.complete();
                Ok(Outcome::Completed)
            }
            Some(target) if self.graph.node(&target).is_none() => {
                Err(self.abort(DialogueError::NodeNotFound(target)))
            }
            Some(target) => self.enter(&target),
        }
    }

    fn enter(&mut self, node_id: &str) -> Result<Outcome, DialogueError> {
        let graph = Arc::clone(&self.graph);
        let node = match navigator::current_node(&graph, node_id) {
            Ok(node) => node,
            Err(err) => return Err(self.abort(err)),
        };

        self.cancel_pending("node entry");
        self.entries += 1;
        let seq = self.entries;
        self.entry = Some(NodeEntry {
            seq,
            reveal: Reveal::start(self.clock.now(), node.has_choices()),
        });
        self.history.push(node_id.to_owned());
        if let Phase::Open {
            node_id: current, ..
        } = &mut self.phase
        {
            node_id.clone_into(current);
        }
        debug!(node_id, entry = seq, "entered node");
        self.record(DialogueEventKind::NodeEntered {
            node_id: node_id.to_owned(),
            entry: seq,
        });

        if node.auto_advance {
            if let Some(target) = &node.next {
                let delay = node
                    .auto_advance_delay_ms
                    .unwrap_or(self.config.default_auto_advance_delay_ms);
                let due_at = self.clock.deadline_after(delay);
                debug!(target = %target, delay_ms = delay, "scheduling auto-advance");
                self.pending = Some(PendingAdvance {
                    entry: seq,
                    target: target.clone(),
                    due_at,
                });
                self.record(DialogueEventKind::AutoAdvanceScheduled {
                    target: target.clone(),
                    due_at,
                });
            }
        }

        self.publish()?;
        Ok(Outcome::Entered(node_id.to_owned()))
    }

    fn complete(&mut self) {
        self.cancel_pending("completion");
        let shown_ms = self
            .entry
            .as_ref()
            .map(|entry| self.clock.millis_since(entry.reveal.entered_at()));
        self.shut();
        self.record(DialogueEventKind::Completed);
        info!(visited = self.history.len(), last_node_ms = ?shown_ms, "dialogue completed");
        self.presenter.completed(&self.store);
    }

    fn abort(&mut self, err: DialogueError) -> DialogueError {
        warn!(error = %err, "dialogue aborted");
        if let DialogueError::NodeNotFound(missing) = &err {
            let missing_node = missing.clone();
            if self.is_open() {
                self.cancel_pending("abort");
                self.shut();
            }
            self.record(DialogueEventKind::Aborted { missing_node });
        }
        self.presenter.failed(&err);
        err
    }

    fn content_failure(&mut self, err: ContentError) -> DialogueError {
        let err = DialogueError::Content(err);
        warn!(error = %err, "content error");
        self.presenter.failed(&err);
        err
    }

    fn rejected(&self, operation: &'static str) -> DialogueError {
        let state = self.status().label();
        debug!(operation, state, "rejected transition");
        DialogueError::InvalidTransition { operation, state }
    }

    fn shut(&mut self) {
        self.phase = Phase::Closed;
        self.entry = None;
        self.last_reveal = None;
    }

    fn cancel_pending(&mut self, reason: &'static str) {
        if let Some(pending) = self.pending.take() {
            debug!(target = %pending.target, reason, "cancelled auto-advance");
        }
    }

    fn choices_ready(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.reveal.choices_ready(self.config.reveal, self.clock.now()))
    }

    fn record(&mut self, kind: DialogueEventKind) {
        self.event_seq += 1;
        self.events.push(DialogueEvent {
            session_id: self.id,
            sequence: self.event_seq,
            occurred_at: self.clock.now(),
            kind,
        });
    }

    fn publish(&mut self) -> Result<(), DialogueError> {
        match self.snapshot() {
            Ok(snapshot) => {
                self.last_reveal = Some(snapshot.reveal);
                self.presenter.present(&snapshot);
                Ok(())
            }
            Err(DialogueError::Content(err)) => Err(self.content_failure(err)),
            Err(err) => {
                warn!(error = %err, "snapshot failed");
                self.presenter.failed(&err);
                Err(err)
            }
        }
    }
}

/// Evaluates every choice condition on `target` against the store it would
/// be entered with. Transitions run this before committing anything, so a
/// failing condition leaves the session where it was.
fn preflight(
    graph: &DialogueGraph,
    target: Option<&str>,
    store: &VariableStore,
) -> Result<(), ContentError> {
    match target.and_then(|id| graph.node(id)) {
        Some(node) => navigator::visible_choices(node, store).map(|_| ()),
        None => Ok(()),
    }
}
