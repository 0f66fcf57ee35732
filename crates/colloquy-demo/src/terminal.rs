//! Plain-text presenter and input parsing for the terminal host.

use std::fmt;
use std::io::Write;

use colloquy_core::error::DialogueError;
use colloquy_core::presenter::{DialogueSnapshot, Presenter, RevealPhase};
use colloquy_core::variables::VariableStore;
use tracing::warn;

/// A line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take the n-th listed choice (1-based).
    Choose(usize),
    /// Continue past a node without choices, or finish the reveal.
    Continue,
    /// Show or hide the history overlay.
    History,
    /// Leave the conversation.
    Quit,
    /// Anything else.
    Unknown,
}

impl Command {
    /// Parses one line of input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Continue,
            "h" | "history" => Self::History,
            "q" | "quit" => Self::Quit,
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map_or(Self::Unknown, Self::Choose),
        }
    }
}

/// Renders snapshots as text.
///
/// Each node entry is printed once: the line when its text becomes visible and
/// the choices once the reveal is complete.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    entry: Option<(String, usize)>,
    text_shown: bool,
    choices_shown: bool,
    history_shown: bool,
}

impl<W: Write + Send> TerminalPresenter<W> {
    /// Creates a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            entry: None,
            text_shown: false,
            choices_shown: false,
            history_shown: false,
        }
    }

    /// Consumes the presenter and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{line}") {
            warn!(error = %err, "failed to write to terminal");
        }
    }

    fn render_line(&mut self, snapshot: &DialogueSnapshot) {
        let character = &snapshot.character;
        let mut speaker = character.name.clone();
        if let Some(role) = &character.role {
            speaker.push_str(&format!(" the {role}"));
        }
        if let Some(emotion) = &snapshot.node.emotion {
            speaker.push_str(&format!(", {emotion}"));
        }
        match character.relationship {
            Some(score) => self.emit(format_args!("\n{speaker} [{score:+}]: {}", snapshot.node.text)),
            None => self.emit(format_args!("\n{speaker}: {}", snapshot.node.text)),
        }
    }

    fn render_choices(&mut self, snapshot: &DialogueSnapshot) {
        for (index, choice) in snapshot.choices.iter().enumerate() {
            let marker = if choice.available { "" } else { " (unavailable)" };
            self.emit(format_args!("  {}. {}{marker}", index + 1, choice.text));
        }
        if snapshot.can_continue {
            self.emit(format_args!("  [enter] continue"));
        }
    }

    fn render_history(&mut self, snapshot: &DialogueSnapshot) {
        self.emit(format_args!("\n--- {} history ---", snapshot.title));
        for entry in &snapshot.history {
            self.emit(format_args!("  {}: {}", entry.speaker, entry.text));
        }
        self.emit(format_args!("--- [h] to return ---"));
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, snapshot: &DialogueSnapshot) {
        let entry = (snapshot.node.id.clone(), snapshot.history.len());
        if self.entry.as_ref() != Some(&entry) {
            self.entry = Some(entry);
            self.text_shown = false;
            self.choices_shown = false;
        }

        if snapshot.showing_history {
            if !self.history_shown {
                self.history_shown = true;
                self.render_history(snapshot);
            }
            return;
        }
        if self.history_shown {
            self.history_shown = false;
            self.text_shown = false;
            self.choices_shown = false;
        }

        if snapshot.reveal.text_visible() && !self.text_shown {
            self.text_shown = true;
            self.render_line(snapshot);
        }
        if snapshot.reveal == RevealPhase::Complete && !self.choices_shown {
            self.choices_shown = true;
            self.render_choices(snapshot);
        }
    }

    fn completed(&mut self, final_store: &VariableStore) {
        self.emit(format_args!("\n*** The conversation ends. ***"));
        for (key, value) in final_store.iter() {
            self.emit(format_args!("  {key} = {value}"));
        }
    }

    fn closed(&mut self) {
        self.emit(format_args!("\n*** You walk away. ***"));
    }

    fn failed(&mut self, error: &DialogueError) {
        self.emit(format_args!("! {error}"));
    }
}
