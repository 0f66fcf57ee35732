//! Reveal sequence timing for a node entry.
//!
//! On every node entry the previous text is hidden before the new text fades
//! in, and choices run their own hide, pause, and fade sequence. Choices stay
//! inert until that sequence has finished.

use chrono::{DateTime, Duration, Utc};
use colloquy_core::presenter::RevealPhase;
use serde::{Deserialize, Serialize};

/// Durations of the reveal sequence, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    /// Hiding the previous node's text.
    pub text_hide_ms: u64,
    /// Fading in the new text.
    pub text_show_ms: u64,
    /// Hiding the previous choices.
    pub choices_hide_ms: u64,
    /// Pause that lets the player read before choices appear.
    pub choices_delay_ms: u64,
    /// Fading in the new choices.
    pub choices_show_ms: u64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            text_hide_ms: 150,
            text_show_ms: 300,
            choices_hide_ms: 100,
            choices_delay_ms: 300,
            choices_show_ms: 300,
        }
    }
}

impl RevealTiming {
    /// A timing with every step at zero, so nodes are revealed immediately.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            text_hide_ms: 0,
            text_show_ms: 0,
            choices_hide_ms: 0,
            choices_delay_ms: 0,
            choices_show_ms: 0,
        }
    }

    /// Every step multiplied by `percent / 100`.
    #[must_use]
    pub fn scaled(self, percent: u64) -> Self {
        let scale = |ms: u64| ms.saturating_mul(percent) / 100;
        Self {
            text_hide_ms: scale(self.text_hide_ms),
            text_show_ms: scale(self.text_show_ms),
            choices_hide_ms: scale(self.choices_hide_ms),
            choices_delay_ms: scale(self.choices_delay_ms),
            choices_show_ms: scale(self.choices_show_ms),
        }
    }

    /// Elapsed time at which the new text starts to show.
    #[must_use]
    pub fn text_visible_at(self) -> u64 {
        self.text_hide_ms
    }

    /// Elapsed time at which the text is fully shown.
    #[must_use]
    pub fn text_complete_at(self) -> u64 {
        self.text_hide_ms.saturating_add(self.text_show_ms)
    }

    /// Elapsed time at which choices accept input.
    #[must_use]
    pub fn choices_ready_at(self) -> u64 {
        self.choices_hide_ms
            .saturating_add(self.choices_delay_ms)
            .saturating_add(self.choices_show_ms)
    }

    /// The phase reached `elapsed_ms` after entering a node.
    #[must_use]
    pub fn phase(self, elapsed_ms: u64, has_choices: bool) -> RevealPhase {
        if elapsed_ms < self.text_visible_at() {
            RevealPhase::HidingPrevious
        } else if elapsed_ms < self.text_complete_at() {
            RevealPhase::RevealingText
        } else if has_choices && elapsed_ms < self.choices_ready_at() {
            RevealPhase::RevealingChoices
        } else {
            RevealPhase::Complete
        }
    }

    /// Elapsed times at which the phase can change, in ascending order.
    fn boundaries(self, has_choices: bool) -> Vec<u64> {
        let mut points = vec![self.text_visible_at(), self.text_complete_at()];
        if has_choices {
            points.push(self.choices_ready_at());
        }
        points.sort_unstable();
        points
    }
}

/// Reveal state for a single node entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    entered_at: DateTime<Utc>,
    has_choices: bool,
    skipped: bool,
}

impl Reveal {
    /// Starts a reveal at `entered_at`.
    #[must_use]
    pub fn start(entered_at: DateTime<Utc>, has_choices: bool) -> Self {
        Self {
            entered_at,
            has_choices,
            skipped: false,
        }
    }

    /// Marks the sequence as finished regardless of elapsed time.
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// When the node was entered.
    #[must_use]
    pub fn entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.entered_at).num_milliseconds()).unwrap_or(0)
    }

    /// The phase at `now`.
    #[must_use]
    pub fn phase(&self, timing: RevealTiming, now: DateTime<Utc>) -> RevealPhase {
        if self.skipped {
            return RevealPhase::Complete;
        }
        timing.phase(self.elapsed_ms(now), self.has_choices)
    }

    /// Whether choices accept input at `now`.
    #[must_use]
    pub fn choices_ready(&self, timing: RevealTiming, now: DateTime<Utc>) -> bool {
        self.skipped || self.elapsed_ms(now) >= timing.choices_ready_at()
    }

    /// The next instant after `now` at which the phase changes, if any.
    #[must_use]
    pub fn next_change(&self, timing: RevealTiming, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.skipped {
            return None;
        }
        let elapsed = self.elapsed_ms(now);
        timing
            .boundaries(self.has_choices)
            .into_iter()
            .find(|point| *point > elapsed)
            .map(|point| {
                let offset = i64::try_from(point).unwrap_or(i64::MAX);
                Duration::try_milliseconds(offset)
                    .and_then(|delta| self.entered_at.checked_add_signed(delta))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            })
    }
}
