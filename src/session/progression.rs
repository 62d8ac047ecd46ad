use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::keyboard::finger::FingerId;
use crate::keyboard::layout::KeyboardLayout;
use crate::session::input::Chord;
use crate::session::lesson::{Attempt, Stream, TargetSymbol};
use crate::session::result::LessonSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingInput,
    Paused,
    LessonComplete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressionEvent {
    Chord(Chord),
    Pause,
    Resume,
}

/// What one event did. Chord evaluation runs to completion inside a single
/// `handle` call, so the caller only ever sees where it settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Correct,
    Incorrect,
    Completed,
    Paused,
    Resumed,
    /// Event not accepted in the current phase; nothing changed.
    Ignored,
}

/// Messages to whoever owns the lesson screen.
#[derive(Clone, Debug)]
pub enum LessonSignal {
    Paused,
    Resumed,
    Completed(LessonSummary),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    #[error("symbol {symbol:?} at position {index} cannot be typed on this layout")]
    UnmappedSymbol { index: usize, symbol: char },
}

/// Target fields computed on every entry into `AwaitingInput`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentTarget {
    pub index: usize,
    pub symbol: TargetSymbol,
    pub finger: Option<FingerId>,
    pub needs_shift: bool,
}

/// The stream, the cursor into it and the most recent attempt.
#[derive(Clone, Debug)]
pub struct ProgressionContext {
    stream: Stream,
    cursor: usize,
    last_attempt: Option<(usize, usize)>,
}

impl ProgressionContext {
    fn new(stream: Stream) -> Self {
        Self {
            stream,
            cursor: 0,
            last_attempt: None,
        }
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Always within `0..=stream.len()`; equal to the length once complete.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        let (symbol, attempt) = self.last_attempt?;
        self.stream.get(symbol)?.attempts().get(attempt)
    }

    fn record(&mut self, attempt: Attempt) {
        let index = self.cursor;
        self.stream.record(index, attempt);
        let count = self.stream.get(index).map_or(0, |s| s.attempts().len());
        self.last_attempt = count.checked_sub(1).map(|attempt| (index, attempt));
    }
}

/// Read-only copy of the progression state for view derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressionSnapshot {
    pub phase: Phase,
    pub cursor: usize,
    pub length: usize,
    pub target: Option<TargetSymbol>,
    pub last_attempt: Option<Attempt>,
}

impl ProgressionSnapshot {
    /// A lesson is running (possibly paused) and has a symbol to type.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::LessonComplete && self.target.is_some()
    }
}

pub struct ProgressionMachine {
    layout: Arc<KeyboardLayout>,
    context: ProgressionContext,
    phase: Phase,
    target: Option<CurrentTarget>,
    strict_shift: bool,
    signals: Sender<LessonSignal>,
    awaiting_since: Instant,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl ProgressionMachine {
    /// Start a lesson over `stream`.
    ///
    /// Fails when any symbol has no keys on the layout: the lesson could never
    /// get past it. An empty stream is complete from the start.
    pub fn new(
        stream: Stream,
        layout: Arc<KeyboardLayout>,
        signals: Sender<LessonSignal>,
    ) -> Result<Self, ProgressionError> {
        if let Some((index, symbol)) = stream.first_unmapped() {
            warn!(
                index,
                ?symbol,
                layout = layout.name(),
                "lesson contains an unmapped symbol"
            );
            return Err(ProgressionError::UnmappedSymbol { index, symbol });
        }

        let mut machine = Self {
            layout,
            context: ProgressionContext::new(stream),
            phase: Phase::AwaitingInput,
            target: None,
            strict_shift: true,
            signals,
            awaiting_since: Instant::now(),
            started_at: None,
            finished_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
        };
        machine.enter_awaiting_or_complete(Instant::now());
        Ok(machine)
    }

    /// When off, `ShiftLeft` and `ShiftRight` are interchangeable.
    pub fn with_strict_shift(mut self, strict: bool) -> Self {
        self.strict_shift = strict;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::LessonComplete
    }

    pub fn context(&self) -> &ProgressionContext {
        &self.context
    }

    pub fn stream(&self) -> &Stream {
        &self.context.stream
    }

    pub fn cursor(&self) -> usize {
        self.context.cursor
    }

    pub fn current_target(&self) -> Option<&CurrentTarget> {
        self.target.as_ref()
    }

    pub fn progress(&self) -> f64 {
        let len = self.context.stream.len();
        if len == 0 {
            return 0.0;
        }
        self.context.cursor as f64 / len as f64
    }

    /// Active typing time so far, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        let Some(start) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.finished_at.or(self.paused_at).unwrap_or_else(Instant::now);
        end.saturating_duration_since(start)
            .saturating_sub(self.paused_total)
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            phase: self.phase,
            cursor: self.context.cursor,
            length: self.context.stream.len(),
            target: self.target.as_ref().map(|t| t.symbol.clone()),
            last_attempt: self.context.last_attempt().cloned(),
        }
    }

    pub fn handle(&mut self, event: ProgressionEvent) -> Transition {
        let transition = match event {
            ProgressionEvent::Chord(chord) => self.handle_chord(chord),
            ProgressionEvent::Pause => self.pause(Instant::now()),
            ProgressionEvent::Resume => self.resume(Instant::now()),
        };
        debug!(?transition, phase = ?self.phase, cursor = self.context.cursor, "progression");
        transition
    }

    fn handle_chord(&mut self, chord: Chord) -> Transition {
        if self.phase != Phase::AwaitingInput {
            debug!(phase = ?self.phase, "chord ignored");
            return Transition::Ignored;
        }
        let Some(target) = self.target.as_ref() else {
            return Transition::Ignored;
        };

        let at = chord.recognized_at;
        self.started_at.get_or_insert(at);
        let attempt = Attempt::evaluate(
            &target.symbol,
            chord.into_keys(),
            self.awaiting_since,
            at,
            self.strict_shift,
        );
        let correct = attempt.correct;
        self.context.record(attempt);
        self.awaiting_since = at;

        if !correct {
            return Transition::Incorrect;
        }

        self.context.cursor += 1;
        if self.enter_awaiting_or_complete(at) {
            Transition::Completed
        } else {
            Transition::Correct
        }
    }

    /// Recompute the target for the symbol under the cursor, or finish the
    /// lesson when the cursor reached the end. Returns true on completion.
    fn enter_awaiting_or_complete(&mut self, at: Instant) -> bool {
        let index = self.context.cursor;
        match self.context.stream.get(index) {
            Some(symbol) => {
                let symbol = symbol.target.clone();
                let finger = symbol
                    .primary_key()
                    .and_then(|key| self.layout.finger_for_key(key));
                self.target = Some(CurrentTarget {
                    index,
                    needs_shift: symbol.needs_shift(),
                    symbol,
                    finger,
                });
                self.phase = Phase::AwaitingInput;
                false
            }
            None => {
                self.target = None;
                self.phase = Phase::LessonComplete;
                self.finished_at = Some(at);
                let summary = LessonSummary::from_stream(&self.context.stream, self.elapsed());
                info!(
                    symbols = self.context.stream.len(),
                    errors = summary.incorrect,
                    "lesson complete"
                );
                let _ = self.signals.send(LessonSignal::Completed(summary));
                true
            }
        }
    }

    fn pause(&mut self, at: Instant) -> Transition {
        if self.phase != Phase::AwaitingInput {
            return Transition::Ignored;
        }
        self.phase = Phase::Paused;
        self.paused_at = Some(at);
        let _ = self.signals.send(LessonSignal::Paused);
        Transition::Paused
    }

    fn resume(&mut self, at: Instant) -> Transition {
        if self.phase != Phase::Paused {
            return Transition::Ignored;
        }
        if let Some(paused_at) = self.paused_at.take() {
            // Time before the first chord is not typing time.
            if self.started_at.is_some() {
                self.paused_total += at.saturating_duration_since(paused_at);
            }
        }
        self.phase = Phase::AwaitingInput;
        self.awaiting_since = at;
        let _ = self.signals.send(LessonSignal::Resumed);
        Transition::Resumed
    }
}
