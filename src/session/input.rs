use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, trace};

use crate::keyboard::key::KeyId;

/// Raw keyboard event, one per physical action, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyId),
    KeyUp(KeyId),
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputState {
    /// No keys held.
    Idle,
    /// At least one key held.
    Listening,
}

/// Keys that were held together when a non-modifier key went down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chord {
    keys: BTreeSet<KeyId>,
    pub recognized_at: Instant,
}

impl Chord {
    pub fn new(keys: impl IntoIterator<Item = KeyId>, recognized_at: Instant) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            recognized_at,
        }
    }

    pub fn keys(&self) -> &BTreeSet<KeyId> {
        &self.keys
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    pub fn into_keys(self) -> BTreeSet<KeyId> {
        self.keys
    }
}

/// Turns key-down/key-up events into recognized chords.
///
/// The held-key set belongs to this machine alone; the lesson only ever sees
/// the chords it hands back.
#[derive(Debug)]
pub struct InputMachine {
    pressed: BTreeSet<KeyId>,
    state: InputState,
}

impl Default for InputMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMachine {
    pub fn new() -> Self {
        Self {
            pressed: BTreeSet::new(),
            state: InputState::Idle,
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn pressed(&self) -> &BTreeSet<KeyId> {
        &self.pressed
    }

    pub fn is_held(&self, key: KeyId) -> bool {
        self.pressed.contains(&key)
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<Chord> {
        self.handle_at(event, Instant::now())
    }

    /// Process one event to completion. Returns the chord when a non-modifier
    /// key went down; bare modifier presses, releases and resets return `None`.
    pub fn handle_at(&mut self, event: InputEvent, at: Instant) -> Option<Chord> {
        trace!(?event, held = self.pressed.len(), "input event");
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed.insert(key);
                self.state = InputState::Listening;
                if key.is_modifier() {
                    return None;
                }
                let chord = Chord {
                    keys: self.pressed.clone(),
                    recognized_at: at,
                };
                debug!(keys = ?chord.keys, "chord recognized");
                Some(chord)
            }
            InputEvent::KeyUp(key) => {
                if key.is_meta() && self.pressed.contains(&key) {
                    // Keys released while a command key was down never report
                    // their own key-up, so drop them with it.
                    self.pressed
                        .retain(|held| held.is_modifier() && !held.is_meta());
                } else {
                    self.pressed.remove(&key);
                }
                self.settle();
                None
            }
            InputEvent::Reset => {
                self.pressed.clear();
                self.state = InputState::Idle;
                None
            }
        }
    }

    fn settle(&mut self) {
        self.state = if self.pressed.is_empty() {
            InputState::Idle
        } else {
            InputState::Listening
        };
    }
}
