use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tracing::trace;

use keyguide::keyboard::{KeyId, KeyboardLayout};
use keyguide::session::input::InputEvent;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(_, _)) => {
                            if tx.send(AppEvent::Resize).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// Turns terminal key events into physical key-down/key-up events.
///
/// Terminals report characters, not key codes, and many never report
/// releases or bare modifier presses. Characters are mapped back to the key
/// that produces them on the active layout. Without modifier events a shifted
/// character gets a synthetic Shift (the one on the opposite hand); without
/// release events every press is followed by its release at once.
pub struct KeyTranslator {
    layout: Arc<KeyboardLayout>,
    reports_releases: bool,
    reports_modifiers: bool,
    synthetic_shift: Option<(KeyId, KeyId)>,
}

impl KeyTranslator {
    pub fn new(layout: Arc<KeyboardLayout>, reports_releases: bool) -> Self {
        Self {
            layout,
            reports_releases,
            reports_modifiers: false,
            synthetic_shift: None,
        }
    }

    pub fn translate(&mut self, key: &KeyEvent) -> Vec<InputEvent> {
        if key.kind == KeyEventKind::Repeat {
            return Vec::new();
        }
        let pressed = key.kind == KeyEventKind::Press;

        if let KeyCode::Modifier(modifier) = key.code {
            // First bare modifier event: the terminal reports them, stop faking.
            self.reports_modifiers = true;
            let Some(id) = modifier_key(modifier) else {
                return Vec::new();
            };
            return if pressed {
                vec![InputEvent::KeyDown(id)]
            } else {
                vec![InputEvent::KeyUp(id)]
            };
        }

        let Some(id) = self.key_for_code(key.code) else {
            trace!(code = ?key.code, "key with no physical mapping");
            return Vec::new();
        };

        if !pressed {
            let mut events = vec![InputEvent::KeyUp(id)];
            if let Some((shift, _)) = self.synthetic_shift.take_if(|(_, held)| *held == id) {
                events.push(InputEvent::KeyUp(shift));
            }
            return events;
        }

        let shift = (!self.reports_modifiers && self.wants_shift(key))
            .then(|| self.layout.shift_for_key(id));
        let mut events = Vec::with_capacity(4);
        if let Some(shift) = shift {
            events.push(InputEvent::KeyDown(shift));
        }
        events.push(InputEvent::KeyDown(id));
        if self.reports_releases {
            if let Some(shift) = shift {
                self.synthetic_shift = Some((shift, id));
            }
        } else {
            events.push(InputEvent::KeyUp(id));
            if let Some(shift) = shift {
                events.push(InputEvent::KeyUp(shift));
            }
        }
        events
    }

    fn key_for_code(&self, code: KeyCode) -> Option<KeyId> {
        match code {
            KeyCode::Char(ch) => self.layout.key_for_char(ch),
            KeyCode::Enter => Some(KeyId::Enter),
            KeyCode::Tab | KeyCode::BackTab => Some(KeyId::Tab),
            KeyCode::Backspace => Some(KeyId::Backspace),
            KeyCode::CapsLock => Some(KeyId::CapsLock),
            KeyCode::Menu => Some(KeyId::ContextMenu),
            _ => None,
        }
    }

    fn wants_shift(&self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::SHIFT) || key.code == KeyCode::BackTab {
            return true;
        }
        match key.code {
            KeyCode::Char(ch) => self.layout.required_keys(ch).iter().any(|k| k.is_shift()),
            _ => false,
        }
    }
}

fn modifier_key(modifier: ModifierKeyCode) -> Option<KeyId> {
    let id = match modifier {
        ModifierKeyCode::LeftShift => KeyId::ShiftLeft,
        ModifierKeyCode::RightShift => KeyId::ShiftRight,
        ModifierKeyCode::LeftControl => KeyId::ControlLeft,
        ModifierKeyCode::RightControl => KeyId::ControlRight,
        ModifierKeyCode::LeftAlt => KeyId::AltLeft,
        ModifierKeyCode::RightAlt => KeyId::AltRight,
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => KeyId::MetaLeft,
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => KeyId::MetaRight,
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use InputEvent::{KeyDown, KeyUp};

    fn layout() -> Arc<KeyboardLayout> {
        Arc::new(KeyboardLayout::load_with_user_dir(None, "qwerty").unwrap())
    }

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn test_plain_terminal_emits_press_and_release() {
        let mut keys = KeyTranslator::new(layout(), false);
        assert_eq!(
            keys.translate(&press(KeyCode::Char('r'))),
            vec![KeyDown(KeyId::KeyR), KeyUp(KeyId::KeyR)]
        );
        assert_eq!(
            keys.translate(&press(KeyCode::Enter)),
            vec![KeyDown(KeyId::Enter), KeyUp(KeyId::Enter)]
        );
    }

    #[test]
    fn test_plain_terminal_synthesizes_opposite_shift() {
        let mut keys = KeyTranslator::new(layout(), false);
        let capital_t = key(KeyCode::Char('T'), KeyModifiers::SHIFT, KeyEventKind::Press);
        assert_eq!(
            keys.translate(&capital_t),
            vec![
                KeyDown(KeyId::ShiftRight),
                KeyDown(KeyId::KeyT),
                KeyUp(KeyId::KeyT),
                KeyUp(KeyId::ShiftRight),
            ]
        );
        // '?' is shifted even without the modifier flag; right-hand key, left shift.
        assert_eq!(
            keys.translate(&press(KeyCode::Char('?')))[..2],
            [KeyDown(KeyId::ShiftLeft), KeyDown(KeyId::Slash)]
        );
    }

    #[test]
    fn test_release_reporting_holds_synthetic_shift() {
        let mut keys = KeyTranslator::new(layout(), true);
        let down = key(KeyCode::Char('T'), KeyModifiers::SHIFT, KeyEventKind::Press);
        let up = key(KeyCode::Char('T'), KeyModifiers::SHIFT, KeyEventKind::Release);
        assert_eq!(keys.translate(&down), vec![KeyDown(KeyId::ShiftRight), KeyDown(KeyId::KeyT)]);
        assert_eq!(keys.translate(&up), vec![KeyUp(KeyId::KeyT), KeyUp(KeyId::ShiftRight)]);
    }

    #[test]
    fn test_modifier_events_switch_off_synthesis() {
        let mut keys = KeyTranslator::new(layout(), true);
        let shift = KeyCode::Modifier(ModifierKeyCode::LeftShift);
        assert_eq!(keys.translate(&press(shift)), vec![KeyDown(KeyId::ShiftLeft)]);
        let capital_t = key(KeyCode::Char('T'), KeyModifiers::SHIFT, KeyEventKind::Press);
        assert_eq!(keys.translate(&capital_t), vec![KeyDown(KeyId::KeyT)]);
        let release = key(shift, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(keys.translate(&release), vec![KeyUp(KeyId::ShiftLeft)]);
    }

    #[test]
    fn test_repeats_and_unmapped_codes_are_dropped() {
        let mut keys = KeyTranslator::new(layout(), true);
        let repeat = key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(keys.translate(&repeat).is_empty());
        assert!(keys.translate(&press(KeyCode::F(5))).is_empty());
        assert!(keys.translate(&press(KeyCode::Char('ñ'))).is_empty());
    }
}
