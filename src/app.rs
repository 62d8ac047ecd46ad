use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use keyguide::config::Config;
use keyguide::generator::{TextGenerator, WordLesson};
use keyguide::keyboard::KeyboardLayout;
use keyguide::keyboard::layout::{DEFAULT_LAYOUT, LayoutError};
use keyguide::navigation::{ViewModel, derive_view_model};
use keyguide::session::input::{InputEvent, InputMachine, InputState};
use keyguide::session::lesson::Stream;
use keyguide::session::progression::{
    LessonSignal, Phase, ProgressionEvent, ProgressionMachine, Transition,
};
use keyguide::session::result::LessonSummary;

use crate::event::KeyTranslator;
use crate::ui::theme::Theme;

/// Share of generated words that start with a capital.
const CAPITAL_CHANCE: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Lesson,
    Complete,
    Error,
}

/// Owns the three engine pieces and wires them: terminal keys go through the
/// input machine, recognized chords into the progression machine, and every
/// progression change rebuilds the view model.
pub struct App {
    pub config: Config,
    pub layout: Arc<KeyboardLayout>,
    pub theme: Theme,
    pub screen: AppScreen,
    pub input: InputMachine,
    pub lesson: Option<ProgressionMachine>,
    pub view: ViewModel,
    pub summary: Option<LessonSummary>,
    pub error: Option<String>,
    pub keys: KeyTranslator,
    pub last_key_time: Option<Instant>,
    pub should_quit: bool,
    /// The terminal sends key releases, so held keys never need clearing.
    reports_releases: bool,
    custom_text: Option<String>,
    generator: WordLesson,
    signals: Receiver<LessonSignal>,
    signal_tx: Sender<LessonSignal>,
}

impl App {
    pub fn new(
        config: Config,
        custom_text: Option<String>,
        seed: Option<u64>,
        reports_releases: bool,
    ) -> Result<Self> {
        let layout = Arc::new(load_layout(&config.keyboard_layout)?);
        let theme =
            Theme::load(Some(Config::config_dir().as_path()), &config.theme).unwrap_or_default();
        let generator = match seed {
            Some(seed) => WordLesson::seeded(seed),
            None => WordLesson::new(),
        }
        .with_capitals(CAPITAL_CHANCE);
        let (signal_tx, signals) = mpsc::channel();

        let mut app = Self {
            keys: KeyTranslator::new(Arc::clone(&layout), reports_releases),
            config,
            layout,
            theme,
            screen: AppScreen::Lesson,
            input: InputMachine::new(),
            lesson: None,
            view: ViewModel::idle(),
            summary: None,
            error: None,
            last_key_time: None,
            should_quit: false,
            reports_releases,
            custom_text,
            generator,
            signals,
            signal_tx,
        };
        app.start_lesson();
        Ok(app)
    }

    /// Start over with the custom text, or freshly generated words.
    pub fn start_lesson(&mut self) {
        let text = match &self.custom_text {
            Some(text) => text.clone(),
            None => self.generator.generate(&self.layout, self.config.word_count),
        };
        let stream = Stream::from_text(&text, &self.layout);
        self.input.handle(InputEvent::Reset);
        self.summary = None;
        self.error = None;

        match ProgressionMachine::new(stream, Arc::clone(&self.layout), self.signal_tx.clone()) {
            Ok(machine) => {
                info!(
                    symbols = machine.stream().len(),
                    layout = self.layout.name(),
                    "lesson started"
                );
                self.lesson = Some(machine.with_strict_shift(self.config.strict_shift_side));
                self.screen = AppScreen::Lesson;
            }
            Err(err) => {
                warn!(%err, "lesson cannot start");
                self.lesson = None;
                self.error = Some(err.to_string());
                self.screen = AppScreen::Error;
            }
        }
        self.drain_signals();
        self.refresh_view();
    }

    pub fn is_paused(&self) -> bool {
        self.lesson.as_ref().is_some_and(|l| l.phase() == Phase::Paused)
    }

    /// Feed raw key events through recognition into the lesson.
    pub fn handle_input(&mut self, events: Vec<InputEvent>) {
        if events.is_empty() {
            return;
        }
        self.last_key_time = Some(Instant::now());
        let mut changed = false;
        for event in events {
            let Some(chord) = self.input.handle(event) else {
                continue;
            };
            if let Some(lesson) = self.lesson.as_mut() {
                let transition = lesson.handle(ProgressionEvent::Chord(chord));
                changed |= transition != Transition::Ignored;
            }
        }
        if changed {
            self.drain_signals();
            self.refresh_view();
        }
    }

    pub fn toggle_pause(&mut self) {
        let Some(lesson) = self.lesson.as_mut() else {
            return;
        };
        let event = if lesson.phase() == Phase::Paused {
            ProgressionEvent::Resume
        } else {
            ProgressionEvent::Pause
        };
        if lesson.handle(event) != Transition::Ignored {
            // Keys held across a pause would otherwise leak into the next chord.
            self.input.handle(InputEvent::Reset);
            self.drain_signals();
            self.refresh_view();
        }
    }

    /// Clear held keys when the terminal never reports their release.
    pub fn tick(&mut self, now: Instant) {
        if self.reports_releases {
            return;
        }
        let fallback = Duration::from_millis(self.config.release_fallback_ms);
        if let Some(last) = self.last_key_time {
            if now.saturating_duration_since(last) > fallback
                && self.input.state() == InputState::Listening
            {
                debug!(held = ?self.input.pressed(), "release fallback reset");
                self.input.handle(InputEvent::Reset);
                self.last_key_time = None;
            }
        }
    }

    fn drain_signals(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            match signal {
                LessonSignal::Completed(summary) => {
                    self.summary = Some(summary);
                    self.screen = AppScreen::Complete;
                }
                LessonSignal::Paused | LessonSignal::Resumed => {}
            }
        }
    }

    fn refresh_view(&mut self) {
        self.view = match (&self.lesson, self.config.show_navigation) {
            (Some(lesson), true) => derive_view_model(&lesson.snapshot(), &self.layout),
            _ => ViewModel::idle(),
        };
    }
}

/// The configured layout, or the default one when the configured name does
/// not exist.
fn load_layout(name: &str) -> Result<KeyboardLayout> {
    match KeyboardLayout::load(name) {
        Ok(layout) => Ok(layout),
        Err(LayoutError::LayoutNotFound(_)) if name != DEFAULT_LAYOUT => {
            warn!(layout = name, "unknown layout, using {DEFAULT_LAYOUT}");
            Ok(KeyboardLayout::load(DEFAULT_LAYOUT)?)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyguide::keyboard::KeyId;
    use keyguide::navigation::FingerState;

    fn app(text: &str) -> App {
        let config = Config {
            keyboard_layout: "qwerty".to_string(),
            ..Config::default()
        };
        App::new(config, Some(text.to_string()), Some(1), false).unwrap()
    }

    fn tap(app: &mut App, key: KeyId) {
        app.handle_input(vec![InputEvent::KeyDown(key), InputEvent::KeyUp(key)]);
    }

    #[test]
    fn test_typing_through_a_lesson() {
        let mut app = app("ab");
        assert_eq!(app.screen, AppScreen::Lesson);
        tap(&mut app, KeyId::KeyA);
        tap(&mut app, KeyId::KeyB);
        assert_eq!(app.screen, AppScreen::Complete);
        let summary = app.summary.as_ref().unwrap();
        assert_eq!(summary.total_symbols, 2);
        assert!(app.view.is_idle());
    }

    #[test]
    fn test_unmapped_text_shows_error() {
        let app = app("añ");
        assert_eq!(app.screen, AppScreen::Error);
        assert!(app.lesson.is_none());
        assert!(app.error.as_ref().unwrap().contains('ñ'));
    }

    #[test]
    fn test_pause_drops_typing() {
        let mut app = app("a");
        app.toggle_pause();
        assert!(app.is_paused());
        tap(&mut app, KeyId::KeyA);
        assert_eq!(app.lesson.as_ref().unwrap().cursor(), 0);
        app.toggle_pause();
        assert!(!app.is_paused());
        tap(&mut app, KeyId::KeyA);
        assert_eq!(app.screen, AppScreen::Complete);
    }

    #[test]
    fn test_view_tracks_target() {
        let mut app = app("r");
        let l2 = "L2".parse().unwrap();
        assert_eq!(app.view.finger_state(l2), Some(FingerState::Active));
        tap(&mut app, KeyId::KeyJ);
        let r2 = "R2".parse().unwrap();
        assert_eq!(app.view.finger_state(r2), Some(FingerState::Incorrect));
    }

    #[test]
    fn test_navigation_can_be_hidden() {
        let config = Config {
            show_navigation: false,
            ..Config::default()
        };
        let app = App::new(config, Some("r".to_string()), None, false).unwrap();
        assert!(app.view.is_idle());
    }

    #[test]
    fn test_release_fallback_resets_held_keys() {
        let mut app = app("ab");
        app.handle_input(vec![InputEvent::KeyDown(KeyId::ShiftLeft)]);
        assert_eq!(app.input.state(), InputState::Listening);
        let later = Instant::now() + Duration::from_millis(app.config.release_fallback_ms + 50);
        app.tick(later);
        assert_eq!(app.input.state(), InputState::Idle);
    }

    #[test]
    fn test_release_fallback_waits_for_real_releases() {
        let config = Config {
            keyboard_layout: "qwerty".to_string(),
            ..Config::default()
        };
        let mut app = App::new(config, Some("T".to_string()), Some(1), true).unwrap();
        app.handle_input(vec![InputEvent::KeyDown(KeyId::ShiftRight)]);
        let later = Instant::now() + Duration::from_millis(app.config.release_fallback_ms + 50);
        app.tick(later);
        assert!(app.input.is_held(KeyId::ShiftRight));

        app.handle_input(vec![InputEvent::KeyDown(KeyId::KeyT)]);
        assert_eq!(app.screen, AppScreen::Complete);
    }

    #[test]
    fn test_generated_lessons_start() {
        let config = Config {
            word_count: 5,
            ..Config::default()
        };
        let mut app = App::new(config, None, Some(9), false).unwrap();
        assert_eq!(app.screen, AppScreen::Lesson);
        let words = app.lesson.as_ref().unwrap().stream().text();
        assert_eq!(words.split(' ').count(), 5);
        app.start_lesson();
        assert_eq!(app.screen, AppScreen::Lesson);
    }

    #[test]
    fn test_unknown_layout_falls_back() {
        let layout = load_layout("no-such-layout").unwrap();
        assert_eq!(layout.name(), DEFAULT_LAYOUT);
    }
}
