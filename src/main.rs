mod app;
mod event;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing::{error, info};

use keyguide::config::Config;
use keyguide::keyboard::KeyboardLayout;
use keyguide::keyboard::display::symbol_display_name;
use keyguide::trace_init::init_tracing;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::keyboard_diagram::KeyboardDiagram;
use ui::components::progress_bar::ProgressBar;
use ui::components::summary::SummaryView;
use ui::components::typing_area::TypingArea;
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(name = "keyguide", version, about = "Typing trainer with finger navigation hints")]
struct Cli {
    #[arg(short, long, help = "Keyboard layout (qwerty, dvorak, colemak, or a user layout)")]
    layout: Option<String>,

    #[arg(short, long, help = "Number of words per generated lesson")]
    words: Option<usize>,

    #[arg(long, help = "Practice this text instead of generated words")]
    text: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for repeatable generated lessons")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }
    if let Some(words) = cli.words {
        config.word_count = words;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    let config_dir = Config::config_dir();
    config.normalize_layout(&KeyboardLayout::available_layouts(Some(config_dir.as_path())));

    let _log_guard = init_tracing(&Config::data_dir(), &config.log_filter).ok();
    info!(layout = %config.keyboard_layout, "starting");

    // Release events and bare modifier presses need the kitty keyboard protocol.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    let mut app = App::new(config, cli.text, cli.seed, keyboard_enhanced)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if keyboard_enhanced {
        let _ = execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        );
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(?err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('c')
    {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Lesson => {
            if key.code == KeyCode::Esc {
                if key.kind == KeyEventKind::Press {
                    app.toggle_pause();
                }
                return;
            }
            let input = app.keys.translate(&key);
            app.handle_input(input);
        }
        AppScreen::Complete | AppScreen::Error => {
            if key.kind != KeyEventKind::Press {
                return;
            }
            match key.code {
                KeyCode::Char('r') => app.start_lesson(),
                KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                _ => {}
            }
        }
    }
}

fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area, app.config.show_navigation);
    frame.render_widget(header(app), layout.header);

    if let Some(lesson) = &app.lesson {
        let typing =
            TypingArea::new(lesson.stream(), lesson.cursor(), &app.theme).paused(app.is_paused());
        frame.render_widget(typing, layout.main);
        if let Some(progress) = layout.progress {
            let bar = ProgressBar::new(lesson.cursor(), lesson.stream().len(), &app.theme)
                .paused(app.is_paused());
            frame.render_widget(bar, progress);
        }
    }
    if let Some(keyboard) = layout.keyboard {
        frame.render_widget(KeyboardDiagram::new(&app.layout, &app.view, &app.theme), keyboard);
    }

    let hint = match app.screen {
        AppScreen::Lesson => "  [Esc] pause/resume  [Ctrl+C] quit",
        AppScreen::Complete | AppScreen::Error => "  [r] new lesson  [q] quit",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(colors.text_pending())))),
        layout.footer,
    );

    match app.screen {
        AppScreen::Complete => {
            if let Some(summary) = &app.summary {
                let popup = centered_rect(50, 50, area);
                frame.render_widget(Clear, popup);
                frame.render_widget(SummaryView::new(summary, &app.theme), popup);
            }
        }
        AppScreen::Error => {
            let popup = centered_rect(60, 30, area);
            let message = app.error.as_deref().unwrap_or("lesson cannot start");
            let text = vec![
                Line::from(Span::styled(
                    "Cannot proceed",
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                )),
                Line::default(),
                Line::from(message.to_string()),
                Line::default(),
                Line::from(format!("Layout: {}", app.layout.name())),
            ];
            let block = Block::bordered()
                .title(" Error ")
                .border_style(Style::default().fg(colors.error()))
                .style(Style::default().bg(colors.bg()));
            frame.render_widget(Clear, popup);
            frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup);
        }
        AppScreen::Lesson => {}
    }
}

fn header(app: &App) -> Paragraph<'_> {
    let colors = &app.theme.colors;
    let mut spans = vec![Span::styled(
        " keyguide ",
        Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
    )];
    if let Some(target) = app.lesson.as_ref().and_then(|l| l.current_target()) {
        let ch = target.symbol.symbol;
        let name = match symbol_display_name(ch) {
            "" => ch.to_string(),
            name => name.to_string(),
        };
        spans.push(Span::styled(
            format!(" next: {name} "),
            Style::default().fg(colors.fg()),
        ));
        if let Some(finger) = target.finger {
            spans.push(Span::styled(
                format!(" finger: {finger} "),
                Style::default().fg(colors.text_pending()),
            ));
        }
        if target.needs_shift {
            spans.push(Span::styled(" +shift ", Style::default().fg(colors.warning())));
        }
    }
    Paragraph::new(Line::from(spans)).block(
        Block::bordered().border_style(Style::default().fg(colors.border())),
    )
}
