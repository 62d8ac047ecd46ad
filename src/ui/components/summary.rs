use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use keyguide::session::result::LessonSummary;

use crate::ui::theme::Theme;

/// Completion screen: speed, accuracy and the slowest symbols.
pub struct SummaryView<'a> {
    summary: &'a LessonSummary,
    theme: &'a Theme,
}

impl<'a> SummaryView<'a> {
    pub fn new(summary: &'a LessonSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

/// Up to `n` symbols that took longest, slowest first.
fn slowest(summary: &LessonSummary, n: usize) -> Vec<(char, f64)> {
    let mut times: Vec<(char, f64)> = summary
        .per_symbol
        .iter()
        .filter(|t| !t.symbol.is_whitespace())
        .map(|t| (t.symbol, t.time_ms))
        .collect();
    times.sort_by(|a, b| b.1.total_cmp(&a.1));
    times.truncate(n);
    times
}

impl Widget for SummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.summary;
        let label = Style::default().fg(colors.text_pending());
        let value = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled(
                "Lesson complete",
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("Speed     ", label),
                Span::styled(format!("{:.0} wpm ({:.0} cpm)", s.wpm, s.cpm), value),
            ]),
            Line::from(vec![
                Span::styled("Accuracy  ", label),
                Span::styled(format!("{:.1}%", s.accuracy), value),
            ]),
            Line::from(vec![
                Span::styled("Symbols   ", label),
                Span::styled(
                    format!(
                        "{} typed, {} first try, {} misses",
                        s.total_symbols, s.correct, s.incorrect
                    ),
                    value,
                ),
            ]),
            Line::from(vec![
                Span::styled("Time      ", label),
                Span::styled(format!("{:.1}s", s.elapsed_secs), value),
            ]),
        ];

        let slow = slowest(s, 5);
        if !slow.is_empty() {
            let text = slow
                .iter()
                .map(|(ch, ms)| format!("{ch} {ms:.0}ms"))
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(Line::from(vec![
                Span::styled("Slowest   ", label),
                Span::styled(text, Style::default().fg(colors.warning())),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("[r] new lesson  [q] quit", label)));

        let block = Block::bordered()
            .title(" Result ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
