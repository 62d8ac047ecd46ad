use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use keyguide::keyboard::display::symbol_glyph;
use keyguide::session::lesson::{Stream, StreamSymbol};

use crate::ui::theme::Theme;

/// The lesson text with the cursor, typed symbols colored by whether they
/// needed more than one attempt.
pub struct TypingArea<'a> {
    stream: &'a Stream,
    cursor: usize,
    paused: bool,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(stream: &'a Stream, cursor: usize, theme: &'a Theme) -> Self {
        Self {
            stream,
            cursor,
            paused: false,
            theme,
        }
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SymbolStatus {
    Clean,
    Corrected,
    Current { missed: bool },
    Pending,
}

fn status(symbol: &StreamSymbol, idx: usize, cursor: usize) -> SymbolStatus {
    if idx < cursor {
        if symbol.first_try() {
            SymbolStatus::Clean
        } else {
            SymbolStatus::Corrected
        }
    } else if idx == cursor {
        SymbolStatus::Current {
            missed: symbol.error_count() > 0,
        }
    } else {
        SymbolStatus::Pending
    }
}

struct RenderToken {
    symbol_idx: usize,
    display: String,
    is_line_break: bool,
}

/// One token per symbol. Tabs pad to the next multiple of four columns and
/// newlines end the line after their marker.
fn build_render_tokens(symbols: &[char]) -> Vec<RenderToken> {
    let mut tokens = Vec::with_capacity(symbols.len());
    let mut col = 0usize;

    for (i, &ch) in symbols.iter().enumerate() {
        let (display, is_line_break) = match ch {
            '\n' => {
                col = 0;
                (symbol_glyph(ch).to_string(), true)
            }
            '\t' => {
                let tab_width = 4 - (col % 4);
                col += tab_width;
                let mut display = symbol_glyph(ch).to_string();
                display.extend(std::iter::repeat_n('\u{00b7}', tab_width - 1));
                (display, false)
            }
            _ => {
                col += 1;
                (ch.to_string(), false)
            }
        };
        tokens.push(RenderToken {
            symbol_idx: i,
            display,
            is_line_break,
        });
    }

    tokens
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let chars: Vec<char> = self.stream.symbols().iter().map(|s| s.target.symbol).collect();
        let tokens = build_render_tokens(&chars);

        let mut lines: Vec<Vec<Span>> = vec![Vec::new()];
        for token in &tokens {
            let idx = token.symbol_idx;
            let style = match status(&self.stream.symbols()[idx], idx, self.cursor) {
                SymbolStatus::Clean => Style::default().fg(colors.text_correct()),
                SymbolStatus::Corrected => Style::default()
                    .fg(colors.text_incorrect())
                    .bg(colors.text_incorrect_bg())
                    .add_modifier(Modifier::UNDERLINED),
                SymbolStatus::Current { missed: false } => Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_cursor_bg()),
                SymbolStatus::Current { missed: true } => Style::default()
                    .fg(colors.text_cursor_fg())
                    .bg(colors.text_incorrect()),
                SymbolStatus::Pending => Style::default().fg(colors.text_pending()),
            };

            if let Some(line) = lines.last_mut() {
                line.push(Span::styled(token.display.clone(), style));
            }
            if token.is_line_break {
                lines.push(Vec::new());
            }
        }

        let ratatui_lines: Vec<Line> = lines.into_iter().map(Line::from).collect();

        let mut block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        if self.paused {
            block = block.title(" Paused: Esc to resume ");
        }

        Paragraph::new(ratatui_lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
