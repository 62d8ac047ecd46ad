use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Symbols typed out of the lesson length, as a filled bar.
pub struct ProgressBar<'a> {
    done: usize,
    total: usize,
    paused: bool,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(done: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            done: done.min(total),
            total,
            paused: false,
            theme,
        }
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.done as f64 / self.total as f64
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = if self.paused { " Progress (paused) " } else { " Progress " };

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let fill = if self.paused { colors.warning() } else { colors.bar_filled() };
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = format!("{}/{}", self.done, self.total);
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new(3, 12, &theme).ratio(), 0.25);
        assert_eq!(ProgressBar::new(20, 12, &theme).ratio(), 1.0);
        assert_eq!(ProgressBar::new(0, 0, &theme).ratio(), 1.0);
    }

    #[test]
    fn test_renders_count() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new(3, 12, &theme).render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("3/12"));
    }
}
