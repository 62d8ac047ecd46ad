use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use keyguide::keyboard::display::key_cap_label;
use keyguide::keyboard::{KeyId, KeyboardLayout};
use keyguide::navigation::{
    FingerState, KeyScene, NavigationRole, PressResult, ViewModel, Visibility,
};

use crate::ui::theme::{Theme, ThemeColors};

/// The physical board with finger hints from a [`ViewModel`].
pub struct KeyboardDiagram<'a> {
    layout: &'a KeyboardLayout,
    view: &'a ViewModel,
    theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(layout: &'a KeyboardLayout, view: &'a ViewModel, theme: &'a Theme) -> Self {
        Self {
            layout,
            view,
            theme,
        }
    }

    fn key_style(&self, key: KeyId, colors: &ThemeColors) -> Style {
        let base = Style::default().bg(colors.bg());
        if let Some(scene) = self.view.key(key) {
            return scene_style(scene, base, colors);
        }
        let state = self
            .layout
            .finger_for_key(key)
            .and_then(|finger| self.view.finger_state(finger));
        match state {
            Some(FingerState::Inactive) => base.fg(colors.finger_inactive()),
            Some(FingerState::Incorrect) => base.fg(colors.key_incorrect()),
            _ => base.fg(colors.key_idle()),
        }
    }
}

fn scene_style(scene: &KeyScene, base: Style, colors: &ThemeColors) -> Style {
    if scene.visibility == Visibility::Hidden {
        return base.fg(colors.finger_inactive());
    }
    let style = match scene.role {
        NavigationRole::Target => base
            .fg(colors.bg())
            .bg(colors.key_target())
            .add_modifier(Modifier::BOLD),
        NavigationRole::Path => base.fg(colors.key_path()).add_modifier(Modifier::BOLD),
        NavigationRole::None => base.fg(colors.fg()),
    };
    match scene.press {
        PressResult::Incorrect => style.fg(colors.bg()).bg(colors.key_incorrect()),
        PressResult::Correct => style.fg(colors.bg()).bg(colors.key_correct()),
        PressResult::Neutral => style,
    }
}

/// Text for one key cell `width` columns wide: the label, cut to fit, with
/// the arrow glyph in the last column when there is one.
fn cell_text(label: &str, arrow: Option<char>, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let room = if arrow.is_some() { width - 1 } else { width };
    let label: String = label.chars().take(room).collect();
    let mut text = format!("{label:^room$}");
    if let Some(arrow) = arrow {
        text.push(arrow);
    }
    text
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.layout.name()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = self.layout.rows();
        let widest = rows.iter().map(Vec::len).max().unwrap_or(0) as u16;
        if widest == 0 || inner.height == 0 {
            return;
        }
        // One column of spacing between keys.
        let key_width = (inner.width / widest).min(6);
        if key_width < 3 {
            return;
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let y = inner.y + row_idx as u16;
            if y >= inner.y + inner.height {
                break;
            }
            for (col_idx, cell) in row.iter().enumerate() {
                let Some(key) = *cell else {
                    continue;
                };
                let x = inner.x + col_idx as u16 * key_width;
                if x + key_width > inner.x + inner.width {
                    break;
                }
                let label = key_cap_label(key, self.layout);
                let arrow = self.view.key(key).and_then(|scene| scene.arrow.glyph());
                let text = cell_text(&label, arrow, key_width as usize - 1);
                buf.set_string(x, y, &text, self.key_style(key, colors));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Instant;

    use super::*;
    use keyguide::navigation::derive_view_model;
    use keyguide::session::lesson::{Attempt, TargetSymbol};
    use keyguide::session::progression::{Phase, ProgressionSnapshot};

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text("F", None, 5), "  F  ");
        assert_eq!(cell_text("F", Some('↑'), 5), " F  ↑");
        assert_eq!(cell_text("Bksp", Some('→'), 3), "Bk→");
        assert_eq!(cell_text("Q", None, 0), "");
    }

    #[test]
    fn test_renders_target_and_arrow() {
        let layout = KeyboardLayout::load_with_user_dir(None, "qwerty").unwrap();
        let target = TargetSymbol::resolve('r', &layout);
        let now = Instant::now();
        let miss = Attempt::evaluate(&target, BTreeSet::from([KeyId::KeyG]), now, now, true);
        let snapshot = ProgressionSnapshot {
            phase: Phase::AwaitingInput,
            cursor: 0,
            length: 1,
            last_attempt: Some(miss),
            target: Some(target),
        };
        let view = derive_view_model(&snapshot, &layout);
        let theme = Theme::default();

        let area = Rect::new(0, 0, 90, 7);
        let mut buf = Buffer::empty(area);
        KeyboardDiagram::new(&layout, &view, &theme).render(area, &mut buf);

        let home_row: String = (0..90).map(|x| buf[(x, 3)].symbol().to_string()).collect();
        assert!(home_row.contains('↑'), "{home_row}");

        let colors = &theme.colors;
        let diagram = KeyboardDiagram::new(&layout, &view, &theme);
        let target_style = diagram.key_style(KeyId::KeyR, colors);
        assert_eq!(target_style.bg, Some(colors.key_target()));
        let wrong_style = diagram.key_style(KeyId::KeyG, colors);
        assert_eq!(wrong_style.bg, Some(colors.key_incorrect()));
        let inactive = diagram.key_style(KeyId::KeyJ, colors);
        assert_eq!(inactive.fg, Some(colors.finger_inactive()));
    }
}
