use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows needed for the keyboard diagram: five key rows plus the border.
pub const KEYBOARD_HEIGHT: u16 = 7;

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub keyboard: Option<Rect>,
    pub progress: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, show_keyboard: bool) -> Self {
        let show_keyboard = show_keyboard && area.height >= 20 && area.width >= 60;
        let show_progress = area.height >= 16;

        let mut constraints = vec![Constraint::Length(3), Constraint::Min(4)];
        if show_keyboard {
            constraints.push(Constraint::Length(KEYBOARD_HEIGHT));
        }
        if show_progress {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut next = 2;
        let keyboard = show_keyboard.then(|| {
            next += 1;
            chunks[next - 1]
        });
        let progress = show_progress.then(|| {
            next += 1;
            chunks[next - 1]
        });

        Self {
            header: chunks[0],
            main: chunks[1],
            keyboard,
            progress,
            footer: chunks[next],
        }
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 10;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_layout() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30), true);
        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.keyboard.unwrap().height, KEYBOARD_HEIGHT);
        assert_eq!(layout.progress.unwrap().height, 3);
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.footer.y, 29);
    }

    #[test]
    fn test_small_terminal_drops_keyboard() {
        let layout = AppLayout::new(Rect::new(0, 0, 50, 30), true);
        assert!(layout.keyboard.is_none());
        let layout = AppLayout::new(Rect::new(0, 0, 100, 12), true);
        assert!(layout.keyboard.is_none());
        assert!(layout.progress.is_none());
        assert_eq!(layout.footer.y, 11);
    }

    #[test]
    fn test_keyboard_can_be_turned_off() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30), false);
        assert!(layout.keyboard.is_none());
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 30, 8);
        assert_eq!(centered_rect(50, 50, area), area);
    }
}
