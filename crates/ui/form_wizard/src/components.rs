//! Render helpers shared by the pages.
//!
//! - `field`    : one control per form field (label, value, committed error)
//! - `progress` : "Section n of m" gauge and the step markers

use ratatui::layout::{Constraint, Flex, Layout, Rect};

pub mod field;
pub mod progress;

/// A `width` x `height` rectangle centered in `area` (clamped to it).
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        let r = centered_rect(area, 10, 4);
        assert_eq!((r.x, r.y, r.width, r.height), (5, 3, 10, 4));
        assert_eq!(centered_rect(area, 50, 50), area);
    }
}
