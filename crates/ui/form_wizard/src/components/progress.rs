use forms::{Progress, StepStatus};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Gauge,
};

use crate::style::{Role, Theme};

/// Step markers, one per section: `● ● ◉ ○`.
pub fn step_line(progress: Progress, theme: &Theme) -> Line<'static> {
    let spans: Vec<Span> = progress
        .steps()
        .enumerate()
        .flat_map(|(i, step)| {
            let (mark, role) = match step {
                StepStatus::Completed => ("●", Role::Success),
                StepStatus::Current => ("◉", Role::Primary),
                StepStatus::Upcoming => ("○", Role::Muted),
            };
            let sep = (i > 0).then(|| Span::raw(" "));
            sep.into_iter().chain([Span::styled(mark, theme.style(role))])
        })
        .collect();
    Line::from(spans)
}

/// Two rows: the gauge with "Section n of m", then the step markers.
pub fn render_progress(frame: &mut Frame, area: Rect, progress: Progress, theme: &Theme) {
    let [gauge_area, steps_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);
    let gauge = Gauge::default()
        .gauge_style(theme.style_on(Role::Primary, Role::Background))
        .ratio(progress.fraction())
        .label(Span::styled(progress.label(), theme.bold(Role::Text)));
    frame.render_widget(gauge, gauge_area);
    frame.render_widget(step_line(progress, theme), steps_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::default_dark_theme;

    #[test]
    fn one_marker_per_section() {
        let line = step_line(Progress::new(1, 3), &default_dark_theme());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "● ◉ ○");
    }
}
