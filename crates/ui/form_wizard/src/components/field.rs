//! One control per field.
//!
//! The control is drawn as plain lines so the form page can scroll a whole
//! section as one paragraph:
//!
//! ```text
//! Email *                          <- label, `*` when required
//!   ada@example                    <- value line (editor, choice, flag)
//!   Please enter a valid email     <- committed error, if any
//! ```

use forms::{Field, FieldKind, FieldOption, FieldValue};
use ratatui::{
    style::Modifier,
    text::{Line, Span},
};
use tui_input::Input;

use crate::style::{Role, Theme};

/// Columns before the value on the value line.
pub const VALUE_INDENT: u16 = 2;

pub const SELECT_PLACEHOLDER: &str = "Select an option";

/// Everything needed to draw one field.
pub struct FieldControl<'a> {
    pub field: &'a Field,
    pub value: FieldValue,
    /// The live editor, only for the focused text-like field.
    pub input: Option<&'a Input>,
    pub error: Option<&'a str>,
    pub focused: bool,
}

impl FieldControl<'_> {
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = vec![self.label_line(theme), self.value_line(theme)];
        if let Some(err) = self.error {
            lines.push(Line::from(vec![
                indent(),
                Span::styled(err.to_string(), theme.style(Role::Danger)),
            ]));
        }
        lines
    }

    fn label_line(&self, theme: &Theme) -> Line<'static> {
        let style = if self.focused {
            theme.bold(Role::Primary)
        } else {
            theme.bold(Role::Text)
        };
        let mut spans = vec![Span::styled(self.field.label.clone(), style)];
        if self.field.required {
            spans.push(Span::styled(" *", theme.style(Role::Danger)));
        }
        Line::from(spans)
    }

    fn value_line(&self, theme: &Theme) -> Line<'static> {
        let focus_style = |style: ratatui::style::Style| {
            if self.focused {
                style.add_modifier(Modifier::UNDERLINED)
            } else {
                style
            }
        };

        let body = match &self.field.kind {
            kind if kind.is_textual() => {
                let text = self
                    .input
                    .map(|i| i.value().to_string())
                    .unwrap_or_else(|| self.value.as_text().unwrap_or_default().to_string());
                if text.is_empty() && self.input.is_none() {
                    let hint = placeholder(self.field).unwrap_or_default();
                    Span::styled(hint, theme.style(Role::Muted))
                } else {
                    Span::styled(text, focus_style(theme.style(Role::Text)))
                }
            }
            FieldKind::Radio { options } => {
                return Line::from(
                    std::iter::once(indent())
                        .chain(radio_spans(options, self.value.as_text(), theme, self.focused))
                        .collect::<Vec<_>>(),
                );
            }
            FieldKind::Unsupported { .. } => {
                Span::styled(display_value(self.field, &self.value), theme.style(Role::Danger))
            }
            _ => Span::styled(
                display_value(self.field, &self.value),
                focus_style(theme.style(Role::Accent)),
            ),
        };
        Line::from(vec![indent(), body])
    }
}

fn indent() -> Span<'static> {
    Span::raw(" ".repeat(VALUE_INDENT as usize))
}

fn placeholder(field: &Field) -> Option<String> {
    field.placeholder.clone().or_else(|| match field.kind {
        FieldKind::Date => Some("YYYY-MM-DD".into()),
        _ => None,
    })
}

fn radio_spans(
    options: &[FieldOption],
    selected: Option<&str>,
    theme: &Theme,
    focused: bool,
) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(options.len() * 2);
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let on = selected == Some(option.value.as_str());
        let mark = if on { "(•)" } else { "( )" };
        let style = match (on, focused) {
            (true, true) => theme.bold(Role::Primary),
            (true, false) => theme.style(Role::Accent),
            (false, _) => theme.style(Role::SubtleText),
        };
        spans.push(Span::styled(format!("{mark} {}", option.label), style));
    }
    spans
}

/// Plain-text rendering of a field's value.
pub fn display_value(field: &Field, value: &FieldValue) -> String {
    match &field.kind {
        FieldKind::Dropdown { options } => {
            let label = value
                .as_text()
                .and_then(|v| options.iter().find(|o| o.value == v))
                .map(|o| o.label.clone())
                .or_else(|| field.placeholder.clone())
                .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string());
            format!("◀ {label} ▶")
        }
        FieldKind::Radio { options } => options
            .iter()
            .map(|o| {
                let on = value.as_text() == Some(o.value.as_str());
                format!("{} {}", if on { "(•)" } else { "( )" }, o.label)
            })
            .collect::<Vec<_>>()
            .join("  "),
        FieldKind::Checkbox => {
            if value.as_flag().unwrap_or(false) {
                "[x]".into()
            } else {
                "[ ]".into()
            }
        }
        FieldKind::Unsupported { type_name } => format!("Unsupported field type: {type_name}"),
        _ => match value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Many(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
            FieldValue::Flag(b) => b.to_string(),
        },
    }
}

/// The option after (or before) `current`, wrapping around. With nothing
/// selected yet, forward picks the first option and backward the last.
pub fn cycle_option(options: &[FieldOption], current: Option<&str>, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let next = match current.and_then(|c| options.iter().position(|o| o.value == c)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(options[next].value.clone())
}
