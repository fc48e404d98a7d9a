//! The form page: loading view, error view with a way back to login, and the
//! active section with one control per field.
//!
//! All state changes go through `forms::reduce`; the page only turns keys
//! into intents and carries out the returned effects.

use std::collections::HashMap;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use forms::{Effect, Field, FieldKind, FieldValue, FormState, Identity, Intent, LoadStatus, Phase};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use tracing::{error, info};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler as _;

use super::Page;
use crate::{
    action::Action,
    components::{
        centered_rect,
        field::{FieldControl, VALUE_INDENT, cycle_option},
        progress::render_progress,
    },
    executor::misconfigured,
    style::{Role, Theme},
    tui::{Event, EventResponse},
};

pub const SUBMITTED_NOTICE: &str = "Form submitted successfully!";

pub struct FormPage {
    theme: Theme,
    identity: Option<Identity>,
    state: FormState,
    /// Index of the focused field within the active section.
    focus: usize,
    /// Editors for the text-like fields of the active section.
    inputs: HashMap<String, Input>,
    scroll: u16,
    notice: Option<String>,
}

impl FormPage {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            identity: None,
            state: FormState::loading(),
            focus: 0,
            inputs: HashMap::new(),
            scroll: 0,
            notice: None,
        }
    }

    /// Start over for `identity`; the loading view shows until the form
    /// arrives.
    pub fn begin(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.state = FormState::loading();
        self.notice = None;
        self.reset_viewport();
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn fields(&self) -> &[Field] {
        self.state
            .current_section()
            .map(|s| s.fields.as_slice())
            .unwrap_or_default()
    }

    fn focused_field(&self) -> Option<&Field> {
        self.fields().get(self.focus)
    }

    fn reset_viewport(&mut self) {
        self.scroll = 0;
        self.focus = 0;
        self.inputs = self
            .fields()
            .iter()
            .filter(|f| f.kind.is_textual())
            .map(|f| {
                let text = self.state.display_value(f).as_text().unwrap_or_default().to_string();
                (f.field_id.clone(), Input::new(text))
            })
            .collect();
    }

    fn move_focus(&mut self, forward: bool) {
        let n = self.fields().len();
        if n == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
    }

    /// Run one intent through the reducer and carry out its effects.
    fn dispatch(&mut self, intent: Intent) -> Option<Action> {
        let mut follow_up = None;
        for effect in forms::reduce(&mut self.state, intent) {
            match effect {
                Effect::ResetViewport => self.reset_viewport(),
                Effect::Log(msg) => info!("{msg}"),
                Effect::Submit(submission) => {
                    self.notice = Some(SUBMITTED_NOTICE.into());
                    follow_up = Some(Action::Submitted(submission));
                }
            }
        }
        follow_up
    }

    fn edit(&mut self, field_id: String, value: FieldValue) -> Option<Action> {
        self.dispatch(Intent::Edit { field_id, value })
    }

    /// Keys for the focused control. `None` when the key means nothing to it.
    fn edit_focused(&mut self, key: KeyEvent) -> Option<Option<Action>> {
        let field = self.focused_field()?.clone();
        let current = self.state.display_value(&field);
        match (&field.kind, key.code) {
            (FieldKind::Dropdown { options } | FieldKind::Radio { options }, KeyCode::Left | KeyCode::Right) => {
                let next = cycle_option(options, current.as_text(), key.code == KeyCode::Right)?;
                Some(self.edit(field.field_id, FieldValue::Text(next)))
            }
            (FieldKind::Checkbox, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                let checked = current.as_flag().unwrap_or(false);
                Some(self.edit(field.field_id, FieldValue::Flag(!checked)))
            }
            (kind, _) if kind.is_textual() => {
                let input = self.inputs.get_mut(&field.field_id)?;
                let changed = input
                    .handle_event(&crossterm::event::Event::Key(key))
                    .is_some_and(|state| state.value);
                if !changed {
                    return Some(None);
                }
                let text = input.value().to_string();
                Some(self.edit(field.field_id, FieldValue::Text(text)))
            }
            _ => None,
        }
    }

    /// Paste into the focused text-like field.
    fn paste(&mut self, text: &str) -> Option<Action> {
        if self.state.status() != &LoadStatus::Ready || self.state.phase() != Phase::Editing {
            return None;
        }
        let field_id = self.focused_field().filter(|f| f.kind.is_textual())?.field_id.clone();
        let input = self.inputs.get_mut(&field_id)?;
        for c in text.chars().filter(|c| !c.is_control()) {
            input.handle(tui_input::InputRequest::InsertChar(c));
        }
        let value = FieldValue::Text(input.value().to_string());
        Some(self.edit(field_id, value).unwrap_or(Action::Render))
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Option<EventResponse<Action>> {
        let stop = |action: Option<Action>| Some(EventResponse::Stop(action.unwrap_or(Action::Render)));

        match self.state.status() {
            LoadStatus::Loading => {
                return (key.code == KeyCode::Esc).then_some(EventResponse::Stop(Action::BackToLogin));
            }
            LoadStatus::Failed(_) => {
                return matches!(key.code, KeyCode::Esc | KeyCode::Enter)
                    .then_some(EventResponse::Stop(Action::BackToLogin));
            }
            LoadStatus::Ready => {}
        }
        if self.state.phase() == Phase::Submitted {
            return matches!(key.code, KeyCode::Esc | KeyCode::Enter)
                .then_some(EventResponse::Stop(Action::BackToLogin));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(EventResponse::Stop(Action::BackToLogin)),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                stop(None)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                stop(None)
            }
            KeyCode::PageDown => stop(self.dispatch(Intent::Next)),
            KeyCode::Char('n') if ctrl => stop(self.dispatch(Intent::Next)),
            KeyCode::PageUp => stop(self.dispatch(Intent::Previous)),
            KeyCode::Char('p') if ctrl => stop(self.dispatch(Intent::Previous)),
            KeyCode::Char('s') if ctrl => stop(self.dispatch(Intent::Submit)),
            _ => self.edit_focused(key).map(|action| EventResponse::Stop(action.unwrap_or(Action::Render))),
        }
    }
}

impl Page for FormPage {
    fn name(&self) -> &str {
        "form"
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        Ok(match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) => self.paste(&text).map(EventResponse::Stop),
            _ => None,
        })
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FormLoaded(schema) => {
                if self.state.status() != &LoadStatus::Loading {
                    return Ok(None);
                }
                match self.state.initialize_form(schema) {
                    Ok(()) => self.reset_viewport(),
                    Err(e) => {
                        error!("form configuration error: {e}");
                        self.state.fail_loading(misconfigured(&e));
                    }
                }
            }
            Action::FormFailed(message) => self.state.fail_loading(message),
            _ => {}
        }
        Ok(None)
    }

    fn on_exit(&mut self) -> Result<()> {
        self.identity = None;
        self.state = FormState::loading();
        self.inputs.clear();
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let bg = Block::default().style(Style::default().bg(self.theme.roles.background));
        frame.render_widget(bg, area);

        match self.state.status().clone() {
            LoadStatus::Loading => self.draw_message(
                frame,
                area,
                Line::styled("Loading form...", self.theme.style(Role::SubtleText)),
                "Esc back to login",
            ),
            LoadStatus::Failed(message) => self.draw_message(
                frame,
                area,
                Line::styled(message, self.theme.style(Role::Danger)),
                "[ Back to Login ]  Enter / Esc",
            ),
            LoadStatus::Ready if self.state.phase() == Phase::Submitted => self.draw_message(
                frame,
                area,
                Line::styled(
                    self.notice.clone().unwrap_or_else(|| SUBMITTED_NOTICE.into()),
                    self.theme.bold(Role::Success),
                ),
                "Enter / Esc back to login · Ctrl-C quit",
            ),
            LoadStatus::Ready => self.draw_form(frame, area),
        }
        Ok(())
    }
}

impl FormPage {
    fn draw_message(&self, frame: &mut Frame, area: Rect, message: Line<'static>, hint: &str) {
        let dialog = centered_rect(area, 60, 7);
        let block = Block::bordered()
            .border_set(border::ROUNDED)
            .border_style(self.theme.style(Role::Muted));
        let text = vec![
            Line::raw(""),
            message,
            Line::raw(""),
            Line::styled(hint.to_string(), self.theme.style(Role::Muted)),
        ];
        frame.render_widget(
            Paragraph::new(text).centered().wrap(Wrap { trim: true }).block(block),
            dialog,
        );
    }

    fn draw_form(&mut self, frame: &mut Frame, area: Rect) {
        let Some(section) = self.state.current_section().cloned() else {
            return;
        };
        let has_description = !section.description.is_empty();

        let [_, column, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Max(90),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [header, progress, _, section_area, description, _, body, buttons, hints] =
            Layout::vertical([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(u16::from(has_description)),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(column);

        let mut title = vec![Line::styled(self.state.title().to_string(), self.theme.bold(Role::Primary))];
        if let Some(identity) = &self.identity {
            title.push(Line::styled(
                format!("{} · {}", identity.name, identity.roll_number),
                self.theme.style(Role::SubtleText),
            ));
        }
        frame.render_widget(Paragraph::new(title), header);
        render_progress(frame, progress, self.state.progress(), &self.theme);
        frame.render_widget(
            Paragraph::new(section.title.clone()).style(self.theme.bold(Role::Text)),
            section_area,
        );
        if has_description {
            frame.render_widget(
                Paragraph::new(section.description.clone()).style(self.theme.style(Role::SubtleText)),
                description,
            );
        }

        self.draw_fields(frame, body, &section.fields);
        self.draw_buttons(frame, buttons);
        frame.render_widget(
            Paragraph::new(
                "Tab field · ←/→ choose · Space toggle · Ctrl-N next · Ctrl-P back · Ctrl-S submit · Esc login",
            )
            .style(self.theme.style(Role::Muted)),
            hints,
        );
    }

    fn draw_fields(&mut self, frame: &mut Frame, body: Rect, fields: &[Field]) {
        let mut lines: Vec<Line> = Vec::new();
        // (first line, line count) per field
        let mut extents = Vec::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let focused = i == self.focus;
            let control = FieldControl {
                field,
                value: self.state.display_value(field),
                input: if focused { self.inputs.get(&field.field_id) } else { None },
                error: self.state.error_for(&field.field_id),
                focused,
            };
            let field_lines = control.lines(&self.theme);
            extents.push((lines.len() as u16, field_lines.len() as u16));
            lines.extend(field_lines);
            lines.push(Line::raw(""));
        }

        // keep the focused field in view
        if let Some(&(start, len)) = extents.get(self.focus) {
            if start < self.scroll {
                self.scroll = start;
            } else if start + len > self.scroll + body.height {
                self.scroll = (start + len).saturating_sub(body.height);
            }
        }
        frame.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)), body);

        let Some(field) = fields.get(self.focus) else {
            return;
        };
        let (Some(input), Some(&(start, _))) = (self.inputs.get(&field.field_id), extents.get(self.focus)) else {
            return;
        };
        let value_line = start + 1;
        if value_line >= self.scroll && value_line < self.scroll + body.height {
            let x = (VALUE_INDENT as usize + input.visual_cursor()).min(body.width.saturating_sub(1) as usize);
            frame.set_cursor_position((body.x + x as u16, body.y + value_line - self.scroll));
        }
    }

    fn draw_buttons(&self, frame: &mut Frame, area: Rect) {
        let can_proceed = self.state.can_proceed();
        let previous = Span::styled("[ Previous ]", self.theme.button(!self.state.is_first_section(), false));
        let forward = if self.state.is_last_section() {
            Span::styled("[ Submit ]", self.theme.button(can_proceed, true))
        } else {
            Span::styled("[ Next ]", self.theme.button(can_proceed, true))
        };
        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);
        frame.render_widget(Paragraph::new(previous), left);
        frame.render_widget(Paragraph::new(forward).right_aligned(), right);
    }
}
