use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use forms::LoginDraft;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::Line,
    widgets::{Block, Paragraph},
};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler as _;

use super::Page;
use crate::{
    action::Action,
    style::{Role, Theme},
    tui::{Event, EventResponse},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    RollNumber,
    Name,
}

impl Focus {
    fn key(self) -> &'static str {
        match self {
            Focus::RollNumber => "rollNumber",
            Focus::Name => "name",
        }
    }

    fn toggle(self) -> Self {
        match self {
            Focus::RollNumber => Focus::Name,
            Focus::Name => Focus::RollNumber,
        }
    }
}

/// Roll number + name, validated locally, then registered with the service.
pub struct LoginPage {
    theme: Theme,
    draft: LoginDraft,
    roll_input: Input,
    name_input: Input,
    focus: Focus,
    /// A registration request is in flight.
    busy: bool,
    api_error: Option<String>,
}

impl LoginPage {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            draft: LoginDraft::default(),
            roll_input: Input::default(),
            name_input: Input::default(),
            focus: Focus::RollNumber,
            busy: false,
            api_error: None,
        }
    }

    pub fn prefill(mut self, roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        let (roll_number, name) = (roll_number.into(), name.into());
        self.roll_input = Input::new(roll_number.clone());
        self.name_input = Input::new(name.clone());
        self.draft = LoginDraft::new(roll_number, name);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn draft(&self) -> &LoginDraft {
        &self.draft
    }

    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    fn focused_input(&mut self) -> &mut Input {
        match self.focus {
            Focus::RollNumber => &mut self.roll_input,
            Focus::Name => &mut self.name_input,
        }
    }

    fn sync_focused(&mut self) {
        match self.focus {
            Focus::RollNumber => self.draft.set_roll_number(self.roll_input.value()),
            Focus::Name => self.draft.set_name(self.name_input.value()),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        self.api_error = None;
        match self.draft.validate() {
            Ok(identity) => {
                self.busy = true;
                Some(Action::Login(identity))
            }
            Err(errors) => {
                // jump to the first broken input
                if errors.contains_key(Focus::RollNumber.key()) {
                    self.focus = Focus::RollNumber;
                } else {
                    self.focus = Focus::Name;
                }
                None
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Option<EventResponse<Action>> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = self.focus.toggle();
                Some(EventResponse::Stop(Action::Render))
            }
            KeyCode::Enter => {
                if self.busy {
                    return Some(EventResponse::Stop(Action::Render));
                }
                let action = self.submit().unwrap_or(Action::Render);
                Some(EventResponse::Stop(action))
            }
            // Esc bleibt global (Beenden)
            KeyCode::Esc => None,
            _ => {
                if self.busy {
                    return Some(EventResponse::Stop(Action::Render));
                }
                let ev = crossterm::event::Event::Key(key);
                let changed = self
                    .focused_input()
                    .handle_event(&ev)
                    .is_some_and(|state| state.value);
                if changed {
                    self.sync_focused();
                }
                Some(EventResponse::Stop(Action::Render))
            }
        }
    }
}

impl Page for LoginPage {
    fn name(&self) -> &str {
        "login"
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        Ok(match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) if !self.busy => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.focused_input().handle(tui_input::InputRequest::InsertChar(c));
                }
                self.sync_focused();
                Some(EventResponse::Stop(Action::Render))
            }
            _ => None,
        })
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Registered(_) => {
                self.busy = false;
                self.api_error = None;
            }
            Action::RegistrationFailed(message) => {
                self.busy = false;
                self.api_error = Some(message);
            }
            _ => {}
        }
        Ok(None)
    }

    fn on_enter(&mut self) -> Result<()> {
        self.busy = false;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let bg = Block::default().style(Style::default().bg(self.theme.roles.background));
        frame.render_widget(bg, area);

        let [_, column, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(50),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [
            _,
            header,
            _,
            banner,
            roll_area,
            roll_error,
            name_area,
            name_error,
            _,
            button,
            hints,
            _,
        ] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(2), // Header
            Constraint::Length(1),
            Constraint::Length(2), // API error
            Constraint::Length(3), // Roll number
            Constraint::Length(1),
            Constraint::Length(3), // Name
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1), // Button
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(column);

        let title = Paragraph::new(vec![
            Line::styled("Student Login", self.theme.bold(Role::Primary)),
            Line::styled(
                "Enter your details to access the form",
                self.theme.style(Role::SubtleText),
            ),
        ])
        .centered();
        frame.render_widget(title, header);

        if let Some(err) = &self.api_error {
            frame.render_widget(
                Paragraph::new(err.as_str())
                    .centered()
                    .style(self.theme.style(Role::Danger)),
                banner,
            );
        }

        self.render_input(frame, roll_area, Focus::RollNumber, "Roll Number");
        self.render_error(frame, roll_error, Focus::RollNumber);
        self.render_input(frame, name_area, Focus::Name, "Name");
        self.render_error(frame, name_error, Focus::Name);

        let label = if self.busy { "Logging in..." } else { "[ Login ]" };
        frame.render_widget(
            Paragraph::new(label)
                .centered()
                .style(self.theme.button(!self.busy, true)),
            button,
        );
        frame.render_widget(
            Paragraph::new("Tab switch · Enter login · Esc quit")
                .centered()
                .style(self.theme.style(Role::Muted)),
            hints,
        );
        Ok(())
    }
}

impl LoginPage {
    fn render_input(&self, frame: &mut Frame, area: Rect, which: Focus, title: &str) {
        let input = match which {
            Focus::RollNumber => &self.roll_input,
            Focus::Name => &self.name_input,
        };
        let focused = self.focus == which;
        // keep 2 for borders and 1 for cursor
        let width = area.width.max(3) - 3;
        let scroll = input.visual_scroll(width as usize);

        let title_style = if focused {
            self.theme.style(Role::Primary).add_modifier(Modifier::BOLD)
        } else {
            self.theme.style(Role::SubtleText)
        };
        let border_style = match (focused, self.draft.error_for(which.key()).is_some()) {
            (_, true) => self.theme.style(Role::Danger),
            (true, false) => self.theme.style(Role::Primary),
            (false, false) => self.theme.style(Role::Muted),
        };
        let widget = Paragraph::new(input.value())
            .scroll((0, scroll as u16))
            .style(self.theme.style(Role::Text))
            .block(
                Block::bordered()
                    .title(format!("{title} *"))
                    .title_style(title_style)
                    .border_set(border::ROUNDED)
                    .border_style(border_style),
            );
        frame.render_widget(widget, area);

        if focused && !self.busy {
            let x = input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1))
        }
    }

    fn render_error(&self, frame: &mut Frame, area: Rect, which: Focus) {
        if let Some(err) = self.draft.error_for(which.key()) {
            frame.render_widget(
                Paragraph::new(format!(" {err}")).style(self.theme.style(Role::Danger)),
                area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use forms::{Identity, RegisterOutcome};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(page: &mut LoginPage, text: &str) {
        for c in text.chars() {
            page.handle_events(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn empty_submit_shows_both_errors() {
        let mut page = LoginPage::new(Theme::default());
        let resp = page.handle_events(key(KeyCode::Enter)).unwrap();
        assert_eq!(resp, Some(EventResponse::Stop(Action::Render)));
        assert_eq!(
            page.draft().error_for("rollNumber"),
            Some("Roll number is required")
        );
        assert_eq!(page.draft().error_for("name"), Some("Name is required"));
        assert!(!page.is_busy());
    }

    #[test]
    fn typing_clears_that_error_only() {
        let mut page = LoginPage::new(Theme::default());
        page.handle_events(key(KeyCode::Enter)).unwrap();
        type_str(&mut page, "RA1");
        assert_eq!(page.draft().error_for("rollNumber"), None);
        assert!(page.draft().error_for("name").is_some());
    }

    #[test]
    fn valid_submit_emits_login_and_waits() {
        let mut page = LoginPage::new(Theme::default());
        type_str(&mut page, "RA1");
        page.handle_events(key(KeyCode::Tab)).unwrap();
        type_str(&mut page, "Ada");

        let resp = page.handle_events(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            resp,
            Some(EventResponse::Stop(Action::Login(Identity {
                roll_number: "RA1".into(),
                name: "Ada".into(),
            })))
        );
        assert!(page.is_busy());
        // a second Enter while waiting does nothing
        let again = page.handle_events(key(KeyCode::Enter)).unwrap();
        assert_eq!(again, Some(EventResponse::Stop(Action::Render)));
    }

    #[test]
    fn registration_failure_shows_banner() {
        let mut page = LoginPage::new(Theme::default()).prefill("RA1", "Ada");
        page.handle_events(key(KeyCode::Enter)).unwrap();
        page.update(Action::RegistrationFailed("Failed to connect to the server. Please try again.".into()))
            .unwrap();
        assert!(!page.is_busy());
        assert_eq!(
            page.api_error(),
            Some("Failed to connect to the server. Please try again.")
        );

        page.handle_events(key(KeyCode::Enter)).unwrap();
        assert_eq!(page.api_error(), None);
        page.update(Action::Registered(RegisterOutcome::AlreadyExists)).unwrap();
        assert!(!page.is_busy());
    }

    #[test]
    fn esc_is_left_to_the_app() {
        let mut page = LoginPage::new(Theme::default());
        assert_eq!(page.handle_events(key(KeyCode::Esc)).unwrap(), None);
    }
}
