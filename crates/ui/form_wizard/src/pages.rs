use color_eyre::Result;
use ratatui::{Frame, layout::Rect};

use crate::{
    action::Action,
    tui::{Event, EventResponse},
};

mod form;
mod login;

pub use form::FormPage;
pub use login::LoginPage;

/// Which page is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageId {
    #[default]
    Login,
    Form,
}

/// A full-screen view with its own input handling. The app routes terminal
/// events and actions to the active page only.
pub trait Page {
    fn name(&self) -> &str;

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        let _ = event;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Draw the page using the provided `Frame` and `area`.
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;

    /// Called when the page becomes active.
    fn on_enter(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when the page is leaving / being replaced.
    fn on_exit(&mut self) -> Result<()> {
        Ok(())
    }
}
