use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use forms::{FormService, Identity, Session, Submission};
use ratatui::{Frame, prelude::Rect};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    action::Action,
    config::Config,
    executor::{REGISTER_FAILED, TaskExecutor, TaskKind},
    pages::{FormPage, LoginPage, Page, PageId},
    style::Theme,
    tui::{Event, EventResponse, Tui},
};

pub struct App<S> {
    pub config: Config,
    pub session: Session,
    pub login: LoginPage,
    pub form: FormPage,
    pub active_page: PageId,
    /// Identity waiting for the registration result.
    pub pending_identity: Option<Identity>,
    /// The last submitted answers, handed back to the caller on exit.
    pub submission: Option<Submission>,
    pub should_quit: bool,
    pub should_suspend: bool,
    service: Arc<S>,
}

impl<S> App<S>
where
    S: FormService + 'static,
{
    pub fn new(config: Config, theme: Theme, login: LoginPage, service: Arc<S>) -> Self {
        Self {
            config,
            session: Session::new(),
            login,
            form: FormPage::new(theme),
            active_page: PageId::default(),
            pending_identity: None,
            submission: None,
            should_quit: false,
            should_suspend: false,
            service,
        }
    }

    fn page(&mut self) -> &mut dyn Page {
        match self.active_page {
            PageId::Login => &mut self.login,
            PageId::Form => &mut self.form,
        }
    }

    fn switch_to(&mut self, id: PageId) -> Result<()> {
        if self.active_page == id {
            return Ok(());
        }
        debug!("page {} -> {:?}", self.page().name(), id);
        self.page().on_exit()?;
        self.active_page = id;
        crate::errors::set_current_page(id);
        self.page().on_enter()
    }

    /// The form page needs an identity from the session; without one the
    /// user is sent back to login.
    fn enter_form(&mut self, executor: &TaskExecutor<S>) -> Result<()> {
        match self.session.require_identity() {
            Ok(identity) => {
                let roll_number = identity.roll_number.clone();
                self.switch_to(PageId::Form)?;
                self.form.begin(identity);
                executor.spawn(TaskKind::FetchForm(roll_number));
            }
            Err(e) => {
                warn!("cannot open the form: {e}");
                self.switch_to(PageId::Login)?;
            }
        }
        Ok(())
    }

    /// Route one terminal event: global bindings first, then the active page,
    /// then the fallbacks the page let through.
    pub fn handle_event(&mut self, event: Event, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if let Event::Key(key) = &event {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match key.code {
                    KeyCode::Char('c') => return Ok(action_tx.send(Action::Quit)?),
                    KeyCode::Char('z') => return Ok(action_tx.send(Action::Suspend)?),
                    _ => {}
                }
            }
        }

        let stop_event_propagation = match self.page().handle_events(event.clone())? {
            Some(EventResponse::Continue(action)) => {
                action_tx.send(action)?;
                false
            }
            Some(EventResponse::Stop(action)) => {
                action_tx.send(action)?;
                true
            }
            None => false,
        };
        if stop_event_propagation {
            return Ok(());
        }

        match event {
            Event::Quit => action_tx.send(Action::Quit)?,
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            Event::Key(key) if key.code == KeyCode::Esc => action_tx.send(Action::Quit)?,
            _ => {}
        }
        Ok(())
    }

    /// Apply one action to the app and the active page. Drawing actions are
    /// handled by the run loop.
    pub fn handle_action(&mut self, action: Action, executor: &TaskExecutor<S>) -> Result<Option<Action>> {
        if !matches!(action, Action::Tick | Action::Render) {
            debug!("{action}");
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::Error(ref message) => error!("{message}"),
            Action::Login(identity) => {
                info!("registering {}", identity.roll_number);
                executor.spawn(TaskKind::Register(identity.clone()));
                self.pending_identity = Some(identity);
            }
            Action::Registered(outcome) => {
                self.login.update(Action::Registered(outcome))?;
                let Some(identity) = self.pending_identity.take() else {
                    warn!("registration result without a pending login");
                    return Ok(None);
                };
                if let Err(e) = self.session.store_identity(&identity) {
                    error!("failed to store identity: {e}");
                    return self.login.update(Action::RegistrationFailed(REGISTER_FAILED.into()));
                }
                self.enter_form(executor)?;
            }
            Action::RegistrationFailed(message) => {
                self.pending_identity = None;
                return self.login.update(Action::RegistrationFailed(message));
            }
            Action::FormLoaded(_) | Action::FormFailed(_) => {
                if self.active_page == PageId::Form {
                    return self.form.update(action);
                }
                debug!("form result arrived after leaving the form page");
            }
            Action::BackToLogin => {
                executor.invalidate();
                self.session.clear_identity();
                self.switch_to(PageId::Login)?;
            }
            Action::Submitted(submission) => {
                match serde_json::to_string(&submission) {
                    Ok(json) => info!("form submitted: {json}"),
                    Err(e) => warn!("submission is not serializable: {e}"),
                }
                self.submission = Some(submission);
            }
            other => return self.page().update(other),
        }
        Ok(None)
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let executor = TaskExecutor::new(self.service.clone(), action_tx.clone());

        let mut tui = Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate)
            .paste(true);
        tui.enter()?;
        self.page().on_enter()?;

        loop {
            if let Some(e) = tui.next().await {
                self.handle_event(e, &action_tx)?;
            }

            while let Ok(action) = action_rx.try_recv() {
                match action {
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    action => {
                        if let Some(follow_up) = self.handle_action(action, &executor)? {
                            action_tx.send(follow_up)?
                        }
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                tui = Tui::new()?
                    .tick_rate(self.config.tick_rate)
                    .frame_rate(self.config.frame_rate)
                    .paste(true);
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                let _ = action_tx.send(Action::Error(format!("Failed to draw: {err:?}")));
            }
        })?;
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let area = frame.area();
        self.page().draw(frame, area)
    }
}
