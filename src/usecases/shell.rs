use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::{
    conversation::ViewId,
    events::{AppEvent, KeyInput},
    shell_state::ShellState,
};

use super::{
    chat_session::{ChatSession, SubmitOutcome},
    contracts::{ChatCommands, ShellOrchestrator},
};

pub type Clock = fn() -> DateTime<Utc>;

pub struct DefaultShellOrchestrator<C>
where
    C: ChatCommands,
{
    state: ShellState,
    session: ChatSession<C>,
    clock: Clock,
}

impl<C> DefaultShellOrchestrator<C>
where
    C: ChatCommands,
{
    pub fn new(session: ChatSession<C>) -> Self {
        Self::with_clock(session, Utc::now)
    }

    pub fn with_clock(session: ChatSession<C>, clock: Clock) -> Self {
        Self {
            state: ShellState::default(),
            session,
            clock,
        }
    }

    fn handle_key(&mut self, key: KeyInput) {
        if key.ctrl {
            match key.key.as_str() {
                "c" => self.quit(),
                "r" => self.session.refresh(self.state.chat_mut()),
                "a" => {
                    self.session.toggle_assistant(self.state.chat());
                }
                _ => {}
            }
            return;
        }

        match key.key.as_str() {
            "esc" => self.quit(),
            "enter" => self.submit(),
            "backspace" => self.state.input_mut().backspace(),
            "delete" => self.state.input_mut().delete(),
            "left" => self.state.input_mut().move_left(),
            "right" => self.state.input_mut().move_right(),
            "home" => self.state.input_mut().move_home(),
            "end" => self.state.input_mut().move_end(),
            "up" => self.state.chat_mut().select_previous(),
            "down" => self.state.chat_mut().select_next(),
            _ => {
                if let Some(ch) = key.printable_char() {
                    self.state.input_mut().insert_char(ch);
                }
            }
        }
    }

    fn submit(&mut self) {
        let text = self.state.input().text().to_owned();
        let now = (self.clock)();

        match self.session.submit(self.state.chat_mut(), &text, now) {
            SubmitOutcome::Sent | SubmitOutcome::Blank => {
                self.state.input_mut().take();
            }
            SubmitOutcome::AwaitingReply | SubmitOutcome::NotMounted => {}
        }
    }

    fn quit(&mut self) {
        self.session.unmount(self.state.chat_mut());
        self.state.stop();
    }
}

impl<C> ShellOrchestrator for DefaultShellOrchestrator<C>
where
    C: ChatCommands,
{
    fn start(&mut self) -> ViewId {
        let now = (self.clock)();
        self.session.mount(self.state.chat_mut(), now)
    }

    fn state(&self) -> &ShellState {
        &self.state
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Tick => {}
            AppEvent::QuitRequested => self.quit(),
            AppEvent::InputKey(key) => self.handle_key(key),
            AppEvent::Backend(event) => {
                let now = (self.clock)();
                self.session
                    .handle_backend_event(self.state.chat_mut(), event, now);
            }
        }

        Ok(())
    }
}
