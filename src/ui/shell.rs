use anyhow::Result;

use crate::{
    backend::poller::PollSchedule,
    domain::shell_state::ShellState,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ShellOrchestrator},
    },
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    polls: &PollSchedule,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        log_level = %context.config.logging.level,
        base_url = %context.config.backend.base_url,
        intervals = ?polls.intervals(),
        "starting chat shell"
    );

    let mut terminal = TerminalSession::enter()?;
    let mounted = orchestrator.start();
    let _poller = polls.start(mounted);

    run_loop(event_source, orchestrator, |state| {
        terminal.draw(|frame| view::render(frame, state))
    })
}

/// Draws, then handles one event, until the orchestrator stops.
fn run_loop<D>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
    mut draw: D,
) -> Result<()>
where
    D: FnMut(&ShellState) -> Result<()>,
{
    while orchestrator.state().is_running() {
        draw(orchestrator.state())?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, time::Duration};

    use super::*;
    use crate::{
        domain::{
            conversation::{ConversationContext, Perspective, RefreshMode, ViewId},
            events::{AppEvent, KeyInput},
        },
        ui::event_source::MockEventSource,
        usecases::{
            chat_session::{ChatSession, SessionSettings},
            contracts::ChatCommands,
            send_message::SendMessageCommand,
            shell::DefaultShellOrchestrator,
        },
    };

    struct NoopCommands;

    impl ChatCommands for NoopCommands {
        fn fetch_conversation(&self, _: ViewId, _: &ConversationContext, _: RefreshMode) {}
        fn send_message(&self, _: ViewId, _: SendMessageCommand) {}
        fn check_assistant_status(&self, _: ViewId, _: &ConversationContext) {}
        fn check_health(&self, _: ViewId) {}
        fn toggle_assistant(&self, _: ViewId, _: &ConversationContext, _: bool) {}
        fn schedule_refresh(&self, _: ViewId, _: &ConversationContext, _: Duration) {}
    }

    fn orchestrator() -> DefaultShellOrchestrator<NoopCommands> {
        let session = ChatSession::new(
            NoopCommands,
            ConversationContext::new(Some("r1"), Some("c1"), Some("4")).expect("valid context"),
            Perspective::Customer,
            SessionSettings {
                welcome_text: None,
                follow_up_refresh: Duration::from_secs(2),
            },
        );
        let mut orchestrator = DefaultShellOrchestrator::new(session);
        orchestrator.start();
        orchestrator
    }

    #[test]
    fn mock_source_produces_quit_event() {
        let mut source = MockEventSource::from(vec![AppEvent::QuitRequested]);
        let event = source.next_event().expect("must read mock event");

        assert_eq!(event, Some(AppEvent::QuitRequested));
    }

    #[test]
    fn loop_draws_until_quit() {
        let mut source = MockEventSource::from(vec![
            AppEvent::Tick,
            AppEvent::InputKey(KeyInput::new("h", false)),
            AppEvent::QuitRequested,
        ]);
        let mut orchestrator = orchestrator();
        let draws = Cell::new(0);

        run_loop(&mut source, &mut orchestrator, |_| {
            draws.set(draws.get() + 1);
            Ok(())
        })
        .expect("loop should finish");

        assert_eq!(draws.get(), 3);
        assert!(!orchestrator.state().is_running());
        assert_eq!(orchestrator.state().input().text(), "h");
    }

    #[test]
    fn draw_failure_ends_the_loop() {
        let mut source = MockEventSource::from(vec![AppEvent::Tick]);
        let mut orchestrator = orchestrator();

        let result = run_loop(&mut source, &mut orchestrator, |_| {
            Err(anyhow::anyhow!("terminal gone"))
        });

        assert!(result.is_err());
    }
}
