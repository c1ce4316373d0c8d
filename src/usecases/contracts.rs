use std::{sync::Arc, time::Duration};

use anyhow::Result;

use crate::domain::{
    conversation::{ConversationContext, RefreshMode, ViewId},
    events::AppEvent,
    shell_state::ShellState,
};

use super::{
    assistant_status::{AssistantStatusSource, HealthProbe},
    load_conversation::ConversationSource,
    send_message::{MessageSender, SendMessageCommand},
};

/// Failure reported by any backend source, before use-case specific mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    Unauthorized,
    Unavailable,
    InvalidData,
}

/// Everything a chat view needs from the backend service.
pub trait ChatBackend:
    ConversationSource + MessageSender + AssistantStatusSource + HealthProbe
{
}

impl<T> ChatBackend for T where
    T: ConversationSource + MessageSender + AssistantStatusSource + HealthProbe
{
}

/// Fire-and-forget requests issued by the UI thread.
///
/// Completions come back as `AppEvent::Backend` events tagged with the requesting view.
pub trait ChatCommands {
    fn fetch_conversation(&self, view: ViewId, context: &ConversationContext, mode: RefreshMode);
    fn send_message(&self, view: ViewId, command: SendMessageCommand);
    fn check_assistant_status(&self, view: ViewId, context: &ConversationContext);
    fn check_health(&self, view: ViewId);
    fn toggle_assistant(&self, view: ViewId, context: &ConversationContext, enabled: bool);
    /// Issues a silent fetch once `delay` has elapsed.
    fn schedule_refresh(&self, view: ViewId, context: &ConversationContext, delay: Duration);
}

impl<T> ChatCommands for Arc<T>
where
    T: ChatCommands + ?Sized,
{
    fn fetch_conversation(&self, view: ViewId, context: &ConversationContext, mode: RefreshMode) {
        (**self).fetch_conversation(view, context, mode)
    }

    fn send_message(&self, view: ViewId, command: SendMessageCommand) {
        (**self).send_message(view, command)
    }

    fn check_assistant_status(&self, view: ViewId, context: &ConversationContext) {
        (**self).check_assistant_status(view, context)
    }

    fn check_health(&self, view: ViewId) {
        (**self).check_health(view)
    }

    fn toggle_assistant(&self, view: ViewId, context: &ConversationContext, enabled: bool) {
        (**self).toggle_assistant(view, context, enabled)
    }

    fn schedule_refresh(&self, view: ViewId, context: &ConversationContext, delay: Duration) {
        (**self).schedule_refresh(view, context, delay)
    }
}

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

pub trait ShellOrchestrator {
    /// Mounts the chat view. Call once before the event loop starts.
    fn start(&mut self) -> ViewId;
    fn state(&self) -> &ShellState;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}
