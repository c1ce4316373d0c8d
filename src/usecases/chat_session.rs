//! Drives one chat view: optimistic sends, reconciliation on every fetch, and the
//! mount/unmount lifecycle that makes late responses harmless.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    chat_view_state::{ChatViewState, ConnectionStatus},
    conversation::{
        ConversationContext, ConversationSnapshot, Perspective, RefreshMode, ServerRecord, ViewId,
    },
    events::{BackendEvent, PollTarget, RequestFailure},
    message::{Message, MessageId, Provenance, SenderKind},
    overlay::Overlay,
    reconcile::{local_stamp, reconcile, should_replace, ReconcileInput},
};

use super::{contracts::ChatCommands, send_message::SendMessageCommand};

pub const ASSISTANT_FAILURE_TEXT: &str =
    "Sorry, something went wrong. Please try again in a moment.";
pub const DELIVERY_FAILURE_TEXT: &str =
    "Failed to send message. Please check your connection and try again.";
const FETCH_FAILURE_NOTICE: &str = "Could not load the conversation. Press Ctrl+R to retry.";
const TOGGLE_FAILURE_NOTICE: &str = "Could not update the assistant setting.";
const GREETING_ID: &str = "welcome";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Leading welcome line for the customer perspective.
    pub welcome_text: Option<String>,
    /// Delay before the extra silent fetch after a send that produced no reply.
    pub follow_up_refresh: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Blank,
    /// A reply to the previous message is still being produced.
    AwaitingReply,
    NotMounted,
}

pub struct ChatSession<C>
where
    C: ChatCommands,
{
    commands: C,
    context: ConversationContext,
    perspective: Perspective,
    settings: SessionSettings,
    mounted: Option<ViewId>,
    next_view: ViewId,
    overlay: Overlay,
    fetched: Vec<ServerRecord>,
    greeting: Option<Message>,
}

impl<C> ChatSession<C>
where
    C: ChatCommands,
{
    pub fn new(
        commands: C,
        context: ConversationContext,
        perspective: Perspective,
        settings: SessionSettings,
    ) -> Self {
        Self {
            commands,
            context,
            perspective,
            settings,
            mounted: None,
            next_view: ViewId::first(),
            overlay: Overlay::default(),
            fetched: Vec::new(),
            greeting: None,
        }
    }

    /// Binds a fresh view to the conversation and kicks off the initial requests.
    pub fn mount(&mut self, state: &mut ChatViewState, now: DateTime<Utc>) -> ViewId {
        let view = self.next_view;
        self.next_view = view.next();
        self.mounted = Some(view);

        self.overlay.clear();
        self.fetched.clear();
        self.greeting = self.greeting_at(now);

        state.mount(
            self.context.clone(),
            self.perspective,
            self.greeting.iter().cloned().collect(),
        );

        tracing::info!(
            code = "CHAT_VIEW_MOUNTED",
            view = view.get(),
            restaurant_id = self.context.restaurant_id(),
            perspective = ?self.perspective,
            "chat view mounted"
        );

        self.commands.check_health(view);
        self.commands
            .fetch_conversation(view, &self.context, RefreshMode::Visible);
        self.commands.check_assistant_status(view, &self.context);

        view
    }

    /// Forgets the current view. Responses still in flight for it are dropped on arrival.
    pub fn unmount(&mut self, state: &mut ChatViewState) {
        if let Some(view) = self.mounted.take() {
            tracing::info!(code = "CHAT_VIEW_UNMOUNTED", view = view.get(), "chat view unmounted");
        }

        self.overlay.clear();
        self.fetched.clear();
        self.greeting = None;
        state.unmount();
    }

    pub fn submit(
        &mut self,
        state: &mut ChatViewState,
        text: &str,
        now: DateTime<Utc>,
    ) -> SubmitOutcome {
        let Some(view) = self.mounted else {
            return SubmitOutcome::NotMounted;
        };

        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Blank;
        }

        let expects_reply = self.expects_reply(state);
        if expects_reply && state.awaiting_reply() {
            return SubmitOutcome::AwaitingReply;
        }

        let at = self.next_local_stamp(now);
        if self
            .overlay
            .push_pending(self.perspective.author(), text, at)
            .is_none()
        {
            return SubmitOutcome::Blank;
        }

        if expects_reply {
            state.set_awaiting_reply(true);
        }
        self.render(state, RefreshMode::Visible);

        self.commands.send_message(
            view,
            SendMessageCommand {
                context: self.context.clone(),
                author: self.perspective.author(),
                text: text.to_owned(),
            },
        );

        SubmitOutcome::Sent
    }

    /// User-initiated refresh. Its failure is surfaced, unlike timer-driven polls.
    pub fn refresh(&mut self, state: &mut ChatViewState) {
        let Some(view) = self.mounted else {
            return;
        };

        state.set_loading();
        self.commands.check_health(view);
        self.commands
            .fetch_conversation(view, &self.context, RefreshMode::Visible);
    }

    /// Flips the assistant flag of the conversation. Only the staff console may do this.
    pub fn toggle_assistant(&mut self, state: &ChatViewState) -> bool {
        let Some(view) = self.mounted else {
            return false;
        };
        if self.perspective != Perspective::Staff {
            return false;
        }

        self.commands
            .toggle_assistant(view, &self.context, !state.assistant_enabled());
        true
    }

    pub fn handle_backend_event(
        &mut self,
        state: &mut ChatViewState,
        event: BackendEvent,
        now: DateTime<Utc>,
    ) {
        if self.mounted != Some(event.view()) {
            tracing::debug!(
                code = "STALE_RESPONSE_IGNORED",
                view = event.view().get(),
                "ignoring backend event for a view that is no longer mounted"
            );
            return;
        }

        match event {
            BackendEvent::ConversationLoaded { mode, result, .. } => {
                self.on_conversation_loaded(state, mode, result)
            }
            BackendEvent::MessageSent { view, result } => {
                self.on_message_sent(state, view, result, now)
            }
            BackendEvent::AssistantStatusChecked { result, .. } => match result {
                Ok(Some(enabled)) => {
                    if enabled != state.assistant_enabled() {
                        state.set_assistant_enabled(enabled);
                        self.render(state, RefreshMode::Silent);
                    }
                }
                Ok(None) => {}
                Err(failure) => {
                    tracing::debug!(
                        code = "STATUS_CHECK_FAILED",
                        ?failure,
                        "assistant status check failed"
                    );
                }
            },
            BackendEvent::HealthChecked { healthy, .. } => {
                state.set_connection(if healthy {
                    ConnectionStatus::Connected
                } else {
                    ConnectionStatus::Unreachable
                });
            }
            BackendEvent::AssistantToggled {
                enabled, result, ..
            } => match result {
                Ok(()) => {
                    state.set_assistant_enabled(enabled);
                    state.clear_notice();
                    self.render(state, RefreshMode::Silent);
                }
                Err(failure) => {
                    tracing::warn!(
                        code = "ASSISTANT_TOGGLE_FAILED",
                        ?failure,
                        "assistant toggle failed"
                    );
                    state.set_notice(TOGGLE_FAILURE_NOTICE);
                }
            },
            BackendEvent::PollDue { view, target } => match target {
                PollTarget::Conversation => {
                    self.commands
                        .fetch_conversation(view, &self.context, RefreshMode::Silent)
                }
                PollTarget::AssistantStatus => {
                    self.commands.check_assistant_status(view, &self.context)
                }
            },
        }
    }

    fn on_conversation_loaded(
        &mut self,
        state: &mut ChatViewState,
        mode: RefreshMode,
        result: Result<ConversationSnapshot, RequestFailure>,
    ) {
        match result {
            Ok(snapshot) => {
                if let Some(enabled) = snapshot.assistant_enabled {
                    state.set_assistant_enabled(enabled);
                }
                self.fetched = snapshot.records;
                self.render(state, mode);
                state.set_ready();
                state.set_connection(ConnectionStatus::Connected);
            }
            Err(failure) => match mode {
                RefreshMode::Visible => {
                    tracing::warn!(code = "CONVERSATION_FETCH_FAILED", ?failure, "refresh failed");
                    state.set_error(FETCH_FAILURE_NOTICE);
                }
                RefreshMode::Silent => {
                    tracing::debug!(code = "CONVERSATION_POLL_FAILED", ?failure, "poll failed");
                }
            },
        }
    }

    fn on_message_sent(
        &mut self,
        state: &mut ChatViewState,
        view: ViewId,
        result: Result<Option<String>, RequestFailure>,
        now: DateTime<Utc>,
    ) {
        let expected_reply = self.expects_reply(state);
        state.set_awaiting_reply(false);

        match result {
            Ok(Some(reply)) if self.perspective.expects_reply() => {
                let at = self.next_local_stamp(now);
                self.overlay.push_pending(SenderKind::Ai, &reply, at);
                self.render(state, RefreshMode::Visible);
            }
            Ok(_) => {
                if self.perspective == Perspective::Staff {
                    self.commands
                        .fetch_conversation(view, &self.context, RefreshMode::Silent);
                } else if !state.assistant_enabled() {
                    self.commands.schedule_refresh(
                        view,
                        &self.context,
                        self.settings.follow_up_refresh,
                    );
                }
            }
            Err(failure) => {
                tracing::warn!(code = "MESSAGE_SEND_FAILED", ?failure, "message send failed");
                let notice = if expected_reply {
                    ASSISTANT_FAILURE_TEXT
                } else {
                    DELIVERY_FAILURE_TEXT
                };
                let at = self.next_local_stamp(now);
                self.overlay.push_failure(notice, at);
                self.render(state, RefreshMode::Visible);
            }
        }
    }

    /// Recomputes the rendered list from the last fetch and the overlay, pruning absorbed entries.
    fn render(&mut self, state: &mut ChatViewState, mode: RefreshMode) {
        let reconciled = reconcile(ReconcileInput {
            fetched: &self.fetched,
            overlay: self.overlay.entries(),
            assistant_enabled: state.assistant_enabled(),
            greeting: self.greeting.as_ref(),
        });

        self.overlay.observe_horizon(reconciled.horizon);
        self.overlay.retain_ids(&reconciled.retained);

        if should_replace(state.messages(), &reconciled, mode) {
            state.apply(reconciled);
        }
    }

    fn expects_reply(&self, state: &ChatViewState) -> bool {
        self.perspective.expects_reply() && state.assistant_enabled()
    }

    /// Keeps local entries ahead of both the server horizon and earlier local entries.
    fn next_local_stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.overlay.horizon().max(self.overlay.latest_timestamp());
        local_stamp(now, floor)
    }

    fn greeting_at(&self, now: DateTime<Utc>) -> Option<Message> {
        if !self.perspective.shows_greeting() {
            return None;
        }

        let text = self.settings.welcome_text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Message {
            id: MessageId::new(GREETING_ID),
            text: text.to_owned(),
            sender: SenderKind::Ai,
            timestamp: now,
            provenance: Provenance::Greeting,
        })
    }
}
