use super::conversation::{ConversationSnapshot, RefreshMode, ViewId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    Backend(BackendEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }

    /// Returns the typed character when the key is a single printable char without modifiers.
    pub fn printable_char(&self) -> Option<char> {
        if self.ctrl {
            return None;
        }

        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_control() => Some(ch),
            _ => None,
        }
    }
}

/// Why a backend request did not produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFailure {
    Unauthorized,
    Unavailable,
    InvalidData,
    /// Validation refused the request before it left the process.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    Conversation,
    AssistantStatus,
}

/// Completion of work running off the UI thread, addressed to the view that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    ConversationLoaded {
        view: ViewId,
        mode: RefreshMode,
        result: Result<ConversationSnapshot, RequestFailure>,
    },
    MessageSent {
        view: ViewId,
        /// Immediate reply carried by the send response, if any.
        result: Result<Option<String>, RequestFailure>,
    },
    AssistantStatusChecked {
        view: ViewId,
        result: Result<Option<bool>, RequestFailure>,
    },
    HealthChecked {
        view: ViewId,
        healthy: bool,
    },
    AssistantToggled {
        view: ViewId,
        enabled: bool,
        result: Result<(), RequestFailure>,
    },
    PollDue {
        view: ViewId,
        target: PollTarget,
    },
}

impl BackendEvent {
    pub fn view(&self) -> ViewId {
        match self {
            Self::ConversationLoaded { view, .. }
            | Self::MessageSent { view, .. }
            | Self::AssistantStatusChecked { view, .. }
            | Self::HealthChecked { view, .. }
            | Self::AssistantToggled { view, .. }
            | Self::PollDue { view, .. } => *view,
        }
    }
}
