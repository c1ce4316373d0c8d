use super::{
    conversation::{ConversationContext, Perspective},
    message::Message,
    reconcile::Reconciled,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatUiState {
    /// Not bound to a conversation.
    Unmounted,
    /// First fetch or a user-initiated refresh is in flight.
    Loading,
    Ready,
    /// The last visible refresh failed; the last-known-good list is still shown.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Checking,
    Connected,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatViewState {
    ui_state: ChatUiState,
    context: Option<ConversationContext>,
    perspective: Perspective,
    messages: Vec<Message>,
    pending_count: usize,
    selected_index: Option<usize>,
    assistant_enabled: bool,
    connection: ConnectionStatus,
    awaiting_reply: bool,
    notice: Option<String>,
}

impl Default for ChatViewState {
    fn default() -> Self {
        Self {
            ui_state: ChatUiState::Unmounted,
            context: None,
            perspective: Perspective::Customer,
            messages: Vec::new(),
            pending_count: 0,
            selected_index: None,
            assistant_enabled: true,
            connection: ConnectionStatus::Checking,
            awaiting_reply: false,
            notice: None,
        }
    }
}

impl ChatViewState {
    pub fn ui_state(&self) -> ChatUiState {
        self.ui_state
    }

    pub fn context(&self) -> Option<&ConversationContext> {
        self.context.as_ref()
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant_enabled
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Starts a fresh conversation view showing only `initial` (the greeting, if any).
    pub fn mount(
        &mut self,
        context: ConversationContext,
        perspective: Perspective,
        initial: Vec<Message>,
    ) {
        *self = Self::default();
        self.ui_state = ChatUiState::Loading;
        self.context = Some(context);
        self.perspective = perspective;
        self.selected_index = initial.len().checked_sub(1);
        self.messages = initial;
    }

    pub fn unmount(&mut self) {
        *self = Self::default();
    }

    pub fn set_loading(&mut self) {
        self.ui_state = ChatUiState::Loading;
    }

    /// Replaces the rendered list. Selection follows the tail when it was already there.
    pub fn apply(&mut self, reconciled: Reconciled) {
        let was_at_tail = match self.selected_index {
            None => true,
            Some(index) => index + 1 >= self.messages.len(),
        };

        self.pending_count = reconciled.pending_count();
        self.messages = reconciled.messages;

        self.selected_index = if self.messages.is_empty() {
            None
        } else if was_at_tail {
            Some(self.messages.len() - 1)
        } else {
            self.selected_index
                .map(|index| index.min(self.messages.len() - 1))
        };
    }

    pub fn set_ready(&mut self) {
        self.ui_state = ChatUiState::Ready;
        self.notice = None;
    }

    /// Surfaces a failed visible refresh without clearing the rendered list.
    pub fn set_error(&mut self, notice: impl Into<String>) {
        self.ui_state = ChatUiState::Error;
        self.notice = Some(notice.into());
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn set_assistant_enabled(&mut self, enabled: bool) {
        self.assistant_enabled = enabled;
        if !enabled {
            self.awaiting_reply = false;
        }
    }

    pub fn set_connection(&mut self, connection: ConnectionStatus) {
        self.connection = connection;
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(0),
            Some(idx) if idx + 1 < self.messages.len() => Some(idx + 1),
            Some(idx) => Some(idx),
        };
    }

    pub fn select_previous(&mut self) {
        if self.messages.is_empty() {
            return;
        }

        self.selected_index = match self.selected_index {
            None => Some(self.messages.len() - 1),
            Some(0) => Some(0),
            Some(idx) => Some(idx - 1),
        };
    }
}
