use super::{chat_view_state::ChatViewState, message_input_state::MessageInputState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    chat: ChatViewState,
    input: MessageInputState,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            chat: ChatViewState::default(),
            input: MessageInputState::default(),
        }
    }
}

impl ShellState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn chat(&self) -> &ChatViewState {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatViewState {
        &mut self.chat
    }

    pub fn input(&self) -> &MessageInputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut MessageInputState {
        &mut self.input
    }
}
