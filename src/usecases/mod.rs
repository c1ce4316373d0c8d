//! Use case layer: application workflows and orchestration.

pub mod assistant_status;
pub mod bootstrap;
pub mod chat_session;
pub mod context;
pub mod contracts;
pub mod load_conversation;
pub mod send_message;
pub mod shell;
