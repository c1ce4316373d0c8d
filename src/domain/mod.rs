//! Domain layer: conversation entities, the optimistic overlay and the reconciler.

pub mod chat_view_state;
pub mod conversation;
pub mod events;
pub mod message;
pub mod message_input_state;
pub mod overlay;
pub mod reconcile;
pub mod shell_state;
