//! Transport half of the optimistic send: validates the text and posts it.

use async_trait::async_trait;

use crate::domain::{
    conversation::ConversationContext, events::RequestFailure, message::SenderKind,
};

use super::contracts::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub context: ConversationContext,
    pub author: SenderKind,
    pub text: String,
}

/// Payload handed to the transport after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage<'a> {
    pub restaurant_id: &'a str,
    pub client_id: &'a str,
    pub table_id: Option<&'a str>,
    pub text: &'a str,
    pub author: SenderKind,
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Posts one message. `Ok(Some(_))` carries the reply produced synchronously by the backend.
    async fn send_message(
        &self,
        message: &OutgoingMessage<'_>,
    ) -> Result<Option<String>, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMessageError {
    EmptyMessage,
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl SendMessageError {
    pub fn failure(self) -> RequestFailure {
        match self {
            Self::EmptyMessage => RequestFailure::Rejected,
            Self::Unauthorized => RequestFailure::Unauthorized,
            Self::TemporarilyUnavailable => RequestFailure::Unavailable,
            Self::DataContractViolation => RequestFailure::InvalidData,
        }
    }
}

/// Sends the trimmed text and returns the immediate reply, if the backend produced one.
///
/// A blank reply is reported as no reply.
pub async fn send_message<S>(
    sender: &S,
    command: &SendMessageCommand,
) -> Result<Option<String>, SendMessageError>
where
    S: MessageSender + ?Sized,
{
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let message = OutgoingMessage {
        restaurant_id: command.context.restaurant_id(),
        client_id: command.context.client_id(),
        table_id: command.context.table_id(),
        text,
        author: command.author,
    };

    let reply = sender
        .send_message(&message)
        .await
        .map_err(map_source_error)?;

    Ok(reply.filter(|reply| !reply.trim().is_empty()))
}

fn map_source_error(error: SourceError) -> SendMessageError {
    match error {
        SourceError::Unauthorized => SendMessageError::Unauthorized,
        SourceError::Unavailable => SendMessageError::TemporarilyUnavailable,
        SourceError::InvalidData => SendMessageError::DataContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Captured {
        restaurant_id: String,
        table_id: Option<String>,
        text: String,
        author: SenderKind,
    }

    struct StubSender {
        result: Result<Option<String>, SourceError>,
        captured: Mutex<Option<Captured>>,
    }

    impl StubSender {
        fn with_result(result: Result<Option<String>, SourceError>) -> Self {
            Self {
                result,
                captured: Mutex::new(None),
            }
        }

        fn captured(&self) -> Option<Captured> {
            self.captured.lock().expect("capture lock").clone()
        }
    }

    #[async_trait]
    impl MessageSender for StubSender {
        async fn send_message(
            &self,
            message: &OutgoingMessage<'_>,
        ) -> Result<Option<String>, SourceError> {
            *self.captured.lock().expect("capture lock") = Some(Captured {
                restaurant_id: message.restaurant_id.to_owned(),
                table_id: message.table_id.map(str::to_owned),
                text: message.text.to_owned(),
                author: message.author,
            });
            self.result.clone()
        }
    }

    fn command(text: &str) -> SendMessageCommand {
        SendMessageCommand {
            context: ConversationContext::new(Some("r1"), Some("c1"), Some("7"))
                .expect("valid context"),
            author: SenderKind::Client,
            text: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn rejects_whitespace_only_message() {
        let sender = StubSender::with_result(Ok(None));

        let result = send_message(&sender, &command("   \n\t  ")).await;

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(sender.captured().is_none());
    }

    #[tokio::test]
    async fn trims_text_and_forwards_context() {
        let sender = StubSender::with_result(Ok(None));

        send_message(&sender, &command("  Any vegan pizza?  "))
            .await
            .expect("send should succeed");

        assert_eq!(
            sender.captured(),
            Some(Captured {
                restaurant_id: "r1".to_owned(),
                table_id: Some("7".to_owned()),
                text: "Any vegan pizza?".to_owned(),
                author: SenderKind::Client,
            })
        );
    }

    #[tokio::test]
    async fn returns_immediate_reply() {
        let sender = StubSender::with_result(Ok(Some("Yes, the Marinara.".to_owned())));

        let reply = send_message(&sender, &command("Any vegan pizza?")).await;

        assert_eq!(reply, Ok(Some("Yes, the Marinara.".to_owned())));
    }

    #[tokio::test]
    async fn blank_reply_counts_as_no_reply() {
        let sender = StubSender::with_result(Ok(Some("  ".to_owned())));

        let reply = send_message(&sender, &command("hello")).await;

        assert_eq!(reply, Ok(None));
    }

    #[tokio::test]
    async fn maps_unavailable_error() {
        let sender = StubSender::with_result(Err(SourceError::Unavailable));

        let result = send_message(&sender, &command("hello")).await;

        assert_eq!(result, Err(SendMessageError::TemporarilyUnavailable));
        assert_eq!(
            SendMessageError::TemporarilyUnavailable.failure(),
            RequestFailure::Unavailable
        );
    }

    #[tokio::test]
    async fn maps_unauthorized_error() {
        let sender = StubSender::with_result(Err(SourceError::Unauthorized));

        let result = send_message(&sender, &command("hello")).await;

        assert_eq!(result, Err(SendMessageError::Unauthorized));
    }
}
