use async_trait::async_trait;

use crate::domain::{
    conversation::{ConversationContext, ConversationSnapshot, ServerRecord},
    events::RequestFailure,
};

use super::contracts::SourceError;

#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Returns every stored record of one conversation in server order.
    async fn conversation_records(
        &self,
        restaurant_id: &str,
        client_id: &str,
    ) -> Result<Vec<ServerRecord>, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadConversationError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl LoadConversationError {
    pub fn failure(self) -> RequestFailure {
        match self {
            Self::Unauthorized => RequestFailure::Unauthorized,
            Self::TemporarilyUnavailable => RequestFailure::Unavailable,
            Self::DataContractViolation => RequestFailure::InvalidData,
        }
    }
}

/// Fetches the full conversation for `context`.
///
/// Records without renderable text are dropped here so nothing downstream ever sees them.
pub async fn load_conversation<S>(
    source: &S,
    context: &ConversationContext,
) -> Result<ConversationSnapshot, LoadConversationError>
where
    S: ConversationSource + ?Sized,
{
    let records = source
        .conversation_records(context.restaurant_id(), context.client_id())
        .await
        .map_err(map_source_error)?;

    let total = records.len();
    let records: Vec<ServerRecord> = records
        .into_iter()
        .filter(|record| !record.message.trim().is_empty())
        .collect();

    tracing::debug!(
        code = "CONVERSATION_LOADED",
        restaurant_id = context.restaurant_id(),
        total,
        kept = records.len(),
        "conversation fetched"
    );

    Ok(ConversationSnapshot::from_records(records))
}

fn map_source_error(error: SourceError) -> LoadConversationError {
    match error {
        SourceError::Unauthorized => LoadConversationError::Unauthorized,
        SourceError::Unavailable => LoadConversationError::TemporarilyUnavailable,
        SourceError::InvalidData => LoadConversationError::DataContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use super::*;

    struct StubSource {
        result: Result<Vec<ServerRecord>, SourceError>,
        captured: Mutex<Option<(String, String)>>,
    }

    impl StubSource {
        fn with_result(result: Result<Vec<ServerRecord>, SourceError>) -> Self {
            Self {
                result,
                captured: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ConversationSource for StubSource {
        async fn conversation_records(
            &self,
            restaurant_id: &str,
            client_id: &str,
        ) -> Result<Vec<ServerRecord>, SourceError> {
            *self.captured.lock().expect("capture lock") =
                Some((restaurant_id.to_owned(), client_id.to_owned()));
            self.result.clone()
        }
    }

    fn record(text: &str, ai_enabled: Option<bool>) -> ServerRecord {
        ServerRecord {
            message: text.to_owned(),
            sender_type: Some("client".to_owned()),
            data_sender_type: None,
            timestamp: DateTime::<Utc>::from_timestamp(10, 0).expect("valid timestamp"),
            ai_enabled,
        }
    }

    fn context() -> ConversationContext {
        ConversationContext::new(Some("r1"), Some("c1"), Some("4")).expect("valid context")
    }

    #[tokio::test]
    async fn passes_conversation_identity_to_source() {
        let source = StubSource::with_result(Ok(vec![]));

        load_conversation(&source, &context())
            .await
            .expect("load should succeed");

        assert_eq!(
            *source.captured.lock().expect("capture lock"),
            Some(("r1".to_owned(), "c1".to_owned()))
        );
    }

    #[tokio::test]
    async fn drops_records_without_text() {
        let source = StubSource::with_result(Ok(vec![
            record("Hi", None),
            record("   ", Some(false)),
            record("", None),
        ]));

        let snapshot = load_conversation(&source, &context())
            .await
            .expect("load should succeed");

        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].message, "Hi");
        assert_eq!(snapshot.assistant_enabled, None);
    }

    #[tokio::test]
    async fn carries_assistant_flag_from_records() {
        let source = StubSource::with_result(Ok(vec![record("Hi", Some(false))]));

        let snapshot = load_conversation(&source, &context())
            .await
            .expect("load should succeed");

        assert_eq!(snapshot.assistant_enabled, Some(false));
    }

    #[tokio::test]
    async fn maps_source_errors() {
        let cases = [
            (SourceError::Unauthorized, LoadConversationError::Unauthorized),
            (
                SourceError::Unavailable,
                LoadConversationError::TemporarilyUnavailable,
            ),
            (
                SourceError::InvalidData,
                LoadConversationError::DataContractViolation,
            ),
        ];

        for (source_error, expected) in cases {
            let source = StubSource::with_result(Err(source_error));

            let result = load_conversation(&source, &context()).await;

            assert_eq!(result, Err(expected));
        }
    }
}
