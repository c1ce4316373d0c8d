//! Assistant flag lookups and toggles, plus the backend health probe.

use async_trait::async_trait;

use crate::domain::{conversation::ConversationContext, events::RequestFailure};

use super::contracts::SourceError;

/// Latest assistant flag of one conversation of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStatus {
    pub client_id: String,
    pub ai_enabled: bool,
}

#[async_trait]
pub trait AssistantStatusSource: Send + Sync {
    async fn latest_statuses(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<ConversationStatus>, SourceError>;

    async fn set_assistant_enabled(
        &self,
        restaurant_id: &str,
        client_id: &str,
        enabled: bool,
    ) -> Result<(), SourceError>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check_health(&self) -> Result<(), SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantStatusError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

impl AssistantStatusError {
    pub fn failure(self) -> RequestFailure {
        match self {
            Self::Unauthorized => RequestFailure::Unauthorized,
            Self::TemporarilyUnavailable => RequestFailure::Unavailable,
            Self::DataContractViolation => RequestFailure::InvalidData,
        }
    }
}

/// Looks up the assistant flag for `context`. `Ok(None)` means the backend has no entry yet.
pub async fn check_assistant_status<S>(
    source: &S,
    context: &ConversationContext,
) -> Result<Option<bool>, AssistantStatusError>
where
    S: AssistantStatusSource + ?Sized,
{
    let statuses = source
        .latest_statuses(context.restaurant_id())
        .await
        .map_err(map_source_error)?;

    Ok(statuses
        .into_iter()
        .find(|status| status.client_id == context.client_id())
        .map(|status| status.ai_enabled))
}

pub async fn toggle_assistant<S>(
    source: &S,
    context: &ConversationContext,
    enabled: bool,
) -> Result<(), AssistantStatusError>
where
    S: AssistantStatusSource + ?Sized,
{
    source
        .set_assistant_enabled(context.restaurant_id(), context.client_id(), enabled)
        .await
        .map_err(map_source_error)?;

    tracing::info!(
        code = "ASSISTANT_TOGGLED",
        restaurant_id = context.restaurant_id(),
        enabled,
        "assistant flag updated"
    );

    Ok(())
}

/// Any failure, including an unexpected status payload, counts as unhealthy.
pub async fn is_backend_healthy<P>(probe: &P) -> bool
where
    P: HealthProbe + ?Sized,
{
    match probe.check_health().await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(code = "HEALTHCHECK_FAILED", ?error, "backend health check failed");
            false
        }
    }
}

fn map_source_error(error: SourceError) -> AssistantStatusError {
    match error {
        SourceError::Unauthorized => AssistantStatusError::Unauthorized,
        SourceError::Unavailable => AssistantStatusError::TemporarilyUnavailable,
        SourceError::InvalidData => AssistantStatusError::DataContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct StubStatusSource {
        statuses: Vec<ConversationStatus>,
        fail_with: Option<SourceError>,
        toggles: Mutex<Vec<(String, String, bool)>>,
    }

    #[async_trait]
    impl AssistantStatusSource for StubStatusSource {
        async fn latest_statuses(
            &self,
            _restaurant_id: &str,
        ) -> Result<Vec<ConversationStatus>, SourceError> {
            match self.fail_with {
                Some(error) => Err(error),
                None => Ok(self.statuses.clone()),
            }
        }

        async fn set_assistant_enabled(
            &self,
            restaurant_id: &str,
            client_id: &str,
            enabled: bool,
        ) -> Result<(), SourceError> {
            if let Some(error) = self.fail_with {
                return Err(error);
            }
            self.toggles.lock().expect("toggle lock").push((
                restaurant_id.to_owned(),
                client_id.to_owned(),
                enabled,
            ));
            Ok(())
        }
    }

    struct StubProbe(Result<(), SourceError>);

    #[async_trait]
    impl HealthProbe for StubProbe {
        async fn check_health(&self) -> Result<(), SourceError> {
            self.0
        }
    }

    fn context() -> ConversationContext {
        ConversationContext::new(Some("r1"), Some("c2"), None).expect("valid context")
    }

    fn status(client_id: &str, ai_enabled: bool) -> ConversationStatus {
        ConversationStatus {
            client_id: client_id.to_owned(),
            ai_enabled,
        }
    }

    #[tokio::test]
    async fn picks_the_entry_for_this_client() {
        let source = StubStatusSource {
            statuses: vec![status("c1", true), status("c2", false)],
            ..StubStatusSource::default()
        };

        let flag = check_assistant_status(&source, &context()).await;

        assert_eq!(flag, Ok(Some(false)));
    }

    #[tokio::test]
    async fn unknown_client_yields_no_flag() {
        let source = StubStatusSource {
            statuses: vec![status("c1", true)],
            ..StubStatusSource::default()
        };

        let flag = check_assistant_status(&source, &context()).await;

        assert_eq!(flag, Ok(None));
    }

    #[tokio::test]
    async fn toggle_forwards_conversation_and_flag() {
        let source = StubStatusSource::default();

        toggle_assistant(&source, &context(), false)
            .await
            .expect("toggle should succeed");

        assert_eq!(
            *source.toggles.lock().expect("toggle lock"),
            vec![("r1".to_owned(), "c2".to_owned(), false)]
        );
    }

    #[tokio::test]
    async fn maps_status_errors() {
        let source = StubStatusSource {
            fail_with: Some(SourceError::Unauthorized),
            ..StubStatusSource::default()
        };

        assert_eq!(
            check_assistant_status(&source, &context()).await,
            Err(AssistantStatusError::Unauthorized)
        );
        assert_eq!(
            toggle_assistant(&source, &context(), true).await,
            Err(AssistantStatusError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn health_follows_probe_result() {
        assert!(is_backend_healthy(&StubProbe(Ok(()))).await);
        assert!(!is_backend_healthy(&StubProbe(Err(SourceError::Unavailable))).await);
    }
}
