use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::{
    domain::conversation::ServerRecord,
    infra::{config::BackendConfig, error::AppError},
    usecases::{
        assistant_status::{AssistantStatusSource, ConversationStatus, HealthProbe},
        contracts::SourceError,
        load_conversation::ConversationSource,
        send_message::{MessageSender, OutgoingMessage},
    },
};

use super::wire::{self, HealthResponse, SendRequest, SendResponse, ToggleRequest};

/// Talks to the chat backend over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpChatBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(AppError::HttpClientBuild)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            access_token: config
                .access_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<Response, SourceError> {
        let response = self.authorized(request).send().await.map_err(|error| {
            tracing::warn!(code = "HTTP_TRANSPORT_FAILED", endpoint, %error, "request failed");
            SourceError::Unavailable
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!(
            code = "HTTP_STATUS_FAILED",
            endpoint,
            status = status.as_u16(),
            "backend returned an error status"
        );
        Err(classify_status(status))
    }

    async fn read_json(response: Response, endpoint: &'static str) -> Result<Value, SourceError> {
        response.json::<Value>().await.map_err(|error| {
            tracing::warn!(code = "HTTP_BODY_INVALID", endpoint, %error, "could not decode body");
            if error.is_decode() {
                SourceError::InvalidData
            } else {
                SourceError::Unavailable
            }
        })
    }
}

fn classify_status(status: StatusCode) -> SourceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized,
        _ => SourceError::Unavailable,
    }
}

#[async_trait]
impl ConversationSource for HttpChatBackend {
    async fn conversation_records(
        &self,
        restaurant_id: &str,
        client_id: &str,
    ) -> Result<Vec<ServerRecord>, SourceError> {
        const ENDPOINT: &str = "/chat/logs/client";

        let request = self
            .client
            .get(self.url(ENDPOINT))
            .query(&[("restaurant_id", restaurant_id), ("client_id", client_id)]);
        let response = self.execute(request, ENDPOINT).await?;
        let body = Self::read_json(response, ENDPOINT).await?;

        Ok(wire::parse_records(body))
    }
}

#[async_trait]
impl MessageSender for HttpChatBackend {
    async fn send_message(
        &self,
        message: &OutgoingMessage<'_>,
    ) -> Result<Option<String>, SourceError> {
        const ENDPOINT: &str = "/chat";

        let request = self
            .client
            .post(self.url(ENDPOINT))
            .json(&SendRequest::from_outgoing(message));
        let response = self.execute(request, ENDPOINT).await?;

        let body = response.text().await.map_err(|error| {
            tracing::warn!(
                code = "HTTP_BODY_INVALID",
                endpoint = ENDPOINT,
                %error,
                "could not read body"
            );
            SourceError::Unavailable
        })?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: SendResponse = serde_json::from_str(&body).map_err(|error| {
            tracing::warn!(
                code = "HTTP_BODY_INVALID",
                endpoint = ENDPOINT,
                %error,
                "could not decode body"
            );
            SourceError::InvalidData
        })?;

        Ok(parsed.answer)
    }
}

#[async_trait]
impl AssistantStatusSource for HttpChatBackend {
    async fn latest_statuses(
        &self,
        restaurant_id: &str,
    ) -> Result<Vec<ConversationStatus>, SourceError> {
        const ENDPOINT: &str = "/chat/logs/latest";

        let request = self
            .client
            .get(self.url(ENDPOINT))
            .query(&[("restaurant_id", restaurant_id)]);
        let response = self.execute(request, ENDPOINT).await?;
        let body = Self::read_json(response, ENDPOINT).await?;

        Ok(wire::parse_statuses(body))
    }

    async fn set_assistant_enabled(
        &self,
        restaurant_id: &str,
        client_id: &str,
        enabled: bool,
    ) -> Result<(), SourceError> {
        const ENDPOINT: &str = "/chat/logs/toggle-ai";

        let request = self.client.post(self.url(ENDPOINT)).json(&ToggleRequest {
            restaurant_id,
            client_id,
            enabled,
        });
        self.execute(request, ENDPOINT).await?;

        Ok(())
    }
}

#[async_trait]
impl HealthProbe for HttpChatBackend {
    async fn check_health(&self) -> Result<(), SourceError> {
        const ENDPOINT: &str = "/healthcheck";

        let response = self
            .execute(self.client.get(self.url(ENDPOINT)), ENDPOINT)
            .await?;
        let body = Self::read_json(response, ENDPOINT).await?;
        let health: HealthResponse =
            serde_json::from_value(body).map_err(|_| SourceError::InvalidData)?;

        if health.status == "ok" {
            Ok(())
        } else {
            Err(SourceError::Unavailable)
        }
    }
}
