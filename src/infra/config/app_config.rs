use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Bearer token attached to every request. `TABLECHAT_ACCESS_TOKEN` takes precedence.
    pub access_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_owned(),
            request_timeout_ms: 10_000,
            access_token: None,
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    pub conversation_interval_ms: u64,
    pub monitor_interval_ms: u64,
    /// Zero disables the assistant status timer.
    pub status_interval_ms: u64,
    pub follow_up_refresh_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            conversation_interval_ms: 3_000,
            monitor_interval_ms: 5_000,
            status_interval_ms: 6_000,
            follow_up_refresh_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    pub restaurant_id: Option<String>,
    pub table_id: Option<String>,
    pub welcome_text: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            restaurant_id: None,
            table_id: None,
            welcome_text: "Hi! I'm your AI assistant. I can help you with information about our \
                           menu, ingredients, allergens, opening hours, and answer any questions \
                           you might have. What would you like to know?"
                .to_owned(),
        }
    }
}
