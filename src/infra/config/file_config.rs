use serde::Deserialize;

use crate::infra::config::{AppConfig, BackendConfig, ChatConfig, LogConfig, PollingConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub polling: Option<FilePollingConfig>,
    pub chat: Option<FileChatConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(polling) = self.polling {
            polling.merge_into(&mut config.polling);
        }

        if let Some(chat) = self.chat {
            chat.merge_into(&mut config.chat);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct FileBackendConfig {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for FileBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackendConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }

        if let Some(token) = self.access_token.filter(|token| !token.trim().is_empty()) {
            config.access_token = Some(token);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePollingConfig {
    pub conversation_interval_ms: Option<u64>,
    pub monitor_interval_ms: Option<u64>,
    pub status_interval_ms: Option<u64>,
    pub follow_up_refresh_ms: Option<u64>,
}

impl FilePollingConfig {
    fn merge_into(self, config: &mut PollingConfig) {
        if let Some(value) = self.conversation_interval_ms {
            config.conversation_interval_ms = value;
        }

        if let Some(value) = self.monitor_interval_ms {
            config.monitor_interval_ms = value;
        }

        if let Some(value) = self.status_interval_ms {
            config.status_interval_ms = value;
        }

        if let Some(value) = self.follow_up_refresh_ms {
            config.follow_up_refresh_ms = value;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub restaurant_id: Option<String>,
    pub table_id: Option<String>,
    pub welcome_text: Option<String>,
}

impl FileChatConfig {
    fn merge_into(self, config: &mut ChatConfig) {
        if let Some(restaurant_id) = self.restaurant_id {
            config.restaurant_id = Some(restaurant_id);
        }

        if let Some(table_id) = self.table_id {
            config.table_id = Some(table_id);
        }

        if let Some(welcome_text) = self.welcome_text {
            config.welcome_text = welcome_text;
        }
    }
}
