mod app_config;
mod file_config;
mod loader;

pub use app_config::{AppConfig, BackendConfig, ChatConfig, LogConfig, PollingConfig};
pub use loader::{load, ACCESS_TOKEN_ENV};
