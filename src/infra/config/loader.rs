use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ACCESS_TOKEN_ENV: &str = "TABLECHAT_ACCESS_TOKEN";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    load_with_token_override(path, env::var(ACCESS_TOKEN_ENV).ok())
}

pub(crate) fn load_with_token_override(
    path: Option<&Path>,
    token_override: Option<String>,
) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if config_path.exists() {
        let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
            path: config_path.clone(),
            source,
        })?;

        let file_config: FileConfig =
            toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
                path: config_path,
                source,
            })?;

        file_config.merge_into(&mut config);
    }

    if let Some(token) = token_override.filter(|token| !token.trim().is_empty()) {
        config.backend.access_token = Some(token);
    }

    Ok(config)
}
