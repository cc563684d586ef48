//! Environment configuration for the terminal front-end.

use thiserror::Error;
use todo_core::UserId;

pub const API_URL_VAR: &str = "TODO_API_URL";
pub const USER_ID_VAR: &str = "TODO_USER_ID";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TODO_USER_ID is not set\n  hint: export TODO_USER_ID=<id> to pick a user")]
    MissingUserId,

    #[error("invalid TODO_USER_ID '{0}'\n  hint: the user id must be a positive integer")]
    InvalidUserId(String),

    #[error("TODO_API_URL is empty")]
    EmptyApiUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub user_id: UserId,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        let raw = lookup(USER_ID_VAR).ok_or(ConfigError::MissingUserId)?;
        let user_id = match raw.trim().parse::<UserId>() {
            Ok(0) | Err(_) => return Err(ConfigError::InvalidUserId(raw)),
            Ok(id) => id,
        };

        Ok(Self {
            api_url: api_url.trim().to_string(),
            user_id,
        })
    }
}
