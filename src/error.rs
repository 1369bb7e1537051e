use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Catalog download from {url} failed with status {status}")]
    CatalogDownload { status: StatusCode, url: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Monster catalog is not loaded yet")]
    CatalogUnavailable,

    #[error("Catalog refresh failed: {0}")]
    RefreshFailed(String),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns a user-friendly error message suitable for displaying in Discord
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::Serenity(_) => {
                "Sorry, I'm having trouble communicating with Discord right now. Please try again later.".to_string()
            }
            BotError::Config(_) | BotError::EnvVar(_) | BotError::Url(_) => {
                "Sorry, there's a configuration issue on my end. Please contact the bot administrator.".to_string()
            }
            BotError::Reqwest(_) | BotError::CatalogDownload { .. } => {
                "Sorry, I couldn't fetch the monster database. Please try again later.".to_string()
            }
            BotError::Sqlite(_) | BotError::RefreshFailed(_) => {
                "Sorry, the monster database looks broken right now. Please try again later.".to_string()
            }
            BotError::CatalogUnavailable => {
                "The monster database is still loading. Please try again in a minute.".to_string()
            }
            BotError::Io(_) | BotError::Json(_) | BotError::TaskJoin(_) => {
                "Sorry, something went wrong on my end. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_catalog_has_loading_message() {
        let message = BotError::CatalogUnavailable.user_message();
        assert!(message.contains("still loading"));
    }

    #[test]
    fn download_failure_mentions_status() {
        let err = BotError::CatalogDownload {
            status: StatusCode::NOT_FOUND,
            url: "https://example.com/catalog.sqlite".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.user_message().contains("monster database"));
    }
}
