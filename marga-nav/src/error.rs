//! Error types for the navigation crate.

use thiserror::Error;

/// Navigation error type.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("map error: {0}")]
    Map(#[from] bhumi_map::MapError),

    #[error("tracking error: {0}")]
    Tracking(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
