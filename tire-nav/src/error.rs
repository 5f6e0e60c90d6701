//! Error types for tire-nav

use thiserror::Error;

/// tire-nav error type
#[derive(Error, Debug)]
pub enum NavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Map error: {0}")]
    Map(#[from] tire_core::MapError),

    #[error("Device error: {0}")]
    Device(#[from] tire_hal::Error),

    #[error("Thread error: {0}")]
    Thread(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
