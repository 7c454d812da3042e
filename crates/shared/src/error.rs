use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ArtistId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Conflict,
    InsufficientData,
    ProviderUnavailable,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Everything that can stop a game from starting or advancing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("artist catalog unavailable: {0}")]
    Provider(String),
    #[error("not enough artists to play: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },
    #[error("artist pool is exhausted")]
    PoolExhausted,
    #[error("choice does not belong to the current round")]
    StaleChoice,
    #[error("game is already over")]
    GameOver,
    #[error("artist {0} is not a challenger in this round")]
    InvalidChoice(ArtistId),
}

impl GameError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Provider(_) => ErrorCode::ProviderUnavailable,
            Self::InsufficientData { .. } => ErrorCode::InsufficientData,
            Self::PoolExhausted => ErrorCode::Internal,
            Self::StaleChoice | Self::GameOver => ErrorCode::Conflict,
            Self::InvalidChoice(_) => ErrorCode::Validation,
        }
    }
}

impl From<GameError> for ApiError {
    fn from(value: GameError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
