//! Application error types.

use thiserror::Error;

/// Top-level application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Strategy(#[from] xemm_strategy::StrategyError),
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
