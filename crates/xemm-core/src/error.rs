//! Error types for xemm-core.

use thiserror::Error;

/// Parse errors for core domain types, surfaced through their `FromStr`
/// implementations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid trading pair symbol: {0}")]
    InvalidPair(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
