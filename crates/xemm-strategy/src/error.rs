//! Error types for xemm-strategy.

use thiserror::Error;
use xemm_core::PairId;
use xemm_venue::VenueError;

/// Strategy errors.
///
/// Configuration variants are fatal at construction; venue variants are
/// caught at the per-pair processing boundary and logged, never allowed to
/// take down the tick loop.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No market pairs configured")]
    NoPairs,

    #[error("Duplicate market pair handle: {0}")]
    DuplicatePair(PairId),

    #[error(transparent)]
    Venue(#[from] VenueError),
}

/// Result type alias for strategy operations.
pub type Result<T> = std::result::Result<T, StrategyError>;
