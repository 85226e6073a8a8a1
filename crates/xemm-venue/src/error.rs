//! Error types for xemm-venue.

use thiserror::Error;

/// Venue adapter errors.
///
/// Expected market conditions (empty book, zero size) are `None`/zero
/// results on the query methods, never errors; this enum covers genuine
/// submission failures.
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("Venue not connected")]
    NotConnected,

    #[error("Unknown trading pair: {0}")]
    UnknownPair(String),

    #[error("Insufficient {asset} balance: needed {needed}, available {available}")]
    InsufficientBalance {
        asset: String,
        needed: String,
        available: String,
    },

    #[error("Order rejected: {0}")]
    Rejected(String),
}

/// Result type alias for venue operations.
pub type Result<T> = std::result::Result<T, VenueError>;
