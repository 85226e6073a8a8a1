//! Venue-side interfaces for the cross-exchange market-making engine.
//!
//! Provides what the strategy consumes from an exchange:
//! - `OrderBook`: L2 snapshot with VWAP-for-depth queries
//! - `Venue`: the adapter trait (readiness, balances, quantization,
//!   fire-and-forget order submission and cancel)
//! - `FxOracle`: quote-asset conversion rates
//! - `PaperVenue`: deterministic in-memory venue for paper trading and tests

pub mod book;
pub mod error;
pub mod fx;
pub mod paper;
pub mod venue;

pub use book::{BookLevel, OrderBook, VwapResult};
pub use error::VenueError;
pub use fx::{FixedRateOracle, FxOracle};
pub use paper::{PaperOrder, PaperVenue};
pub use venue::{NetworkStatus, OrderRequest, Venue};
