//! Core domain types for the cross-exchange market-making engine.
//!
//! This crate provides the fundamental types shared across the system:
//! - `Price`, `Size`: precision-safe decimal newtypes with grid quantization
//! - `TradingPair`, `PairId`: venue symbols and stable internal pair handles
//! - `OrderSide`, `OrderType`, `ClientOrderId`, `TrackedOrder`: order model
//! - venue event payloads

pub mod decimal;
pub mod error;
pub mod events;
pub mod market;
pub mod order;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use events::{OrderCancelledEvent, OrderCompletedEvent, OrderFilledEvent, VenueEvent};
pub use market::{PairId, TradingPair};
pub use order::{ClientOrderId, OrderSide, OrderType, TrackedOrder};
