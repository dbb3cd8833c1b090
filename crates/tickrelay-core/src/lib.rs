//! Core domain types for the tickrelay price ingestion service.
//!
//! This crate provides the fundamental types shared across the workspace:
//! - `Asset`: a tradable instrument with identity fields and its latest price
//! - `PriceQuote`: a single last-trade observation (price + timestamp)
//! - `CoreError`: base error type

pub mod asset;
pub mod error;

pub use asset::{Asset, PriceQuote};
pub use error::{CoreError, Result};
