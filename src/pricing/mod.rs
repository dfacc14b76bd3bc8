//! Pricing engine for the apartment.
//!
//! Seasonal periods, fees, discounts and the deposit split, plus the
//! availability rules that gate every quote. The calculators are pure;
//! services add the database and cache.

pub mod availability;
pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use availability::{check_availability, DateRange, UnavailableReason};
pub use calculators::{price_stay, round_money, PriceBreakdown};
pub use routes::router;
pub use services::{quote_stay, QuoteError};
