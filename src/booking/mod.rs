//! Booking creation, lifecycle and blocked-date management.

pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{create_booking, transition_status, BookingError};
