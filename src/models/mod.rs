//! Database models shared across modules

pub mod booking;
pub mod content;

pub use booking::{BlockedDate, Booking, BookingStatus, Guest};
pub use content::{BlogPost, BlogPostSummary, Event, Message};
