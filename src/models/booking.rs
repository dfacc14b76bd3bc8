//! Booking, guest and blocked-date models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Booking lifecycle state.
///
/// `pending → confirmed | cancelled`, `confirmed → cancelled`; nothing
/// ever returns to pending. Cancellation is the terminal state and the
/// only form of deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Whether the state machine allows this transition
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Booking from the `bookings` table.
///
/// The price fields are a copy of the breakdown computed at submission
/// time; later catalog edits do not reprice existing bookings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_adults: i32,
    pub num_children: i32,
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_amount: Decimal,
    pub deposit_paid: bool,
    pub deposit_due_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub remaining_amount: Decimal,
    pub remaining_paid: bool,
    pub remaining_due_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub room_surcharge: Decimal,
    pub selected_fee_ids: Vec<Uuid>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub manual_discount_percentage: Option<Decimal>,
    pub manual_discount_reason: Option<String>,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

/// Guest from the `guests` table. Matched by email across bookings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guest {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub preferred_language: String,
    pub marketing_consent: bool,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Administrator-declared unavailable range, independent of bookings
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlockedDate {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_confirm_or_cancel() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_confirmed_can_only_cancel() {
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Confirmed));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_no_transition_back_to_pending() {
        for status in [BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert!(!status.can_transition_to(BookingStatus::Pending));
        }
    }
}
