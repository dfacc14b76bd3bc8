//! Request DTOs for booking submission and admin booking management.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::BookingStatus;
use crate::pricing::requests::QuoteRequest;

fn default_language() -> String {
    "de".to_string()
}

/// Guest contact data submitted with a booking
#[derive(Debug, Clone, Deserialize)]
pub struct GuestInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default)]
    pub marketing_consent: bool,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Booking submission from the guest form or the admin form.
///
/// The manual discount fields are only honored on the admin form; the
/// public endpoint ignores them.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_adults: i32,
    #[serde(default)]
    pub num_children: i32,
    #[serde(default)]
    pub second_bedroom: bool,
    #[serde(default)]
    pub selected_fee_ids: Vec<Uuid>,
    pub guest: GuestInput,
    #[serde(default)]
    pub manual_discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub manual_discount_reason: Option<String>,
}

impl BookingRequest {
    /// The pricing view of this submission
    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            start_date: self.start_date,
            end_date: self.end_date,
            num_adults: self.num_adults,
            num_children: self.num_children,
            second_bedroom: self.second_bedroom,
            selected_fee_ids: self.selected_fee_ids.clone(),
            locale: self.guest.preferred_language.clone(),
        }
    }
}

/// Admin status change
#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: BookingStatus,
}

/// Admin payment-flag change; omitted flags are left untouched
#[derive(Debug, Deserialize)]
pub struct PaymentFlagsInput {
    #[serde(default)]
    pub deposit_paid: Option<bool>,
    #[serde(default)]
    pub remaining_paid: Option<bool>,
}

/// Admin payload for a blocked range
#[derive(Debug, Deserialize)]
pub struct BlockedDateInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}
