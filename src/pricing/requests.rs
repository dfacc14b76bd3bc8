//! Request DTOs for the pricing and admin API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{CalculationType, DiscountType, FeeKind, PaymentLocation, SeasonType};

fn default_locale() -> String {
    "de".to_string()
}

fn default_adults() -> i32 {
    2
}

/// Request to price a candidate stay
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_adults")]
    pub num_adults: i32,
    #[serde(default)]
    pub num_children: i32,
    #[serde(default)]
    pub second_bedroom: bool,
    #[serde(default)]
    pub selected_fee_ids: Vec<Uuid>,
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Query parameters for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Query parameters for the occupied-days calendar
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Admin payload for creating or updating a pricing period
#[derive(Debug, Deserialize)]
pub struct PricingPeriodInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub season_type: SeasonType,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub room_surcharge: Decimal,
    pub min_nights: i32,
    pub max_nights: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "crate::pricing::requests::default_true")]
    pub is_active: bool,
}

/// Admin payload for creating or updating a fee
#[derive(Debug, Deserialize)]
pub struct FeeInput {
    pub names: serde_json::Value,
    pub fee_kind: FeeKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub calculation_type: CalculationType,
    pub payment_location: PaymentLocation,
    #[serde(default = "crate::pricing::requests::default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Admin payload for creating or updating a discount rule
#[derive(Debug, Deserialize)]
pub struct DiscountInput {
    pub discount_type: DiscountType,
    pub min_value: i32,
    #[serde(default)]
    pub max_value: Option<i32>,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percentage: Decimal,
    #[serde(default = "crate::pricing::requests::default_true")]
    pub is_active: bool,
}

/// Admin payload for updating the payment settings singleton
#[derive(Debug, Deserialize)]
pub struct PaymentSettingsInput {
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_percentage: Decimal,
    pub deposit_due_days: i32,
    pub remaining_due_days: i32,
    pub bank_name: String,
    pub bank_iban: String,
    pub bank_bic: String,
    pub account_holder: String,
}

pub(crate) fn default_true() -> bool {
    true
}
