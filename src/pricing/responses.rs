//! Response DTOs for the pricing API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::availability::UnavailableReason;
use super::calculators::{DiscountLine, DiscountSource, FeeLine, PriceBreakdown};
use super::models::{DiscountType, PaymentLocation};

/// A resolved fee charge on the wire
#[derive(Debug, Clone, Serialize)]
pub struct FeeLineResponse {
    pub fee_id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub payment_location: PaymentLocation,
}

impl From<FeeLine> for FeeLineResponse {
    fn from(line: FeeLine) -> Self {
        Self {
            fee_id: line.fee_id,
            name: line.name,
            amount: line.amount,
            payment_location: line.payment_location,
        }
    }
}

/// A resolved discount on the wire
#[derive(Debug, Clone, Serialize)]
pub struct DiscountLineResponse {
    pub kind: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub percentage: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

impl From<DiscountLine> for DiscountLineResponse {
    fn from(line: DiscountLine) -> Self {
        let kind = match line.source {
            DiscountSource::Catalog(DiscountType::EarlyBird) => "early_bird",
            DiscountSource::Catalog(DiscountType::LastMinute) => "last_minute",
            DiscountSource::Catalog(DiscountType::LongStay) => "long_stay",
            DiscountSource::Manual => "manual",
        };
        Self {
            kind: kind.to_string(),
            percentage: line.percentage,
            amount: line.amount,
        }
    }
}

/// Full price breakdown returned by the quote endpoint
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub nights: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub surcharge_total: Decimal,
    pub mandatory_fees: Vec<FeeLineResponse>,
    pub optional_fees: Vec<FeeLineResponse>,
    pub discounts: Vec<DiscountLineResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_online: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_on_site: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub remaining_amount: Decimal,
    pub deposit_due_date: NaiveDate,
    pub remaining_due_date: NaiveDate,
}

impl From<PriceBreakdown> for QuoteResponse {
    fn from(b: PriceBreakdown) -> Self {
        Self {
            nights: b.nights,
            base_total: b.base_total,
            surcharge_total: b.surcharge_total,
            mandatory_fees: b.mandatory_fees.into_iter().map(Into::into).collect(),
            optional_fees: b.optional_fees.into_iter().map(Into::into).collect(),
            discounts: b.discounts.into_iter().map(Into::into).collect(),
            total_online: b.total_online,
            total_on_site: b.total_on_site,
            deposit_amount: b.deposit_amount,
            remaining_amount: b.remaining_amount,
            deposit_due_date: b.deposit_due_date,
            remaining_due_date: b.remaining_due_date,
        }
    }
}

/// Availability verdict for a candidate range
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub detail: Option<UnavailableReason>,
}

impl AvailabilityResponse {
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
            detail: None,
        }
    }

    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self {
            available: false,
            reason: Some(reason.to_string()),
            detail: Some(reason),
        }
    }
}

/// Occupied nights for calendar highlighting
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub occupied: Vec<NaiveDate>,
}
