//! Response DTOs for the booking API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};
use crate::pricing::models::PaymentSettings;
use crate::pricing::responses::QuoteResponse;

/// Bank transfer coordinates shown to the guest after submission
#[derive(Debug, Clone, Serialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub bank_iban: String,
    pub bank_bic: String,
    pub account_holder: String,
}

impl From<&PaymentSettings> for BankDetails {
    fn from(settings: &PaymentSettings) -> Self {
        Self {
            bank_name: settings.bank_name.clone(),
            bank_iban: settings.bank_iban.clone(),
            bank_bic: settings.bank_bic.clone(),
            account_holder: settings.account_holder.clone(),
        }
    }
}

/// Returned by the booking submission endpoint
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub reference: String,
    pub status: BookingStatus,
    pub quote: QuoteResponse,
    pub bank: BankDetails,
}

/// Public view of a booking, looked up by reference
#[derive(Debug, Serialize)]
pub struct BookingSummaryResponse {
    pub reference: String,
    pub status: BookingStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
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
}

impl From<Booking> for BookingSummaryResponse {
    fn from(b: Booking) -> Self {
        Self {
            reference: b.reference,
            status: b.status,
            start_date: b.start_date,
            end_date: b.end_date,
            total_price: b.total_price,
            deposit_amount: b.deposit_amount,
            deposit_paid: b.deposit_paid,
            deposit_due_date: b.deposit_due_date,
            remaining_amount: b.remaining_amount,
            remaining_paid: b.remaining_paid,
            remaining_due_date: b.remaining_due_date,
        }
    }
}
