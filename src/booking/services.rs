//! Booking lifecycle services.
//!
//! Booking creation runs inside a single transaction: the availability
//! check and the guest and booking writes either all land or none do,
//! closing the double-booking race between concurrent submissions.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;
use crate::models::{Booking, BookingStatus, Guest};
use crate::pricing::availability::{check_availability, DateRange};
use crate::pricing::calculators::{price_stay, PriceBreakdown, StayQuoteInput};
use crate::pricing::queries as pricing_queries;
use crate::pricing::services::{catalog_snapshot, validate_stay, QuoteError};

use super::queries;
use super::requests::{BookingRequest, GuestInput};

/// Booking failure modes
#[derive(Debug)]
pub enum BookingError {
    Quote(QuoteError),
    Validation(String),
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    Database(AppError),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::Quote(e) => write!(f, "{}", e),
            BookingError::Validation(msg) => write!(f, "{}", msg),
            BookingError::InvalidTransition { from, to } => {
                write!(f, "Statuswechsel von '{}' nach '{}' ist nicht möglich.", from, to)
            }
            BookingError::Database(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<QuoteError> for BookingError {
    fn from(e: QuoteError) -> Self {
        BookingError::Quote(e)
    }
}

impl From<AppError> for BookingError {
    fn from(e: AppError) -> Self {
        BookingError::Database(e)
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        BookingError::Database(AppError::Database(e))
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Quote(inner) => inner.into(),
            BookingError::Validation(msg) => AppError::Validation(msg),
            BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            BookingError::Database(inner) => inner,
        }
    }
}

/// Generate a guest-facing booking reference, e.g. `CB-1A2B3C`
pub fn new_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("CB-{}", id[..6].to_uppercase())
}

/// Reject malformed guest data before touching the database
pub fn validate_guest(guest: &GuestInput) -> Result<(), BookingError> {
    if guest.first_name.trim().is_empty() || guest.last_name.trim().is_empty() {
        return Err(BookingError::Validation(
            "Bitte Vor- und Nachnamen angeben.".to_string(),
        ));
    }
    let email = guest.email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(BookingError::Validation(
            "Bitte eine gültige E-Mail-Adresse angeben.".to_string(),
        ));
    }
    Ok(())
}

/// Create a booking.
///
/// Guest matching, the availability re-check and both inserts run in one
/// transaction. The stored price fields are the breakdown computed here;
/// the returned breakdown is what the confirmation email renders.
/// `allow_manual_discount` is true only for the admin form.
pub async fn create_booking(
    pool: &PgPool,
    cache: &AppCache,
    req: &BookingRequest,
    today: NaiveDate,
    allow_manual_discount: bool,
) -> Result<(Booking, Guest, PriceBreakdown), BookingError> {
    let quote_req = req.quote_request();
    validate_stay(&quote_req)?;
    validate_guest(&req.guest)?;

    let catalog = catalog_snapshot(pool, cache).await?;
    let period = catalog
        .period_for(req.start_date)
        .ok_or(QuoteError::NoPricingPeriod {
            start_date: req.start_date,
        })?;

    let manual_discount = if allow_manual_discount {
        req.manual_discount_percentage
    } else {
        None
    };

    let mut tx = pool.begin().await?;

    // Availability is checked against committed rows inside the same
    // transaction that inserts the booking.
    let stay = DateRange::new(req.start_date, req.end_date);
    let bookings = pricing_queries::overlapping_bookings(&mut *tx, stay).await?;
    let blocks = pricing_queries::overlapping_blocks(&mut *tx, stay).await?;
    check_availability(stay, &bookings, &blocks, period)
        .map_err(|reason| QuoteError::Unavailable(reason))?;

    let breakdown = price_stay(&StayQuoteInput {
        period,
        settings: &catalog.settings,
        fees: &catalog.fees,
        discounts: &catalog.discounts,
        start_date: req.start_date,
        end_date: req.end_date,
        num_adults: req.num_adults,
        num_children: req.num_children,
        second_bedroom: req.second_bedroom,
        selected_fee_ids: &req.selected_fee_ids,
        manual_discount_percentage: manual_discount,
        locale: &req.guest.preferred_language,
        today,
    });

    let guest = match queries::find_guest_by_email(&mut *tx, &req.guest.email).await? {
        Some(existing) => queries::update_guest(&mut *tx, existing.id, &req.guest).await?,
        None => queries::insert_guest(&mut *tx, &req.guest).await?,
    };

    let reference = new_reference();
    let booking = queries::insert_booking(
        &mut *tx,
        guest.id,
        req.start_date,
        req.end_date,
        req.num_adults,
        req.num_children,
        &req.selected_fee_ids,
        manual_discount,
        req.manual_discount_reason.as_deref(),
        &reference,
        &breakdown,
    )
    .await?;

    tx.commit().await?;

    info!(
        reference = %booking.reference,
        start = %booking.start_date,
        end = %booking.end_date,
        "booking created"
    );

    Ok((booking, guest, breakdown))
}

/// Apply a status change, enforcing the state machine
pub async fn transition_status(
    pool: &PgPool,
    id: Uuid,
    next: BookingStatus,
) -> Result<Booking, BookingError> {
    let booking = queries::get_booking(pool, id).await?;

    if !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }

    let updated = queries::update_booking_status(pool, id, next).await?;
    info!(reference = %updated.reference, from = %booking.status, to = %next, "booking status changed");

    Ok(updated)
}

/// Start the background sweeper for unpaid pending bookings.
///
/// Pending bookings hold calendar slots; once their deposit due date has
/// passed unpaid they are cancelled so the dates free up again.
pub async fn start_pending_sweeper(pool: PgPool) {
    let mut interval = interval(Duration::from_secs(60 * 60));
    loop {
        interval.tick().await;
        sweep_overdue_pending(&pool).await;
    }
}

async fn sweep_overdue_pending(pool: &PgPool) {
    let today = Utc::now().date_naive();
    match queries::expire_overdue_pending(pool, today).await {
        Ok(expired) => {
            for booking in &expired {
                info!(
                    reference = %booking.reference,
                    due = %booking.deposit_due_date,
                    "pending booking expired, deposit overdue"
                );
            }
        }
        Err(e) => warn!("pending-booking sweep failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest() -> GuestInput {
        GuestInput {
            first_name: "Anna".to_string(),
            last_name: "Muster".to_string(),
            email: "anna@example.com".to_string(),
            phone: None,
            preferred_language: "de".to_string(),
            marketing_consent: false,
            street: None,
            postal_code: None,
            city: None,
            country: None,
        }
    }

    #[test]
    fn test_reference_format() {
        let reference = new_reference();
        assert!(reference.starts_with("CB-"));
        assert_eq!(reference.len(), 9);
        assert!(reference[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_references_are_unique_enough() {
        let a = new_reference();
        let b = new_reference();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_guest_accepts_complete_input() {
        assert!(validate_guest(&guest()).is_ok());
    }

    #[test]
    fn test_validate_guest_rejects_blank_name() {
        let mut g = guest();
        g.last_name = "  ".to_string();
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_guest_rejects_bad_email() {
        let mut g = guest();
        g.email = "not-an-email".to_string();
        assert!(matches!(
            validate_guest(&g),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_transition_maps_to_conflict() {
        let err: AppError = BookingError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        }
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
