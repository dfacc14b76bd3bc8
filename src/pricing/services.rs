//! Pricing service functions with database access.
//!
//! These functions load the catalog snapshot (through the cache), gate a
//! candidate stay on availability and hand the pure calculators a fully
//! resolved input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::AppCache;
use crate::error::AppError;

use super::availability::{check_availability, occupied_days, DateRange, UnavailableReason};
use super::calculators::{price_stay, PriceBreakdown, StayQuoteInput};
use super::models::PricingCatalog;
use super::queries;
use super::requests::{CalendarQuery, QuoteRequest};
use super::responses::AvailabilityResponse;

/// Minimum-nights figure the booking form shows before a pricing period
/// is known. Presentation convenience only; the period's own constraint
/// is what is enforced.
pub const FALLBACK_MIN_NIGHTS: i32 = 4;

const CATALOG_KEY: &str = "catalog";

/// Quote failure modes
#[derive(Debug)]
pub enum QuoteError {
    InvalidRange(String),
    NoPricingPeriod { start_date: NaiveDate },
    Unavailable(UnavailableReason),
    Database(AppError),
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::InvalidRange(msg) => write!(f, "{}", msg),
            QuoteError::NoPricingPeriod { start_date } => {
                write!(f, "Für den {} sind keine Preise hinterlegt.", start_date)
            }
            QuoteError::Unavailable(reason) => write!(f, "{}", reason),
            QuoteError::Database(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for QuoteError {}

impl From<AppError> for QuoteError {
    fn from(e: AppError) -> Self {
        QuoteError::Database(e)
    }
}

impl From<QuoteError> for AppError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::InvalidRange(msg) => AppError::Validation(msg),
            QuoteError::NoPricingPeriod { .. } => AppError::Validation(e.to_string()),
            QuoteError::Unavailable(reason) => AppError::Conflict(reason.to_string()),
            QuoteError::Database(inner) => inner,
        }
    }
}

/// Get the pricing catalog, from cache when fresh.
///
/// The returned snapshot is immutable; a whole quote is computed against
/// one snapshot even if an administrator edits rates mid-request.
pub async fn catalog_snapshot(
    pool: &PgPool,
    cache: &AppCache,
) -> Result<Arc<PricingCatalog>, AppError> {
    if let Some(cached) = cache.catalog.get(CATALOG_KEY).await {
        tracing::debug!("Cache HIT for pricing catalog");
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for pricing catalog");
    let catalog = Arc::new(queries::load_catalog(pool).await?);
    cache
        .catalog
        .insert(CATALOG_KEY.to_string(), catalog.clone())
        .await;

    Ok(catalog)
}

/// Reject malformed stay requests before touching the database
pub fn validate_stay(req: &QuoteRequest) -> Result<(), QuoteError> {
    if req.end_date <= req.start_date {
        return Err(QuoteError::InvalidRange(
            "Das Abreisedatum muss nach dem Anreisedatum liegen.".to_string(),
        ));
    }
    if req.num_adults < 1 {
        return Err(QuoteError::InvalidRange(
            "Mindestens ein Erwachsener ist erforderlich.".to_string(),
        ));
    }
    if req.num_children < 0 {
        return Err(QuoteError::InvalidRange(
            "Ungültige Kinderanzahl.".to_string(),
        ));
    }
    Ok(())
}

/// Price a candidate stay.
///
/// Availability gates the quote: an occupied or blocked range never gets
/// a price. `manual_discount_percentage` is only supplied by the admin
/// booking form.
pub async fn quote_stay(
    pool: &PgPool,
    cache: &AppCache,
    req: &QuoteRequest,
    manual_discount_percentage: Option<Decimal>,
    today: NaiveDate,
) -> Result<PriceBreakdown, QuoteError> {
    validate_stay(req)?;

    let catalog = catalog_snapshot(pool, cache).await?;
    let period = catalog
        .period_for(req.start_date)
        .ok_or(QuoteError::NoPricingPeriod {
            start_date: req.start_date,
        })?;

    let stay = DateRange::new(req.start_date, req.end_date);
    let bookings = queries::overlapping_bookings(pool, stay).await?;
    let blocks = queries::overlapping_blocks(pool, stay).await?;
    check_availability(stay, &bookings, &blocks, period).map_err(QuoteError::Unavailable)?;

    let input = StayQuoteInput {
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
        manual_discount_percentage,
        locale: &req.locale,
        today,
    };

    Ok(price_stay(&input))
}

/// Availability verdict for a candidate range, as a value.
///
/// A missing pricing period also renders the range unbookable, with its
/// own message rather than an availability reason.
pub async fn availability_for(
    pool: &PgPool,
    cache: &AppCache,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<AvailabilityResponse, AppError> {
    if end_date <= start_date {
        return Err(AppError::Validation(
            "Das Abreisedatum muss nach dem Anreisedatum liegen.".to_string(),
        ));
    }

    let catalog = catalog_snapshot(pool, cache).await?;
    let period = match catalog.period_for(start_date) {
        Some(p) => p,
        None => {
            return Ok(AvailabilityResponse {
                available: false,
                reason: Some(format!(
                    "Für den {} sind keine Preise hinterlegt.",
                    start_date
                )),
                detail: None,
            });
        }
    };

    let stay = DateRange::new(start_date, end_date);
    let bookings = queries::overlapping_bookings(pool, stay).await?;
    let blocks = queries::overlapping_blocks(pool, stay).await?;

    Ok(match check_availability(stay, &bookings, &blocks, period) {
        Ok(()) => AvailabilityResponse::available(),
        Err(reason) => AvailabilityResponse::unavailable(reason),
    })
}

/// Occupied nights within a window, for calendar highlighting
pub async fn occupied_calendar(
    pool: &PgPool,
    query: &CalendarQuery,
) -> Result<Vec<NaiveDate>, AppError> {
    let window = DateRange::new(query.from, query.to);
    let mut ranges = queries::overlapping_bookings(pool, window).await?;
    ranges.extend(queries::overlapping_blocks(pool, window).await?);

    Ok(occupied_days(&ranges)
        .into_iter()
        .filter(|d| *d >= query.from && *d < query.to)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32), adults: i32) -> QuoteRequest {
        QuoteRequest {
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            num_adults: adults,
            num_children: 0,
            second_bedroom: false,
            selected_fee_ids: vec![],
            locale: "de".to_string(),
        }
    }

    #[test]
    fn test_validate_stay_rejects_inverted_range() {
        let req = request((2025, 7, 12), (2025, 7, 10), 2);
        assert!(matches!(
            validate_stay(&req),
            Err(QuoteError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_validate_stay_rejects_zero_adults() {
        let req = request((2025, 7, 10), (2025, 7, 14), 0);
        assert!(matches!(
            validate_stay(&req),
            Err(QuoteError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_validate_stay_accepts_sane_request() {
        let req = request((2025, 7, 10), (2025, 7, 14), 2);
        assert!(validate_stay(&req).is_ok());
    }

    #[test]
    fn test_quote_error_maps_to_status() {
        let err: AppError = QuoteError::Unavailable(UnavailableReason::AlreadyBooked).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = QuoteError::NoPricingPeriod {
            start_date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
        }
        .into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
