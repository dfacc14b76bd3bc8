//! Public booking API routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use crate::email;
use crate::error::{AppError, Result};
use crate::pricing::services::catalog_snapshot;
use crate::AppState;

use super::requests::BookingRequest;
use super::responses::{BankDetails, BookingResponse, BookingSummaryResponse};
use super::{queries, services};

/// Router for the public booking API, nested under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create))
        .route("/bookings/:reference", get(by_reference))
}

/// Submit a booking from the guest form.
///
/// Manual discount fields in the payload are ignored here; only the
/// admin endpoint honors them.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let today = Utc::now().date_naive();
    let (booking, guest, breakdown) =
        services::create_booking(&state.db, &state.cache, &req, today, false)
            .await
            .map_err(AppError::from)?;

    let catalog = catalog_snapshot(&state.db, &state.cache).await?;
    let bank = BankDetails::from(&catalog.settings);

    // Confirmation email goes out in the background; a mail failure must
    // not fail the booking that is already committed.
    tokio::spawn(email::mailer::send_booking_confirmation(
        state.clone(),
        booking.clone(),
        guest,
        breakdown.clone(),
    ));

    let response = BookingResponse {
        id: booking.id,
        reference: booking.reference.clone(),
        status: booking.status,
        quote: breakdown.into(),
        bank,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Look up a booking by its guest-facing reference
async fn by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<BookingSummaryResponse>> {
    let booking = queries::get_booking_by_reference(&state.db, &reference).await?;
    Ok(Json(booking.into()))
}
