//! JSON API routes for quoting and availability.
//!
//! Consumed by the booking form on the apartment page and by the admin
//! booking screen.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::AppState;

use super::requests::{AvailabilityQuery, CalendarQuery, QuoteRequest};
use super::responses::{AvailabilityResponse, CalendarResponse, QuoteResponse};
use super::services;

/// Router for the public pricing API, nested under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/availability", get(availability))
        .route("/calendar", get(calendar))
}

/// Price a candidate stay
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let today = Utc::now().date_naive();
    let breakdown = services::quote_stay(&state.db, &state.cache, &req, None, today)
        .await
        .map_err(AppError::from)?;

    Ok(Json(breakdown.into()))
}

/// Check whether a date range can be booked
async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let response =
        services::availability_for(&state.db, &state.cache, query.start_date, query.end_date)
            .await?;

    Ok(Json(response))
}

/// Occupied nights for calendar highlighting
async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    let occupied = services::occupied_calendar(&state.db, &query).await?;

    Ok(Json(CalendarResponse { occupied }))
}
