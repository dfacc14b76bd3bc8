//! Admin back-office JSON API.
//!
//! Mounted under `/admin/api`. Authentication is terminated by the
//! hosting layer in front of this service; these handlers only do the
//! work.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::booking::requests::{
    BlockedDateInput, BookingRequest, PaymentFlagsInput, StatusUpdateInput,
};
use crate::booking::responses::BookingResponse;
use crate::booking::{queries as booking_queries, services as booking_services};
use crate::cache::CacheStats;
use crate::db;
use crate::email::models::{EmailLog, EmailTemplate};
use crate::email::queries::{self as email_queries, TemplateInput};
use crate::error::{AppError, Result};
use crate::models::{BlockedDate, Booking, BookingStatus, Guest, Message};
use crate::pricing::models::{Discount, Fee, PaymentSettings, PricingPeriod};
use crate::pricing::queries as pricing_queries;
use crate::pricing::requests::{DiscountInput, FeeInput, PaymentSettingsInput, PricingPeriodInput};
use crate::pricing::responses::QuoteResponse;
use crate::AppState;

const PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default)]
    status: Option<BookingStatus>,
}

fn default_page() -> i64 {
    1
}

fn offset(page: i64) -> i64 {
    (page.max(1) - 1) * PAGE_SIZE
}

/// Router for the admin API, nested under `/admin/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/status", put(update_status))
        .route("/bookings/:id/payment", put(update_payment))
        .route("/guests", get(list_guests))
        .route("/guests/:id", get(get_guest))
        .route("/pricing/periods", get(list_periods).post(create_period))
        .route("/pricing/periods/:id", put(update_period).delete(delete_period))
        .route("/pricing/fees", get(list_fees).post(create_fee))
        .route("/pricing/fees/:id", put(update_fee).delete(delete_fee))
        .route("/pricing/discounts", get(list_discounts).post(create_discount))
        .route("/pricing/discounts/:id", put(update_discount).delete(delete_discount))
        .route("/pricing/settings", get(get_settings).put(update_settings))
        .route("/blocked-dates", get(list_blocked).post(create_blocked))
        .route("/blocked-dates/:id", axum::routing::delete(delete_blocked))
        .route("/email/templates", get(list_templates))
        .route("/email/templates/:id", put(update_template))
        .route("/email/logs", get(list_email_logs))
        .route("/messages", get(list_messages))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(invalidate_cache))
}

// ==================== bookings ====================

async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Booking>>> {
    let bookings =
        booking_queries::list_bookings(&state.db, query.status, PAGE_SIZE, offset(query.page))
            .await?;
    Ok(Json(bookings))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    Ok(Json(booking_queries::get_booking(&state.db, id).await?))
}

/// Create a booking on behalf of a guest; honors the manual discount
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let today = Utc::now().date_naive();
    let (booking, _guest, breakdown) =
        booking_services::create_booking(&state.db, &state.cache, &req, today, true)
            .await
            .map_err(AppError::from)?;

    let catalog = crate::pricing::services::catalog_snapshot(&state.db, &state.cache).await?;

    let response = BookingResponse {
        id: booking.id,
        reference: booking.reference.clone(),
        status: booking.status,
        quote: QuoteResponse::from(breakdown),
        bank: (&catalog.settings).into(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusUpdateInput>,
) -> Result<Json<Booking>> {
    let booking = booking_services::transition_status(&state.db, id, input.status)
        .await
        .map_err(AppError::from)?;
    Ok(Json(booking))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PaymentFlagsInput>,
) -> Result<Json<Booking>> {
    let booking = booking_queries::update_payment_flags(
        &state.db,
        id,
        input.deposit_paid,
        input.remaining_paid,
    )
    .await?;
    Ok(Json(booking))
}

// ==================== guests ====================

async fn list_guests(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Guest>>> {
    let guests = booking_queries::list_guests(&state.db, PAGE_SIZE, offset(query.page)).await?;
    Ok(Json(guests))
}

async fn get_guest(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Guest>> {
    Ok(Json(booking_queries::get_guest(&state.db, id).await?))
}

// ==================== pricing periods ====================

async fn list_periods(State(state): State<AppState>) -> Result<Json<Vec<PricingPeriod>>> {
    Ok(Json(pricing_queries::list_periods(&state.db).await?))
}

async fn create_period(
    State(state): State<AppState>,
    Json(input): Json<PricingPeriodInput>,
) -> Result<(StatusCode, Json<PricingPeriod>)> {
    validate_period(&input)?;
    let period = pricing_queries::insert_period(&state.db, &input).await?;
    state.cache.invalidate_catalog();
    Ok((StatusCode::CREATED, Json(period)))
}

async fn update_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PricingPeriodInput>,
) -> Result<Json<PricingPeriod>> {
    validate_period(&input)?;
    let period = pricing_queries::update_period(&state.db, id, &input).await?;
    state.cache.invalidate_catalog();
    Ok(Json(period))
}

async fn delete_period(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    pricing_queries::delete_period(&state.db, id).await?;
    state.cache.invalidate_catalog();
    Ok(StatusCode::NO_CONTENT)
}

fn validate_period(input: &PricingPeriodInput) -> Result<()> {
    if input.end_date < input.start_date {
        return Err(AppError::Validation(
            "Das Enddatum muss nach dem Startdatum liegen.".to_string(),
        ));
    }
    if input.min_nights < 1 || input.max_nights < input.min_nights {
        return Err(AppError::Validation(
            "Ungültige Mindest-/Maximalaufenthaltsdauer.".to_string(),
        ));
    }
    Ok(())
}

// ==================== fees ====================

async fn list_fees(State(state): State<AppState>) -> Result<Json<Vec<Fee>>> {
    Ok(Json(pricing_queries::list_fees(&state.db).await?))
}

async fn create_fee(
    State(state): State<AppState>,
    Json(input): Json<FeeInput>,
) -> Result<(StatusCode, Json<Fee>)> {
    let fee = pricing_queries::insert_fee(&state.db, &input).await?;
    state.cache.invalidate_catalog();
    Ok((StatusCode::CREATED, Json(fee)))
}

async fn update_fee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FeeInput>,
) -> Result<Json<Fee>> {
    let fee = pricing_queries::update_fee(&state.db, id, &input).await?;
    state.cache.invalidate_catalog();
    Ok(Json(fee))
}

async fn delete_fee(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    pricing_queries::delete_fee(&state.db, id).await?;
    state.cache.invalidate_catalog();
    Ok(StatusCode::NO_CONTENT)
}

// ==================== discounts ====================

async fn list_discounts(State(state): State<AppState>) -> Result<Json<Vec<Discount>>> {
    Ok(Json(pricing_queries::list_discounts(&state.db).await?))
}

async fn create_discount(
    State(state): State<AppState>,
    Json(input): Json<DiscountInput>,
) -> Result<(StatusCode, Json<Discount>)> {
    let discount = pricing_queries::insert_discount(&state.db, &input).await?;
    state.cache.invalidate_catalog();
    Ok((StatusCode::CREATED, Json(discount)))
}

async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DiscountInput>,
) -> Result<Json<Discount>> {
    let discount = pricing_queries::update_discount(&state.db, id, &input).await?;
    state.cache.invalidate_catalog();
    Ok(Json(discount))
}

async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    pricing_queries::delete_discount(&state.db, id).await?;
    state.cache.invalidate_catalog();
    Ok(StatusCode::NO_CONTENT)
}

// ==================== payment settings ====================

async fn get_settings(State(state): State<AppState>) -> Result<Json<PaymentSettings>> {
    Ok(Json(pricing_queries::get_payment_settings(&state.db).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<PaymentSettingsInput>,
) -> Result<Json<PaymentSettings>> {
    use rust_decimal::Decimal;
    if input.deposit_percentage < Decimal::ZERO || input.deposit_percentage > Decimal::from(100) {
        return Err(AppError::Validation(
            "Die Anzahlung muss zwischen 0 und 100 Prozent liegen.".to_string(),
        ));
    }

    let settings = pricing_queries::update_payment_settings(&state.db, &input).await?;
    state.cache.invalidate_catalog();
    Ok(Json(settings))
}

// ==================== blocked dates ====================

async fn list_blocked(State(state): State<AppState>) -> Result<Json<Vec<BlockedDate>>> {
    Ok(Json(booking_queries::list_blocked_dates(&state.db).await?))
}

async fn create_blocked(
    State(state): State<AppState>,
    Json(input): Json<BlockedDateInput>,
) -> Result<(StatusCode, Json<BlockedDate>)> {
    if input.end_date <= input.start_date {
        return Err(AppError::Validation(
            "Das Enddatum muss nach dem Startdatum liegen.".to_string(),
        ));
    }

    let block = booking_queries::insert_blocked_date(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

async fn delete_blocked(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    booking_queries::delete_blocked_date(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== email ====================

async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<EmailTemplate>>> {
    Ok(Json(email_queries::list_templates(&state.db).await?))
}

async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TemplateInput>,
) -> Result<Json<EmailTemplate>> {
    Ok(Json(email_queries::update_template(&state.db, id, &input).await?))
}

async fn list_email_logs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<EmailLog>>> {
    let logs = email_queries::list_logs(&state.db, PAGE_SIZE, offset(query.page)).await?;
    Ok(Json(logs))
}

// ==================== messages ====================

async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Message>>> {
    let messages = db::list_messages(&state.db, PAGE_SIZE, offset(query.page)).await?;
    Ok(Json(messages))
}

// ==================== cache ====================

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

async fn invalidate_cache(State(state): State<AppState>) -> StatusCode {
    state.cache.invalidate_all();
    StatusCode::NO_CONTENT
}
