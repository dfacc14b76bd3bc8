//! Database queries for bookings, guests and blocked dates.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BlockedDate, Booking, BookingStatus, Guest};
use crate::pricing::calculators::PriceBreakdown;

use super::requests::{BlockedDateInput, GuestInput};

const BOOKING_COLUMNS: &str = r#"
    id, guest_id, start_date, end_date, num_adults, num_children, status,
    total_price, deposit_amount, deposit_paid, deposit_due_date,
    remaining_amount, remaining_paid, remaining_due_date, room_surcharge,
    selected_fee_ids, manual_discount_percentage, manual_discount_reason,
    reference, created_at
"#;

const GUEST_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone, preferred_language,
    marketing_consent, street, postal_code, city, country, created_at
"#;

/// Guest lookup by email, the cross-booking identity key
pub async fn find_guest_by_email<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    email: &str,
) -> Result<Option<Guest>> {
    let guest = sqlx::query_as::<_, Guest>(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(guest)
}

pub async fn insert_guest<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    input: &GuestInput,
) -> Result<Guest> {
    let guest = sqlx::query_as::<_, Guest>(&format!(
        r#"
        INSERT INTO guests
            (id, first_name, last_name, email, phone, preferred_language,
             marketing_consent, street, postal_code, city, country, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now())
        RETURNING {GUEST_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.preferred_language)
    .bind(input.marketing_consent)
    .bind(&input.street)
    .bind(&input.postal_code)
    .bind(&input.city)
    .bind(&input.country)
    .fetch_one(executor)
    .await?;

    Ok(guest)
}

/// Refresh a returning guest's contact fields
pub async fn update_guest<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: Uuid,
    input: &GuestInput,
) -> Result<Guest> {
    sqlx::query_as::<_, Guest>(&format!(
        r#"
        UPDATE guests SET
            first_name = $2, last_name = $3, phone = $4,
            preferred_language = $5, marketing_consent = $6,
            street = $7, postal_code = $8, city = $9, country = $10
        WHERE id = $1
        RETURNING {GUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.phone)
    .bind(&input.preferred_language)
    .bind(input.marketing_consent)
    .bind(&input.street)
    .bind(&input.postal_code)
    .bind(&input.city)
    .bind(&input.country)
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::NotFound)
}

/// Persist a booking from its computed price breakdown
#[allow(clippy::too_many_arguments)]
pub async fn insert_booking<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    guest_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    num_adults: i32,
    num_children: i32,
    selected_fee_ids: &[Uuid],
    manual_discount_percentage: Option<rust_decimal::Decimal>,
    manual_discount_reason: Option<&str>,
    reference: &str,
    breakdown: &PriceBreakdown,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        r#"
        INSERT INTO bookings
            (id, guest_id, start_date, end_date, num_adults, num_children,
             status, total_price, deposit_amount, deposit_paid, deposit_due_date,
             remaining_amount, remaining_paid, remaining_due_date, room_surcharge,
             selected_fee_ids, manual_discount_percentage, manual_discount_reason,
             reference, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, false, $9,
                $10, false, $11, $12, $13, $14, $15, $16, now())
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(guest_id)
    .bind(start_date)
    .bind(end_date)
    .bind(num_adults)
    .bind(num_children)
    .bind(breakdown.total_online)
    .bind(breakdown.deposit_amount)
    .bind(breakdown.deposit_due_date)
    .bind(breakdown.remaining_amount)
    .bind(breakdown.remaining_due_date)
    .bind(breakdown.surcharge_total)
    .bind(selected_fee_ids)
    .bind(manual_discount_percentage)
    .bind(manual_discount_reason)
    .bind(reference)
    .fetch_one(executor)
    .await?;

    Ok(booking)
}

pub async fn get_booking(pool: &PgPool, id: Uuid) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_booking_by_reference(pool: &PgPool, reference: &str) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = $1"
    ))
    .bind(reference)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Bookings for the admin list, newest first
pub async fn list_bookings(
    pool: &PgPool,
    status: Option<BookingStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Booking>> {
    let bookings = match status {
        Some(status) => {
            sqlx::query_as::<_, Booking>(&format!(
                r#"
                SELECT {BOOKING_COLUMNS} FROM bookings
                WHERE status = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#
            ))
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Booking>(&format!(
                r#"
                SELECT {BOOKING_COLUMNS} FROM bookings
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
                "#
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(bookings)
}

pub async fn update_booking_status(
    pool: &PgPool,
    id: Uuid,
    status: BookingStatus,
) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Update payment flags; omitted flags keep their current value
pub async fn update_payment_flags(
    pool: &PgPool,
    id: Uuid,
    deposit_paid: Option<bool>,
    remaining_paid: Option<bool>,
) -> Result<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings SET
            deposit_paid = COALESCE($2, deposit_paid),
            remaining_paid = COALESCE($3, remaining_paid)
        WHERE id = $1
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(deposit_paid)
    .bind(remaining_paid)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Cancel pending bookings whose deposit went unpaid past its due date.
/// Returns the expired rows for logging and notification.
pub async fn expire_overdue_pending(pool: &PgPool, today: NaiveDate) -> Result<Vec<Booking>> {
    let expired = sqlx::query_as::<_, Booking>(&format!(
        r#"
        UPDATE bookings SET status = 'cancelled'
        WHERE status = 'pending'
          AND deposit_paid = false
          AND deposit_due_date < $1
        RETURNING {BOOKING_COLUMNS}
        "#
    ))
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(expired)
}

pub async fn list_guests(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Guest>> {
    let guests = sqlx::query_as::<_, Guest>(&format!(
        r#"
        SELECT {GUEST_COLUMNS} FROM guests
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(guests)
}

pub async fn get_guest(pool: &PgPool, id: Uuid) -> Result<Guest> {
    sqlx::query_as::<_, Guest>(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

// ==================== blocked dates ====================

pub async fn list_blocked_dates(pool: &PgPool) -> Result<Vec<BlockedDate>> {
    let blocks = sqlx::query_as::<_, BlockedDate>(
        r#"
        SELECT id, start_date, end_date, reason, created_at
        FROM blocked_dates
        ORDER BY start_date
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(blocks)
}

pub async fn insert_blocked_date(pool: &PgPool, input: &BlockedDateInput) -> Result<BlockedDate> {
    let block = sqlx::query_as::<_, BlockedDate>(
        r#"
        INSERT INTO blocked_dates (id, start_date, end_date, reason, created_at)
        VALUES ($1, $2, $3, $4, now())
        RETURNING id, start_date, end_date, reason, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.reason)
    .fetch_one(pool)
    .await?;

    Ok(block)
}

pub async fn delete_blocked_date(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM blocked_dates WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
