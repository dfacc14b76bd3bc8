//! Database queries for the pricing catalog and availability checks.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::availability::DateRange;
use super::models::{Discount, Fee, PaymentSettings, PricingCatalog, PricingPeriod};
use super::requests::{DiscountInput, FeeInput, PaymentSettingsInput, PricingPeriodInput};

const PERIOD_COLUMNS: &str = r#"
    id, start_date, end_date, season_type, base_price, room_surcharge,
    min_nights, max_nights, description, is_active, created_at
"#;

const FEE_COLUMNS: &str = r#"
    id, names, fee_kind, amount, calculation_type, payment_location,
    is_active, sort_order, created_at
"#;

const DISCOUNT_COLUMNS: &str = r#"
    id, discount_type, min_value, max_value, discount_percentage,
    is_active, created_at
"#;

/// Load the active pricing configuration as one snapshot
pub async fn load_catalog(pool: &PgPool) -> Result<PricingCatalog> {
    let periods = sqlx::query_as::<_, PricingPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM pricing WHERE is_active = true ORDER BY start_date"
    ))
    .fetch_all(pool)
    .await?;

    let fees = sqlx::query_as::<_, Fee>(&format!(
        "SELECT {FEE_COLUMNS} FROM pricing_fees WHERE is_active = true ORDER BY sort_order, created_at"
    ))
    .fetch_all(pool)
    .await?;

    let discounts = sqlx::query_as::<_, Discount>(&format!(
        "SELECT {DISCOUNT_COLUMNS} FROM pricing_discounts WHERE is_active = true ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    let settings = get_payment_settings(pool).await?;

    Ok(PricingCatalog {
        periods,
        fees,
        discounts,
        settings,
    })
}

/// Get the single active payment settings row.
///
/// Exactly one active row is expected; its absence is a configuration
/// error, not a default.
pub async fn get_payment_settings(pool: &PgPool) -> Result<PaymentSettings> {
    sqlx::query_as::<_, PaymentSettings>(
        r#"
        SELECT
            id, deposit_percentage, deposit_due_days, remaining_due_days,
            bank_name, bank_iban, bank_bic, account_holder, is_active
        FROM payment_settings
        WHERE is_active = true
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Internal("no active payment_settings row".to_string()))
}

/// Non-cancelled bookings overlapping the candidate range.
///
/// Ranges are half-open, so strict comparisons: a booking ending on the
/// candidate's start date does not collide.
pub async fn overlapping_bookings<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    range: DateRange,
) -> Result<Vec<DateRange>> {
    let rows = sqlx::query_as::<_, DateRange>(
        r#"
        SELECT start_date AS "start", end_date AS "end"
        FROM bookings
        WHERE status <> 'cancelled'
          AND start_date < $2
          AND end_date > $1
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Administrator blocked ranges overlapping the candidate range
pub async fn overlapping_blocks<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    range: DateRange,
) -> Result<Vec<DateRange>> {
    let rows = sqlx::query_as::<_, DateRange>(
        r#"
        SELECT start_date AS "start", end_date AS "end"
        FROM blocked_dates
        WHERE start_date < $2
          AND end_date > $1
        "#,
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

// ==================== admin CRUD ====================

/// All pricing periods, including inactive ones
pub async fn list_periods(pool: &PgPool) -> Result<Vec<PricingPeriod>> {
    let periods = sqlx::query_as::<_, PricingPeriod>(&format!(
        "SELECT {PERIOD_COLUMNS} FROM pricing ORDER BY start_date"
    ))
    .fetch_all(pool)
    .await?;

    Ok(periods)
}

/// Reject a period whose range collides with another active period.
/// Period bounds are inclusive on both ends.
async fn assert_period_free(
    pool: &PgPool,
    input: &PricingPeriodInput,
    exclude: Option<Uuid>,
) -> Result<()> {
    let colliding: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM pricing
            WHERE is_active = true
              AND start_date <= $2
              AND end_date >= $1
              AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(exclude)
    .fetch_one(pool)
    .await?;

    if colliding && input.is_active {
        return Err(AppError::Conflict(
            "Der Zeitraum überschneidet sich mit einem bestehenden Preiszeitraum.".to_string(),
        ));
    }
    Ok(())
}

pub async fn insert_period(pool: &PgPool, input: &PricingPeriodInput) -> Result<PricingPeriod> {
    assert_period_free(pool, input, None).await?;

    let period = sqlx::query_as::<_, PricingPeriod>(&format!(
        r#"
        INSERT INTO pricing
            (id, start_date, end_date, season_type, base_price, room_surcharge,
             min_nights, max_nights, description, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        RETURNING {PERIOD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.season_type)
    .bind(input.base_price)
    .bind(input.room_surcharge)
    .bind(input.min_nights)
    .bind(input.max_nights)
    .bind(&input.description)
    .bind(input.is_active)
    .fetch_one(pool)
    .await?;

    Ok(period)
}

pub async fn update_period(
    pool: &PgPool,
    id: Uuid,
    input: &PricingPeriodInput,
) -> Result<PricingPeriod> {
    assert_period_free(pool, input, Some(id)).await?;

    sqlx::query_as::<_, PricingPeriod>(&format!(
        r#"
        UPDATE pricing SET
            start_date = $2, end_date = $3, season_type = $4, base_price = $5,
            room_surcharge = $6, min_nights = $7, max_nights = $8,
            description = $9, is_active = $10
        WHERE id = $1
        RETURNING {PERIOD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.season_type)
    .bind(input.base_price)
    .bind(input.room_surcharge)
    .bind(input.min_nights)
    .bind(input.max_nights)
    .bind(&input.description)
    .bind(input.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete_period(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM pricing WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// All fees, including inactive ones
pub async fn list_fees(pool: &PgPool) -> Result<Vec<Fee>> {
    let fees = sqlx::query_as::<_, Fee>(&format!(
        "SELECT {FEE_COLUMNS} FROM pricing_fees ORDER BY sort_order, created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(fees)
}

pub async fn insert_fee(pool: &PgPool, input: &FeeInput) -> Result<Fee> {
    let fee = sqlx::query_as::<_, Fee>(&format!(
        r#"
        INSERT INTO pricing_fees
            (id, names, fee_kind, amount, calculation_type, payment_location,
             is_active, sort_order, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
        RETURNING {FEE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&input.names)
    .bind(input.fee_kind)
    .bind(input.amount)
    .bind(input.calculation_type)
    .bind(input.payment_location)
    .bind(input.is_active)
    .bind(input.sort_order)
    .fetch_one(pool)
    .await?;

    Ok(fee)
}

pub async fn update_fee(pool: &PgPool, id: Uuid, input: &FeeInput) -> Result<Fee> {
    sqlx::query_as::<_, Fee>(&format!(
        r#"
        UPDATE pricing_fees SET
            names = $2, fee_kind = $3, amount = $4, calculation_type = $5,
            payment_location = $6, is_active = $7, sort_order = $8
        WHERE id = $1
        RETURNING {FEE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&input.names)
    .bind(input.fee_kind)
    .bind(input.amount)
    .bind(input.calculation_type)
    .bind(input.payment_location)
    .bind(input.is_active)
    .bind(input.sort_order)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete_fee(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM pricing_fees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// All discount rules, including inactive ones
pub async fn list_discounts(pool: &PgPool) -> Result<Vec<Discount>> {
    let discounts = sqlx::query_as::<_, Discount>(&format!(
        "SELECT {DISCOUNT_COLUMNS} FROM pricing_discounts ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(discounts)
}

pub async fn insert_discount(pool: &PgPool, input: &DiscountInput) -> Result<Discount> {
    let discount = sqlx::query_as::<_, Discount>(&format!(
        r#"
        INSERT INTO pricing_discounts
            (id, discount_type, min_value, max_value, discount_percentage,
             is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, now())
        RETURNING {DISCOUNT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(input.discount_type)
    .bind(input.min_value)
    .bind(input.max_value)
    .bind(input.discount_percentage)
    .bind(input.is_active)
    .fetch_one(pool)
    .await?;

    Ok(discount)
}

pub async fn update_discount(pool: &PgPool, id: Uuid, input: &DiscountInput) -> Result<Discount> {
    sqlx::query_as::<_, Discount>(&format!(
        r#"
        UPDATE pricing_discounts SET
            discount_type = $2, min_value = $3, max_value = $4,
            discount_percentage = $5, is_active = $6
        WHERE id = $1
        RETURNING {DISCOUNT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(input.discount_type)
    .bind(input.min_value)
    .bind(input.max_value)
    .bind(input.discount_percentage)
    .bind(input.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn delete_discount(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM pricing_discounts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Update the active payment settings row in place
pub async fn update_payment_settings(
    pool: &PgPool,
    input: &PaymentSettingsInput,
) -> Result<PaymentSettings> {
    sqlx::query_as::<_, PaymentSettings>(
        r#"
        UPDATE payment_settings SET
            deposit_percentage = $1, deposit_due_days = $2, remaining_due_days = $3,
            bank_name = $4, bank_iban = $5, bank_bic = $6, account_holder = $7
        WHERE is_active = true
        RETURNING
            id, deposit_percentage, deposit_due_days, remaining_due_days,
            bank_name, bank_iban, bank_bic, account_holder, is_active
        "#,
    )
    .bind(input.deposit_percentage)
    .bind(input.deposit_due_days)
    .bind(input.remaining_due_days)
    .bind(&input.bank_name)
    .bind(&input.bank_iban)
    .bind(&input.bank_bic)
    .bind(&input.account_holder)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Internal("no active payment_settings row".to_string()))
}
