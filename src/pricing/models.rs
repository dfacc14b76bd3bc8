//! Database models for the pricing catalog.
//!
//! These models use sqlx's FromRow derive for direct database
//! deserialization. Season, fee and discount kinds are stored as text
//! columns and mapped onto Rust enums.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Season classification of a pricing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SeasonType {
    Low,
    Mid,
    High,
    Holiday,
}

/// Whether a fee is always charged or guest-selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    Mandatory,
    Optional,
}

/// How a fee amount scales with the stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    PerStay,
    PerNight,
    PerPerson,
    PerPersonNight,
}

/// Where a fee is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentLocation {
    Online,
    OnSite,
}

/// Discount rule kind.
///
/// Variant order is the tie-break order when two applicable discounts
/// share the same percentage: earlier variants win.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    EarlyBird,
    LastMinute,
    LongStay,
}

/// Seasonal rate from the `pricing` table.
///
/// Periods are maintained by the administrator and must not overlap;
/// a stay is priced by the single active period containing its first
/// night. Period bounds are inclusive on both ends.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingPeriod {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub season_type: SeasonType,
    pub base_price: Decimal,
    pub room_surcharge: Decimal,
    pub min_nights: i32,
    pub max_nights: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PricingPeriod {
    /// Whether this period covers the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Fee from the `pricing_fees` table.
///
/// `names` is a locale → display-name map (jsonb). Guests select
/// optional fees by id; the name is resolved for display only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fee {
    pub id: Uuid,
    pub names: serde_json::Value,
    pub fee_kind: FeeKind,
    pub amount: Decimal,
    pub calculation_type: CalculationType,
    pub payment_location: PaymentLocation,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl Fee {
    /// Resolve the display name for a locale, falling back to German
    /// and then to any available translation.
    pub fn name_for(&self, locale: &str) -> String {
        let lookup = |key: &str| {
            self.names
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        lookup(locale)
            .or_else(|| lookup("de"))
            .or_else(|| {
                self.names
                    .as_object()
                    .and_then(|m| m.values().next())
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_default()
    }
}

/// Discount rule from the `pricing_discounts` table.
///
/// `min_value`/`max_value` are nights for `long_stay` and lead days for
/// the other two kinds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Discount {
    pub id: Uuid,
    pub discount_type: DiscountType,
    pub min_value: i32,
    pub max_value: Option<i32>,
    pub discount_percentage: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Singleton row from `payment_settings`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentSettings {
    pub id: Uuid,
    pub deposit_percentage: Decimal,
    pub deposit_due_days: i32,
    pub remaining_due_days: i32,
    pub bank_name: String,
    pub bank_iban: String,
    pub bank_bic: String,
    pub account_holder: String,
    pub is_active: bool,
}

/// Immutable snapshot of the pricing configuration.
///
/// Fetched once per quote and passed by value into the calculation, so
/// a quote never mixes settings read at different times.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    pub periods: Vec<PricingPeriod>,
    pub fees: Vec<Fee>,
    pub discounts: Vec<Discount>,
    pub settings: PaymentSettings,
}

impl PricingCatalog {
    /// Find the active period covering the given stay start date
    pub fn period_for(&self, start_date: NaiveDate) -> Option<&PricingPeriod> {
        self.periods
            .iter()
            .find(|p| p.is_active && p.contains(start_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate, is_active: bool) -> PricingPeriod {
        PricingPeriod {
            id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            season_type: SeasonType::Mid,
            base_price: dec!(90),
            room_surcharge: dec!(15),
            min_nights: 3,
            max_nights: 14,
            description: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    fn catalog(periods: Vec<PricingPeriod>) -> PricingCatalog {
        PricingCatalog {
            periods,
            fees: vec![],
            discounts: vec![],
            settings: PaymentSettings {
                id: Uuid::new_v4(),
                deposit_percentage: dec!(50),
                deposit_due_days: 7,
                remaining_due_days: 30,
                bank_name: String::new(),
                bank_iban: String::new(),
                bank_bic: String::new(),
                account_holder: String::new(),
                is_active: true,
            },
        }
    }

    #[test]
    fn test_period_contains_inclusive_bounds() {
        let p = period(date(2025, 6, 1), date(2025, 9, 30), true);
        assert!(p.contains(date(2025, 6, 1)));
        assert!(p.contains(date(2025, 9, 30)));
        assert!(!p.contains(date(2025, 5, 31)));
        assert!(!p.contains(date(2025, 10, 1)));
    }

    #[test]
    fn test_period_for_picks_covering_period() {
        let summer = period(date(2025, 6, 1), date(2025, 9, 30), true);
        let winter = period(date(2025, 12, 1), date(2026, 2, 28), true);
        let c = catalog(vec![summer.clone(), winter]);

        let found = c.period_for(date(2025, 7, 10)).unwrap();
        assert_eq!(found.id, summer.id);
    }

    #[test]
    fn test_period_for_has_no_fallback() {
        let c = catalog(vec![period(date(2025, 6, 1), date(2025, 9, 30), true)]);
        assert!(c.period_for(date(2025, 11, 1)).is_none());
    }

    #[test]
    fn test_period_for_skips_inactive() {
        let c = catalog(vec![period(date(2025, 6, 1), date(2025, 9, 30), false)]);
        assert!(c.period_for(date(2025, 7, 10)).is_none());
    }
}
