//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access. Every function
//! takes its inputs (including "today") explicitly, so a quote is fully
//! determined by the catalog snapshot it was computed from.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use uuid::Uuid;

use super::models::{
    CalculationType, Discount, DiscountType, Fee, FeeKind, PaymentLocation, PaymentSettings,
    PricingPeriod,
};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use casabarbara_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Number of nights in a stay.
///
/// Stay ranges are half-open: `end_date` is the checkout day and is not
/// slept in. A stay from the 10th to the 12th is 2 nights.
pub fn nights_between(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days()
}

/// Days between the booking date and arrival
pub fn lead_days(today: NaiveDate, arrival: NaiveDate) -> i64 {
    (arrival - today).num_days()
}

/// A single resolved fee charge
#[derive(Debug, Clone, PartialEq)]
pub struct FeeLine {
    pub fee_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub payment_location: PaymentLocation,
}

/// Resolved fees for a stay, split by kind and bucketed by payment location
#[derive(Debug, Clone, Default)]
pub struct FeeResolution {
    pub mandatory: Vec<FeeLine>,
    pub optional: Vec<FeeLine>,
    pub online_total: Decimal,
    pub on_site_total: Decimal,
}

/// Scale a fee amount by its calculation mode
fn scale_fee(fee: &Fee, persons: i64, nights: i64) -> Decimal {
    match fee.calculation_type {
        CalculationType::PerStay => fee.amount,
        CalculationType::PerNight => fee.amount * Decimal::from(nights),
        CalculationType::PerPerson => fee.amount * Decimal::from(persons),
        CalculationType::PerPersonNight => {
            fee.amount * Decimal::from(persons) * Decimal::from(nights)
        }
    }
}

/// Resolve the fee catalog against a stay.
///
/// Mandatory fees are always charged. Optional fees are charged only
/// when their id appears in `selected_fee_ids`. Inactive fees are
/// skipped entirely.
pub fn resolve_fees(
    fees: &[Fee],
    num_adults: i32,
    num_children: i32,
    nights: i64,
    selected_fee_ids: &[Uuid],
    locale: &str,
) -> FeeResolution {
    let persons = i64::from(num_adults) + i64::from(num_children);
    let mut resolution = FeeResolution::default();

    for fee in fees.iter().filter(|f| f.is_active) {
        let included = match fee.fee_kind {
            FeeKind::Mandatory => true,
            FeeKind::Optional => selected_fee_ids.contains(&fee.id),
        };
        if !included {
            continue;
        }

        let line = FeeLine {
            fee_id: fee.id,
            name: fee.name_for(locale),
            amount: scale_fee(fee, persons, nights),
            payment_location: fee.payment_location,
        };

        match fee.payment_location {
            PaymentLocation::Online => resolution.online_total += line.amount,
            PaymentLocation::OnSite => resolution.on_site_total += line.amount,
        }
        match fee.fee_kind {
            FeeKind::Mandatory => resolution.mandatory.push(line),
            FeeKind::Optional => resolution.optional.push(line),
        }
    }

    resolution
}

/// Origin of a discount line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountSource {
    Catalog(DiscountType),
    Manual,
}

/// A single resolved discount
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountLine {
    pub source: DiscountSource,
    pub percentage: Decimal,
    pub amount: Decimal,
}

/// Whether a discount rule applies to the given stay.
///
/// `long_stay` windows are in nights, `early_bird` and `last_minute`
/// windows are in lead days. `last_minute` compares in the opposite
/// direction: a *shorter* lead time qualifies, with `max_value` as an
/// optional lower bound.
pub fn discount_applies(discount: &Discount, nights: i64, lead: i64) -> bool {
    let min = i64::from(discount.min_value);
    let max = discount.max_value.map(i64::from);
    match discount.discount_type {
        DiscountType::LongStay => nights >= min && max.map_or(true, |m| nights <= m),
        DiscountType::EarlyBird => lead >= min && max.map_or(true, |m| lead <= m),
        DiscountType::LastMinute => lead <= min && max.map_or(true, |m| lead >= m),
    }
}

/// Pick the single best applicable catalog discount.
///
/// Highest percentage wins. Ties are broken by `DiscountType` order
/// (early_bird before last_minute before long_stay), so the result does
/// not depend on catalog row order.
pub fn pick_best_discount<'a>(
    discounts: &'a [Discount],
    nights: i64,
    lead: i64,
) -> Option<&'a Discount> {
    discounts
        .iter()
        .filter(|d| d.is_active && discount_applies(d, nights, lead))
        .min_by(|a, b| {
            b.discount_percentage
                .cmp(&a.discount_percentage)
                .then(a.discount_type.cmp(&b.discount_type))
        })
}

/// Resolve discount lines for a stay.
///
/// At most one catalog discount applies; a manual percentage greater
/// than zero stacks on top as an independent second line. Amounts are
/// percentages of the pre-fee gross (base plus surcharge).
pub fn resolve_discounts(
    discounts: &[Discount],
    nights: i64,
    lead: i64,
    gross: Decimal,
    manual_percentage: Option<Decimal>,
) -> Vec<DiscountLine> {
    let mut lines = Vec::new();

    if let Some(best) = pick_best_discount(discounts, nights, lead) {
        lines.push(DiscountLine {
            source: DiscountSource::Catalog(best.discount_type),
            percentage: best.discount_percentage,
            amount: round_money(gross * best.discount_percentage / Decimal::from(100), 2),
        });
    }

    if let Some(pct) = manual_percentage {
        if pct > Decimal::ZERO {
            lines.push(DiscountLine {
                source: DiscountSource::Manual,
                percentage: pct,
                amount: round_money(gross * pct / Decimal::from(100), 2),
            });
        }
    }

    lines
}

/// Everything needed to price a stay, resolved ahead of time
#[derive(Debug)]
pub struct StayQuoteInput<'a> {
    pub period: &'a PricingPeriod,
    pub settings: &'a PaymentSettings,
    pub fees: &'a [Fee],
    pub discounts: &'a [Discount],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_adults: i32,
    pub num_children: i32,
    pub second_bedroom: bool,
    pub selected_fee_ids: &'a [Uuid],
    pub manual_discount_percentage: Option<Decimal>,
    pub locale: &'a str,
    pub today: NaiveDate,
}

/// Full price breakdown for a stay
#[derive(Debug, Clone)]
pub struct PriceBreakdown {
    pub nights: i64,
    pub base_total: Decimal,
    pub surcharge_total: Decimal,
    pub mandatory_fees: Vec<FeeLine>,
    pub optional_fees: Vec<FeeLine>,
    pub discounts: Vec<DiscountLine>,
    pub total_online: Decimal,
    pub total_on_site: Decimal,
    pub deposit_amount: Decimal,
    pub remaining_amount: Decimal,
    pub deposit_due_date: NaiveDate,
    pub remaining_due_date: NaiveDate,
}

/// Price a stay against a resolved period and catalog snapshot.
///
/// Discounts are computed on base plus surcharge and subtracted from the
/// online total only; on-site fees are never discounted. The deposit and
/// remaining amounts always sum to the rounded online total.
pub fn price_stay(input: &StayQuoteInput) -> PriceBreakdown {
    let nights = nights_between(input.start_date, input.end_date);
    let lead = lead_days(input.today, input.start_date);

    let base_total = input.period.base_price * Decimal::from(nights);
    let surcharge_total = if input.second_bedroom {
        input.period.room_surcharge * Decimal::from(nights)
    } else {
        Decimal::ZERO
    };

    let fees = resolve_fees(
        input.fees,
        input.num_adults,
        input.num_children,
        nights,
        input.selected_fee_ids,
        input.locale,
    );

    let gross = base_total + surcharge_total;
    let discounts = resolve_discounts(
        input.discounts,
        nights,
        lead,
        gross,
        input.manual_discount_percentage,
    );
    let discount_total: Decimal = discounts.iter().map(|d| d.amount).sum();

    let total_online = round_money(gross + fees.online_total - discount_total, 2);
    let total_on_site = round_money(fees.on_site_total, 2);

    let deposit_amount = round_money(
        total_online * input.settings.deposit_percentage / Decimal::from(100),
        2,
    );
    let remaining_amount = total_online - deposit_amount;

    PriceBreakdown {
        nights,
        base_total,
        surcharge_total,
        mandatory_fees: fees.mandatory,
        optional_fees: fees.optional,
        discounts,
        total_online,
        total_on_site,
        deposit_amount,
        remaining_amount,
        deposit_due_date: input.today + Duration::days(i64::from(input.settings.deposit_due_days)),
        remaining_due_date: input.start_date
            - Duration::days(i64::from(input.settings.remaining_due_days)),
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

    fn period(base_price: Decimal, room_surcharge: Decimal) -> PricingPeriod {
        PricingPeriod {
            id: Uuid::new_v4(),
            start_date: date(2025, 6, 1),
            end_date: date(2025, 9, 30),
            season_type: super::super::models::SeasonType::High,
            base_price,
            room_surcharge,
            min_nights: 4,
            max_nights: 21,
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn settings(deposit_percentage: Decimal) -> PaymentSettings {
        PaymentSettings {
            id: Uuid::new_v4(),
            deposit_percentage,
            deposit_due_days: 7,
            remaining_due_days: 30,
            bank_name: "Volksbank".to_string(),
            bank_iban: "DE02120300000000202051".to_string(),
            bank_bic: "BYLADEM1001".to_string(),
            account_holder: "Barbara".to_string(),
            is_active: true,
        }
    }

    fn fee(
        name_de: &str,
        fee_kind: FeeKind,
        amount: Decimal,
        calculation_type: CalculationType,
        payment_location: PaymentLocation,
    ) -> Fee {
        Fee {
            id: Uuid::new_v4(),
            names: serde_json::json!({ "de": name_de }),
            fee_kind,
            amount,
            calculation_type,
            payment_location,
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn discount(
        discount_type: DiscountType,
        min_value: i32,
        max_value: Option<i32>,
        percentage: Decimal,
    ) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            discount_type,
            min_value,
            max_value,
            discount_percentage: percentage,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.675), 2), dec!(2.68));
        assert_eq!(round_money(dec!(2.665), 2), dec!(2.66));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    // ==================== night count tests ====================

    #[test]
    fn test_nights_between_half_open() {
        // Checkout day is not slept in: 10th to 12th is 2 nights
        assert_eq!(nights_between(date(2025, 7, 10), date(2025, 7, 12)), 2);
        assert_eq!(nights_between(date(2025, 7, 10), date(2025, 7, 11)), 1);
    }

    #[test]
    fn test_nights_between_across_month_boundary() {
        assert_eq!(nights_between(date(2025, 6, 28), date(2025, 7, 5)), 7);
    }

    #[test]
    fn test_lead_days() {
        assert_eq!(lead_days(date(2025, 6, 1), date(2025, 7, 11)), 40);
        assert_eq!(lead_days(date(2025, 7, 10), date(2025, 7, 11)), 1);
    }

    // ==================== fee resolver tests ====================

    #[test]
    fn test_fee_scaling_modes() {
        // 3 persons, 5 nights: each mode is the expected partial product
        let fees = vec![
            fee("Pauschale", FeeKind::Mandatory, dec!(40), CalculationType::PerStay, PaymentLocation::Online),
            fee("Heizung", FeeKind::Mandatory, dec!(8), CalculationType::PerNight, PaymentLocation::Online),
            fee("Kurtaxe", FeeKind::Mandatory, dec!(2), CalculationType::PerPerson, PaymentLocation::Online),
            fee("Frühstück", FeeKind::Mandatory, dec!(10), CalculationType::PerPersonNight, PaymentLocation::Online),
        ];

        let resolved = resolve_fees(&fees, 2, 1, 5, &[], "de");
        let amounts: Vec<Decimal> = resolved.mandatory.iter().map(|l| l.amount).collect();

        assert_eq!(amounts, vec![dec!(40), dec!(40), dec!(6), dec!(150)]);
        assert_eq!(resolved.online_total, dec!(236));
        assert_eq!(resolved.on_site_total, dec!(0));
    }

    #[test]
    fn test_optional_fee_selected_by_id() {
        let breakfast = fee("Frühstück", FeeKind::Optional, dec!(10), CalculationType::PerPersonNight, PaymentLocation::Online);
        let bikes = fee("Fahrradverleih", FeeKind::Optional, dec!(25), CalculationType::PerStay, PaymentLocation::OnSite);
        let selected = vec![breakfast.id];

        let resolved = resolve_fees(&[breakfast, bikes], 2, 0, 5, &selected, "de");

        assert_eq!(resolved.optional.len(), 1);
        assert_eq!(resolved.optional[0].name, "Frühstück");
        assert_eq!(resolved.optional[0].amount, dec!(100));
        assert_eq!(resolved.on_site_total, dec!(0));
    }

    #[test]
    fn test_inactive_fee_skipped() {
        let mut cleaning = fee("Endreinigung", FeeKind::Mandatory, dec!(50), CalculationType::PerStay, PaymentLocation::OnSite);
        cleaning.is_active = false;

        let resolved = resolve_fees(&[cleaning], 2, 0, 5, &[], "de");
        assert!(resolved.mandatory.is_empty());
        assert_eq!(resolved.on_site_total, dec!(0));
    }

    #[test]
    fn test_fee_name_locale_fallback() {
        let mut f = fee("Endreinigung", FeeKind::Mandatory, dec!(50), CalculationType::PerStay, PaymentLocation::OnSite);
        f.names = serde_json::json!({ "de": "Endreinigung", "en": "Final cleaning" });

        let en = resolve_fees(std::slice::from_ref(&f), 1, 0, 1, &[], "en");
        assert_eq!(en.mandatory[0].name, "Final cleaning");

        // Unknown locale falls back to German
        let it = resolve_fees(std::slice::from_ref(&f), 1, 0, 1, &[], "it");
        assert_eq!(it.mandatory[0].name, "Endreinigung");
    }

    #[test]
    fn test_fee_buckets_online_vs_on_site() {
        // Mandatory cleaning paid on site, optional breakfast paid online
        let cleaning = fee("Endreinigung", FeeKind::Mandatory, dec!(50), CalculationType::PerStay, PaymentLocation::OnSite);
        let breakfast = fee("Frühstück", FeeKind::Optional, dec!(10), CalculationType::PerPersonNight, PaymentLocation::Online);
        let selected = vec![breakfast.id];

        let resolved = resolve_fees(&[cleaning, breakfast], 2, 0, 5, &selected, "de");

        assert_eq!(resolved.on_site_total, dec!(50));
        assert_eq!(resolved.online_total, dec!(100)); // 10 x 2 x 5
    }

    // ==================== discount resolver tests ====================

    #[test]
    fn test_long_stay_window() {
        let d = discount(DiscountType::LongStay, 7, Some(14), dec!(10));
        assert!(!discount_applies(&d, 6, 40));
        assert!(discount_applies(&d, 7, 40));
        assert!(discount_applies(&d, 14, 40));
        assert!(!discount_applies(&d, 15, 40));
    }

    #[test]
    fn test_early_bird_open_upper_bound() {
        let d = discount(DiscountType::EarlyBird, 30, None, dec!(15));
        assert!(!discount_applies(&d, 5, 29));
        assert!(discount_applies(&d, 5, 30));
        assert!(discount_applies(&d, 5, 200));
    }

    #[test]
    fn test_last_minute_inverted_window() {
        // Shorter lead time qualifies; max_value is the lower bound
        let d = discount(DiscountType::LastMinute, 7, Some(2), dec!(12));
        assert!(!discount_applies(&d, 5, 8));
        assert!(discount_applies(&d, 5, 7));
        assert!(discount_applies(&d, 5, 2));
        assert!(!discount_applies(&d, 5, 1));
    }

    #[test]
    fn test_highest_percentage_wins() {
        // 10 nights booked 40 days ahead: both apply, 15% beats 10%
        let catalog = vec![
            discount(DiscountType::LongStay, 7, None, dec!(10)),
            discount(DiscountType::EarlyBird, 30, None, dec!(15)),
        ];

        let best = pick_best_discount(&catalog, 10, 40).unwrap();
        assert_eq!(best.discount_type, DiscountType::EarlyBird);
        assert_eq!(best.discount_percentage, dec!(15));
    }

    #[test]
    fn test_tie_break_is_order_independent() {
        let long_stay = discount(DiscountType::LongStay, 7, None, dec!(10));
        let early_bird = discount(DiscountType::EarlyBird, 30, None, dec!(10));

        let catalog_a = [long_stay.clone(), early_bird.clone()];
        let a = pick_best_discount(&catalog_a, 10, 40).unwrap();
        let catalog_b = [early_bird, long_stay];
        let b = pick_best_discount(&catalog_b, 10, 40).unwrap();

        assert_eq!(a.discount_type, DiscountType::EarlyBird);
        assert_eq!(b.discount_type, DiscountType::EarlyBird);
    }

    #[test]
    fn test_inactive_discount_skipped() {
        let mut d = discount(DiscountType::LongStay, 7, None, dec!(10));
        d.is_active = false;
        assert!(pick_best_discount(&[d], 10, 40).is_none());
    }

    #[test]
    fn test_manual_discount_stacks() {
        let catalog = vec![discount(DiscountType::LongStay, 7, None, dec!(10))];
        let lines = resolve_discounts(&catalog, 10, 40, dec!(1000), Some(dec!(5)));

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].source, DiscountSource::Catalog(DiscountType::LongStay));
        assert_eq!(lines[0].amount, dec!(100));
        assert_eq!(lines[1].source, DiscountSource::Manual);
        assert_eq!(lines[1].amount, dec!(50));
    }

    #[test]
    fn test_manual_discount_zero_ignored() {
        let lines = resolve_discounts(&[], 10, 40, dec!(1000), Some(dec!(0)));
        assert!(lines.is_empty());
    }

    // ==================== price_stay tests ====================

    fn quote<'a>(
        period: &'a PricingPeriod,
        settings: &'a PaymentSettings,
        fees: &'a [Fee],
        discounts: &'a [Discount],
        selected: &'a [Uuid],
        nights: i64,
    ) -> StayQuoteInput<'a> {
        let start = date(2025, 7, 10);
        StayQuoteInput {
            period,
            settings,
            fees,
            discounts,
            start_date: start,
            end_date: start + Duration::days(nights),
            num_adults: 2,
            num_children: 0,
            second_bedroom: false,
            selected_fee_ids: selected,
            manual_discount_percentage: None,
            locale: "de",
            today: date(2025, 6, 1),
        }
    }

    #[test]
    fn test_seven_nights_no_extras() {
        // 110 EUR/night x 7 nights, nothing else: 770 online, 50% deposit
        let period = period(dec!(110), dec!(0));
        let settings = settings(dec!(50));
        let input = quote(&period, &settings, &[], &[], &[], 7);

        let breakdown = price_stay(&input);

        assert_eq!(breakdown.nights, 7);
        assert_eq!(breakdown.base_total, dec!(770));
        assert_eq!(breakdown.total_online, dec!(770));
        assert_eq!(breakdown.total_on_site, dec!(0));
        assert_eq!(breakdown.deposit_amount, dec!(385.00));
        assert_eq!(breakdown.remaining_amount, dec!(385.00));
    }

    #[test]
    fn test_fees_split_between_totals() {
        // On-site cleaning never enters the online total and is never
        // discounted; online breakfast is added to the base price.
        let period = period(dec!(110), dec!(0));
        let settings = settings(dec!(50));
        let cleaning = fee("Endreinigung", FeeKind::Mandatory, dec!(50), CalculationType::PerStay, PaymentLocation::OnSite);
        let breakfast = fee("Frühstück", FeeKind::Optional, dec!(10), CalculationType::PerPersonNight, PaymentLocation::Online);
        let fees = vec![cleaning, breakfast.clone()];
        let selected = vec![breakfast.id];
        let input = quote(&period, &settings, &fees, &[], &selected, 5);

        let breakdown = price_stay(&input);

        assert_eq!(breakdown.base_total, dec!(550));
        assert_eq!(breakdown.total_online, dec!(650)); // 550 + 10 x 2 x 5
        assert_eq!(breakdown.total_on_site, dec!(50));
    }

    #[test]
    fn test_second_bedroom_surcharge() {
        let period = period(dec!(110), dec!(20));
        let settings = settings(dec!(50));
        let mut input = quote(&period, &settings, &[], &[], &[], 7);
        input.second_bedroom = true;

        let breakdown = price_stay(&input);

        assert_eq!(breakdown.surcharge_total, dec!(140));
        assert_eq!(breakdown.total_online, dec!(910));
    }

    #[test]
    fn test_discount_applied_to_online_only() {
        let period = period(dec!(100), dec!(0));
        let settings = settings(dec!(50));
        let cleaning = fee("Endreinigung", FeeKind::Mandatory, dec!(50), CalculationType::PerStay, PaymentLocation::OnSite);
        let fees = vec![cleaning];
        let discounts = vec![discount(DiscountType::LongStay, 7, None, dec!(10))];
        let input = quote(&period, &settings, &fees, &discounts, &[], 10);

        let breakdown = price_stay(&input);

        // 1000 base - 100 discount; the 50 on-site fee is untouched
        assert_eq!(breakdown.total_online, dec!(900));
        assert_eq!(breakdown.total_on_site, dec!(50));
    }

    #[test]
    fn test_deposit_and_remaining_sum_exactly() {
        // Odd totals must not leak a cent between deposit and remaining
        let period = period(dec!(33.33), dec!(0));
        let half = settings(dec!(50));
        let input = quote(&period, &half, &[], &[], &[], 7);

        let breakdown = price_stay(&input);

        assert_eq!(
            breakdown.deposit_amount + breakdown.remaining_amount,
            breakdown.total_online
        );

        // And with a percentage that does not divide evenly
        let uneven = settings(dec!(33));
        let input = quote(&period, &uneven, &[], &[], &[], 7);
        let breakdown = price_stay(&input);
        assert_eq!(
            breakdown.deposit_amount + breakdown.remaining_amount,
            breakdown.total_online
        );
    }

    #[test]
    fn test_due_dates() {
        let period = period(dec!(110), dec!(0));
        let settings = settings(dec!(50));
        let input = quote(&period, &settings, &[], &[], &[], 7);

        let breakdown = price_stay(&input);

        // Booked 2025-06-01, arriving 2025-07-10
        assert_eq!(breakdown.deposit_due_date, date(2025, 6, 8));
        assert_eq!(breakdown.remaining_due_date, date(2025, 6, 10));
    }
}
