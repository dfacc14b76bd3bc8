//! Outbound email dispatch through the hosted `send-email` function.
//!
//! Rendering happens in-process (see [`super::template`]); the hosted
//! function only ever receives finished subject and HTML. Every attempt
//! is recorded in `email_logs`.

use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::error::Result;
use crate::models::{Booking, Guest};
use crate::pricing::calculators::{DiscountSource, PriceBreakdown};
use crate::pricing::models::DiscountType;
use crate::pricing::services::catalog_snapshot;
use crate::AppState;

use super::queries;
use super::template::render_template;

const CONFIRMATION_TEMPLATE: &str = "booking_confirmation";

/// HTTP client for the hosted send-email function
pub struct Mailer {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl Mailer {
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            token,
        }
    }

    /// Dispatch one rendered email
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let mut request = self.http.post(&self.endpoint).json(&json!({
            "to": to,
            "subject": subject,
            "html": html,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}

fn discount_label(source: DiscountSource) -> &'static str {
    match source {
        DiscountSource::Catalog(DiscountType::EarlyBird) => "Frühbucherrabatt",
        DiscountSource::Catalog(DiscountType::LastMinute) => "Last-Minute-Rabatt",
        DiscountSource::Catalog(DiscountType::LongStay) => "Langzeitrabatt",
        DiscountSource::Manual => "Rabatt",
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Template context for the confirmation email
fn confirmation_context(
    booking: &Booking,
    guest: &Guest,
    breakdown: &PriceBreakdown,
    bank: &crate::pricing::models::PaymentSettings,
) -> serde_json::Value {
    let fee_lines: Vec<serde_json::Value> = breakdown
        .mandatory_fees
        .iter()
        .chain(breakdown.optional_fees.iter())
        .map(|line| {
            json!({
                "name": line.name,
                "amount": format!("{:.2}", line.amount),
            })
        })
        .collect();

    let discount_lines: Vec<serde_json::Value> = breakdown
        .discounts
        .iter()
        .map(|line| {
            json!({
                "label": discount_label(line.source),
                "percentage": format!("{}", line.percentage),
                "amount": format!("{:.2}", line.amount),
            })
        })
        .collect();

    json!({
        "reference": booking.reference,
        "guest_first_name": guest.first_name,
        "guest_last_name": guest.last_name,
        "start_date": format_date(booking.start_date),
        "end_date": format_date(booking.end_date),
        "nights": breakdown.nights,
        "num_adults": booking.num_adults,
        "num_children": booking.num_children,
        "total_online": format!("{:.2}", breakdown.total_online),
        "total_on_site": format!("{:.2}", breakdown.total_on_site),
        "has_on_site": !breakdown.total_on_site.is_zero(),
        "deposit_amount": format!("{:.2}", breakdown.deposit_amount),
        "deposit_due_date": format_date(breakdown.deposit_due_date),
        "remaining_amount": format!("{:.2}", breakdown.remaining_amount),
        "remaining_due_date": format_date(breakdown.remaining_due_date),
        "fees": fee_lines,
        "discounts": discount_lines,
        "has_discounts": !discount_lines.is_empty(),
        "bank": {
            "name": bank.bank_name,
            "iban": bank.bank_iban,
            "bic": bank.bank_bic,
            "holder": bank.account_holder,
        },
    })
}

/// Render and send the booking confirmation, logging the outcome.
///
/// Runs detached from the booking request; failures are logged, never
/// propagated to the guest who already holds a committed booking.
pub async fn send_booking_confirmation(
    state: AppState,
    booking: Booking,
    guest: Guest,
    breakdown: PriceBreakdown,
) {
    let locale = guest.preferred_language.clone();

    let template = match queries::get_template(&state.db, CONFIRMATION_TEMPLATE, &locale).await {
        Ok(Some(t)) => t,
        Ok(None) => {
            warn!(template = CONFIRMATION_TEMPLATE, "no active email template, skipping");
            return;
        }
        Err(e) => {
            warn!("loading email template failed: {}", e);
            return;
        }
    };

    let catalog = match catalog_snapshot(&state.db, &state.cache).await {
        Ok(c) => c,
        Err(e) => {
            warn!("loading payment settings for email failed: {}", e);
            return;
        }
    };

    let context = confirmation_context(&booking, &guest, &breakdown, &catalog.settings);

    let header = queries::get_part(&state.db, "header", &locale)
        .await
        .ok()
        .flatten()
        .map(|p| p.body_html)
        .unwrap_or_default();
    let footer = queries::get_part(&state.db, "footer", &locale)
        .await
        .ok()
        .flatten()
        .map(|p| p.body_html)
        .unwrap_or_default();

    let subject = render_template(&template.subject, &context);
    let body = render_template(&template.body_html, &context);
    let html = format!("{}{}{}", header, body, footer);

    let (status, error) = match state.mailer.send(&guest.email, &subject, &html).await {
        Ok(()) => ("sent", None),
        Err(e) => {
            warn!(recipient = %guest.email, "confirmation email failed: {}", e);
            ("failed", Some(e.to_string()))
        }
    };

    if let Err(e) = queries::insert_log(
        &state.db,
        Some(booking.id),
        &guest.email,
        CONFIRMATION_TEMPLATE,
        &subject,
        status,
        error.as_deref(),
    )
    .await
    {
        warn!("writing email log failed: {}", e);
    }
}
