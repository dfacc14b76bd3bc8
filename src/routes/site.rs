//! Public page route handlers

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use chrono::Utc;
use serde::Deserialize;

use crate::db::{self, MessageInput};
use crate::error::{AppError, Result};
use crate::models::BlogPostSummary;
use crate::pricing::models::{FeeKind, SeasonType};
use crate::pricing::services::{catalog_snapshot, FALLBACK_MIN_NIGHTS};
use crate::AppState;

/// Row of the seasonal price table on the apartment page
struct PeriodRow {
    label: String,
    range: String,
    base_price: String,
    room_surcharge: String,
    min_nights: i32,
    max_nights: i32,
}

/// Fee shown on the apartment page
struct FeeRow {
    id: String,
    name: String,
    amount: String,
    per: &'static str,
    on_site: bool,
}

/// Event shown on the area page
struct EventRow {
    title: String,
    date_range: String,
    location: String,
    description: String,
}

fn season_label(season: SeasonType) -> &'static str {
    match season {
        SeasonType::Low => "Nebensaison",
        SeasonType::Mid => "Zwischensaison",
        SeasonType::High => "Hauptsaison",
        SeasonType::Holiday => "Feiertage",
    }
}

fn calculation_label(calc: crate::pricing::models::CalculationType) -> &'static str {
    use crate::pricing::models::CalculationType::*;
    match calc {
        PerStay => "pro Aufenthalt",
        PerNight => "pro Nacht",
        PerPerson => "pro Person",
        PerPersonNight => "pro Person und Nacht",
    }
}

/// Homepage template
#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    posts: Vec<BlogPostSummary>,
    has_posts: bool,
}

/// Homepage handler
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let posts = db::get_blog_posts(&state.db, 3, 0).await?;

    let template = HomeTemplate {
        has_posts: !posts.is_empty(),
        posts,
    };

    Ok(Html(template.render()?))
}

/// Apartment details template, with the live price table and booking form
#[derive(Template)]
#[template(path = "apartment.html")]
struct ApartmentTemplate {
    periods: Vec<PeriodRow>,
    has_periods: bool,
    mandatory_fees: Vec<FeeRow>,
    optional_fees: Vec<FeeRow>,
    fallback_min_nights: i32,
}

/// Apartment details handler
pub async fn apartment(State(state): State<AppState>) -> Result<Html<String>> {
    let catalog = catalog_snapshot(&state.db, &state.cache).await?;

    let periods: Vec<PeriodRow> = catalog
        .periods
        .iter()
        .map(|p| PeriodRow {
            label: p
                .description
                .clone()
                .unwrap_or_else(|| season_label(p.season_type).to_string()),
            range: format!(
                "{} – {}",
                p.start_date.format("%d.%m.%Y"),
                p.end_date.format("%d.%m.%Y")
            ),
            base_price: format!("{:.2}", p.base_price),
            room_surcharge: format!("{:.2}", p.room_surcharge),
            min_nights: p.min_nights,
            max_nights: p.max_nights,
        })
        .collect();

    let fee_row = |fee: &crate::pricing::models::Fee| FeeRow {
        id: fee.id.to_string(),
        name: fee.name_for("de"),
        amount: format!("{:.2}", fee.amount),
        per: calculation_label(fee.calculation_type),
        on_site: fee.payment_location == crate::pricing::models::PaymentLocation::OnSite,
    };

    let template = ApartmentTemplate {
        has_periods: !periods.is_empty(),
        periods,
        mandatory_fees: catalog
            .fees
            .iter()
            .filter(|f| f.fee_kind == FeeKind::Mandatory)
            .map(fee_row)
            .collect(),
        optional_fees: catalog
            .fees
            .iter()
            .filter(|f| f.fee_kind == FeeKind::Optional)
            .map(fee_row)
            .collect(),
        fallback_min_nights: FALLBACK_MIN_NIGHTS,
    };

    Ok(Html(template.render()?))
}

/// Area guide template
#[derive(Template)]
#[template(path = "area.html")]
struct AreaTemplate {
    events: Vec<EventRow>,
    has_events: bool,
}

/// Area guide handler
pub async fn area(State(state): State<AppState>) -> Result<Html<String>> {
    let today = Utc::now().date_naive();

    let events = if let Some(cached) = state.cache.events.get("events").await {
        (*cached).clone()
    } else {
        let events = db::get_upcoming_events(&state.db, today, 12).await?;
        state
            .cache
            .events
            .insert("events".to_string(), std::sync::Arc::new(events.clone()))
            .await;
        events
    };

    let rows = events
        .iter()
        .map(|e| EventRow {
            title: e.title.clone(),
            date_range: match e.ends_on {
                Some(end) if end != e.starts_on => format!(
                    "{} – {}",
                    e.starts_on.format("%d.%m.%Y"),
                    end.format("%d.%m.%Y")
                ),
                _ => e.starts_on.format("%d.%m.%Y").to_string(),
            },
            location: e.location.clone().unwrap_or_default(),
            description: e.description.clone().unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    let template = AreaTemplate {
        has_events: !rows.is_empty(),
        events: rows,
    };

    Ok(Html(template.render()?))
}

/// Contact form template
#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    sent: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    #[serde(default)]
    pub sent: bool,
}

/// Contact form page
pub async fn contact(Query(query): Query<ContactQuery>) -> Result<Html<String>> {
    let template = ContactTemplate { sent: query.sent };
    Ok(Html(template.render()?))
}

/// Contact form submission
pub async fn contact_submit(
    State(state): State<AppState>,
    Form(input): Form<MessageInput>,
) -> Result<axum::response::Redirect> {
    if input.name.trim().is_empty() || input.body.trim().is_empty() {
        return Err(AppError::Validation(
            "Bitte Name und Nachricht ausfüllen.".to_string(),
        ));
    }
    if !input.email.contains('@') {
        return Err(AppError::Validation(
            "Bitte eine gültige E-Mail-Adresse angeben.".to_string(),
        ));
    }

    db::insert_message(&state.db, &input).await?;
    tracing::info!(from = %input.email, "contact message received");

    Ok(axum::response::Redirect::to("/kontakt?sent=true"))
}
