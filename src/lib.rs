//! Casa di Barbara — booking and marketing site for a holiday apartment.
//!
//! Public HTML pages are server-rendered with askama; the booking flow
//! and the admin back-office speak JSON under `/api` and `/admin/api`.

pub mod admin;
pub mod booking;
pub mod cache;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod pricing;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use cache::AppCache;
use email::Mailer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub mailer: Arc<Mailer>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::site::home))
        .route("/wohnung", get(routes::site::apartment))
        .route("/umgebung", get(routes::site::area))
        .route(
            "/kontakt",
            get(routes::site::contact).post(routes::site::contact_submit),
        )
        .route("/aktuelles", get(routes::blog::list))
        .route("/aktuelles/:slug", get(routes::blog::detail))
        .nest(
            "/api",
            pricing::routes::router().merge(booking::routes::router()),
        )
        .nest("/admin/api", admin::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
