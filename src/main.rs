use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use casabarbara_web::booking;
use casabarbara_web::cache::{self, AppCache};
use casabarbara_web::email::Mailer;
use casabarbara_web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "casabarbara_web=debug,tower_http=info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let send_email_url =
        std::env::var("SEND_EMAIL_URL").context("SEND_EMAIL_URL must be set")?;
    let send_email_token = std::env::var("SEND_EMAIL_TOKEN").ok();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("connecting to database")?;

    let cache = AppCache::new();
    let mailer = Arc::new(Mailer::new(send_email_url, send_email_token));

    let state = AppState {
        db: db.clone(),
        cache: cache.clone(),
        mailer,
    };

    tokio::spawn(cache::start_cache_warmer(cache, db.clone()));
    tokio::spawn(booking::services::start_pending_sweeper(db));

    let app = casabarbara_web::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    tracing::info!("listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
