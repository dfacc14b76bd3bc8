//! Database queries for news and area content

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BlogPost, BlogPostSummary, Event, Message};

/// Contact form submission
#[derive(Debug, Deserialize)]
pub struct MessageInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
}

/// Published news posts, newest first
pub async fn get_blog_posts(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<BlogPostSummary>> {
    let posts = sqlx::query_as::<_, BlogPostSummary>(
        r#"
        SELECT slug, title, excerpt, cover_image_url, published_at
        FROM blog_posts
        WHERE published_at IS NOT NULL
          AND published_at <= now()
        ORDER BY published_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Count published posts (for pagination)
pub async fn count_blog_posts(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM blog_posts
        WHERE published_at IS NOT NULL
          AND published_at <= now()
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Get a published news post by slug
pub async fn get_blog_post(pool: &PgPool, slug: &str) -> Result<BlogPost> {
    let post = sqlx::query_as::<_, BlogPost>(
        r#"
        SELECT id, slug, title, excerpt, body_html, cover_image_url,
               published_at, created_at
        FROM blog_posts
        WHERE slug = $1
          AND published_at IS NOT NULL
          AND published_at <= now()
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(post)
}

/// Published events that have not ended yet, soonest first
pub async fn get_upcoming_events(pool: &PgPool, today: NaiveDate, limit: i64) -> Result<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, starts_on, ends_on, location,
               is_published, created_at
        FROM events
        WHERE is_published = true
          AND COALESCE(ends_on, starts_on) >= $1
        ORDER BY starts_on
        LIMIT $2
        "#,
    )
    .bind(today)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// Store a contact form submission
pub async fn insert_message(pool: &PgPool, input: &MessageInput) -> Result<Message> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, name, email, subject, body, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        RETURNING id, name, email, subject, body, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.subject)
    .bind(&input.body)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

/// Contact messages for the admin inbox, newest first
pub async fn list_messages(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, name, email, subject, body, created_at
        FROM messages
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
