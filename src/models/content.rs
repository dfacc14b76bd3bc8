//! Site content models: news posts, area events, contact messages

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// News post from the `blog_posts` table.
///
/// Public only once `published_at` is set and in the past.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body_html: String,
    pub cover_image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Listing row for the news index (no body)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPostSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Local happening shown on the area-guide page
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub location: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact form submission from the `messages` table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
