//! Database models for email templates and the dispatch log

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Template from `email_templates`, one row per key and locale
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailTemplate {
    pub id: Uuid,
    pub template_key: String,
    pub locale: String,
    pub subject: String,
    pub body_html: String,
    pub is_active: bool,
}

/// Shared header/footer fragment from `email_template_parts`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailTemplatePart {
    pub id: Uuid,
    pub part_key: String,
    pub locale: String,
    pub body_html: String,
}

/// One dispatch attempt from `email_logs`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailLog {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub recipient: String,
    pub template_key: String,
    pub subject: String,
    pub status: String,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}
