//! Database queries for email templates, parts and logs.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{EmailLog, EmailTemplate, EmailTemplatePart};

/// Get an active template for a key, preferring the requested locale
/// and falling back to German.
pub async fn get_template(
    pool: &PgPool,
    template_key: &str,
    locale: &str,
) -> Result<Option<EmailTemplate>> {
    let template = sqlx::query_as::<_, EmailTemplate>(
        r#"
        SELECT id, template_key, locale, subject, body_html, is_active
        FROM email_templates
        WHERE template_key = $1
          AND is_active = true
          AND locale IN ($2, 'de')
        ORDER BY (locale = $2) DESC
        LIMIT 1
        "#,
    )
    .bind(template_key)
    .bind(locale)
    .fetch_optional(pool)
    .await?;

    Ok(template)
}

/// Get a header/footer part, with the same locale fallback
pub async fn get_part(
    pool: &PgPool,
    part_key: &str,
    locale: &str,
) -> Result<Option<EmailTemplatePart>> {
    let part = sqlx::query_as::<_, EmailTemplatePart>(
        r#"
        SELECT id, part_key, locale, body_html
        FROM email_template_parts
        WHERE part_key = $1
          AND locale IN ($2, 'de')
        ORDER BY (locale = $2) DESC
        LIMIT 1
        "#,
    )
    .bind(part_key)
    .bind(locale)
    .fetch_optional(pool)
    .await?;

    Ok(part)
}

/// Record a dispatch attempt, successful or not
pub async fn insert_log(
    pool: &PgPool,
    booking_id: Option<Uuid>,
    recipient: &str,
    template_key: &str,
    subject: &str,
    status: &str,
    error: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO email_logs
            (id, booking_id, recipient, template_key, subject, status, error, sent_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking_id)
    .bind(recipient)
    .bind(template_key)
    .bind(subject)
    .bind(status)
    .bind(error)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_logs(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<EmailLog>> {
    let logs = sqlx::query_as::<_, EmailLog>(
        r#"
        SELECT id, booking_id, recipient, template_key, subject, status, error, sent_at
        FROM email_logs
        ORDER BY sent_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

pub async fn list_templates(pool: &PgPool) -> Result<Vec<EmailTemplate>> {
    let templates = sqlx::query_as::<_, EmailTemplate>(
        r#"
        SELECT id, template_key, locale, subject, body_html, is_active
        FROM email_templates
        ORDER BY template_key, locale
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(templates)
}

/// Admin payload for editing a template
#[derive(Debug, Deserialize)]
pub struct TemplateInput {
    pub subject: String,
    pub body_html: String,
    pub is_active: bool,
}

pub async fn update_template(pool: &PgPool, id: Uuid, input: &TemplateInput) -> Result<EmailTemplate> {
    sqlx::query_as::<_, EmailTemplate>(
        r#"
        UPDATE email_templates
        SET subject = $2, body_html = $3, is_active = $4
        WHERE id = $1
        RETURNING id, template_key, locale, subject, body_html, is_active
        "#,
    )
    .bind(id)
    .bind(&input.subject)
    .bind(&input.body_html)
    .bind(input.is_active)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}
