//! News route handlers

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db;
use crate::error::Result;
use crate::models::{BlogPost, BlogPostSummary};
use crate::AppState;

/// Query parameters for the news listing
#[derive(Debug, Deserialize)]
pub struct NewsListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

const POSTS_PER_PAGE: i64 = 9;

/// News listing template
#[derive(Template)]
#[template(path = "blog/list.html")]
struct NewsListTemplate {
    posts: Vec<BlogPostSummary>,
    page: i64,
    total_pages: i64,
    has_previous: bool,
    has_next: bool,
    has_posts: bool,
}

/// News detail template
#[derive(Template)]
#[template(path = "blog/detail.html")]
struct NewsDetailTemplate {
    post: BlogPost,
    published: String,
    has_cover: bool,
    cover_image_url: String,
}

/// News listing page
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> Result<Html<String>> {
    let page = query.page.max(1);
    let offset = (page - 1) * POSTS_PER_PAGE;

    let posts = if page == 1 {
        if let Some(cached) = state.cache.blog_listings.get(&1).await {
            tracing::debug!("Cache HIT for news listing page 1");
            (*cached).clone()
        } else {
            let posts = db::get_blog_posts(&state.db, POSTS_PER_PAGE, 0).await?;
            state
                .cache
                .blog_listings
                .insert(1, Arc::new(posts.clone()))
                .await;
            posts
        }
    } else {
        db::get_blog_posts(&state.db, POSTS_PER_PAGE, offset).await?
    };

    let total = db::count_blog_posts(&state.db).await?;
    let total_pages = (total + POSTS_PER_PAGE - 1) / POSTS_PER_PAGE;

    let template = NewsListTemplate {
        has_posts: !posts.is_empty(),
        posts,
        page,
        total_pages,
        has_previous: page > 1,
        has_next: page < total_pages,
    };

    Ok(Html(template.render()?))
}

/// News detail page
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let post: BlogPost = if let Some(cached) = state.cache.blog_posts.get(&slug).await {
        tracing::debug!("Cache HIT for news post: {}", slug);
        (*cached).clone()
    } else {
        tracing::debug!("Cache MISS for news post: {}", slug);
        let post = db::get_blog_post(&state.db, &slug).await?;
        state
            .cache
            .blog_posts
            .insert(slug.clone(), Arc::new(post.clone()))
            .await;
        post
    };

    let published = post
        .published_at
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_default();
    let cover_image_url = post.cover_image_url.clone().unwrap_or_default();

    let template = NewsDetailTemplate {
        has_cover: !cover_image_url.is_empty(),
        cover_image_url,
        published,
        post,
    };

    Ok(Html(template.render()?))
}
