//! In-memory caching using moka
//!
//! Caches the pricing catalog snapshot and the rarely-changing site
//! content. The catalog TTL is short so admin rate edits reach guests
//! within minutes; content TTLs are more aggressive.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::db;
use crate::models::{BlogPost, BlogPostSummary, Event};
use crate::pricing::models::PricingCatalog;
use crate::pricing::queries as pricing_queries;

/// Application cache
#[derive(Clone)]
pub struct AppCache {
    /// Pricing catalog snapshot (singleton key "catalog")
    pub catalog: Cache<String, Arc<PricingCatalog>>,
    /// News posts (slug -> post)
    pub blog_posts: Cache<String, Arc<BlogPost>>,
    /// News listings (page -> summaries)
    pub blog_listings: Cache<i64, Arc<Vec<BlogPostSummary>>>,
    /// Upcoming events for the area page (singleton key "events")
    pub events: Cache<String, Arc<Vec<Event>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Catalog: 1 entry, 5 min TTL so rate edits show up quickly
            catalog: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(5 * 60))
                .build(),

            // News posts: 200 entries, 1 hour TTL (rarely change after publish)
            blog_posts: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(60 * 60))
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),

            // News listings: 20 pages, 15 min TTL
            blog_listings: Cache::builder()
                .max_capacity(20)
                .time_to_live(Duration::from_secs(15 * 60))
                .build(),

            // Events: 1 entry, 30 min TTL
            events: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalog_cached: self.catalog.entry_count() > 0,
            blog_posts_size: self.blog_posts.entry_count(),
            blog_listings_size: self.blog_listings.entry_count(),
            events_cached: self.events.entry_count() > 0,
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.catalog.invalidate_all();
        self.blog_posts.invalidate_all();
        self.blog_listings.invalidate_all();
        self.events.invalidate_all();
        info!("All caches invalidated");
    }

    /// Drop the catalog snapshot after an admin pricing edit
    pub fn invalidate_catalog(&self) {
        self.catalog.invalidate_all();
        info!("Pricing catalog cache invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub catalog_cached: bool,
    pub blog_posts_size: u64,
    pub blog_listings_size: u64,
    pub events_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    warm_cache(&cache, &db).await;

    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with commonly accessed data
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match pricing_queries::load_catalog(db).await {
        Ok(catalog) => {
            cache
                .catalog
                .insert("catalog".to_string(), Arc::new(catalog))
                .await;
        }
        Err(e) => warn!("Failed to warm catalog cache: {}", e),
    }

    match db::get_blog_posts(db, 9, 0).await {
        Ok(posts) => {
            cache.blog_listings.insert(1, Arc::new(posts)).await;
        }
        Err(e) => warn!("Failed to warm news listing cache: {}", e),
    }

    let today = chrono::Utc::now().date_naive();
    match db::get_upcoming_events(db, today, 12).await {
        Ok(events) => {
            cache.events.insert("events".to_string(), Arc::new(events)).await;
        }
        Err(e) => warn!("Failed to warm events cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
