//! The read boundary between page rendering and wherever posts live

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::{CategorySummary, LocalStore, Post, PostSummary, SanityClient};
use crate::config::ContentSource;
use crate::Site;

/// Failures talking to a content store. An absent post is not an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("content task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("content store misconfigured: {0}")]
    Config(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read operations the site needs from a content store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Fetch one post by slug; `Ok(None)` when no post has that slug
    async fn fetch_post(&self, slug: &str) -> StoreResult<Option<Post>>;

    /// Up to `limit` posts related to `slug`, never including it, newest first
    async fn fetch_related(&self, slug: &str, limit: usize) -> StoreResult<Vec<PostSummary>>;

    /// All categories
    async fn fetch_categories(&self) -> StoreResult<Vec<CategorySummary>>;

    /// The `limit` most recent posts
    async fn fetch_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>>;
}

/// Open the store selected by the site configuration
pub fn open(site: &Site) -> StoreResult<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match site.config.content.source {
        ContentSource::Local => Arc::new(LocalStore::new(&site.content_dir)),
        ContentSource::Sanity => Arc::new(SanityClient::from_config(&site.config.content.sanity)?),
    };
    tracing::debug!("Using {} content store", store.name());
    Ok(store)
}
