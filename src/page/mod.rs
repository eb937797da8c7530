//! Server-rendered pages
//!
//! Every page is a function of fetched content plus site configuration. The
//! [`RenderContext`] bundles the collaborators a page needs; each page module
//! returns a [`RenderedPage`] that the server or the static exporter writes out.

pub mod blog;
pub mod home;
pub mod layout;
pub mod metadata;
pub mod post;

pub use blog::render_blog_index;
pub use home::render_home;
pub use metadata::{derive_metadata, generate_metadata, OpenGraph, PageMetadata, TwitterCard};
pub use post::{render_not_found, render_post_page};

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{ContentStore, PostSummary, StoreError};
use crate::helpers::{format_timestamp, post_path, sizes, ImageUrlBuilder};
use crate::portable::{CodeHighlighter, PortableTextRenderer};
use crate::templates::TemplateRenderer;

/// Failures while producing a page
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl RenderError {
    /// Status served for this failure: upstream content errors are a bad gateway
    pub fn status_code(&self) -> u16 {
        match self {
            RenderError::Store(_) => 502,
            RenderError::Template(_) => 500,
        }
    }
}

/// Whether the page found what it was asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

impl PageStatus {
    pub fn code(self) -> u16 {
        match self {
            PageStatus::Ok => 200,
            PageStatus::NotFound => 404,
        }
    }
}

/// A finished HTML document
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: PageStatus,
    pub metadata: PageMetadata,
    pub html: String,
}

/// Everything a page render needs
#[derive(Clone)]
pub struct RenderContext {
    pub config: Arc<SiteConfig>,
    pub store: Arc<dyn ContentStore>,
    pub images: ImageUrlBuilder,
    pub templates: Arc<TemplateRenderer>,
    pub highlighter: Option<Arc<CodeHighlighter>>,
    pub timezone: Tz,
}

impl RenderContext {
    pub fn new(config: SiteConfig, store: Arc<dyn ContentStore>) -> Result<Self> {
        let images = ImageUrlBuilder::from_config(&config.content.sanity);
        let highlighter = config
            .highlight
            .enable
            .then(|| Arc::new(CodeHighlighter::new(&config.highlight.theme)));
        let timezone = config.timezone();

        Ok(Self {
            templates: Arc::new(TemplateRenderer::new()?),
            config: Arc::new(config),
            store,
            images,
            highlighter,
            timezone,
        })
    }

    /// Portable text renderer bound to this site's image CDN and highlighter
    pub fn portable(&self) -> PortableTextRenderer<'_> {
        PortableTextRenderer::new(&self.images).with_highlighter(self.highlighter.as_deref())
    }

    /// Publish date in the site timezone and date pattern
    pub fn format_date(&self, timestamp: &DateTime<Utc>) -> String {
        format_timestamp(timestamp, &self.config.date_format, self.timezone)
    }
}

/// Listing card for a post
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub title: String,
    pub href: String,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub date: Option<String>,
    pub reading_time: Option<u32>,
    /// `small` cards drop the excerpt
    pub variant: &'static str,
}

impl CardView {
    pub fn new(ctx: &RenderContext, post: &PostSummary, variant: &'static str) -> Self {
        Self {
            title: post.title.clone(),
            href: post_path(&ctx.config, &post.slug.current),
            excerpt: post.excerpt.clone().filter(|e| !e.is_empty()),
            image: post
                .main_image
                .as_ref()
                .map(|image| ctx.images.sized(image, sizes::CARD))
                .filter(|url| !url.is_empty()),
            date: post.published_at.as_ref().map(|d| ctx.format_date(d)),
            reading_time: post.estimated_reading_time,
            variant,
        }
    }
}
