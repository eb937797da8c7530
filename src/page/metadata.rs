//! Document metadata for pages: title, description, Open Graph and Twitter card

use chrono::SecondsFormat;
use serde::Serialize;

use super::RenderContext;
use crate::config::SiteConfig;
use crate::content::{Post, StoreResult};
use crate::helpers::{full_url_for, html_escape, post_path, sizes};

pub const NOT_FOUND_TITLE: &str = "Post Not Found";
pub const NOT_FOUND_DESCRIPTION: &str = "The requested blog post could not be found.";

/// Metadata attached to a page. Optional fields are omitted, never placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Canonical absolute URL of the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl PageMetadata {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Site-wide defaults for pages that set nothing of their own
    pub fn site(config: &SiteConfig) -> Self {
        Self::new(&config.title, &config.description)
    }

    pub fn not_found() -> Self {
        Self::new(NOT_FOUND_TITLE, NOT_FOUND_DESCRIPTION)
    }

    /// `<title>` and `<meta>` tags for the document head
    pub fn to_head_html(&self) -> String {
        let mut head = format!("<title>{}</title>\n", html_escape(&self.title));
        push_meta(&mut head, "name", "description", &self.description);

        if let Some(og) = &self.open_graph {
            push_meta(&mut head, "property", "og:title", &og.title);
            push_meta(&mut head, "property", "og:description", &og.description);
            push_meta(&mut head, "property", "og:type", &og.kind);
            if let Some(url) = &og.url {
                push_meta(&mut head, "property", "og:url", url);
                head.push_str(&format!(
                    "<link rel=\"canonical\" href=\"{}\">\n",
                    html_escape(url)
                ));
            }
            if let Some(time) = &og.published_time {
                push_meta(&mut head, "property", "article:published_time", time);
            }
            for author in og.authors.iter().flatten() {
                push_meta(&mut head, "property", "article:author", author);
            }
            for image in og.images.iter().flatten() {
                push_meta(&mut head, "property", "og:image", image);
            }
        }

        if let Some(twitter) = &self.twitter {
            push_meta(&mut head, "name", "twitter:card", &twitter.card);
            push_meta(&mut head, "name", "twitter:title", &twitter.title);
            push_meta(&mut head, "name", "twitter:description", &twitter.description);
            for image in twitter.images.iter().flatten() {
                push_meta(&mut head, "name", "twitter:image", image);
            }
        }

        head
    }
}

fn push_meta(head: &mut String, attr: &str, key: &str, content: &str) {
    head.push_str(&format!(
        "<meta {}=\"{}\" content=\"{}\">\n",
        attr,
        key,
        html_escape(content)
    ));
}

/// Metadata for a post page, or the not-found fallback when `post` is absent
pub fn derive_metadata(ctx: &RenderContext, post: Option<&Post>) -> PageMetadata {
    let Some(post) = post else {
        return PageMetadata::not_found();
    };

    let author = post.first_author().map(|a| a.name.clone());
    let description = match post.excerpt() {
        Some(excerpt) => excerpt.to_string(),
        None => format!(
            "Read this article by {}",
            author.as_deref().unwrap_or(&ctx.config.default_author)
        ),
    };

    let images = post
        .main_image
        .as_ref()
        .map(|image| ctx.images.sized(image, sizes::SOCIAL))
        .filter(|url| !url.is_empty())
        .map(|url| vec![url]);

    PageMetadata {
        title: post.title.clone(),
        description: description.clone(),
        published_label: post.published_at.as_ref().map(|d| ctx.format_date(d)),
        open_graph: Some(OpenGraph {
            title: post.title.clone(),
            description: description.clone(),
            kind: "article".to_string(),
            url: full_url_for(&ctx.config, &post_path(&ctx.config, post.slug())),
            published_time: post
                .published_at
                .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            authors: author.map(|name| vec![name]),
            images: images.clone(),
        }),
        twitter: Some(TwitterCard {
            card: "summary_large_image".to_string(),
            title: post.title.clone(),
            description,
            images,
        }),
    }
}

/// Fetch the post for `slug` and derive its metadata
pub async fn generate_metadata(ctx: &RenderContext, slug: &str) -> StoreResult<PageMetadata> {
    let post = ctx.store.fetch_post(slug).await?;
    if post.is_none() {
        tracing::debug!("No post for slug {:?}, using fallback metadata", slug);
    }
    Ok(derive_metadata(ctx, post.as_ref()))
}
