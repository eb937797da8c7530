//! Blog post page

use serde::Serialize;

use super::layout::base_context;
use super::metadata::derive_metadata;
use super::{CardView, PageMetadata, PageStatus, RenderContext, RenderError, RenderedPage};
use crate::content::{Author, CategorySummary, Post};
use crate::helpers::{byline, sizes};

#[derive(Debug, Serialize)]
struct PostView {
    title: String,
    byline: String,
    hero: Option<String>,
    body: String,
}

#[derive(Debug, Serialize)]
struct AuthorView {
    name: String,
    image: Option<String>,
    bio: String,
}

impl AuthorView {
    fn new(ctx: &RenderContext, author: &Author) -> Self {
        Self {
            name: author.name.clone(),
            image: author
                .image
                .as_ref()
                .map(|image| ctx.images.sized(image, sizes::AVATAR))
                .filter(|url| !url.is_empty()),
            bio: ctx.portable().render(&author.bio),
        }
    }
}

/// Render `/blog/<slug>`
///
/// The post, its related posts and the category list are fetched together;
/// any store failure fails the whole page. A missing post renders the
/// not-found page with a 404 status.
pub async fn render_post_page(ctx: &RenderContext, slug: &str) -> Result<RenderedPage, RenderError> {
    let store = ctx.store.as_ref();
    let limit = ctx.config.related_posts;
    let (post, related, categories) = tokio::try_join!(
        store.fetch_post(slug),
        store.fetch_related(slug, limit),
        store.fetch_categories(),
    )?;

    let Some(post) = post else {
        tracing::info!("Post not found: {}", slug);
        return render_not_found(ctx);
    };

    let related: Vec<CardView> = related
        .iter()
        .filter(|summary| summary.slug.current != slug)
        .take(limit)
        .map(|summary| CardView::new(ctx, summary, "small"))
        .collect();

    let metadata = derive_metadata(ctx, Some(&post));
    let html = render_post(ctx, &post, &metadata, &related, &categories)?;

    Ok(RenderedPage {
        status: PageStatus::Ok,
        metadata,
        html,
    })
}

fn render_post(
    ctx: &RenderContext,
    post: &Post,
    metadata: &PageMetadata,
    related: &[CardView],
    categories: &[CategorySummary],
) -> Result<String, RenderError> {
    let view = PostView {
        title: post.title.clone(),
        byline: byline(
            metadata.published_label.as_deref(),
            post.estimated_reading_time,
        ),
        hero: post
            .main_image
            .as_ref()
            .map(|image| ctx.images.sized(image, sizes::CONTENT))
            .filter(|url| !url.is_empty()),
        body: ctx.portable().render(&post.content),
    };
    let author = post.first_author().map(|a| AuthorView::new(ctx, a));

    let mut context = base_context(ctx, metadata);
    context.insert("post", &view);
    context.insert("author", &author);
    context.insert("related", related);
    context.insert("categories", categories);
    context.insert("show_categories", &false);

    Ok(ctx.templates.render("post.html", &context)?)
}

/// The page served for an unknown slug
pub fn render_not_found(ctx: &RenderContext) -> Result<RenderedPage, RenderError> {
    let metadata = PageMetadata::not_found();
    let context = base_context(ctx, &metadata);
    let html = ctx.templates.render("not_found.html", &context)?;

    Ok(RenderedPage {
        status: PageStatus::NotFound,
        metadata,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{sample_post, summary, MemoryStore};
    use crate::content::{CategorySummary, ContentBlock, StoreError};
    use crate::page::testing::context;

    fn store_with_related(related: Vec<crate::content::PostSummary>) -> MemoryStore {
        MemoryStore {
            related,
            categories: vec![CategorySummary {
                id: "cat-1".to_string(),
                title: "Robotics".to_string(),
                slug: None,
                description: None,
            }],
            ..MemoryStore::with_post(sample_post())
        }
    }

    #[tokio::test]
    async fn test_unknown_slug_renders_not_found() {
        let ctx = context(store_with_related(vec![summary("other", "Other Post")]));
        let page = render_post_page(&ctx, "unknown-post").await.unwrap();

        assert_eq!(page.status, PageStatus::NotFound);
        assert_eq!(page.metadata.title, "Post Not Found");
        assert!(page.html.contains("<h1 class=\"text-3xl font-bold text-gray-800\">Post Not Found</h1>"));
        assert!(!page.html.contains("Related Articles"));
        assert!(!page.html.contains("Other Post"));
    }

    #[tokio::test]
    async fn test_full_post_page() {
        let ctx = context(store_with_related(vec![
            summary("soldering-101", "Soldering 101"),
            summary("line-follower", "Building a Line Follower"),
        ]));
        let page = render_post_page(&ctx, "line-follower").await.unwrap();
        let html = &page.html;

        assert_eq!(page.status, PageStatus::Ok);
        assert!(html.contains("<title>Building a Line Follower</title>"));
        assert!(html.contains("March 05, 2024 · 6 min read"));
        assert!(html.contains(r#"fetchpriority="high""#));
        assert!(html.contains(r#"loading="eager""#));
        assert!(html.contains("Sensors first."));
        assert!(html.contains("Robotics lead."));
        assert!(html.contains("Related Articles"));
        assert!(html.contains("Soldering 101"));
        // the current post never lists itself
        assert_eq!(html.matches(r#"class="blog-card "#).count(), 1);
    }

    #[tokio::test]
    async fn test_only_first_author_is_rendered() {
        let ctx = context(store_with_related(Vec::new()));
        let page = render_post_page(&ctx, "line-follower").await.unwrap();
        assert!(page.html.contains("Asha Verma"));
        assert!(!page.html.contains("Rohan Mehta"));
    }

    #[tokio::test]
    async fn test_no_related_section_when_empty() {
        let ctx = context(store_with_related(Vec::new()));
        let page = render_post_page(&ctx, "line-follower").await.unwrap();
        assert!(!page.html.contains("Related Articles"));
    }

    #[tokio::test]
    async fn test_minimal_post() {
        let mut post = Post::new("post-2", "Plain", "plain");
        post.content = vec![ContentBlock::paragraph("Just text.")];
        let ctx = context(MemoryStore::with_post(post));
        let page = render_post_page(&ctx, "plain").await.unwrap();

        assert!(page.html.contains("Just text."));
        assert!(!page.html.contains("min read"));
        assert!(!page.html.contains("fetchpriority"));
        assert!(!page.html.contains("About the author"));
    }

    #[tokio::test]
    async fn test_null_callout_tag_renders_as_info() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "_id": "post-3",
            "title": "Lab Safety",
            "slug": {"current": "lab-safety"},
            "content": [
                {"_type": "callout", "type": null, "content": [
                    {"_type": "block", "children": [{"_type": "span", "text": "Wear goggles"}]}
                ]},
                {"_type": "code", "code": null}
            ]
        }))
        .unwrap();
        let ctx = context(MemoryStore::with_post(post));
        let page = render_post_page(&ctx, "lab-safety").await.unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.html.contains("Wear goggles"));
        assert!(page.html.contains("bg-blue-50 border-blue-500 text-blue-700"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let ctx = context(MemoryStore {
            failing: true,
            ..Default::default()
        });
        let err = render_post_page(&ctx, "line-follower").await.unwrap_err();
        assert!(matches!(err, RenderError::Store(StoreError::Status { status: 503, .. })));
    }
}
