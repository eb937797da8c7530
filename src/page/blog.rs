//! Blog index page

use super::layout::base_context;
use super::{CardView, PageMetadata, PageStatus, RenderContext, RenderError, RenderedPage};

/// Render `/blog`: the most recent posts plus the category list
pub async fn render_blog_index(ctx: &RenderContext) -> Result<RenderedPage, RenderError> {
    let store = ctx.store.as_ref();
    let (posts, categories) = tokio::try_join!(
        store.fetch_posts(ctx.config.blog_per_page),
        store.fetch_categories(),
    )?;

    let cards: Vec<CardView> = posts
        .iter()
        .map(|post| CardView::new(ctx, post, "default"))
        .collect();

    let metadata = PageMetadata::new(
        &format!("Blog | {}", ctx.config.title),
        &format!("Articles and updates from the {}", ctx.config.description),
    );

    let mut context = base_context(ctx, &metadata);
    context.insert("posts", &cards);
    context.insert("categories", &categories);
    context.insert("show_categories", &true);
    let html = ctx.templates.render("blog_index.html", &context)?;

    Ok(RenderedPage {
        status: PageStatus::Ok,
        metadata,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{sample_post, MemoryStore};
    use crate::content::CategorySummary;
    use crate::page::testing::context;

    #[tokio::test]
    async fn test_blog_index() {
        let ctx = context(MemoryStore {
            categories: vec![CategorySummary {
                id: "cat-1".to_string(),
                title: "Workshops".to_string(),
                slug: None,
                description: None,
            }],
            ..MemoryStore::with_post(sample_post())
        });
        let page = render_blog_index(&ctx).await.unwrap();

        assert_eq!(page.status, PageStatus::Ok);
        assert!(page.html.contains("<title>Blog | IEEE GU Chapter</title>"));
        assert!(page.html.contains("Building a Line Follower"));
        assert!(page.html.contains("Notes from our robotics workshop."));
        assert!(page.html.contains("Workshops"));
    }

    #[tokio::test]
    async fn test_empty_blog() {
        let ctx = context(MemoryStore::default());
        let page = render_blog_index(&ctx).await.unwrap();
        assert!(page.html.contains("No posts yet"));
        assert!(!page.html.contains("blog-card"));
    }
}
