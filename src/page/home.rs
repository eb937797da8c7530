//! Home page with the hero carousel

use super::layout::base_context;
use super::{PageMetadata, PageStatus, RenderContext, RenderError, RenderedPage};
use crate::carousel::CarouselView;

/// Render `/` around the current carousel state
///
/// Slides and the headline over them appear only once preloading has
/// settled with at least one image.
pub fn render_home(ctx: &RenderContext, carousel: &CarouselView) -> Result<RenderedPage, RenderError> {
    let metadata = PageMetadata::site(&ctx.config);

    let mut context = base_context(ctx, &metadata);
    context.insert("carousel", carousel);
    context.insert("overlay", &ctx.config.carousel.overlay);
    context.insert("description", &ctx.config.description);
    let html = ctx.templates.render("home.html", &context)?;

    Ok(RenderedPage {
        status: PageStatus::Ok,
        metadata,
        html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::{Carousel, Direction, ImageProbe};
    use crate::content::testing::MemoryStore;
    use crate::page::testing::context;
    use async_trait::async_trait;

    struct Loads;

    #[async_trait]
    impl ImageProbe for Loads {
        async fn probe(&self, url: &str) -> anyhow::Result<()> {
            if url.ends_with("missing.jpg") {
                anyhow::bail!("not found");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_home_with_slides() {
        let ctx = context(MemoryStore::default());
        let mut carousel = Carousel::new(vec!["/images/a.jpg".to_string(), "/images/b.jpg".to_string()]);
        carousel.preload(&Loads).await;
        carousel.next();

        let page = render_home(&ctx, &carousel.view(Direction::Down)).unwrap();
        assert!(page.html.contains("<title>IEEE GU Chapter</title>"));
        assert!(page.html.contains("slide-exit-down"));
        assert!(page.html.contains(r#"data-index="1""#));
        assert!(page.html.contains("carousel-slide"));
    }

    #[tokio::test]
    async fn test_home_without_loaded_images() {
        let ctx = context(MemoryStore::default());
        let mut carousel = Carousel::new(vec!["/images/missing.jpg".to_string()]);
        carousel.preload(&Loads).await;

        let page = render_home(&ctx, &carousel.view(Direction::Up)).unwrap();
        assert!(!page.html.contains("carousel-slide"));
        assert!(page.html.contains("<main class=\"bg-white\">"));
    }
}
