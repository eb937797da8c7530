//! Render a single post page to stdout

use anyhow::Result;

use crate::page::{self, PageStatus, RenderContext};

/// Print the page for `slug`, or its metadata as JSON
pub async fn run(ctx: &RenderContext, slug: &str, metadata_only: bool) -> Result<()> {
    if metadata_only {
        let metadata = page::generate_metadata(ctx, slug).await?;
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    let rendered = page::render_post_page(ctx, slug).await?;
    if rendered.status == PageStatus::NotFound {
        tracing::warn!("No post with slug {:?}", slug);
    }
    println!("{}", rendered.html);
    Ok(())
}
