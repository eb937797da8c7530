//! Static export of the site into the public directory

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::carousel::{AssetProbe, Carousel};
use crate::page::{self, RenderContext};
use crate::Site;

/// Upper bound on posts exported in one run
const EXPORT_LIMIT: usize = 1000;

/// What a generation run wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateStats {
    pub pages: usize,
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    ctx: RenderContext,
    static_dir: PathBuf,
    public_dir: PathBuf,
}

impl Generator {
    /// Create a generator over the site's configured content store
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self::with_context(site, site.render_context()?))
    }

    pub fn with_context(site: &Site, ctx: RenderContext) -> Self {
        Self {
            ctx,
            static_dir: site.static_dir.clone(),
            public_dir: site.public_dir.clone(),
        }
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.public_dir)?;

        let mut stats = GenerateStats {
            assets: self.copy_static_assets()?,
            ..Default::default()
        };

        // Home page, with whichever carousel images load now
        let carousel = self.preload_carousel().await?;
        let home = page::render_home(&self.ctx, &carousel.view(self.ctx.config.carousel.direction))?;
        self.write_page("index.html", &home.html)?;
        stats.pages += 1;

        let index = page::render_blog_index(&self.ctx).await?;
        self.write_page("blog/index.html", &index.html)?;
        stats.pages += 1;

        let posts = self.ctx.store.fetch_posts(EXPORT_LIMIT).await?;
        for post in &posts {
            let slug = &post.slug.current;
            if slug.is_empty() || slug.contains('/') || slug.contains("..") {
                tracing::warn!("Skipping post {} with unusable slug {:?}", post.id, slug);
                continue;
            }
            let rendered = page::render_post_page(&self.ctx, slug).await?;
            self.write_page(&format!("blog/{}/index.html", slug), &rendered.html)?;
            stats.posts += 1;
        }

        let not_found = page::render_not_found(&self.ctx)?;
        self.write_page("404.html", &not_found.html)?;
        stats.pages += 1;

        Ok(stats)
    }

    async fn preload_carousel(&self) -> Result<Carousel> {
        let config = &self.ctx.config.carousel;
        let mut carousel = Carousel::new(config.images.clone());
        if !config.images.is_empty() {
            let probe = AssetProbe::new(
                self.static_dir.clone(),
                Duration::from_secs(config.preload_timeout),
            )?;
            carousel.preload(&probe).await;
        }
        Ok(carousel)
    }

    fn write_page(&self, relative: &str, html: &str) -> Result<()> {
        let output_path = self.public_dir.join(relative.trim_start_matches('/'));
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy static assets (images, css, js) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        if !self.static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&self.static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_hidden(path) {
                continue;
            }

            let relative = path.strip_prefix(&self.static_dir)?;
            let dest = self.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
