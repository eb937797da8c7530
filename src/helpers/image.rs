//! Image URL builder for CMS image assets

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::SanityConfig;
use crate::content::ImageRef;

lazy_static! {
    /// `image-<asset id>-<width>x<height>-<format>`
    static ref ASSET_REF: Regex =
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+)x(\d+)-([a-z0-9]+)$").unwrap();
}

/// Width/height pairs used across the site
pub mod sizes {
    /// Inline body images and hero images (16:9)
    pub const CONTENT: (u32, u32) = (800, 450);
    /// Social preview cards
    pub const SOCIAL: (u32, u32) = (1200, 630);
    /// Blog card thumbnails (16:9)
    pub const CARD: (u32, u32) = (400, 225);
    /// Author avatars
    pub const AVATAR: (u32, u32) = (96, 96);
}

/// Resolves image references to sized CDN URLs
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(base_url: &str, project_id: &str, dataset: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &SanityConfig) -> Self {
        Self::new(&config.image_cdn, &config.project_id, &config.dataset)
    }

    /// URL of `image` cropped to `width`x`height`
    ///
    /// Asset references resolve against the CDN; plain asset URLs get the
    /// size appended as query parameters. An image with neither resolves to
    /// an empty string.
    pub fn url(&self, image: &ImageRef, width: u32, height: u32) -> String {
        let Some(asset) = image.asset.as_ref() else {
            return String::new();
        };

        if let Some(caps) = asset
            .reference
            .as_deref()
            .and_then(|r| ASSET_REF.captures(r))
        {
            return format!(
                "{}/images/{}/{}/{}-{}x{}.{}?w={}&h={}&fit=crop&auto=format",
                self.base_url,
                self.project_id,
                self.dataset,
                &caps[1],
                &caps[2],
                &caps[3],
                &caps[4],
                width,
                height
            );
        }

        match asset.url.as_deref() {
            Some(url) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}w={}&h={}&fit=crop", url, separator, width, height)
            }
            None => String::new(),
        }
    }

    /// URL for one of the fixed [`sizes`]
    pub fn sized(&self, image: &ImageRef, (width, height): (u32, u32)) -> String {
        self.url(image, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImageUrlBuilder {
        ImageUrlBuilder::new("https://cdn.sanity.io/", "abc123", "production")
    }

    #[test]
    fn test_asset_reference() {
        let image = ImageRef::from_ref("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg");
        assert_eq!(
            builder().url(&image, 1200, 630),
            "https://cdn.sanity.io/images/abc123/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg?w=1200&h=630&fit=crop&auto=format"
        );
    }

    #[test]
    fn test_deterministic() {
        let image = ImageRef::from_ref("image-abc-10x10-png");
        assert_eq!(builder().url(&image, 800, 450), builder().url(&image, 800, 450));
    }

    #[test]
    fn test_plain_url() {
        let image = ImageRef::from_url("https://images.unsplash.com/photo-1");
        assert_eq!(
            builder().sized(&image, sizes::CONTENT),
            "https://images.unsplash.com/photo-1?w=800&h=450&fit=crop"
        );
        let image = ImageRef::from_url("https://images.unsplash.com/photo-1?q=80");
        assert_eq!(
            builder().url(&image, 10, 20),
            "https://images.unsplash.com/photo-1?q=80&w=10&h=20&fit=crop"
        );
    }

    #[test]
    fn test_unresolvable_image() {
        assert_eq!(builder().url(&ImageRef::default(), 800, 450), "");
        assert_eq!(builder().url(&ImageRef::from_ref("file-abc-pdf"), 800, 450), "");
    }
}
