//! Image availability checks used while preloading

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Checks that an image URL can be loaded
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<()>;
}

/// Probes remote images over HTTP and site-relative images on disk
pub struct AssetProbe {
    client: reqwest::Client,
    static_dir: PathBuf,
}

impl AssetProbe {
    pub fn new(static_dir: PathBuf, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, static_dir })
    }

    async fn probe_remote(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }

        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !content_type.starts_with("image/") {
                bail!("not an image ({})", content_type);
            }
        }

        Ok(())
    }

    async fn probe_local(&self, path: &str) -> Result<()> {
        let file = self.static_dir.join(path.trim_start_matches('/'));
        let metadata = tokio::fs::metadata(&file)
            .await
            .with_context(|| format!("Missing {:?}", file))?;
        if !metadata.is_file() {
            bail!("{:?} is not a file", file);
        }
        Ok(())
    }
}

#[async_trait]
impl ImageProbe for AssetProbe {
    async fn probe(&self, url: &str) -> Result<()> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.probe_remote(url).await
        } else {
            self.probe_local(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_images() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/hero.jpg"), b"jpeg").unwrap();

        let probe = AssetProbe::new(dir.path().to_path_buf(), Duration::from_secs(1)).unwrap();
        assert!(probe.probe("/images/hero.jpg").await.is_ok());
        assert!(probe.probe("/images/missing.jpg").await.is_err());
        assert!(probe.probe("/images").await.is_err());
    }
}
