//! Sanity content lake client
//!
//! Runs GROQ queries over the HTTP query API and decodes the results into
//! the same models the local store produces.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::store::{ContentStore, StoreError, StoreResult};
use super::{CategorySummary, Post, PostSummary};
use crate::config::SanityConfig;

const SUMMARY_FIELDS: &str =
    r#"_id, title, slug, excerpt, mainImage, publishedAt, "estimatedReadingTime": round(length(pt::text(content)) / 5 / 180)"#;

/// Sanity HTTP API client
pub struct SanityClient {
    /// Query endpoint for the configured dataset
    endpoint: String,
    /// Read token for private datasets
    token: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

/// Envelope of every query response
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

impl SanityClient {
    /// Create a client for a project/dataset
    pub fn new(project_id: &str, dataset: &str, api_version: &str, use_cdn: bool) -> Self {
        let host = if use_cdn { "apicdn" } else { "api" };
        Self {
            endpoint: format!(
                "https://{}.{}.sanity.io/v{}/data/query/{}",
                project_id, host, api_version, dataset
            ),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create from config
    pub fn from_config(config: &SanityConfig) -> StoreResult<Self> {
        if config.project_id.is_empty() {
            return Err(StoreError::Config(
                "content.sanity.project_id is required".to_string(),
            ));
        }
        // The CDN does not serve authenticated queries
        let use_cdn = config.use_cdn && config.token.is_none();
        let mut client = Self::new(
            &config.project_id,
            &config.dataset,
            &config.api_version,
            use_cdn,
        );
        client.token = config.token.clone();
        Ok(client)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a GROQ query; `params` values are JSON-encoded as the API expects
    async fn query<T: DeserializeOwned>(
        &self,
        what: &str,
        groq: &str,
        params: &[(&str, serde_json::Value)],
    ) -> StoreResult<T> {
        let mut query: Vec<(String, String)> = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            query.push((format!("${}", name), value.to_string()));
        }

        let mut request = self.client.get(&self.endpoint).query(&query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Sanity query: {}", what);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let decoded: QueryResponse<T> =
            serde_json::from_str(&body).map_err(|source| StoreError::Decode {
                what: what.to_string(),
                source,
            })?;
        Ok(decoded.result)
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    fn name(&self) -> &str {
        "sanity"
    }

    async fn fetch_post(&self, slug: &str) -> StoreResult<Option<Post>> {
        let groq = format!(
            r#"*[_type == "post" && slug.current == $slug][0]{{
  {},
  "authors": authors[]->{{name, slug, image, bio}},
  categories,
  content
}}"#,
            SUMMARY_FIELDS
        );
        self.query("post", &groq, &[("slug", slug.into())]).await
    }

    async fn fetch_related(&self, slug: &str, limit: usize) -> StoreResult<Vec<PostSummary>> {
        let groq = format!(
            r#"*[_type == "post" && slug.current != $slug
  && count(categories[@._ref in *[_type == "post" && slug.current == $slug][0].categories[]._ref]) > 0]
  | order(publishedAt desc) [0...$limit] {{ {} }}"#,
            SUMMARY_FIELDS
        );
        let params = [("slug", slug.into()), ("limit", limit.into())];
        let related: Vec<PostSummary> = self.query("related posts", &groq, &params).await?;
        if !related.is_empty() {
            return Ok(related);
        }

        // Uncategorized posts fall back to the latest ones
        let groq = format!(
            r#"*[_type == "post" && slug.current != $slug] | order(publishedAt desc) [0...$limit] {{ {} }}"#,
            SUMMARY_FIELDS
        );
        self.query("latest posts", &groq, &params).await
    }

    async fn fetch_categories(&self) -> StoreResult<Vec<CategorySummary>> {
        self.query(
            "categories",
            r#"*[_type == "category"] | order(title asc) { _id, title, slug, description }"#,
            &[],
        )
        .await
    }

    async fn fetch_posts(&self, limit: usize) -> StoreResult<Vec<PostSummary>> {
        let groq = format!(
            r#"*[_type == "post" && defined(slug.current)] | order(publishedAt desc) [0...$limit] {{ {} }}"#,
            SUMMARY_FIELDS
        );
        self.query("posts", &groq, &[("limit", limit.into())]).await
    }
}
