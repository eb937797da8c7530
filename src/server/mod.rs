//! HTTP server: rendered pages, the carousel API and static files

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::PageCache;
use crate::carousel::{
    AssetProbe, Carousel, CarouselDriver, CarouselSettings, CarouselView, Key, AUTOPLAY_INTERVAL,
};
use crate::config::SiteConfig;
use crate::page::{
    self, layout, PageMetadata, PageStatus, RenderContext, RenderError, RenderedPage,
};
use crate::{Site, CONFIG_FILE};

/// Shared server state
pub struct AppState {
    ctx: RenderContext,
    cache: PageCache,
    carousel: CarouselDriver,
}

impl AppState {
    /// Mount the carousel and create an empty page cache; needs a tokio runtime
    pub fn new(ctx: RenderContext) -> Self {
        let config = ctx.config.clone();
        let carousel = CarouselDriver::mount(
            Arc::new(Mutex::new(Carousel::new(config.carousel.images.clone()))),
            CarouselSettings {
                autoplay: config.carousel.autoplay,
                direction: config.carousel.direction,
                interval: AUTOPLAY_INTERVAL,
            },
        );

        Self {
            cache: PageCache::new(Duration::from_secs(config.revalidate)),
            carousel,
            ctx,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn carousel(&self) -> &CarouselDriver {
        &self.carousel
    }

    /// Re-read the config file and apply carousel settings to the mounted
    /// driver; returns whether the subscriptions were swapped
    pub fn reload_config(&self, path: &std::path::Path) -> Result<bool> {
        let config = SiteConfig::load(path)?;
        let changed = self
            .carousel
            .reconfigure(config.carousel.autoplay, config.carousel.direction);
        if changed {
            tracing::info!(
                "Carousel reconfigured (autoplay: {}, direction: {:?})",
                config.carousel.autoplay,
                config.carousel.direction
            );
        }
        self.cache.invalidate_all();
        Ok(changed)
    }

    /// Serve `key` from the cache, rendering it when missing or stale.
    /// Not-found pages are never stored.
    async fn cached<F, Fut>(&self, key: &str, render: F) -> Response
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RenderedPage, RenderError>>,
    {
        if let Some(page) = self.cache.get(key) {
            tracing::debug!("Cache hit: {}", key);
            return self.page_response(page);
        }

        match render().await {
            Ok(page) => {
                if page.status == PageStatus::Ok {
                    self.cache.insert(key, page.clone());
                }
                self.page_response(page)
            }
            Err(e) => self.error_response(e),
        }
    }

    fn page_response(&self, page: RenderedPage) -> Response {
        let status = StatusCode::from_u16(page.status.code()).unwrap_or(StatusCode::OK);
        (
            status,
            [(header::CACHE_CONTROL, cache_control(self.cache.ttl()))],
            Html(page.html),
        )
            .into_response()
    }

    /// Generic error page; upstream content failures are not retried
    fn error_response(&self, err: RenderError) -> Response {
        tracing::error!("Failed to render page: {}", err);
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let metadata = PageMetadata::new("Something went wrong", &self.ctx.config.description);
        let mut context = layout::base_context(&self.ctx, &metadata);
        context.insert("status", &status.as_u16());

        match self.ctx.templates.render("error.html", &context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, "Something went wrong").into_response()
            }
        }
    }
}

/// `Cache-Control` for rendered pages
pub fn cache_control(revalidate: Duration) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate",
        revalidate.as_secs()
    )
}

/// Build the router over `state`, falling back to files in `static_dir`
pub fn router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_index_handler))
        .route("/blog/:slug", get(blog_post_handler))
        .route("/api/carousel", get(carousel_handler))
        .route("/api/carousel/key", post(carousel_key_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let ctx = site.render_context()?;
    let state = Arc::new(AppState::new(ctx));

    spawn_preload(&site.config, site.static_dir.clone(), state.clone())?;

    if watch {
        let config_path = site.base_dir.join(CONFIG_FILE);
        let paths = vec![site.content_dir.clone(), config_path.clone()];
        let watch_state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_content(paths, config_path, watch_state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let app = router(state, site.static_dir.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Watching content for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Preload carousel images in the background; the hero shows slides once done
fn spawn_preload(config: &SiteConfig, static_dir: PathBuf, state: Arc<AppState>) -> Result<()> {
    let images = config.carousel.images.clone();
    if images.is_empty() {
        return Ok(());
    }

    let probe = AssetProbe::new(
        static_dir,
        Duration::from_secs(config.carousel.preload_timeout),
    )?;
    tokio::spawn(async move {
        let mut carousel = Carousel::new(images);
        carousel.preload(&probe).await;
        state.carousel.replace(carousel);
    });
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down");
}

/// Clear the page cache whenever content changes on disk, and reapply
/// carousel settings when the config file changes
fn watch_content(paths: Vec<PathBuf>, config_path: PathBuf, state: Arc<AppState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid clearing on every write of a save
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in &paths {
        if path.exists() {
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            debouncer.watcher().watch(path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("Changed: {}", event.path.display());
                }
                if relevant.iter().any(|e| e.path.ends_with(CONFIG_FILE)) {
                    match state.reload_config(&config_path) {
                        Ok(_) => tracing::info!(
                            "{} reloaded; settings other than the carousel apply after a restart",
                            CONFIG_FILE
                        ),
                        Err(e) => tracing::error!("Failed to reload {}: {}", CONFIG_FILE, e),
                    }
                }
                state.cache.invalidate_all();
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    let view = state.carousel.view();
    match page::render_home(&state.ctx, &view) {
        Ok(page) => Html(page.html).into_response(),
        Err(e) => state.error_response(e),
    }
}

async fn blog_index_handler(State(state): State<Arc<AppState>>) -> Response {
    state
        .cached("/blog", || page::render_blog_index(&state.ctx))
        .await
}

async fn blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let key = format!("/blog/{}", slug);
    state
        .cached(&key, || page::render_post_page(&state.ctx, &slug))
        .await
}

async fn carousel_handler(State(state): State<Arc<AppState>>) -> Json<CarouselView> {
    Json(state.carousel.view())
}

#[derive(Debug, Deserialize)]
struct KeyEvent {
    key: String,
}

async fn carousel_key_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<KeyEvent>,
) -> StatusCode {
    match Key::from_name(&event.key) {
        Key::Other => StatusCode::NO_CONTENT,
        key if state.carousel.send_key(key) => StatusCode::ACCEPTED,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::Direction;
    use crate::content::testing::{sample_post, MemoryStore};
    use crate::page::testing::context;

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_cache_control() {
        assert_eq!(
            cache_control(Duration::from_secs(60)),
            "public, s-maxage=60, stale-while-revalidate"
        );
    }

    #[tokio::test]
    async fn test_post_is_cached() {
        let state = AppState::new(context(MemoryStore::with_post(sample_post())));
        let ctx = state.ctx.clone();

        let response = state
            .cached("/blog/line-follower", || page::render_post_page(&ctx, "line-follower"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, s-maxage=60, stale-while-revalidate"
        );
        assert_eq!(state.cache().len(), 1);

        // a cached page is served without rendering again
        let response = state
            .cached("/blog/line-follower", || async {
                Err(RenderError::Store(crate::content::StoreError::Config(
                    "should not render".to_string(),
                )))
            })
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await.contains("Building a Line Follower"));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let state = AppState::new(context(MemoryStore::default()));
        let ctx = state.ctx.clone();
        let response = state
            .cached("/blog/nope", || page::render_post_page(&ctx, "nope"))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("Post Not Found"));
        assert!(state.cache().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_502() {
        let state = AppState::new(context(MemoryStore {
            failing: true,
            ..Default::default()
        }));
        let ctx = state.ctx.clone();
        let response = state
            .cached("/blog/line-follower", || page::render_post_page(&ctx, "line-follower"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body(response).await;
        assert!(html.contains("Something went wrong"));
        assert!(!html.contains("503"));
        assert!(state.cache().is_empty());
    }

    #[tokio::test]
    async fn test_config_change_reconfigures_carousel() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let state = AppState::new(context(MemoryStore::with_post(sample_post())));
        assert!(state.carousel().is_autoplaying());

        let ctx = state.ctx.clone();
        state
            .cached("/blog/line-follower", || page::render_post_page(&ctx, "line-follower"))
            .await;
        assert_eq!(state.cache().len(), 1);

        std::fs::write(&path, "carousel:\n  autoplay: false\n  direction: down\n").unwrap();
        assert!(state.reload_config(&path).unwrap());
        assert!(!state.carousel().is_autoplaying());
        assert_eq!(state.carousel().settings().direction, Direction::Down);
        assert_eq!(state.carousel().view().exit_class, "slide-exit-down");
        assert!(state.cache().is_empty());

        // unchanged settings keep the current subscriptions
        assert!(!state.reload_config(&path).unwrap());
    }

    #[tokio::test]
    async fn test_key_endpoint() {
        let state = Arc::new(AppState::new(context(MemoryStore::default())));
        let status = carousel_key_handler(
            State(state.clone()),
            Json(KeyEvent {
                key: "Enter".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let status = carousel_key_handler(
            State(state),
            Json(KeyEvent {
                key: "ArrowRight".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
}
