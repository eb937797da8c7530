//! Decorative image carousel for the home page hero
//!
//! [`Carousel`] is the pure state (loaded images + current index). Preloading
//! goes through [`ImageProbe`]; autoplay and key input are owned by
//! [`CarouselDriver`], whose timer and listener are released when dropped.

mod driver;
mod probe;

pub use driver::{CarouselDriver, CarouselSettings, SharedCarousel, Subscriptions};
pub use probe::{AssetProbe, ImageProbe};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time between automatic advances
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);

/// Direction the outgoing slide leaves in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    /// Exit animation class for the outgoing slide
    pub fn exit_class(self) -> &'static str {
        match self {
            Direction::Up => "slide-exit-up",
            Direction::Down => "slide-exit-down",
        }
    }
}

/// Directional input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Carousel state
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    images: Vec<String>,
    loaded: Vec<String>,
    index: usize,
    settled: bool,
}

impl Carousel {
    pub fn new(images: Vec<String>) -> Self {
        Self {
            images,
            ..Default::default()
        }
    }

    /// Probe every image concurrently and keep the ones that load, in input order
    ///
    /// A failing image is logged and left out; it never aborts the others.
    pub async fn preload<P: ImageProbe + ?Sized>(&mut self, probe: &P) {
        let results = join_all(self.images.iter().map(|url| async move {
            let result = probe.probe(url).await;
            (url, result)
        }))
        .await;

        self.loaded = results
            .into_iter()
            .filter_map(|(url, result)| match result {
                Ok(()) => Some(url.clone()),
                Err(e) => {
                    tracing::warn!("Failed to load carousel image {}: {}", url, e);
                    None
                }
            })
            .collect();
        self.index = 0;
        self.settled = true;

        tracing::info!(
            "Carousel preloaded {}/{} images",
            self.loaded.len(),
            self.images.len()
        );
    }

    /// Slides are shown only after preloading settled with at least one image
    pub fn is_ready(&self) -> bool {
        self.settled && !self.loaded.is_empty()
    }

    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.loaded.get(self.index).map(String::as_str)
    }

    /// Advance one slide, wrapping to the first
    pub fn next(&mut self) {
        if !self.loaded.is_empty() {
            self.index = (self.index + 1) % self.loaded.len();
        }
    }

    /// Go back one slide, wrapping to the last
    pub fn previous(&mut self) {
        if !self.loaded.is_empty() {
            self.index = (self.index + self.loaded.len() - 1) % self.loaded.len();
        }
    }

    /// Apply a key press; returns whether it was handled
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowRight => self.next(),
            Key::ArrowLeft => self.previous(),
            Key::Other => return false,
        }
        true
    }

    /// Serializable view for templates and the JSON endpoint
    pub fn view(&self, direction: Direction) -> CarouselView {
        CarouselView {
            ready: self.is_ready(),
            index: self.index,
            images: self.loaded.clone(),
            current: self.current().map(str::to_string),
            exit_class: direction.exit_class().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CarouselView {
    pub ready: bool,
    pub index: usize,
    pub images: Vec<String>,
    pub current: Option<String>,
    pub exit_class: String,
}
