//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::carousel::Direction;
use crate::helpers::{is_valid_date_format, POST_DATE_FORMAT};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    /// Byline used when a post has no authors
    pub default_author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Content source
    #[serde(default)]
    pub content: ContentConfig,

    // Rendering
    /// Seconds a rendered page stays fresh
    pub revalidate: u64,
    pub related_posts: usize,
    pub blog_per_page: usize,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Chrome
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    pub menu: Vec<MenuItem>,
    pub context_menu: Vec<MenuEntry>,
    pub banner: Vec<String>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "IEEE GU Chapter".to_string(),
            description: "IEEE Galgotias University Student Chapter".to_string(),
            language: "en".to_string(),
            timezone: String::new(),
            default_author: "IEEE GU".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            content: ContentConfig::default(),

            revalidate: 60,
            related_posts: 3,
            blog_per_page: 12,
            date_format: POST_DATE_FORMAT.to_string(),
            highlight: HighlightConfig::default(),

            theme: ThemeConfig::default(),
            carousel: CarouselConfig::default(),
            menu: default_menu(),
            context_menu: default_context_menu(),
            banner: vec![
                "Welcome to the IEEE Galgotias University Student Chapter".to_string(),
                "Join us for workshops, hackathons and technical talks".to_string(),
            ],

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        config.check_date_format();
        Ok(config)
    }

    /// Replace a date pattern chrono cannot format with the default
    pub fn check_date_format(&mut self) {
        if !is_valid_date_format(&self.date_format) {
            tracing::warn!(
                "Invalid date_format {:?} in config, using {:?}",
                self.date_format,
                POST_DATE_FORMAT
            );
            self.date_format = POST_DATE_FORMAT.to_string();
        }
    }

    /// Pick up secrets that should not live in _config.yml
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("SANITY_TOKEN") {
            if !token.is_empty() {
                self.content.sanity.token = Some(token);
            }
        }
    }

    /// Resolve the configured timezone, falling back to UTC
    pub fn timezone(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => tz,
            Err(e) => {
                tracing::warn!("Unknown timezone {:?} ({}), using UTC", self.timezone, e);
                chrono_tz::UTC
            }
        }
    }
}

/// Where blog content comes from
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContentConfig {
    pub source: ContentSource,
    #[serde(default)]
    pub sanity: SanityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// JSON documents under `content_dir`
    #[default]
    Local,
    /// Sanity content lake
    Sanity,
}

/// Sanity project settings, also used to build image URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub image_cdn: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2023-05-03".to_string(),
            use_cdn: true,
            image_cdn: "https://cdn.sanity.io".to_string(),
            token: None,
        }
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Color scheme handed to the root layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub default: ThemeMode,
    pub enable_system: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: ThemeMode::System,
            enable_system: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

/// Home page hero slider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub images: Vec<String>,
    pub autoplay: bool,
    pub direction: Direction,
    pub overlay: bool,
    /// Per-image preload timeout in seconds
    pub preload_timeout: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            autoplay: true,
            direction: Direction::Up,
            overlay: true,
            preload_timeout: 10,
        }
    }
}

/// Top navigation link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

/// Context menu entry: an item, a submenu (non-empty `items`) or a separator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuEntry {
    pub label: String,
    pub icon: Option<String>,
    pub href: Option<String>,
    pub items: Vec<MenuEntry>,
    pub separator: bool,
}

impl MenuEntry {
    fn item(label: &str, icon: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.map(str::to_string),
            ..Default::default()
        }
    }

    fn link(label: &str, icon: &str, href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            ..Self::item(label, Some(icon))
        }
    }

    fn submenu(label: &str, icon: &str, items: &[&str]) -> Self {
        Self {
            items: items.iter().map(|l| Self::item(l, None)).collect(),
            ..Self::item(label, Some(icon))
        }
    }

    fn separator() -> Self {
        Self {
            separator: true,
            ..Default::default()
        }
    }
}

fn default_menu() -> Vec<MenuItem> {
    [
        ("Home", "/"),
        ("About", "/about"),
        ("Events", "/events"),
        ("Team", "/team"),
        ("Blog", "/blog"),
        ("Contact", "/contact"),
    ]
    .iter()
    .map(|(name, path)| MenuItem {
        name: name.to_string(),
        path: path.to_string(),
    })
    .collect()
}

fn default_context_menu() -> Vec<MenuEntry> {
    vec![
        MenuEntry::submenu(
            "Societies",
            "users",
            &[
                "Women in Engineering",
                "Industry Applications Society",
                "Computer Society",
                "Computational Intelligence Society",
                "Education Society",
            ],
        ),
        MenuEntry::item("Upcoming Events", Some("calendar")),
        MenuEntry::item("Networking", Some("users")),
        MenuEntry::separator(),
        MenuEntry::submenu(
            "Research Areas",
            "book",
            &[
                "Artificial Intelligence",
                "Quantum Computing",
                "Cybersecurity",
                "Robotics",
            ],
        ),
        MenuEntry::item("Global Initiatives", Some("globe")),
        MenuEntry::separator(),
        MenuEntry::item("Innovation Challenges", Some("lightbulb")),
        MenuEntry::link("Awards & Recognition", "award", "/awards"),
        MenuEntry::item("Educational Resources", Some("graduation-cap")),
    ]
}
