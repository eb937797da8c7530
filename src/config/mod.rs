//! Configuration module

mod site;

pub use site::CarouselConfig;
pub use site::ContentConfig;
pub use site::ContentSource;
pub use site::HighlightConfig;
pub use site::MenuEntry;
pub use site::MenuItem;
pub use site::SanityConfig;
pub use site::SiteConfig;
pub use site::ThemeConfig;
pub use site::ThemeMode;
