//! Helper functions shared by the renderers and templates

mod date;
mod html;
mod image;
mod url;

pub use date::*;
pub use html::*;
pub use image::{sizes, ImageUrlBuilder};
pub use url::*;
