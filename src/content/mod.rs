//! Content module - post models, portable text blocks and content stores

pub mod block;
mod local;
mod post;
mod sanity;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use block::{CalloutTone, ContentBlock};
pub use local::LocalStore;
pub use post::{Author, CategorySummary, ImageAsset, ImageRef, Post, PostSummary, Reference, Slug};
pub use sanity::SanityClient;
pub use store::{ContentStore, StoreError, StoreResult};
