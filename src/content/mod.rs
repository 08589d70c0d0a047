//! Content module - page keys, metadata and markdown bodies

mod key;
pub mod loader;
mod markdown;
pub mod metadata;

pub use key::PageKey;
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use metadata::{Metadata, MetadataLoader};
