//! Page-level compilation helpers: markdown rendering and permalinks.

pub mod markdown;
mod permalink;

pub use permalink::normalize_permalink;
