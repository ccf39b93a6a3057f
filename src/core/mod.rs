//! Core types - pure abstractions shared across the codebase.

mod driver;
mod link;

pub use driver::BuildMode;
pub use link::LinkKind;
