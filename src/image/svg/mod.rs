//! SVG processing utilities.
//!
//! - [`optimize`]: lossless SVG optimization using usvg

mod optimize;

pub use optimize::optimize_or_original;
