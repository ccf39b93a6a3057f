//! Image processing utilities.
//!
//! # Modules
//!
//! - [`svg`]: SVG optimization
//! - [`friends`]: avatar/banner normalization for the friends page

pub mod friends;
pub mod svg;

pub use friends::process_friends_image;
