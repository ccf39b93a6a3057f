//! Asset fingerprinting.
//!
//! - [`fingerprint`]: content hash and filename splicing
//! - [`minify`]: optional JS/CSS minification before hashing
//! - [`rename`]: per-route rename stage producing the [`RemapTable`]

pub mod fingerprint;
pub mod minify;
mod rename;

pub use rename::{RemapTable, RenameContext, rename_asset};
