//! Site path utilities.

mod route;

pub use route::{encode_path, extension_lower, file_name, join, parent_dir, resolve_reference};
