//! `[build.assets]` section configuration.
//!
//! Controls which emitted routes are renamed by content hash.
//!
//! # Example
//!
//! ```toml
//! [build.assets]
//! extensions = [".js", ".css", ".ico", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"]
//! minify = false    # Minify JS/CSS (oxc, lightningcss) before hashing
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::utils::path::extension_lower;

/// Extensions hashed when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".ico", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Extensions (with leading dot) of routes that get content hashes.
    pub extensions: Vec<String>,

    /// Minify JS/CSS before hashing (never applied in live preview).
    pub minify: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            minify: false,
        }
    }
}

impl AssetsConfig {
    /// Check whether a route path has a hashable extension (case-insensitive).
    pub fn is_hashable(&self, path: &str) -> bool {
        let ext = extension_lower(path);
        !ext.is_empty() && self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.extensions.iter().find(|e| !e.starts_with('.')) {
            Some(bad) => Err(ConfigError::Validation(format!(
                "build.assets.extensions entries must start with `.`, got `{bad}`"
            ))),
            None => Ok(()),
        }
    }
}
