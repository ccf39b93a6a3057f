//! `[build]` section configuration.
//!
//! Contains post-processing settings: where the generated site lives, the CDN
//! origin, minification and the sub-sections for hashing and rewriting.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"                       # Generated site (relative to site root)
//! cdn_root = "https://cdn.example.com/"   # Origin prefixed to rewritten URLs
//! minify = true                           # Minify HTML output
//! manifest = "assets.json"                # Optional asset manifest route
//!
//! [build.assets]
//! extensions = [".js", ".css", ".png"]    # Extensions that get content hashes
//! minify = false                          # Minify JS/CSS before hashing
//!
//! [build.friends]
//! prefix = "friends/"                     # Route prefix of the friends page
//!
//! [build.rewrite]
//! feed_type = "application/atom+xml"      # <link type> left out of href rewriting
//! lightbox_attr = "data-fancybox"         # Marker attribute of lightbox anchors
//! background_selector = "[style]"         # Elements with background-image styles
//! ```
//!
//! See submodules for detailed options: [`assets`], [`friends`], [`rewrite`].

pub mod assets;
pub mod friends;
pub mod rewrite;

pub use assets::AssetsConfig;
pub use friends::FriendsConfig;
pub use rewrite::RewriteConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Generated site directory.
    pub output: PathBuf,

    /// CDN origin prefixed to rewritten URLs outside live preview.
    /// Must end with `/`.
    pub cdn_root: String,

    /// Minify HTML output (never applied in live preview).
    pub minify: bool,

    /// Route the asset manifest is written to. Empty disables it.
    pub manifest: String,

    /// Content hashing settings.
    pub assets: AssetsConfig,

    /// Friends page image settings.
    pub friends: FriendsConfig,

    /// HTML rewrite target settings.
    pub rewrite: RewriteConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "public".into(),
            cdn_root: "/".into(),
            minify: true,
            manifest: String::new(),
            assets: AssetsConfig::default(),
            friends: FriendsConfig::default(),
            rewrite: RewriteConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    /// Validate build configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cdn_root.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "build.cdn_root must end with `/`, got `{}`",
                self.cdn_root
            )));
        }
        if self.manifest.starts_with('/') {
            return Err(ConfigError::Validation(
                "build.manifest must be a site-relative route".into(),
            ));
        }
        self.assets.validate()?;
        self.rewrite.validate()
    }
}
