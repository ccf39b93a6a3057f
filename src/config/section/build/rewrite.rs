//! `[build.rewrite]` section configuration.
//!
//! Tunes the element selection of the HTML rewriter.
//!
//! # Example
//!
//! ```toml
//! [build.rewrite]
//! feed_type = "application/atom+xml"   # <link> of this type keeps its href
//! lightbox_attr = "data-fancybox"      # Anchors with this attribute are rewritten
//! background_selector = "[style]"      # Elements scanned for background-image: url('…')
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// `type` of feed `<link>` elements excluded from href rewriting.
    pub feed_type: String,

    /// Marker attribute of lightbox anchors whose href points at an image.
    pub lightbox_attr: String,

    /// CSS selector of elements carrying an inline background image.
    pub background_selector: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            feed_type: "application/atom+xml".into(),
            lightbox_attr: "data-fancybox".into(),
            background_selector: "[style]".into(),
        }
    }
}

impl RewriteConfig {
    /// CSS selector of lightbox anchors.
    pub fn lightbox_selector(&self) -> String {
        format!("a[{}]", self.lightbox_attr)
    }

    /// Check that both configurable selectors parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for selector in [self.lightbox_selector(), self.background_selector.clone()] {
            if let Err(e) = selector.parse::<lol_html::Selector>() {
                return Err(ConfigError::Validation(format!(
                    "invalid selector `{selector}` in [build.rewrite]: {e}"
                )));
            }
        }
        Ok(())
    }
}
