//! `[markdown]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [markdown]
//! highlight = true    # Syntax-highlight fenced code blocks
//! math = true         # Render $inline$ and $$display$$ math
//! anchors = true      # Heading ids and headerlink anchors
//! katex = "node_modules/katex/dist/katex.min.js"
//! ```
//!
//! When the KaTeX bundle exists, math is typeset at build time; otherwise the
//! TeX is emitted for client-side typesetting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Syntax-highlight fenced code blocks.
    pub highlight: bool,

    /// Render `$…$` / `$$…$$` math.
    pub math: bool,

    /// Add slug ids and `headerlink` anchors to headings.
    pub anchors: bool,

    /// KaTeX bundle, relative to the project root.
    pub katex: PathBuf,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            math: true,
            anchors: true,
            katex: PathBuf::from("node_modules/katex/dist/katex.min.js"),
        }
    }
}
