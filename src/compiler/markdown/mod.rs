//! Markdown rendering.
//!
//! Rendering is two-phase:
//!
//! ```text
//! markdown ──convert──▶ tree (code blocks as placeholders)
//!                         │ post_process
//!                         ▼
//!          highlight every block concurrently
//!                         │ all resolved
//!                         ▼
//!                   write_html ──▶ html
//! ```
//!
//! - [`convert`] - pulldown-cmark events → owned tree
//! - [`transform`] - linkify, image galleries, wrappers, punctuation fixes
//! - [`highlight`] / [`math`] - pluggable collaborators

mod convert;
mod excerpt;
mod frontmatter;
mod highlight;
mod math;
mod slug;
mod transform;
mod tree;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use crate::config::MarkdownConfig;
use convert::CodeBlock;

pub use excerpt::strip_excerpt_links;
pub use frontmatter::{Frontmatter, split_frontmatter};
pub use highlight::{Highlighter, SyntectHighlighter};
pub use math::{MathMarkup, MathRenderer, math_renderer};

/// Markdown to HTML renderer with pluggable highlighter and math backends.
#[derive(Clone)]
pub struct MarkdownRenderer {
    config: MarkdownConfig,
    highlighter: Arc<dyn Highlighter>,
    math: Arc<dyn MathRenderer>,
}

impl MarkdownRenderer {
    pub fn new(config: MarkdownConfig) -> Self {
        Self {
            config,
            highlighter: Arc::new(SyntectHighlighter::new()),
            math: Arc::new(MathMarkup),
        }
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_math(mut self, math: Arc<dyn MathRenderer>) -> Self {
        self.math = math;
        self
    }

    /// Render a markdown document (without frontmatter) to HTML.
    ///
    /// Returns only after every code block has been highlighted.
    pub async fn render(&self, markdown: &str) -> Result<String> {
        let converted = convert::convert(markdown, &self.config, self.math.as_ref())?;
        let mut nodes = converted.nodes;
        transform::post_process(&mut nodes);

        let highlighted = self.highlight_all(converted.code_blocks).await?;

        let mut html = String::with_capacity(markdown.len() * 2);
        tree::write_html(&nodes, &highlighted, &mut html);
        Ok(html)
    }

    async fn highlight_all(&self, blocks: Vec<CodeBlock>) -> Result<Vec<String>> {
        let mut results = vec![String::new(); blocks.len()];
        if blocks.is_empty() {
            return Ok(results);
        }

        let mut tasks = JoinSet::new();
        for (idx, block) in blocks.into_iter().enumerate() {
            let highlighter = Arc::clone(&self.highlighter);
            tasks.spawn_blocking(move || {
                let html = highlighter.highlight(&block.code, block.lang.as_deref());
                (idx, html)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (idx, html) = joined.context("highlight task failed")?;
            results[idx] = html?;
        }
        Ok(results)
    }
}
