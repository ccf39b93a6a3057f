//! Excerpt sanitizer.

use anyhow::{Context, Result};
use lol_html::{RewriteStrSettings, element, rewrite_str};

/// Demote links to `<span>` so excerpts can sit inside an outer link.
///
/// Attributes are kept.
pub fn strip_excerpt_links(html: &str) -> Result<String> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a", |el| {
                el.set_tag_name("span")?;
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .context("failed to sanitize excerpt")
}
