//! HTML minification via minify-html.

use minify_html::{Cfg, minify};

/// Minification config for emitted pages.
///
/// Whitespace is collapsed, attribute quotes and redundant attributes are
/// dropped and the doctype is shortened; `<html>`/`<head>` and closing tags
/// are kept so the output stays well-formed for downstream tools.
fn html_cfg() -> Cfg {
    Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        ..Cfg::default()
    }
}

/// Minify an HTML document.
pub fn minify_html(html: &str) -> Vec<u8> {
    minify(html.as_bytes(), &html_cfg())
}
