//! SVG optimization using usvg.
//!
//! usvg parses the document into a simplified render tree (defaults resolved,
//! paths normalized, unused definitions and metadata dropped) and writes it
//! back without indentation. Failures never drop the asset: the original
//! bytes are returned instead.

use anyhow::{Context, Result, bail};

use crate::log;

/// Options for SVG optimization
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// DPI for unit conversion.
    pub dpi: f32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self { dpi: 96.0 }
    }
}

/// Optimize SVG bytes, falling back to the input on any failure.
pub fn optimize_or_original(name: &str, content: Vec<u8>) -> Vec<u8> {
    match optimize_svg(&content, &OptimizeOptions::default()) {
        Ok(optimized) => optimized,
        Err(e) => {
            log!("svg"; "error optimizing {}: {:#}", name, e);
            content
        }
    }
}

/// Markers of content the usvg round-trip cannot preserve.
///
/// usvg has no font data to outline `<text>`, resolves `<style>` rules
/// statically (so `@media` variants are lost), and drops links, scripts,
/// animation and foreign objects from the render tree.
const UNSUPPORTED: &[(&str, &str)] = &[
    ("<text", "text elements"),
    ("<style", "stylesheets"),
    ("@media", "media queries"),
    ("<a ", "links"),
    ("<a>", "links"),
    ("<script", "scripts"),
    ("<animate", "animation"),
    ("<set ", "animation"),
    ("<foreignObject", "foreign objects"),
];

/// Optimize SVG using usvg
///
/// Documents with content usvg would lose are rejected.
pub fn optimize_svg(content: &[u8], options: &OptimizeOptions) -> Result<Vec<u8>> {
    if let Some(what) = unsupported_content(content) {
        bail!("SVG contains {what}");
    }

    let usvg_options = usvg::Options {
        dpi: options.dpi,
        ..Default::default()
    };

    let tree = usvg::Tree::from_data(content, &usvg_options).context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };

    Ok(tree.to_string(&write_options).into_bytes())
}

fn unsupported_content(content: &[u8]) -> Option<&'static str> {
    UNSUPPORTED
        .iter()
        .find(|(marker, _)| {
            let marker = marker.as_bytes();
            content.windows(marker.len()).any(|w| w == marker)
        })
        .map(|&(_, what)| what)
}
