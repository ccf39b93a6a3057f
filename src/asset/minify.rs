//! Optional JS/CSS minification of site assets.
//!
//! Runs before fingerprinting so the hash covers the minified bytes. Site
//! scripts are classic `<script>` files: their top-level declarations are
//! globals that inline handlers (`onclick="toggleMenu()"`) and other scripts
//! reach by name, so they are neither mangled nor dropped as unused.

use anyhow::{Result, anyhow, bail};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::minifier::{
    CompressOptions, CompressOptionsUnused, MangleOptions, Minifier, MinifierOptions,
};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::debug;
use crate::utils::path::{extension_lower, file_name};

fn script_options() -> MinifierOptions {
    MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions {
            unused: CompressOptionsUnused::Keep,
            ..CompressOptions::smallest()
        }),
    }
}

fn minify_script(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::script()).parse();
    if let Some(error) = parsed.errors.first() {
        bail!("parse error: {error}");
    }

    let mut program = parsed.program;
    let minified = Minifier::new(script_options()).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Ok(code)
}

fn minify_stylesheet(path: &str, source: &str) -> Result<String> {
    let options = ParserOptions {
        filename: path.to_string(),
        ..ParserOptions::default()
    };
    let stylesheet = StyleSheet::parse(source, options).map_err(|e| anyhow!("{e}"))?;
    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(printed.code)
}

/// Minify a route's content based on its extension.
///
/// Returns `None` for non-JS/CSS routes, already minified files
/// (`*.min.js`, `*.min.css`), non-UTF-8 content, or minifier failures.
pub fn minify_asset(path: &str, content: &[u8]) -> Option<Vec<u8>> {
    let ext = extension_lower(path);
    if !matches!(ext.as_str(), ".js" | ".css")
        || file_name(path).to_ascii_lowercase().ends_with(&format!(".min{ext}"))
    {
        return None;
    }
    let source = std::str::from_utf8(content).ok()?;

    let minified = if ext == ".js" {
        minify_script(source)
    } else {
        minify_stylesheet(path, source)
    };
    match minified {
        Ok(code) => Some(code.into_bytes()),
        Err(e) => {
            debug!("minify"; "{}: kept original ({:#})", path, e);
            None
        }
    }
}
