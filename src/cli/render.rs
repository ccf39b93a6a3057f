//! `render` command: markdown file to HTML on stdout.

use std::fs;
use std::io::{Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    cli::RenderArgs,
    compiler::markdown::{
        Frontmatter, MarkdownRenderer, math_renderer, split_frontmatter, strip_excerpt_links,
    },
    config::SiteConfig,
    debug,
};

/// Render `args.file` and print the HTML.
pub fn render_file(args: &RenderArgs, config: &SiteConfig) -> Result<()> {
    let html = render_to_string(&args.file, args.excerpt, config)?;
    let mut stdout = stdout().lock();
    writeln!(stdout, "{html}").context("failed to write to stdout")?;
    Ok(())
}

fn render_to_string(path: &Path, excerpt: bool, config: &SiteConfig) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;

    let (frontmatter, body) = split_frontmatter(&content);
    match frontmatter {
        Some(Frontmatter::Yaml(_)) => debug!("render"; "skipped YAML frontmatter"),
        Some(Frontmatter::Toml(_)) => debug!("render"; "skipped TOML frontmatter"),
        None => {}
    }

    let renderer = MarkdownRenderer::new(config.markdown.clone())
        .with_math(math_renderer(&config.markdown, &config.root));
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let html = rt
        .block_on(renderer.render(body))
        .with_context(|| format!("failed to render `{}`", path.display()))?;

    if excerpt {
        strip_excerpt_links(&html)
    } else {
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_with_frontmatter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "---\ntitle: Hi\n---\n\nSee [home](/).\n").unwrap();

        let html = render_to_string(&path, false, &SiteConfig::default()).unwrap();
        assert_eq!(html, r#"<p>See <a href="/">home</a>.</p>"#);

        let html = render_to_string(&path, true, &SiteConfig::default()).unwrap();
        assert_eq!(html, r#"<p>See <span href="/">home</span>.</p>"#);
    }

    #[test]
    fn test_math_typeset_with_site_katex() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        let bundle = dir.path().join(&config.markdown.katex);
        fs::create_dir_all(bundle.parent().unwrap()).unwrap();
        fs::write(
            &bundle,
            "var katex = { renderToString: function (t, o) { return '<k>' + t + '</k>'; } };",
        )
        .unwrap();

        let path = dir.path().join("post.md");
        fs::write(&path, "Energy $E=mc^2$.\n").unwrap();
        let html = render_to_string(&path, false, &config).unwrap();
        assert_eq!(html, "<p>Energy <k>E=mc^2</k>.</p>");
    }

    #[test]
    fn test_missing_file() {
        let err = render_to_string(Path::new("/nonexistent/post.md"), false, &SiteConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
