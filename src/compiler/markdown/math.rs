//! Math rendering.
//!
//! [`KatexRenderer`] typesets on the server by evaluating the site's KaTeX
//! bundle in an embedded QuickJS runtime. [`MathMarkup`] is the fallback when
//! no bundle is available: TeX is left for client-side typesetting.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Error, Result};
use rquickjs::{Context, Exception, Function, Object, Runtime};

use super::tree::escape_text;
use crate::{config::MarkdownConfig, debug, log};

/// Renders TeX from `$…$` / `$$…$$` into HTML.
pub trait MathRenderer: Send + Sync {
    fn render(&self, tex: &str, display: bool) -> Result<String>;
}

/// Emits escaped TeX in MathJax/KaTeX auto-render delimiters, typeset on the
/// client.
///
/// Both forms use `<span>` so display math stays valid inside paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMarkup;

impl MathRenderer for MathMarkup {
    fn render(&self, tex: &str, display: bool) -> Result<String> {
        let tex = escape_text(tex);
        Ok(if display {
            format!(r#"<span class="math math-display">\[{tex}\]</span>"#)
        } else {
            format!(r#"<span class="math math-inline">\({tex}\)</span>"#)
        })
    }
}

/// `katex.renderToString` with `output: "html"` and `trust: true`.
pub struct KatexRenderer {
    context: Context,
}

impl KatexRenderer {
    /// Evaluate a KaTeX bundle (`katex.min.js`).
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read KaTeX from `{}`", path.display()))?;
        Self::from_source(&source)
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let runtime = Runtime::new().context("failed to initialize JS runtime")?;
        let context = Context::full(&runtime).context("failed to initialize JS runtime context")?;

        context
            .with(|ctx| {
                ctx.eval::<(), _>(source)
                    .context("failed to evaluate `katex` source code")
            })
            .context("failed to initialize `katex`")?;

        Ok(Self { context })
    }
}

impl MathRenderer for KatexRenderer {
    fn render(&self, tex: &str, display: bool) -> Result<String> {
        self.context.with(|ctx| {
            let settings =
                Object::new(ctx.clone()).context("failed to initialize `katex` settings")?;
            settings
                .set("displayMode", display)
                .and_then(|()| settings.set("output", "html"))
                .and_then(|()| settings.set("trust", true))
                .context("failed to initialize `katex` settings")?;

            ctx.globals()
                .get::<_, Object<'_>>("katex")
                .context("failed to find the namespace `katex`")?
                .get::<_, Function<'_>>("renderToString")
                .context("failed to find the function `katex.renderToString()`")?
                .call((tex, settings))
                .map_err(|e| {
                    let mut err = Error::new(e);
                    if let Some(msg) = ctx.catch().as_exception().and_then(Exception::message) {
                        err = err.context(msg);
                    }
                    err.context("failed to run `katex.renderToString()`")
                })
        })
    }
}

/// Pick the math backend for `config`.
///
/// KaTeX is used when `config.katex` (relative to `root`) can be loaded;
/// otherwise math falls back to [`MathMarkup`].
pub fn math_renderer(config: &MarkdownConfig, root: &Path) -> Arc<dyn MathRenderer> {
    if !config.math {
        return Arc::new(MathMarkup);
    }
    let path = root.join(&config.katex);
    if !path.is_file() {
        debug!("math"; "no KaTeX at `{}`, typesetting on the client", path.display());
        return Arc::new(MathMarkup);
    }
    match KatexRenderer::from_file(&path) {
        Ok(katex) => Arc::new(katex),
        Err(e) => {
            log!("math"; "{:#}, typesetting on the client", e);
            Arc::new(MathMarkup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Echoes its input and settings so the call contract is visible.
    const FAKE_KATEX: &str = r#"
var katex = {
    renderToString: function (tex, opts) {
        if (tex === "\\bad") { throw new Error("Undefined control sequence"); }
        return (opts.displayMode ? "D" : "I") + "|" + tex + "|" + opts.output + "|" + opts.trust;
    }
};
"#;

    #[test]
    fn test_markup() {
        assert_eq!(
            MathMarkup.render("a<b", false).unwrap(),
            r#"<span class="math math-inline">\(a&lt;b\)</span>"#
        );
        assert_eq!(
            MathMarkup.render(r"\frac{{a}}{b}", true).unwrap(),
            r#"<span class="math math-display">\[\frac{{a}}{b}\]</span>"#
        );
    }

    #[test]
    fn test_katex_inline_and_display() {
        let katex = KatexRenderer::from_source(FAKE_KATEX).unwrap();
        assert_eq!(katex.render("x^2", false).unwrap(), "I|x^2|html|true");
        assert_eq!(katex.render(r"\sum_i i", true).unwrap(), r"D|\sum_i i|html|true");
    }

    #[test]
    fn test_katex_error_carries_message() {
        let katex = KatexRenderer::from_source(FAKE_KATEX).unwrap();
        let err = katex.render(r"\bad", false).unwrap_err();
        assert!(format!("{err:#}").contains("Undefined control sequence"));
    }

    #[test]
    fn test_katex_missing_namespace() {
        let katex = KatexRenderer::from_source("var notKatex = 1;").unwrap();
        assert!(katex.render("x", false).is_err());
    }

    #[test]
    fn test_invalid_bundle_is_error() {
        assert!(KatexRenderer::from_source("var = ;").is_err());
    }

    #[test]
    fn test_math_renderer_selection() {
        let dir = TempDir::new().unwrap();
        let config = MarkdownConfig::default();

        // No bundle: client-side markup
        let math = math_renderer(&config, dir.path());
        assert!(math.render("x", false).unwrap().starts_with("<span class=\"math"));

        let bundle = dir.path().join(&config.katex);
        fs::create_dir_all(bundle.parent().unwrap()).unwrap();
        fs::write(&bundle, FAKE_KATEX).unwrap();
        let math = math_renderer(&config, dir.path());
        assert_eq!(math.render("x", true).unwrap(), "D|x|html|true");

        // Broken bundle: falls back
        fs::write(&bundle, "var = ;").unwrap();
        let math = math_renderer(&config, dir.path());
        assert!(math.render("x", false).unwrap().contains(r"\(x\)"));
    }
}
