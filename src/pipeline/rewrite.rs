//! HTML URL rewriter.
//!
//! Rewrites URL-bearing attributes of one HTML document against the
//! finalized [`RemapTable`]:
//!
//! | Target                      | Attribute          | `crossorigin` |
//! |-----------------------------|--------------------|---------------|
//! | `script`                    | `src`              | yes           |
//! | `link` (except feed links)  | `href`             | yes           |
//! | `a[data-fancybox]`          | `href`             | no            |
//! | `img`                       | `src`, `srcset`    | yes           |
//! | `[style]`                   | `background-image` | no            |
//!
//! # URL Resolution
//!
//! | LinkKind       | Example          | Result                              |
//! |----------------|------------------|-------------------------------------|
//! | `External`     | `https://x.com/` | Kept (scheme stripped in production)|
//! | `SiteRoot`     | `/css/a.css`     | `{root}css/a.<fp>.css`              |
//! | `FileRelative` | `cover.png`      | `{root}posts/a/cover.<fp>.png`      |
//! | `Fragment`     | `#top`           | `{root}posts/a/index.html#top`      |
//!
//! `{root}` is the CDN origin in production and `/` in live preview.

use anyhow::{Context, Result};
use lol_html::html_content::Element;
use lol_html::{HandlerResult, RewriteStrSettings, element, rewrite_str};

use crate::asset::RemapTable;
use crate::config::RewriteConfig;
use crate::core::{BuildMode, LinkKind};
use crate::debug;
use crate::utils::path::{encode_path, resolve_reference};

/// Literal wrapper around a URL inside a non-URL attribute.
#[derive(Debug, Clone, Copy)]
struct Border {
    prefix: &'static str,
    suffix: &'static str,
}

const BACKGROUND_BORDER: Border = Border {
    prefix: "background-image: url('",
    suffix: "')",
};

/// One (attribute, options) rewrite target.
#[derive(Debug, Clone, Copy)]
struct Target {
    attr: &'static str,
    border: Option<Border>,
    crossorigin: bool,
    /// Also rewrite the `srcset` list.
    srcset: bool,
}

const SCRIPT: Target = Target {
    attr: "src",
    border: None,
    crossorigin: true,
    srcset: false,
};
const STYLESHEET: Target = Target {
    attr: "href",
    border: None,
    crossorigin: true,
    srcset: false,
};
const LIGHTBOX: Target = Target {
    attr: "href",
    border: None,
    crossorigin: false,
    srcset: false,
};
const IMAGE: Target = Target {
    attr: "src",
    border: None,
    crossorigin: true,
    srcset: true,
};
const BACKGROUND: Target = Target {
    attr: "style",
    border: Some(BACKGROUND_BORDER),
    crossorigin: false,
    srcset: false,
};

/// Settings shared by every rewrite task.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Finalized rename results.
    pub remap: RemapTable,
    /// Target selection.
    pub rules: RewriteConfig,
    /// CDN origin, ends with `/`.
    pub cdn_root: String,
    pub mode: BuildMode,
    /// Output goes through the minifier; class tokens are sorted first.
    pub minify: bool,
}

/// Rewrite all targets of one document.
///
/// `document` is the site-relative route path of the HTML file, used to
/// resolve relative references.
pub fn rewrite_document(document: &str, html: &str, ctx: &RewriteContext) -> Result<String> {
    let urls = UrlRewriter { document, ctx };
    let feed_type = ctx.rules.feed_type.as_str();
    let lightbox = ctx.rules.lightbox_selector();

    let mut handlers = vec![
        element!("script", |el| urls.apply(el, &SCRIPT)),
        element!("link", |el| {
            let is_feed = el
                .get_attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case(feed_type));
            if is_feed {
                return Ok(());
            }
            urls.apply(el, &STYLESHEET)
        }),
        element!(lightbox, |el| urls.apply(el, &LIGHTBOX)),
        element!("img", |el| urls.apply(el, &IMAGE)),
        element!(ctx.rules.background_selector, |el| urls.apply(el, &BACKGROUND)),
    ];
    if ctx.minify {
        handlers.push(element!("[class]", sort_class_names));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
    .with_context(|| format!("failed to rewrite `{document}`"))
}

/// A rewritten URI and whether the CDN root was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rewritten {
    uri: String,
    cdn: bool,
}

struct UrlRewriter<'a> {
    document: &'a str,
    ctx: &'a RewriteContext,
}

impl UrlRewriter<'_> {
    /// Rewrite the target attribute of `el`, plus `srcset` when the target asks.
    fn apply(&self, el: &mut Element, target: &Target) -> HandlerResult {
        let mut cdn = false;

        if target.srcset
            && let Some(srcset) = el.get_attribute("srcset")
        {
            let (rewritten, srcset_cdn) = self.rewrite_srcset(&srcset);
            el.set_attribute("srcset", &rewritten)?;
            cdn |= srcset_cdn;
        }

        if let Some(value) = el.get_attribute(target.attr)
            && let Some(rewritten) = self.rewrite_value(&value, target.border)
        {
            el.set_attribute(target.attr, &rewritten.uri)?;
            cdn |= rewritten.cdn;
        }

        if cdn && target.crossorigin {
            el.set_attribute("crossorigin", "anonymous")?;
        }
        Ok(())
    }

    /// Rewrite a raw attribute value, unwrapping and re-wrapping a border.
    ///
    /// `None` leaves the attribute untouched.
    fn rewrite_value(&self, value: &str, border: Option<Border>) -> Option<Rewritten> {
        let Some(border) = border else {
            return self.rewrite(value);
        };

        let Some(inner) = value
            .strip_prefix(border.prefix)
            .and_then(|rest| rest.strip_suffix(border.suffix))
        else {
            if value.contains("url(") {
                debug!("rewrite"; "{}: skipping style `{}`", self.document, value);
            }
            return None;
        };

        self.rewrite(inner).map(|rewritten| Rewritten {
            uri: format!("{}{}{}", border.prefix, rewritten.uri, border.suffix),
            cdn: rewritten.cdn,
        })
    }

    /// Rewrite a single URI. Empty URIs are left alone.
    fn rewrite(&self, uri: &str) -> Option<Rewritten> {
        if uri.is_empty() {
            return None;
        }

        let mut cdn = false;
        let mut out = match LinkKind::parse(uri) {
            LinkKind::External(uri) => uri.to_string(),
            _ => match resolve_reference(self.document, uri) {
                Some(resolved) => {
                    let root = if self.ctx.mode.use_cdn() {
                        cdn = true;
                        self.ctx.cdn_root.as_str()
                    } else {
                        "/"
                    };
                    let path = encode_path(self.ctx.remap.resolve(&resolved.path));
                    format!("{root}{path}{}", resolved.fragment)
                }
                None => uri.to_string(),
            },
        };

        if self.ctx.mode.strip_scheme() && has_https_scheme(&out) {
            out.drain(.."https:".len());
        }

        Some(Rewritten { uri: out, cdn })
    }

    /// Rewrite every URI of a `srcset` list, keeping descriptors.
    ///
    /// Entries are re-joined with `,` and no padding.
    fn rewrite_srcset(&self, srcset: &str) -> (String, bool) {
        let mut cdn = false;
        let entries: Vec<String> = srcset
            .split(',')
            .map(str::trim)
            .map(|entry| {
                let mut parts = entry.split(' ').filter(|s| !s.is_empty());
                let Some(uri) = parts.next() else {
                    return String::new();
                };
                let uri = match self.rewrite(uri) {
                    Some(rewritten) => {
                        cdn |= rewritten.cdn;
                        rewritten.uri
                    }
                    None => uri.to_string(),
                };
                std::iter::once(uri)
                    .chain(parts.map(str::to_string))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        (entries.join(","), cdn)
    }
}

#[inline]
fn has_https_scheme(uri: &str) -> bool {
    uri.get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Sort class tokens so equal class lists serialize identically.
fn sort_class_names(el: &mut Element) -> HandlerResult {
    if let Some(class) = el.get_attribute("class") {
        let mut tokens: Vec<&str> = class.split_ascii_whitespace().collect();
        tokens.sort_unstable();
        el.set_attribute("class", &tokens.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN: &str = "https://cdn.example.com/";

    fn ctx(mode: BuildMode, entries: &[(&str, &str)]) -> RewriteContext {
        RewriteContext {
            remap: entries
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            rules: RewriteConfig::default(),
            cdn_root: CDN.into(),
            mode,
            minify: false,
        }
    }

    fn rewrite(ctx: &RewriteContext, document: &str, uri: &str) -> Option<String> {
        UrlRewriter { document, ctx }.rewrite(uri).map(|r| r.uri)
    }

    #[test]
    fn test_remapped_with_cdn() {
        let ctx = ctx(BuildMode::PRODUCTION, &[("css/style.css", "css/style.abcd1234.css")]);
        assert_eq!(
            rewrite(&ctx, "posts/a/index.html", "/css/style.css").unwrap(),
            "//cdn.example.com/css/style.abcd1234.css"
        );
        assert_eq!(
            rewrite(&ctx, "posts/a/index.html", "../../css/style.css").unwrap(),
            "//cdn.example.com/css/style.abcd1234.css"
        );
    }

    #[test]
    fn test_preview_uses_site_root() {
        let ctx = ctx(BuildMode::PREVIEW, &[("css/style.css", "css/style.abcd1234.css")]);
        assert_eq!(
            rewrite(&ctx, "index.html", "css/style.css").unwrap(),
            "/css/style.abcd1234.css"
        );
        // Not in the table: identity path
        assert_eq!(rewrite(&ctx, "posts/a/index.html", "cover.png").unwrap(), "/posts/a/cover.png");
    }

    #[test]
    fn test_fragment_preserved() {
        let ctx = ctx(BuildMode::PRODUCTION, &[]);
        assert_eq!(
            rewrite(&ctx, "index.html", "/post/#section").unwrap(),
            "//cdn.example.com/post/#section"
        );
    }

    #[test]
    fn test_scheme_stripping() {
        let ctx_prod = ctx(BuildMode::PRODUCTION, &[]);
        assert_eq!(
            rewrite(&ctx_prod, "index.html", "https://example.com/x").unwrap(),
            "//example.com/x"
        );
        assert_eq!(
            rewrite(&ctx_prod, "index.html", "HTTPS://example.com/x").unwrap(),
            "//example.com/x"
        );
        assert_eq!(
            rewrite(&ctx_prod, "index.html", "http://example.com/x").unwrap(),
            "http://example.com/x"
        );

        let ctx_preview = ctx(BuildMode::PREVIEW, &[]);
        assert_eq!(
            rewrite(&ctx_preview, "index.html", "https://example.com/x").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_non_relative_never_remapped() {
        let ctx = ctx(
            BuildMode::PRODUCTION,
            &[("example.com/a.png", "example.com/a.11111111.png")],
        );
        assert_eq!(
            rewrite(&ctx, "index.html", "//example.com/a.png").unwrap(),
            "//example.com/a.png"
        );
        assert_eq!(
            rewrite(&ctx, "index.html", "mailto:me@example.com").unwrap(),
            "mailto:me@example.com"
        );
        assert!(rewrite(&ctx, "index.html", "").is_none());
    }

    #[test]
    fn test_srcset_order_and_descriptors() {
        let ctx = ctx(
            BuildMode::PRODUCTION,
            &[("a.png", "a.abcd1234.png"), ("a@2x.png", "a.ef567890.png")],
        );
        let (srcset, cdn) =
            UrlRewriter { document: "index.html", ctx: &ctx }.rewrite_srcset("a.png 1x, a@2x.png 2x");
        assert!(cdn);
        assert_eq!(
            srcset,
            "//cdn.example.com/a.abcd1234.png 1x,//cdn.example.com/a.ef567890.png 2x"
        );
    }

    #[test]
    fn test_document_rewrite() {
        let ctx = ctx(
            BuildMode::PRODUCTION,
            &[
                ("js/app.js", "js/app.11111111.js"),
                ("css/a.css", "css/a.22222222.css"),
                ("img/p.png", "img/p.33333333.png"),
            ],
        );
        let html = concat!(
            r#"<script src="/js/app.js"></script>"#,
            r#"<link rel="stylesheet" href="/css/a.css">"#,
            r#"<link rel="alternate" type="application/atom+xml" href="/atom.xml">"#,
            r#"<a href="/img/p.png" data-fancybox>x</a>"#,
            r#"<a href="/about/">about</a>"#,
            r#"<img src="/img/p.png">"#,
        );
        let out = rewrite_document("index.html", html, &ctx).unwrap();

        assert!(out.contains(
            r#"<script src="//cdn.example.com/js/app.11111111.js" crossorigin="anonymous">"#
        ));
        assert!(out.contains(
            r#"href="//cdn.example.com/css/a.22222222.css" crossorigin="anonymous">"#
        ));
        assert!(out.contains(r#"type="application/atom+xml" href="/atom.xml">"#));
        assert!(out.contains(r#"<a href="//cdn.example.com/img/p.33333333.png""#));
        let anchor = out.split("<a ").nth(1).unwrap();
        assert!(!anchor[..anchor.find('>').unwrap()].contains("crossorigin"));
        assert!(out.contains(r#"<a href="/about/">"#));
        assert!(out.contains(
            r#"<img src="//cdn.example.com/img/p.33333333.png" crossorigin="anonymous">"#
        ));
    }

    #[test]
    fn test_document_preview_has_no_crossorigin() {
        let ctx = ctx(BuildMode::PREVIEW, &[("js/app.js", "js/app.11111111.js")]);
        let out = rewrite_document("index.html", r#"<script src="js/app.js"></script>"#, &ctx)
            .unwrap();
        assert_eq!(out, r#"<script src="/js/app.11111111.js"></script>"#);
    }

    #[test]
    fn test_background_border() {
        let ctx = ctx(BuildMode::PREVIEW, &[("img/bg.jpg", "img/bg.44444444.jpg")]);
        let out = rewrite_document(
            "index.html",
            r#"<div style="background-image: url('/img/bg.jpg')"></div>"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<div style="background-image: url('/img/bg.44444444.jpg')"></div>"#
        );

        // Malformed border: element left alone
        let html = r#"<div style="background: url(/img/bg.jpg)"></div>"#;
        assert_eq!(rewrite_document("index.html", html, &ctx).unwrap(), html);
    }

    #[test]
    fn test_img_srcset_in_document() {
        let ctx = ctx(BuildMode::PREVIEW, &[("a.png", "a.abcd1234.png")]);
        let out = rewrite_document(
            "index.html",
            r#"<img src="a.png" srcset="a.png 1x, https://x.com/b.png 2x">"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<img src="/a.abcd1234.png" srcset="/a.abcd1234.png 1x,https://x.com/b.png 2x">"#
        );
    }

    #[test]
    fn test_styled_img_srcset_rewritten_once() {
        let mut ctx = ctx(BuildMode::PRODUCTION, &[("a.png", "a.abcd1234.png")]);
        ctx.cdn_root = "/static/".into();
        let out = rewrite_document(
            "index.html",
            r#"<img src="a.png" srcset="a.png 2x" style="width: 10px">"#,
            &ctx,
        )
        .unwrap();
        assert!(out.contains(r#"src="/static/a.abcd1234.png""#));
        assert!(out.contains(r#"srcset="/static/a.abcd1234.png 2x""#));
        assert!(!out.contains("/static/static/"));
    }

    #[test]
    fn test_spaces_reencoded_in_srcset() {
        let ctx = ctx(BuildMode::PREVIEW, &[("img/my photo.png", "img/my photo.abcd1234.png")]);
        let out = rewrite_document(
            "index.html",
            r#"<img src="img/my%20photo.png" srcset="img/my%20photo.png 2x">"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<img src="/img/my%20photo.abcd1234.png" srcset="/img/my%20photo.abcd1234.png 2x">"#
        );
    }

    #[test]
    fn test_empty_src_untouched() {
        let ctx = ctx(BuildMode::PRODUCTION, &[]);
        let html = r#"<script src=""></script><img alt="x">"#;
        assert_eq!(rewrite_document("index.html", html, &ctx).unwrap(), html);
    }

    #[test]
    fn test_sort_classes() {
        let mut ctx = ctx(BuildMode::PRODUCTION, &[]);
        ctx.minify = true;
        let out = rewrite_document("index.html", r#"<p class="b  c a">x</p>"#, &ctx).unwrap();
        assert_eq!(out, r#"<p class="a b c">x</p>"#);
    }
}
