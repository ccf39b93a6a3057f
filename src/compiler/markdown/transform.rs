//! Tree post-processing.
//!
//! Runs after conversion and before highlighting:
//!
//! 1. bare URLs in text become links
//! 2. `name@2x.png` images get a matching `srcset`
//! 3. image-only paragraphs become lightbox galleries
//! 4. `<blockquote>` and `<pre>` get a `div.flex-wrapper`
//! 5. inline `<code>` next to punctuation gets `punctuation-l`/`-r`

use std::sync::LazyLock;

use regex::Regex;

use super::tree::{Element, Node};
use crate::core::LinkKind;
use crate::utils::path::file_name;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s<>\x{2018}-\x{201D}\x{3000}-\x{303F}\x{FF00}-\x{FFEF}]+").unwrap()
});

static RETINA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([0-9.]+)x$").unwrap());

/// CJK and ASCII punctuation that needs spacing fixed around inline code.
const PUNCTUATION: &str = "。？！，、；：“”‘’（）《》〈〉【】『』「」﹃﹄〔〕…—～﹏￥,.'!\"#$%&()*+,-./:;<=>?@[]^_`{|}~";

/// Run every pass over a converted document.
pub fn post_process(nodes: &mut Vec<Node>) {
    linkify(nodes);
    retina_srcset(nodes);
    image_paragraphs(nodes);
    wrap_blocks(nodes);
    mark_code_punctuation(nodes);
}

// ============================================================================
// Linkify
// ============================================================================

fn linkify(nodes: &mut Vec<Node>) {
    let mut out = Vec::with_capacity(nodes.len());
    // Raw inline `<a>` … `</a>` around text
    let mut in_raw_link = false;

    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if !in_raw_link && URL.is_match(&text) => split_links(&text, &mut out),
            Node::Element(mut el) => {
                if !matches!(el.tag.as_str(), "a" | "code" | "pre") {
                    linkify(&mut el.children);
                }
                out.push(Node::Element(el));
            }
            Node::Raw(html) => {
                let lower = html.trim_start().to_ascii_lowercase();
                if lower.starts_with("<a ") || lower.starts_with("<a>") {
                    in_raw_link = true;
                } else if lower.starts_with("</a") {
                    in_raw_link = false;
                }
                out.push(Node::Raw(html));
            }
            other => out.push(other),
        }
    }

    *nodes = out;
}

fn split_links(text: &str, out: &mut Vec<Node>) {
    let mut last = 0;
    for found in URL.find_iter(text) {
        let url = trim_url(found.as_str());
        let has_host = url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
        if !has_host {
            continue;
        }
        if found.start() > last {
            out.push(Node::Text(text[last..found.start()].to_string()));
        }
        out.push(Node::Element(
            Element::new("a")
                .with_attr("href", url)
                .with_child(Node::Text(url.to_string())),
        ));
        last = found.start() + url.len();
    }
    if last < text.len() {
        out.push(Node::Text(text[last..].to_string()));
    }
}

/// Drop trailing sentence punctuation and unbalanced closing parens.
fn trim_url(mut url: &str) -> &str {
    while let Some(last) = url.chars().last() {
        let trim = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            ']' => url.matches(']').count() > url.matches('[').count(),
            _ => false,
        };
        if !trim {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

// ============================================================================
// Images
// ============================================================================

/// `img/photo@2x.png` → `srcset="img/photo@2x.png 2x"`.
fn retina_srcset(nodes: &mut [Node]) {
    for node in nodes {
        let Node::Element(el) = node else { continue };
        if el.is("img") {
            if let Some(srcset) = el.attr("src").and_then(retina_descriptor) {
                el.set_attr("srcset", srcset);
            }
        }
        retina_srcset(&mut el.children);
    }
}

fn retina_descriptor(src: &str) -> Option<String> {
    if src.is_empty() || !LinkKind::parse(src).is_internal() {
        return None;
    }
    let name = file_name(src);
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    let factor: f64 = RETINA.captures(stem)?.get(1)?.as_str().parse().ok()?;
    factor.is_finite().then(|| format!("{src} {factor}x"))
}

/// Paragraphs holding nothing but images become captioned lightbox links.
fn image_paragraphs(nodes: &mut [Node]) {
    for node in nodes {
        let Node::Element(el) = node else { continue };
        if el.is("p") && is_image_only(el) {
            *el = image_gallery(std::mem::take(&mut el.children));
        } else {
            image_paragraphs(&mut el.children);
        }
    }
}

fn is_image_only(p: &Element) -> bool {
    let mut images = 0;
    for child in &p.children {
        match child {
            Node::Element(el) if el.is("img") => images += 1,
            Node::Text(text) if text.trim().is_empty() => {}
            _ => return false,
        }
    }
    images > 0
}

fn image_gallery(children: Vec<Node>) -> Element {
    let mut gallery = Element::new("div").with_attr("class", "images");

    for child in children {
        let Node::Element(img) = child else { continue };
        let title = img
            .attr("title")
            .filter(|t| !t.is_empty())
            .or_else(|| img.attr("alt"))
            .unwrap_or_default()
            .to_string();
        let src = img.attr("src").unwrap_or_default().to_string();

        let link = Element::new("a")
            .with_attr("href", src)
            .with_attr("title", title.clone())
            .with_attr("data-fancybox", "")
            .with_child(Node::Element(img));
        let caption = Element::new("p")
            .with_attr("class", "image-caption")
            .with_child(Node::Text(title));

        gallery.children.push(Node::Element(
            Element::new("div")
                .with_attr("class", "image")
                .with_child(Node::Element(link))
                .with_child(Node::Element(caption)),
        ));
    }

    gallery
}

// ============================================================================
// Wrappers & fixes
// ============================================================================

fn wrap_blocks(nodes: &mut [Node]) {
    for node in nodes {
        let Node::Element(el) = node else { continue };
        wrap_blocks(&mut el.children);
        if el.is("blockquote") || el.is("pre") {
            let inner = std::mem::take(el);
            *el = Element::new("div")
                .with_attr("class", "flex-wrapper")
                .with_child(Node::Element(inner));
        }
    }
}

fn mark_code_punctuation(nodes: &mut [Node]) {
    for i in 0..nodes.len() {
        let (before, rest) = nodes.split_at_mut(i);
        let (current, after) = rest.split_at_mut(1);
        let Node::Element(el) = &mut current[0] else { continue };

        if el.is("pre") {
            continue;
        }
        if el.is("code") {
            let next = after.first().and_then(Node::as_text);
            if next.is_some_and(|t| t.starts_with(|c: char| PUNCTUATION.contains(c))) {
                el.add_class("punctuation-r");
            }
            let prev = before.last().and_then(Node::as_text);
            if prev.is_some_and(|t| t.ends_with(|c: char| PUNCTUATION.contains(c))) {
                el.add_class("punctuation-l");
            }
        }
        mark_code_punctuation(&mut el.children);
    }
}
