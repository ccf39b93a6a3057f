//! Route path helpers.
//!
//! Route paths are site-relative, `/`-separated and carry no leading slash
//! (`posts/hello/index.html`, `css/style.css`).

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

/// Characters that cannot appear raw in a URL path, plus `%` so decoded
/// paths round-trip.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static SITE_ROOT: LazyLock<Url> =
    LazyLock::new(|| Url::parse("file:///").expect("file root is a valid URL"));

/// A reference resolved against the document that contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Canonical route path (decoded, no leading slash, no query).
    pub path: String,
    /// Fragment including the leading `#`, or empty.
    pub fragment: String,
}

/// Resolve `uri` against the route path of the document referencing it.
///
/// Query strings are dropped; the fragment is kept apart so it can be
/// re-attached after remapping. Returns `None` if the reference cannot be
/// parsed or its path does not decode to UTF-8.
///
/// # Examples
/// ```ignore
/// let r = resolve_reference("posts/a/index.html", "../img/x.png#top").unwrap();
/// assert_eq!(r.path, "posts/img/x.png");
/// assert_eq!(r.fragment, "#top");
/// ```
pub fn resolve_reference(document: &str, uri: &str) -> Option<Resolved> {
    let mut base = SITE_ROOT.clone();
    base.set_path(&format!("/{document}"));

    let resolved = base.join(uri).ok()?;
    let path = percent_decode_str(resolved.path()).decode_utf8().ok()?;

    let fragment = match resolved.fragment() {
        Some(f) if !f.is_empty() => format!("#{f}"),
        _ => String::new(),
    };

    Some(Resolved {
        path: path.trim_start_matches('/').to_string(),
        fragment,
    })
}

/// Percent-encode a decoded route path for output in an attribute.
///
/// Inverse of the decoding in [`resolve_reference`]; `/` is kept.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

/// Last segment of a route path.
#[inline]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Directory part of a route path, empty for top-level routes.
#[inline]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Join a directory and a file name into a route path.
#[inline]
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Lowercased final extension including the dot (`.png`), or empty.
pub fn extension_lower(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_relative() {
        let r = resolve_reference("posts/hello/index.html", "/css/style.css").unwrap();
        assert_eq!(r.path, "css/style.css");
        assert_eq!(r.fragment, "");
    }

    #[test]
    fn test_resolve_path_relative() {
        let r = resolve_reference("posts/hello/index.html", "cover.png").unwrap();
        assert_eq!(r.path, "posts/hello/cover.png");

        let r = resolve_reference("posts/hello/index.html", "../../img/a.png").unwrap();
        assert_eq!(r.path, "img/a.png");
    }

    #[test]
    fn test_resolve_keeps_fragment_drops_query() {
        let r = resolve_reference("index.html", "/post/?x=1#section").unwrap();
        assert_eq!(r.path, "post/");
        assert_eq!(r.fragment, "#section");

        let r = resolve_reference("index.html", "/post/#").unwrap();
        assert_eq!(r.fragment, "");
    }

    #[test]
    fn test_resolve_decodes_percent_encoding() {
        let r = resolve_reference("index.html", "/img/my%20photo.png").unwrap();
        assert_eq!(r.path, "img/my photo.png");

        let r = resolve_reference("a b/index.html", "x.png").unwrap();
        assert_eq!(r.path, "a b/x.png");
    }

    #[test]
    fn test_resolve_rejects_invalid_utf8() {
        assert!(resolve_reference("index.html", "/img/%FF.png").is_none());
    }

    #[test]
    fn test_encode_path_round_trip() {
        assert_eq!(encode_path("img/my photo.abcd1234.png"), "img/my%20photo.abcd1234.png");
        assert_eq!(encode_path("img/100%.png"), "img/100%25.png");
        assert_eq!(encode_path("css/style.css"), "css/style.css");

        let r = resolve_reference("index.html", "/img/100%25%20off.png").unwrap();
        assert_eq!(encode_path(&r.path), "img/100%25%20off.png");
    }

    #[test]
    fn test_path_parts() {
        assert_eq!(file_name("a/b/c.png"), "c.png");
        assert_eq!(file_name("c.png"), "c.png");
        assert_eq!(parent_dir("a/b/c.png"), "a/b");
        assert_eq!(parent_dir("c.png"), "");
        assert_eq!(join("", "c.png"), "c.png");
        assert_eq!(join("a/b", "c.png"), "a/b/c.png");
    }

    #[test]
    fn test_extension_lower() {
        assert_eq!(extension_lower("img/A.PNG"), ".png");
        assert_eq!(extension_lower("main.min.js"), ".js");
        assert_eq!(extension_lower("LICENSE"), "");
        assert_eq!(extension_lower(".htaccess"), "");
        assert_eq!(extension_lower("dir.v2/file"), "");
    }
}
