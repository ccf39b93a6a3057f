//! Link classification utilities.

use std::sync::LazyLock;

use url::Url;

/// Synthetic origin used to probe whether a reference carries its own host.
const PROBE_ORIGIN: &str = "https://test-relative-url.example.com/";

static PROBE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(PROBE_ORIGIN).expect("probe origin is a valid URL"));

/// Check if a URI resolves under the site's own root.
///
/// The URI is joined onto a synthetic origin; it is relative iff the resolved
/// origin is still the synthetic one. Root-relative, path-relative,
/// query-only and fragment-only references are relative; absolute and
/// protocol-relative references are not. References the URL parser rejects
/// are treated as not relative.
///
/// Callers skip empty strings before classifying.
pub fn is_relative_url(uri: &str) -> bool {
    PROBE_BASE
        .join(uri)
        .is_ok_and(|resolved| resolved.origin() == PROBE_BASE.origin())
}

/// Syntactic classification of links, built on [`is_relative_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with its own scheme or host (https://, //cdn, mailto:).
    External(&'a str),
    /// Pure fragment/anchor link (#section). Value is anchor without `#`.
    Fragment(&'a str),
    /// Site-root-relative path (/about, /posts/hello).
    SiteRoot(&'a str),
    /// File-relative path (./image.png, ../other, ?query).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if !is_relative_url(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if link.starts_with('/') {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }

    /// Whether the link points inside the site.
    #[inline]
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}
