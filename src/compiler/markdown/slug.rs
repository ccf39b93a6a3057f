//! Heading slugs.
//!
//! `Hello World` → `hello-world`. Non-ASCII and reserved characters are
//! percent-encoded like a URI component, so ids are usable in fragments
//! as-is.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rustc_hash::FxHashSet;

/// Characters left alone by URI-component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Slugify heading text: trim, lowercase, whitespace runs to `-`, encode.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let dashed = lowered.split_whitespace().collect::<Vec<_>>().join("-");
    utf8_percent_encode(&dashed, URI_COMPONENT).to_string()
}

/// Hands out unique slugs within one document.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: FxHashSet<String>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, suffixed with `-1`, `-2`… on collision.
    pub fn unique(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        let mut n = 1;
        while !self.seen.insert(slug.clone()) {
            slug = format!("{base}-{n}");
            n += 1;
        }
        slug
    }

    /// Mark an explicit id as taken.
    pub fn reserve(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }
}
