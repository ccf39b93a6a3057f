//! Content fingerprints for cache busting.
//!
//! The fingerprint is the first 8 hex chars of the SHA-1 digest of the final
//! asset bytes. It is spliced into the filename after the first dot-segment:
//! `style.css` → `style.a1b2c3d4.css`, `main.min.js` → `main.a1b2c3d4.min.js`.

use sha1::{Digest, Sha1};

/// Length of a fingerprint in hex chars.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute the fingerprint of `content`.
pub fn fingerprint(content: &[u8]) -> String {
    let digest = Sha1::digest(content);
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Splice a fingerprint into a bare file name.
pub fn splice(file_name: &str, fingerprint: &str) -> String {
    match file_name.split_once('.') {
        Some((stem, rest)) => format!("{stem}.{fingerprint}.{rest}"),
        None => format!("{file_name}.{fingerprint}"),
    }
}

/// Check whether `file_name` already carries `fingerprint` as its second segment.
pub fn is_spliced(file_name: &str, fingerprint: &str) -> bool {
    file_name.split('.').nth(1) == Some(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_sha1_prefix() {
        // sha1("") = da39a3ee5e6b4b0d3255bfef95601890afd80709
        assert_eq!(fingerprint(b""), "da39a3ee");
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(fingerprint(b"abc"), "a9993e36");
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let a = fingerprint(b"body { color: red; }");
        assert_eq!(a, fingerprint(b"body { color: red; }"));
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, fingerprint(b"body { color: red; }\n"));
    }

    #[test]
    fn test_splice() {
        assert_eq!(splice("style.css", "abcd1234"), "style.abcd1234.css");
        assert_eq!(splice("main.min.js", "abcd1234"), "main.abcd1234.min.js");
        assert_eq!(splice("favicon", "abcd1234"), "favicon.abcd1234");
    }

    #[test]
    fn test_is_spliced() {
        assert!(is_spliced("style.abcd1234.css", "abcd1234"));
        assert!(!is_spliced("style.css", "abcd1234"));
        assert!(!is_spliced("style.ffff0000.css", "abcd1234"));
    }
}
