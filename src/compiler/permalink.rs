//! Post permalink normalization.

/// Strip leading slashes and guarantee a trailing one.
///
/// `/posts/hello` → `posts/hello/`, `/` → `/`.
pub fn normalize_permalink(link: &str) -> String {
    let mut link = link.trim_start_matches('/').to_string();
    if !link.ends_with('/') {
        link.push('/');
    }
    link
}
