//! Frontmatter splitting.

/// Frontmatter block found at the top of a markdown file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontmatter<'a> {
    /// `---` delimited.
    Yaml(&'a str),
    /// `+++` delimited.
    Toml(&'a str),
}

/// Split a leading YAML (`---`) or TOML (`+++`) block from the body.
pub fn split_frontmatter(content: &str) -> (Option<Frontmatter<'_>>, &str) {
    let trimmed = content.trim_start();

    for fence in ["---", "+++"] {
        if let Some(rest) = trimmed.strip_prefix(fence)
            && let Some(end) = rest.find(&format!("\n{fence}"))
        {
            let fm = rest[..end].trim();
            let body = rest[end + 1 + fence.len()..].trim_start_matches(['\r', '\n']);
            let fm = if fence == "+++" {
                Frontmatter::Toml(fm)
            } else {
                Frontmatter::Yaml(fm)
            };
            return (Some(fm), body);
        }
    }

    (None, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml() {
        let (fm, body) = split_frontmatter("---\ntitle: Hello\n---\n\n# Body");
        assert_eq!(fm, Some(Frontmatter::Yaml("title: Hello")));
        assert_eq!(body, "# Body");
    }

    #[test]
    fn test_toml() {
        let (fm, body) = split_frontmatter("+++\ntitle = \"Hello\"\n+++\nText");
        assert_eq!(fm, Some(Frontmatter::Toml("title = \"Hello\"")));
        assert_eq!(body, "Text");
    }

    #[test]
    fn test_none() {
        assert_eq!(split_frontmatter("# Title"), (None, "# Title"));
        // Unterminated block is body text
        assert_eq!(split_frontmatter("---\nx"), (None, "---\nx"));
    }
}
