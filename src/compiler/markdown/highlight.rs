//! Code block highlighting.

use anyhow::{Context, Result};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Prefix of every highlight class (`h-keyword`, `h-string`…).
pub const CLASS_PREFIX: &str = "h-";

/// Turns a code block into highlighted HTML (without `<pre><code>`).
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String>;
}

/// Class-based highlighting with syntect's bundled grammars.
///
/// Unknown languages are highlighted as plain text.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: Option<&str>) -> Result<String> {
        let syntax = lang
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .with_context(|| format!("failed to highlight {} code", syntax.name))?;
        }
        Ok(generator.finalize())
    }
}
