//! Owned HTML tree produced by the markdown converter.
//!
//! Small on purpose: element/text/raw nodes plus a placeholder for code
//! blocks whose highlighted HTML is produced later.

use std::borrow::Cow;

/// A node in the rendered document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Text content, escaped on output.
    Text(String),
    /// HTML written verbatim (raw HTML blocks, rendered math).
    Raw(String),
    /// Index of a highlighted code block, filled in after highlighting.
    Highlight(usize),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// An element. An empty tag is a fragment: only its children are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "col", "source", "wbr"];

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn fragment() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn add_class(&mut self, class: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, v)) if v.split_ascii_whitespace().any(|c| c == class) => {}
            Some((_, v)) if !v.is_empty() => {
                v.push(' ');
                v.push_str(class);
            }
            Some((_, v)) => v.push_str(class),
            None => self.attrs.push(("class".into(), class.into())),
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Raw(_) | Node::Highlight(_) => {}
        }
    }
}

/// Serialize nodes, substituting `highlighted[i]` for `Node::Highlight(i)`.
pub fn write_html(nodes: &[Node], highlighted: &[String], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&break_braces(&escape_text(text))),
            Node::Raw(html) => out.push_str(html),
            Node::Highlight(idx) => {
                if let Some(html) = highlighted.get(*idx) {
                    out.push_str(&break_braces(html));
                }
            }
            Node::Element(el) if el.tag.is_empty() => write_html(&el.children, highlighted, out),
            Node::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    continue;
                }
                write_html(&el.children, highlighted, out);
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

/// Split `{{` so client-side template engines leave the text alone.
pub fn break_braces(text: &str) -> Cow<'_, str> {
    if !text.contains("{{") {
        return Cow::Borrowed(text);
    }
    let mut out = text.to_string();
    while out.contains("{{") {
        out = out.replace("{{", "{<span></span>{");
    }
    Cow::Owned(out)
}

pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

pub fn escape_attr(text: &str) -> Cow<'_, str> {
    escape(text, true)
}

fn escape(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !text.contains(needs) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
