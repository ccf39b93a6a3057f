//! Markdown to tree conversion using pulldown-cmark.
//!
//! Events are folded into an owned [`Element`] tree with a stack of open
//! elements. Code blocks are left as [`Node::Highlight`] placeholders and
//! collected for highlighting; math is rendered in place.

use anyhow::Result;
use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use rustc_hash::FxHashMap;

use super::math::MathRenderer;
use super::slug::Slugger;
use super::tree::{Element, Node};
use crate::config::MarkdownConfig;

/// A code block waiting to be highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub code: String,
    /// First word of the fence info string.
    pub lang: Option<String>,
}

/// Converter output.
#[derive(Debug, Default)]
pub struct Converted {
    pub nodes: Vec<Node>,
    /// Indexed by [`Node::Highlight`].
    pub code_blocks: Vec<CodeBlock>,
}

/// Convert markdown into a tree.
pub fn convert(
    markdown: &str,
    config: &MarkdownConfig,
    math: &dyn MathRenderer,
) -> Result<Converted> {
    MarkdownConverter::new(config, math).convert(markdown)
}

fn parser_options(config: &MarkdownConfig) -> Options {
    let mut opts = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;
    if config.math {
        opts.insert(Options::ENABLE_MATH);
    }
    opts
}

#[derive(Debug, Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    body_open: bool,
    cell: usize,
}

/// Markdown to tree converter
struct MarkdownConverter<'a> {
    config: &'a MarkdownConfig,
    math: &'a dyn MathRenderer,
    /// Stack of open elements (for nested structures)
    stack: Vec<Element>,
    /// Root children (collected when stack is empty)
    root_children: Vec<Node>,
    /// Code block being collected
    code: Option<CodeBlock>,
    code_blocks: Vec<CodeBlock>,
    slugger: Slugger,
    table: TableState,
    /// Footnote name → number, in order of first appearance
    footnotes: FxHashMap<String, usize>,
}

impl<'a> MarkdownConverter<'a> {
    fn new(config: &'a MarkdownConfig, math: &'a dyn MathRenderer) -> Self {
        Self {
            config,
            math,
            stack: Vec::new(),
            root_children: Vec::new(),
            code: None,
            code_blocks: Vec::new(),
            slugger: Slugger::new(),
            table: TableState::default(),
            footnotes: FxHashMap::default(),
        }
    }

    fn convert(mut self, markdown: &str) -> Result<Converted> {
        for event in Parser::new_ext(markdown, parser_options(self.config)) {
            self.handle_event(event)?;
        }

        // Unbalanced events cannot happen with pulldown-cmark, but never lose content.
        while let Some(el) = self.stack.pop() {
            self.add_node(Node::Element(el));
        }

        Ok(Converted {
            nodes: self.root_children,
            code_blocks: self.code_blocks,
        })
    }

    /// Handle a single pulldown-cmark event
    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => self.add_node(Node::Element(
                Element::new("code").with_child(Node::Text(code.to_string())),
            )),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.add_node(Node::Raw(html.to_string()));
            }
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => {
                self.add_node(Node::Element(Element::new("br")));
                self.add_text("\n");
            }
            Event::Rule => self.add_node(Node::Element(Element::new("hr"))),
            Event::FootnoteReference(name) => self.add_footnote_ref(&name),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
            Event::InlineMath(tex) => self.add_math(&tex, false)?,
            Event::DisplayMath(tex) => self.add_math(&tex, true)?,
        }
        Ok(())
    }

    /// Start a new tag (push onto stack)
    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    code: String::new(),
                    lang,
                });
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                self.stack.push(Element::new("thead"));
                self.stack.push(Element::new("tr"));
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.table.body_open = true;
                    self.stack.push(Element::new("tbody"));
                }
                self.table.cell = 0;
                self.stack.push(Element::new("tr"));
            }
            tag => {
                let element = self.tag_to_element(tag);
                self.stack.push(element);
            }
        }
    }

    /// End a tag (pop from stack)
    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::TableHead => {
                self.table.in_head = false;
                self.close(); // tr
                self.close(); // thead
            }
            TagEnd::Table => {
                if self.table.body_open {
                    self.close(); // tbody
                }
                self.table = TableState::default();
                self.close();
            }
            TagEnd::Heading(_) => {
                if let Some(heading) = self.stack.pop() {
                    let heading = self.finish_heading(heading);
                    self.add_node(Node::Element(heading));
                }
            }
            TagEnd::Image => {
                if let Some(mut img) = self.stack.pop() {
                    let alt = img.text_content();
                    img.children.clear();
                    img.attrs.insert(1, ("alt".into(), alt));
                    self.add_node(Node::Element(img));
                }
            }
            _ => self.close(),
        }
    }

    /// Pop the innermost element into its parent.
    fn close(&mut self) {
        if let Some(el) = self.stack.pop() {
            self.add_node(Node::Element(el));
        }
    }

    /// Convert a pulldown-cmark tag to an element
    fn tag_to_element(&mut self, tag: Tag) -> Element {
        match tag {
            // Block elements
            Tag::Paragraph => Element::new("p"),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut heading = Element::new(heading_level_to_tag(level));
                if let Some(id) = id {
                    self.slugger.reserve(&id);
                    heading.set_attr("id", id.to_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<&str> = classes.iter().map(|c| c.as_ref()).collect();
                    heading.set_attr("class", classes.join(" "));
                }
                for (name, value) in attrs {
                    heading.set_attr(&name, value.map(|v| v.to_string()).unwrap_or_default());
                }
                heading
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::List(Some(1)) => Element::new("ol"),
            Tag::List(Some(start)) => Element::new("ol").with_attr("start", start.to_string()),
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(name) => {
                let number = self.footnote_number(&name);
                Element::new("div")
                    .with_attr("class", "footnote-definition")
                    .with_attr("id", name.to_string())
                    .with_child(Node::Element(
                        Element::new("sup")
                            .with_attr("class", "footnote-definition-label")
                            .with_child(Node::Text(number.to_string())),
                    ))
            }

            // Definition list (extended syntax)
            Tag::DefinitionList => Element::new("dl"),
            Tag::DefinitionListTitle => Element::new("dt"),
            Tag::DefinitionListDefinition => Element::new("dd"),

            // Table elements
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                Element::new("table")
            }
            Tag::TableCell => {
                let mut cell = Element::new(if self.table.in_head { "th" } else { "td" });
                let align = match self.table.alignments.get(self.table.cell) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    Some(Alignment::None) | None => None,
                };
                if let Some(align) = align {
                    cell.set_attr("style", format!("text-align: {align}"));
                }
                self.table.cell += 1;
                cell
            }

            // Inline elements
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Superscript => Element::new("sup"),
            Tag::Subscript => Element::new("sub"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link.set_attr("title", title.to_string());
                }
                link
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // alt text arrives as children and is moved into `alt` on close
                let mut img = Element::new("img").with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    img.set_attr("title", title.to_string());
                }
                img
            }

            // Transparent containers
            Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::CodeBlock(_)
            | Tag::TableHead
            | Tag::TableRow => Element::fragment(),
        }
    }

    /// Add slug id, `tabindex` and a trailing `headerlink` anchor.
    fn finish_heading(&mut self, mut heading: Element) -> Element {
        if !self.config.anchors {
            return heading;
        }

        let id = match heading.attr("id") {
            Some(id) => id.to_string(),
            None => {
                let id = self.slugger.unique(&heading.text_content());
                heading.set_attr("id", id.clone());
                id
            }
        };
        heading.set_attr("tabindex", "-1");
        heading.children.push(Node::Text(" ".into()));
        heading.children.push(Node::Element(
            Element::new("a")
                .with_attr("class", "headerlink")
                .with_attr("href", format!("#{id}")),
        ));
        heading
    }

    fn finish_code_block(&mut self) {
        let Some(block) = self.code.take() else {
            return;
        };

        let mut code = Element::new("code");
        if let Some(lang) = &block.lang {
            code.set_attr("class", format!("language-{lang}"));
        }

        let content = if self.config.highlight {
            self.code_blocks.push(block);
            Node::Highlight(self.code_blocks.len() - 1)
        } else {
            Node::Text(block.code)
        };

        let pre = Element::new("pre").with_child(Node::Element(code.with_child(content)));
        self.add_node(Node::Element(pre));
    }

    fn footnote_number(&mut self, name: &str) -> usize {
        let next = self.footnotes.len() + 1;
        *self.footnotes.entry(name.to_string()).or_insert(next)
    }

    /// Add footnote reference
    fn add_footnote_ref(&mut self, name: &str) {
        let number = self.footnote_number(name);
        let link = Element::new("a")
            .with_attr("href", format!("#{name}"))
            .with_child(Node::Text(number.to_string()));
        let sup = Element::new("sup")
            .with_attr("class", "footnote-reference")
            .with_child(Node::Element(link));
        self.add_node(Node::Element(sup));
    }

    /// Add task list marker
    fn add_task_marker(&mut self, checked: bool) {
        let mut input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("disabled", "");
        if checked {
            input.set_attr("checked", "");
        }
        self.add_node(Node::Element(input));
    }

    fn add_math(&mut self, tex: &str, display: bool) -> Result<()> {
        let html = self.math.render(tex, display)?;
        self.add_node(Node::Raw(html));
        Ok(())
    }

    /// Add text, merging with a preceding text node.
    fn add_text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.code.push_str(text);
            return;
        }
        if text.is_empty() {
            return;
        }
        let children = self.children_mut();
        match children.last_mut() {
            Some(Node::Text(last)) => last.push_str(text),
            _ => children.push(Node::Text(text.to_string())),
        }
    }

    /// Add a node to current context (top of stack or root)
    fn add_node(&mut self, node: Node) {
        self.children_mut().push(node);
    }

    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root_children,
        }
    }
}

/// Convert heading level to tag name
fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
