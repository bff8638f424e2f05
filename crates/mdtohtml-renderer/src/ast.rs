//! Owned document tree built from the `pulldown-cmark` event stream.
//!
//! The parser is treated as an external collaborator: its events are folded
//! into [`Node`]s so that handlers can look at children before rendering a
//! node (the list item classifier needs its first grandchild).
//!
//! Tree shape follows the usual CommonMark AST conventions:
//! - inline content of a tight list item is grouped into a [`NodeValue::TextBlock`]
//! - a task marker becomes a [`NodeValue::TaskCheckBox`] as the first child
//!   of the item's first block
//! - table body rows are wrapped in [`NodeValue::TableBody`]
//! - footnote definitions are moved into a trailing [`NodeValue::FootnoteList`]

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Options, Parser, Tag};

use crate::linkify::linkify;
use crate::util::{heading_level_to_num, slugify};

/// Ordered attribute list attached to a node (`{#id .class key=value}`).
pub type Attributes = Vec<(String, String)>;

/// Discriminant of a [`NodeValue`], used as the handler registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    TextBlock,
    Heading,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    List,
    ListItem,
    TaskCheckBox,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    ThematicBreak,
    FootnoteList,
    FootnoteDefinition,
    DefinitionList,
    DefinitionTerm,
    DefinitionDetails,
    Metadata,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    CodeSpan,
    Text,
    RawHtml,
    SoftBreak,
    HardBreak,
    FootnoteReference,
}

impl NodeKind {
    /// Every node kind, in declaration order.
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::Document,
        NodeKind::Paragraph,
        NodeKind::TextBlock,
        NodeKind::Heading,
        NodeKind::BlockQuote,
        NodeKind::CodeBlock,
        NodeKind::HtmlBlock,
        NodeKind::List,
        NodeKind::ListItem,
        NodeKind::TaskCheckBox,
        NodeKind::Table,
        NodeKind::TableHead,
        NodeKind::TableBody,
        NodeKind::TableRow,
        NodeKind::TableCell,
        NodeKind::ThematicBreak,
        NodeKind::FootnoteList,
        NodeKind::FootnoteDefinition,
        NodeKind::DefinitionList,
        NodeKind::DefinitionTerm,
        NodeKind::DefinitionDetails,
        NodeKind::Metadata,
        NodeKind::Emphasis,
        NodeKind::Strong,
        NodeKind::Strikethrough,
        NodeKind::Superscript,
        NodeKind::Subscript,
        NodeKind::Link,
        NodeKind::Image,
        NodeKind::CodeSpan,
        NodeKind::Text,
        NodeKind::RawHtml,
        NodeKind::SoftBreak,
        NodeKind::HardBreak,
        NodeKind::FootnoteReference,
    ];

    /// Number of node kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this kind in [`NodeKind::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Document,
    Paragraph,
    /// Inline content of a tight list item (rendered without `<p>`).
    TextBlock,
    Heading {
        level: u8,
    },
    BlockQuote,
    CodeBlock {
        /// Fence info string, `None` for indented blocks.
        info: Option<String>,
        literal: String,
    },
    HtmlBlock {
        literal: String,
    },
    List {
        /// Start number for ordered lists.
        start: Option<u64>,
    },
    ListItem,
    TaskCheckBox {
        checked: bool,
    },
    Table {
        alignments: Vec<Alignment>,
    },
    TableHead,
    TableBody,
    TableRow,
    TableCell {
        header: bool,
        alignment: Alignment,
    },
    ThematicBreak,
    FootnoteList,
    FootnoteDefinition {
        label: String,
        /// 1-based number, assigned in definition order.
        index: usize,
    },
    DefinitionList,
    DefinitionTerm,
    DefinitionDetails,
    /// Front matter block; never rendered.
    Metadata,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link {
        destination: String,
        title: String,
    },
    Image {
        destination: String,
        title: String,
    },
    CodeSpan {
        literal: String,
    },
    Text {
        literal: String,
    },
    RawHtml {
        literal: String,
    },
    SoftBreak,
    HardBreak,
    FootnoteReference {
        label: String,
        /// Number of the matching definition, `None` if undefined.
        index: Option<usize>,
    },
}

impl NodeValue {
    /// Kind discriminant of this value.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Paragraph => NodeKind::Paragraph,
            Self::TextBlock => NodeKind::TextBlock,
            Self::Heading { .. } => NodeKind::Heading,
            Self::BlockQuote => NodeKind::BlockQuote,
            Self::CodeBlock { .. } => NodeKind::CodeBlock,
            Self::HtmlBlock { .. } => NodeKind::HtmlBlock,
            Self::List { .. } => NodeKind::List,
            Self::ListItem => NodeKind::ListItem,
            Self::TaskCheckBox { .. } => NodeKind::TaskCheckBox,
            Self::Table { .. } => NodeKind::Table,
            Self::TableHead => NodeKind::TableHead,
            Self::TableBody => NodeKind::TableBody,
            Self::TableRow => NodeKind::TableRow,
            Self::TableCell { .. } => NodeKind::TableCell,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::FootnoteList => NodeKind::FootnoteList,
            Self::FootnoteDefinition { .. } => NodeKind::FootnoteDefinition,
            Self::DefinitionList => NodeKind::DefinitionList,
            Self::DefinitionTerm => NodeKind::DefinitionTerm,
            Self::DefinitionDetails => NodeKind::DefinitionDetails,
            Self::Metadata => NodeKind::Metadata,
            Self::Emphasis => NodeKind::Emphasis,
            Self::Strong => NodeKind::Strong,
            Self::Strikethrough => NodeKind::Strikethrough,
            Self::Superscript => NodeKind::Superscript,
            Self::Subscript => NodeKind::Subscript,
            Self::Link { .. } => NodeKind::Link,
            Self::Image { .. } => NodeKind::Image,
            Self::CodeSpan { .. } => NodeKind::CodeSpan,
            Self::Text { .. } => NodeKind::Text,
            Self::RawHtml { .. } => NodeKind::RawHtml,
            Self::SoftBreak => NodeKind::SoftBreak,
            Self::HardBreak => NodeKind::HardBreak,
            Self::FootnoteReference { .. } => NodeKind::FootnoteReference,
        }
    }

    /// Whether this value is inline content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::TaskCheckBox
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Strikethrough
                | NodeKind::Superscript
                | NodeKind::Subscript
                | NodeKind::Link
                | NodeKind::Image
                | NodeKind::CodeSpan
                | NodeKind::Text
                | NodeKind::RawHtml
                | NodeKind::SoftBreak
                | NodeKind::HardBreak
                | NodeKind::FootnoteReference
        )
    }
}

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub value: NodeValue,
    pub children: Vec<Node>,
    pub attributes: Option<Attributes>,
    /// Byte range of the node in the markdown source.
    pub span: Range<usize>,
}

impl Node {
    /// Create a node without children or attributes.
    #[must_use]
    pub fn new(value: NodeValue, span: Range<usize>) -> Self {
        Self {
            value,
            children: Vec::new(),
            attributes: None,
            span,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.value.kind()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Plain text of all descendant text leaves, breaks collapsed to spaces.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.value {
            NodeValue::Text { literal } | NodeValue::CodeSpan { literal } => out.push_str(literal),
            NodeValue::SoftBreak | NodeValue::HardBreak => out.push(' '),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// Parser configuration.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    /// Generate `id` attributes for headings without an explicit one.
    pub heading_ids: bool,
    /// Turn bare URLs, `www.` hosts and email addresses into links.
    pub linkify: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            heading_ids: true,
            linkify: true,
        }
    }
}

impl ParseOptions {
    /// `pulldown-cmark` options for this configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let base = Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
        } else {
            base
        }
    }
}

/// Parse markdown into a document tree.
#[must_use]
pub fn parse(markdown: &str, options: &ParseOptions) -> Node {
    let mut builder = TreeBuilder::new(markdown.len());
    for (event, span) in Parser::new_ext(markdown, options.parser_options()).into_offset_iter() {
        builder.push_event(event, span);
    }
    let mut document = builder.finish();
    if options.linkify {
        linkify(&mut document);
    }
    collect_footnotes(&mut document);
    if options.heading_ids {
        assign_heading_ids(&mut document);
    }
    document
}

/// Deepest nesting kept in the tree, counting the document node.
///
/// Containers opened below this depth are dropped and their content is
/// appended to the deepest open node, so tree walks stay shallow on any input.
pub(crate) const MAX_NESTING: usize = 128;

/// Folds start/end events into nested nodes using an open-node stack.
struct TreeBuilder {
    stack: Vec<Node>,
    /// Open start tags that were not turned into nodes.
    flattened: usize,
}

impl TreeBuilder {
    fn new(len: usize) -> Self {
        Self {
            stack: vec![Node::new(NodeValue::Document, 0..len)],
            flattened: 0,
        }
    }

    fn push_event(&mut self, event: Event<'_>, span: Range<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag, span),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text, span),
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                self.leaf(
                    NodeValue::CodeSpan {
                        literal: code.into_string(),
                    },
                    span,
                );
            }
            Event::Html(html) => self.html(&html, span),
            Event::InlineHtml(html) => self.leaf(
                NodeValue::RawHtml {
                    literal: html.into_string(),
                },
                span,
            ),
            Event::SoftBreak => self.leaf(NodeValue::SoftBreak, span),
            Event::HardBreak => self.leaf(NodeValue::HardBreak, span),
            Event::Rule => self.leaf(NodeValue::ThematicBreak, span),
            Event::TaskListMarker(checked) => self.leaf(NodeValue::TaskCheckBox { checked }, span),
            Event::FootnoteReference(label) => self.leaf(
                NodeValue::FootnoteReference {
                    label: label.into_string(),
                    index: None,
                },
                span,
            ),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, span: Range<usize>) {
        if self.stack.len() >= MAX_NESTING {
            self.flattened += 1;
            return;
        }
        let mut attributes = None;
        let value = match tag {
            Tag::Paragraph => NodeValue::Paragraph,
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut attrs_out = Attributes::new();
                if let Some(id) = id {
                    attrs_out.push(("id".to_owned(), id.into_string()));
                }
                if !classes.is_empty() {
                    let joined: Vec<&str> = classes.iter().map(|class| &**class).collect();
                    attrs_out.push(("class".to_owned(), joined.join(" ")));
                }
                for (key, value) in attrs {
                    attrs_out.push((
                        key.into_string(),
                        value.map(pulldown_cmark::CowStr::into_string).unwrap_or_default(),
                    ));
                }
                if !attrs_out.is_empty() {
                    attributes = Some(attrs_out);
                }
                NodeValue::Heading {
                    level: heading_level_to_num(level),
                }
            }
            Tag::BlockQuote(_) => NodeValue::BlockQuote,
            Tag::CodeBlock(kind) => NodeValue::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.into_string()),
                    _ => None,
                },
                literal: String::new(),
            },
            Tag::HtmlBlock => NodeValue::HtmlBlock {
                literal: String::new(),
            },
            Tag::List(start) => NodeValue::List { start },
            Tag::Item => NodeValue::ListItem,
            Tag::FootnoteDefinition(label) => NodeValue::FootnoteDefinition {
                label: label.into_string(),
                index: 0,
            },
            Tag::DefinitionList => NodeValue::DefinitionList,
            Tag::DefinitionListTitle => NodeValue::DefinitionTerm,
            Tag::DefinitionListDefinition => NodeValue::DefinitionDetails,
            Tag::Table(alignments) => NodeValue::Table { alignments },
            Tag::TableHead => NodeValue::TableHead,
            Tag::TableRow => NodeValue::TableRow,
            Tag::TableCell => NodeValue::TableCell {
                header: false,
                alignment: Alignment::None,
            },
            Tag::Emphasis => NodeValue::Emphasis,
            Tag::Strong => NodeValue::Strong,
            Tag::Strikethrough => NodeValue::Strikethrough,
            Tag::Superscript => NodeValue::Superscript,
            Tag::Subscript => NodeValue::Subscript,
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => NodeValue::Link {
                destination: if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                },
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => NodeValue::Image {
                destination: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::MetadataBlock(_) => NodeValue::Metadata,
        };
        let mut node = Node::new(value, span);
        node.attributes = attributes;
        self.stack.push(node);
    }

    fn text(&mut self, text: &str, span: Range<usize>) {
        match self.stack.last_mut().map(|node| &mut node.value) {
            Some(NodeValue::CodeBlock { literal, .. } | NodeValue::HtmlBlock { literal }) => {
                literal.push_str(text);
            }
            Some(NodeValue::Metadata) => {}
            _ => self.leaf(
                NodeValue::Text {
                    literal: text.to_owned(),
                },
                span,
            ),
        }
    }

    fn html(&mut self, html: &str, span: Range<usize>) {
        if let Some(NodeValue::HtmlBlock { literal }) = self.stack.last_mut().map(|n| &mut n.value)
        {
            literal.push_str(html);
        } else {
            self.leaf(
                NodeValue::RawHtml {
                    literal: html.to_owned(),
                },
                span,
            );
        }
    }

    fn leaf(&mut self, value: NodeValue, span: Range<usize>) {
        self.append(Node::new(value, span));
    }

    fn close(&mut self) {
        if self.flattened > 0 {
            self.flattened -= 1;
            return;
        }
        // The document itself is never closed by an end event.
        if self.stack.len() < 2 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            self.append(finish_node(node));
        }
    }

    fn append(&mut self, node: Node) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        // pulldown-cmark splits text around brackets and entities; merge runs.
        if let NodeValue::Text { literal } = &node.value
            && let Some(prev) = parent.children.last_mut()
            && let NodeValue::Text { literal: prev_literal } = &mut prev.value
        {
            prev_literal.push_str(literal);
            prev.span.end = node.span.end;
            return;
        }
        parent.children.push(node);
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .unwrap_or_else(|| Node::new(NodeValue::Document, 0..0))
    }
}

/// Structural fix-ups applied when a container node is closed.
fn finish_node(mut node: Node) -> Node {
    match node.value {
        NodeValue::ListItem => {
            node.children = group_inline_children(std::mem::take(&mut node.children));
            node
        }
        NodeValue::Table { .. } => finish_table(node),
        _ => node,
    }
}

/// Wrap runs of inline children into `TextBlock` nodes.
fn group_inline_children(children: Vec<Node>) -> Vec<Node> {
    let mut grouped = Vec::with_capacity(children.len());
    let mut block: Option<Node> = None;
    for child in children {
        if child.value.is_inline() {
            let text_block = block
                .get_or_insert_with(|| Node::new(NodeValue::TextBlock, child.span.start..child.span.start));
            text_block.span.end = child.span.end;
            text_block.children.push(child);
        } else {
            if let Some(text_block) = block.take() {
                grouped.push(text_block);
            }
            grouped.push(child);
        }
    }
    if let Some(text_block) = block {
        grouped.push(text_block);
    }
    grouped
}

/// Mark header cells, copy column alignment onto cells and wrap body rows.
fn finish_table(mut table: Node) -> Node {
    let NodeValue::Table { alignments } = &table.value else {
        return table;
    };
    let alignments = alignments.clone();
    let set_cells = |row: &mut Node, header: bool| {
        for (i, cell) in row.children.iter_mut().enumerate() {
            if let NodeValue::TableCell { .. } = cell.value {
                cell.value = NodeValue::TableCell {
                    header,
                    alignment: alignments.get(i).copied().unwrap_or(Alignment::None),
                };
            }
        }
    };

    let mut children = Vec::with_capacity(2);
    let mut body: Option<Node> = None;
    for mut child in std::mem::take(&mut table.children) {
        if child.kind() == NodeKind::TableHead {
            set_cells(&mut child, true);
            children.push(child);
        } else {
            set_cells(&mut child, false);
            let tbody = body
                .get_or_insert_with(|| Node::new(NodeValue::TableBody, child.span.start..child.span.start));
            tbody.span.end = child.span.end;
            tbody.children.push(child);
        }
    }
    if let Some(tbody) = body {
        children.push(tbody);
    }
    table.children = children;
    table
}

/// Move footnote definitions to a trailing list and number references.
fn collect_footnotes(document: &mut Node) {
    let mut definitions = Vec::new();
    extract_definitions(document, &mut definitions);
    if definitions.is_empty() {
        return;
    }

    let mut numbers = HashMap::new();
    for (i, definition) in definitions.iter_mut().enumerate() {
        if let NodeValue::FootnoteDefinition { label, index } = &mut definition.value {
            *index = i + 1;
            numbers.entry(label.clone()).or_insert(i + 1);
        }
    }

    document.visit_mut(&mut |node| {
        if let NodeValue::FootnoteReference { label, index } = &mut node.value {
            *index = numbers.get(label).copied();
        }
    });

    let start = definitions.first().map_or(0, |d| d.span.start);
    let end = definitions.last().map_or(0, |d| d.span.end);
    let mut list = Node::new(NodeValue::FootnoteList, start..end);
    list.children = definitions;
    document.children.push(list);
}

fn extract_definitions(node: &mut Node, out: &mut Vec<Node>) {
    let children = std::mem::take(&mut node.children);
    for mut child in children {
        if child.kind() == NodeKind::FootnoteDefinition {
            out.push(child);
        } else {
            extract_definitions(&mut child, out);
            node.children.push(child);
        }
    }
}

/// Give every heading a unique `id`, keeping explicit ids.
fn assign_heading_ids(document: &mut Node) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    document.visit_mut(&mut |node| {
        if node.kind() != NodeKind::Heading {
            return;
        }
        if let Some(id) = node.attribute("id") {
            seen.entry(id.to_owned()).or_insert(0);
            return;
        }
        let mut base = slugify(&node.text());
        if base.is_empty() {
            base = "heading".to_owned();
        }
        let id = match seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{base}-{count}")
            }
            None => {
                seen.insert(base.clone(), 0);
                base
            }
        };
        node.attributes
            .get_or_insert_with(Attributes::new)
            .insert(0, ("id".to_owned(), id));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_default(markdown: &str) -> Node {
        parse(markdown, &ParseOptions::default())
    }

    fn kinds(node: &Node) -> Vec<NodeKind> {
        node.children.iter().map(Node::kind).collect()
    }

    #[test]
    fn test_node_kind_index_matches_all() {
        for (i, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(NodeKind::COUNT, NodeKind::ALL.len());
    }

    #[test]
    fn test_paragraph_text() {
        let doc = parse_default("Hello *world*");
        assert_eq!(kinds(&doc), vec![NodeKind::Paragraph]);
        assert_eq!(doc.children[0].text(), "Hello world");
    }

    #[test]
    fn test_adjacent_text_merged() {
        let doc = parse_default("a [b c");
        let paragraph = &doc.children[0];
        assert_eq!(paragraph.children.len(), 1);
        assert_eq!(paragraph.text(), "a [b c");
    }

    #[test]
    fn test_tight_item_grouped_into_text_block() {
        let doc = parse_default("- one\n- two");
        let list = &doc.children[0];
        assert_eq!(list.kind(), NodeKind::List);
        let item = &list.children[0];
        assert_eq!(kinds(item), vec![NodeKind::TextBlock]);
        assert_eq!(item.children[0].text(), "one");
    }

    #[test]
    fn test_loose_item_keeps_paragraph() {
        let doc = parse_default("- one\n\n- two");
        let item = &doc.children[0].children[0];
        assert_eq!(kinds(item), vec![NodeKind::Paragraph]);
    }

    #[test]
    fn test_nested_list_after_text_block() {
        let doc = parse_default("- one\n  - nested");
        let item = &doc.children[0].children[0];
        assert_eq!(kinds(item), vec![NodeKind::TextBlock, NodeKind::List]);
    }

    #[test]
    fn test_task_marker_is_first_grandchild() {
        let doc = parse_default("- [x] done");
        let item = &doc.children[0].children[0];
        let marker = item.first_child().and_then(Node::first_child).unwrap();
        assert_eq!(marker.value, NodeValue::TaskCheckBox { checked: true });
    }

    #[test]
    fn test_task_marker_disabled_without_gfm() {
        let options = ParseOptions {
            gfm: false,
            ..ParseOptions::default()
        };
        let doc = parse("- [x] done", &options);
        let item = &doc.children[0].children[0];
        let first = item.first_child().and_then(Node::first_child).unwrap();
        assert_eq!(first.kind(), NodeKind::Text);
    }

    #[test]
    fn test_image_alt_text_from_children() {
        let doc = parse_default("![a *b* `c`](x.png \"T\")");
        let image = &doc.children[0].children[0];
        assert_eq!(
            image.value,
            NodeValue::Image {
                destination: "x.png".to_owned(),
                title: "T".to_owned(),
            }
        );
        assert_eq!(image.text(), "a b c");
    }

    #[test]
    fn test_code_block_literal() {
        let doc = parse_default("```rust\nfn main() {}\n```");
        assert_eq!(
            doc.children[0].value,
            NodeValue::CodeBlock {
                info: Some("rust".to_owned()),
                literal: "fn main() {}\n".to_owned(),
            }
        );
    }

    #[test]
    fn test_html_block_literal() {
        let doc = parse_default("<div>\nhi\n</div>\n");
        assert_eq!(
            doc.children[0].value,
            NodeValue::HtmlBlock {
                literal: "<div>\nhi\n</div>\n".to_owned(),
            }
        );
    }

    #[test]
    fn test_table_structure() {
        let doc = parse_default("| A | B |\n|:--|--:|\n| 1 | 2 |\n| 3 | 4 |");
        let table = &doc.children[0];
        assert_eq!(kinds(table), vec![NodeKind::TableHead, NodeKind::TableBody]);
        assert_eq!(
            table.children[0].children[0].value,
            NodeValue::TableCell {
                header: true,
                alignment: Alignment::Left,
            }
        );
        let body = &table.children[1];
        assert_eq!(body.children.len(), 2);
        assert_eq!(
            body.children[0].children[1].value,
            NodeValue::TableCell {
                header: false,
                alignment: Alignment::Right,
            }
        );
    }

    #[test]
    fn test_heading_ids_generated_and_deduplicated() {
        let doc = parse_default("## FAQ\n\n## FAQ\n\n## FAQ");
        let ids: Vec<_> = doc.children.iter().map(|h| h.attribute("id").unwrap()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_heading_explicit_attributes() {
        let doc = parse_default("# Title {#custom .wide data-x=1}");
        let heading = &doc.children[0];
        assert_eq!(
            heading.attributes,
            Some(vec![
                ("id".to_owned(), "custom".to_owned()),
                ("class".to_owned(), "wide".to_owned()),
                ("data-x".to_owned(), "1".to_owned()),
            ])
        );
    }

    #[test]
    fn test_heading_ids_disabled() {
        let options = ParseOptions {
            heading_ids: false,
            ..ParseOptions::default()
        };
        let doc = parse("# Title", &options);
        assert_eq!(doc.children[0].attributes, None);
    }

    #[test]
    fn test_footnotes_moved_and_numbered() {
        let doc = parse_default("Text[^a].\n\n[^a]: Note.\n\nMore.");
        let last = doc.children.last().unwrap();
        assert_eq!(last.kind(), NodeKind::FootnoteList);
        assert!(matches!(
            last.children[0].value,
            NodeValue::FootnoteDefinition { index: 1, .. }
        ));
        let reference = doc.children[0]
            .children
            .iter()
            .find(|n| n.kind() == NodeKind::FootnoteReference)
            .unwrap();
        assert_eq!(
            reference.value,
            NodeValue::FootnoteReference {
                label: "a".to_owned(),
                index: Some(1),
            }
        );
    }

    #[test]
    fn test_email_autolink_gets_mailto() {
        let doc = parse_default("<me@example.com>");
        let link = &doc.children[0].children[0];
        assert!(matches!(
            &link.value,
            NodeValue::Link { destination, .. } if destination == "mailto:me@example.com"
        ));
    }

    #[test]
    fn test_deep_nesting_capped() {
        let markdown = format!("{}x", "> ".repeat(100_000));
        let doc = parse_default(&markdown);

        let mut depth = 0;
        let mut node = &doc;
        while let Some(child) = node.first_child() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, MAX_NESTING);
        assert_eq!(node.value, NodeValue::Text { literal: "x".to_owned() });
        assert_eq!(doc.text(), "x");
    }

    #[test]
    fn test_nesting_below_cap_unchanged() {
        let doc = parse_default("> > > deep");
        let quote = &doc.children[0].children[0].children[0];
        assert_eq!(quote.kind(), NodeKind::BlockQuote);
        assert_eq!(kinds(quote), vec![NodeKind::Paragraph]);
    }

    #[test]
    fn test_empty_document() {
        let doc = parse_default("");
        assert_eq!(doc.kind(), NodeKind::Document);
        assert!(doc.children.is_empty());
    }
}
