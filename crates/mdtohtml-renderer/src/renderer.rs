//! Handler-table renderer.
//!
//! A [`Renderer`] walks the document tree depth-first and dispatches every
//! node to the [`NodeHandler`] registered for its [`NodeKind`]. Handlers are
//! registered with a priority; for each kind the lowest priority number wins
//! and equal priorities keep the earliest registration. The table is resolved
//! once in [`RendererBuilder::build`].

use std::io::{self, Write};
use std::path::Path;

use crate::ast::{Node, NodeKind, ParseOptions, parse};
use crate::escape::escape_html;
use crate::html::DefaultHtmlHandler;
use crate::util::line_number;

/// Priority of the built-in HTML handler.
pub const DEFAULT_PRIORITY: u32 = 1000;

/// Priority used by the image and list item interceptors.
pub const EXTENSION_PRIORITY: u32 = 500;

/// Output options shared by every handler, fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass raw HTML through and skip the dangerous-URL check.
    pub allow_unsafe: bool,
    /// Close void elements XHTML-style (`<br />`).
    pub xhtml: bool,
}

/// What the walker does after a handler visited a node on entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Render the children, then call the handler again on leave.
    Continue,
    /// Skip the children; the handler is still called on leave.
    SkipChildren,
}

/// Renders one or more node kinds.
pub trait NodeHandler: Send + Sync {
    /// Node kinds this handler renders.
    fn kinds(&self) -> &[NodeKind];

    /// Render `node`, called once on entry and once on leave.
    fn render<'a>(
        &self,
        ctx: &mut RenderContext<'a>,
        node: &'a Node,
        entering: bool,
    ) -> io::Result<WalkStatus>;
}

/// Result of rendering one document.
#[derive(Clone, Debug, Default)]
pub struct RenderOutcome {
    /// Recoverable problems, e.g. images that could not be read.
    pub warnings: Vec<String>,
}

/// Builder collecting prioritized handlers.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use mdtohtml_renderer::{
///     EXTENSION_PRIORITY, EmbedImageHandler, RendererBuilder, TaskListItemHandler,
/// };
///
/// let renderer = RendererBuilder::new()
///     .with_default_handlers()
///     .with_handler(EmbedImageHandler, EXTENSION_PRIORITY)
///     .with_handler(TaskListItemHandler, EXTENSION_PRIORITY)
///     .build();
///
/// let mut out = Vec::new();
/// renderer
///     .render_markdown("- [x] done", Path::new("."), &mut out)
///     .unwrap();
/// assert!(String::from_utf8(out).unwrap().contains(r#"<li class="task-list-item">"#));
/// ```
#[derive(Default)]
pub struct RendererBuilder {
    options: RenderOptions,
    parse_options: ParseOptions,
    entries: Vec<(Box<dyn NodeHandler>, u32)>,
}

impl RendererBuilder {
    /// Create an empty builder with safe HTML output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set parser options used by [`Renderer::render_markdown`].
    #[must_use]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Register a handler; lower `priority` wins per node kind.
    #[must_use]
    pub fn with_handler<H: NodeHandler + 'static>(mut self, handler: H, priority: u32) -> Self {
        self.entries.push((Box::new(handler), priority));
        self
    }

    /// Register [`DefaultHtmlHandler`] at [`DEFAULT_PRIORITY`].
    #[must_use]
    pub fn with_default_handlers(self) -> Self {
        self.with_handler(DefaultHtmlHandler, DEFAULT_PRIORITY)
    }

    /// Resolve the handler table.
    #[must_use]
    pub fn build(self) -> Renderer {
        let mut table: Vec<Option<(usize, u32)>> = vec![None; NodeKind::COUNT];
        for (index, (handler, priority)) in self.entries.iter().enumerate() {
            for kind in handler.kinds() {
                let replace = match table[kind.index()] {
                    Some((_, current)) => *priority < current,
                    None => true,
                };
                if replace {
                    table[kind.index()] = Some((index, *priority));
                }
            }
        }

        Renderer {
            options: self.options,
            parse_options: self.parse_options,
            table: table.into_iter().map(|slot| slot.map(|(i, _)| i)).collect(),
            handlers: self.entries.into_iter().map(|(h, _)| h).collect(),
        }
    }
}

/// Renderer with a resolved handler table.
pub struct Renderer {
    options: RenderOptions,
    parse_options: ParseOptions,
    handlers: Vec<Box<dyn NodeHandler>>,
    /// Index into `handlers` per node kind.
    table: Vec<Option<usize>>,
}

impl Renderer {
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[must_use]
    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    /// Handler resolved for `kind`, if any.
    #[must_use]
    pub fn handler_for(&self, kind: NodeKind) -> Option<&dyn NodeHandler> {
        self.table[kind.index()].map(|i| self.handlers[i].as_ref())
    }

    /// Parse markdown with the configured parser options.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Node {
        parse(markdown, &self.parse_options)
    }

    /// Render a parsed document into `out`.
    ///
    /// `source` is the markdown the document was parsed from; `base_dir` is
    /// the directory relative image paths resolve against.
    pub fn render(
        &self,
        document: &Node,
        source: &str,
        base_dir: &Path,
        out: &mut dyn Write,
    ) -> io::Result<RenderOutcome> {
        let mut ctx = RenderContext {
            renderer: self,
            out,
            source,
            base_dir,
            next_sibling: None,
            warnings: Vec::new(),
        };
        ctx.walk(document)?;
        Ok(RenderOutcome {
            warnings: ctx.warnings,
        })
    }

    /// Parse and render markdown in one step.
    pub fn render_markdown(
        &self,
        markdown: &str,
        base_dir: &Path,
        out: &mut dyn Write,
    ) -> io::Result<RenderOutcome> {
        let document = self.parse(markdown);
        self.render(&document, markdown, base_dir, out)
    }
}

/// State of one document render: output sink, source, base directory.
pub struct RenderContext<'a> {
    renderer: &'a Renderer,
    out: &'a mut dyn Write,
    source: &'a str,
    base_dir: &'a Path,
    next_sibling: Option<&'a Node>,
    warnings: Vec<String>,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.renderer.options
    }

    /// Directory relative paths resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &'a Path {
        self.base_dir
    }

    /// Markdown source of the document.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Next sibling of the node currently being rendered.
    #[must_use]
    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.next_sibling
    }

    /// Raw output sink.
    pub fn writer(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    /// Write `s` with HTML special characters escaped.
    pub fn write_escaped(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(escape_html(s).as_bytes())
    }

    /// Record a recoverable problem at `node`, prefixed with its line.
    pub fn warn(&mut self, node: &Node, message: &str) {
        let line = line_number(self.source, node.span.start);
        self.warnings.push(format!("line {line}: {message}"));
    }

    fn walk(&mut self, node: &'a Node) -> io::Result<()> {
        let renderer = self.renderer;
        let handler = renderer.handler_for(node.kind());

        let status = match handler {
            Some(handler) => handler.render(self, node, true)?,
            None => WalkStatus::Continue,
        };

        if status == WalkStatus::Continue {
            let sibling = self.next_sibling;
            for (i, child) in node.children.iter().enumerate() {
                self.next_sibling = node.children.get(i + 1);
                self.walk(child)?;
            }
            self.next_sibling = sibling;
        }

        if let Some(handler) = handler {
            handler.render(self, node, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeValue;
    use pretty_assertions::assert_eq;

    fn render_html(markdown: &str) -> String {
        let renderer = RendererBuilder::new().with_default_handlers().build();
        let mut out = Vec::new();
        renderer
            .render_markdown(markdown, Path::new("."), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Writes a fixed marker for every node of its kinds.
    struct Marker(&'static str, &'static [NodeKind]);

    impl NodeHandler for Marker {
        fn kinds(&self) -> &[NodeKind] {
            self.1
        }

        fn render<'a>(
            &self,
            ctx: &mut RenderContext<'a>,
            _node: &'a Node,
            entering: bool,
        ) -> io::Result<WalkStatus> {
            if entering {
                ctx.write_str(self.0)?;
            }
            Ok(WalkStatus::SkipChildren)
        }
    }

    fn render_with(builder: RendererBuilder, markdown: &str) -> String {
        let renderer = builder.build();
        let mut out = Vec::new();
        renderer
            .render_markdown(markdown, Path::new("."), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_default_renderer_paragraph() {
        assert_eq!(render_html("Hello, world!"), "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_lower_priority_number_wins() {
        let builder = RendererBuilder::new()
            .with_default_handlers()
            .with_handler(Marker("[high]", &[NodeKind::Text]), 10)
            .with_handler(Marker("[low]", &[NodeKind::Text]), 20);
        assert_eq!(render_with(builder, "x"), "<p>[high]</p>\n");
    }

    #[test]
    fn test_registration_order_independent_of_priority() {
        let builder = RendererBuilder::new()
            .with_handler(Marker("[low]", &[NodeKind::Text]), 20)
            .with_handler(Marker("[high]", &[NodeKind::Text]), 10)
            .with_default_handlers();
        assert_eq!(render_with(builder, "x"), "<p>[high]</p>\n");
    }

    #[test]
    fn test_equal_priority_first_registration_wins() {
        let builder = RendererBuilder::new()
            .with_default_handlers()
            .with_handler(Marker("[first]", &[NodeKind::Text]), 5)
            .with_handler(Marker("[second]", &[NodeKind::Text]), 5);
        assert_eq!(render_with(builder, "x"), "<p>[first]</p>\n");
    }

    #[test]
    fn test_override_leaves_other_kinds_alone() {
        let builder = RendererBuilder::new()
            .with_default_handlers()
            .with_handler(Marker("[em]", &[NodeKind::Emphasis]), EXTENSION_PRIORITY);
        assert_eq!(render_with(builder, "a *b* c"), "<p>a [em] c</p>\n");
    }

    #[test]
    fn test_unhandled_kind_renders_children_only() {
        let builder = RendererBuilder::new().with_handler(Marker("T", &[NodeKind::Text]), 1);
        assert_eq!(render_with(builder, "a *b*"), "TT");
    }

    #[test]
    fn test_handler_for_resolves_table() {
        let renderer = RendererBuilder::new()
            .with_default_handlers()
            .with_handler(Marker("", &[NodeKind::Image]), EXTENSION_PRIORITY)
            .build();
        assert!(renderer.handler_for(NodeKind::Image).is_some());
        assert!(renderer.handler_for(NodeKind::Paragraph).is_some());

        let empty = RendererBuilder::new().build();
        assert!(empty.handler_for(NodeKind::Paragraph).is_none());
    }

    struct SiblingRecorder;

    impl NodeHandler for SiblingRecorder {
        fn kinds(&self) -> &[NodeKind] {
            &[NodeKind::Paragraph]
        }

        fn render<'a>(
            &self,
            ctx: &mut RenderContext<'a>,
            _node: &'a Node,
            entering: bool,
        ) -> io::Result<WalkStatus> {
            if !entering {
                let marker = if ctx.next_sibling().is_some() { "+" } else { "." };
                ctx.write_str(marker)?;
            }
            Ok(WalkStatus::SkipChildren)
        }
    }

    #[test]
    fn test_next_sibling_tracked() {
        let builder = RendererBuilder::new().with_handler(SiblingRecorder, 1);
        assert_eq!(render_with(builder, "a\n\nb\n\nc"), "++.");
    }

    #[test]
    fn test_warning_carries_line_number() {
        struct Warner;
        impl NodeHandler for Warner {
            fn kinds(&self) -> &[NodeKind] {
                &[NodeKind::Heading]
            }
            fn render<'a>(
                &self,
                ctx: &mut RenderContext<'a>,
                node: &'a Node,
                entering: bool,
            ) -> io::Result<WalkStatus> {
                if entering {
                    ctx.warn(node, "heading seen");
                }
                Ok(WalkStatus::SkipChildren)
            }
        }

        let renderer = RendererBuilder::new().with_handler(Warner, 1).build();
        let mut out = Vec::new();
        let outcome = renderer
            .render_markdown("text\n\n# Title", Path::new("."), &mut out)
            .unwrap();
        assert_eq!(outcome.warnings, vec!["line 3: heading seen".to_owned()]);
    }

    #[test]
    fn test_render_parsed_document() {
        let renderer = RendererBuilder::new().with_default_handlers().build();
        let document = renderer.parse("# Hi");
        assert!(matches!(
            document.children[0].value,
            NodeValue::Heading { level: 1 }
        ));
        let mut out = Vec::new();
        renderer
            .render(&document, "# Hi", Path::new("."), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<h1 id=\"hi\">Hi</h1>\n");
    }

    #[test]
    fn test_deeply_nested_input_renders() {
        let markdown = format!("{}x", "> ".repeat(100_000));
        let html = render_html(&markdown);

        let depth = crate::ast::MAX_NESTING - 1;
        assert_eq!(html.matches("<blockquote>\n").count(), depth);
        assert_eq!(html.matches("</blockquote>\n").count(), depth);
        assert!(html.contains("<blockquote>\nx</blockquote>\n"));
    }

    #[test]
    fn test_render_deterministic() {
        let markdown = "# A\n\n- [ ] x\n- y\n\n| a |\n|---|\n| b |\n\nText[^1]\n\n[^1]: n";
        assert_eq!(render_html(markdown), render_html(markdown));
    }
}
