//! Fenced code block handler with syntax highlighting and Mermaid diagrams.

use std::io;

use crate::ast::{Node, NodeKind, NodeValue};
use crate::highlight::Highlighter;
use crate::html::{code_language, write_code_block};
use crate::renderer::{NodeHandler, RenderContext, WalkStatus};

/// Mermaid release loaded by pages containing diagrams.
pub const MERMAID_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

const MERMAID: &str = "mermaid";

/// Renders code blocks, optionally highlighted, and `mermaid` fences as
/// client-side diagrams.
///
/// Highlighted blocks are written as `<pre class="highlight"><code
/// class="language-x">` with scope-classed spans; unknown languages fall back
/// to plain output. Mermaid blocks become `<pre class="mermaid">`, and a
/// document containing any gets the Mermaid loader script appended.
///
/// Also registered for [`NodeKind::Document`] to append that script.
#[derive(Debug, Default)]
pub struct CodeBlockHandler {
    highlighter: Option<Highlighter>,
    mermaid_script: Option<String>,
}

impl CodeBlockHandler {
    /// Plain code blocks, no diagrams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Render `mermaid` fences as diagrams loaded from `script_url`.
    #[must_use]
    pub fn with_mermaid(mut self, script_url: impl Into<String>) -> Self {
        self.mermaid_script = Some(script_url.into());
        self
    }

    fn write_block(
        &self,
        ctx: &mut RenderContext<'_>,
        language: Option<&str>,
        literal: &str,
    ) -> io::Result<()> {
        if self.mermaid_script.is_some() && language == Some(MERMAID) {
            ctx.write_str("<pre class=\"mermaid\">")?;
            ctx.write_escaped(literal)?;
            return ctx.write_str("</pre>\n");
        }

        let highlighted = match (&self.highlighter, language) {
            (Some(highlighter), Some(language)) => highlighter
                .highlight(literal, language)
                .map(|html| (language, html)),
            _ => None,
        };
        match highlighted {
            Some((language, html)) => {
                ctx.write_str("<pre class=\"highlight\"><code class=\"language-")?;
                ctx.write_escaped(language)?;
                ctx.write_str("\">")?;
                ctx.write_str(&html)?;
                ctx.write_str("</code></pre>\n")
            }
            None => write_code_block(ctx, language, literal),
        }
    }
}

impl NodeHandler for CodeBlockHandler {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::Document, NodeKind::CodeBlock]
    }

    fn render<'a>(
        &self,
        ctx: &mut RenderContext<'a>,
        node: &'a Node,
        entering: bool,
    ) -> io::Result<WalkStatus> {
        match &node.value {
            NodeValue::CodeBlock { info, literal } => {
                if entering {
                    self.write_block(ctx, code_language(info.as_deref()), literal)?;
                }
                Ok(WalkStatus::SkipChildren)
            }
            NodeValue::Document => {
                if !entering
                    && let Some(url) = &self.mermaid_script
                    && contains_mermaid(node)
                {
                    ctx.write_str("<script src=\"")?;
                    ctx.write_escaped(url)?;
                    ctx.write_str(
                        "\"></script>\n<script>mermaid.initialize({startOnLoad: true});</script>\n",
                    )?;
                }
                Ok(WalkStatus::Continue)
            }
            _ => Ok(WalkStatus::Continue),
        }
    }
}

fn contains_mermaid(document: &Node) -> bool {
    let mut pending = vec![document];
    while let Some(node) = pending.pop() {
        if let NodeValue::CodeBlock { info, .. } = &node.value
            && code_language(info.as_deref()) == Some(MERMAID)
        {
            return true;
        }
        pending.extend(&node.children);
    }
    false
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::renderer::{EXTENSION_PRIORITY, RendererBuilder};
    use pretty_assertions::assert_eq;

    fn render_with(handler: CodeBlockHandler, markdown: &str) -> String {
        let renderer = RendererBuilder::new()
            .with_default_handlers()
            .with_handler(handler, EXTENSION_PRIORITY)
            .build();
        let mut out = Vec::new();
        renderer
            .render_markdown(markdown, Path::new("."), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn full() -> CodeBlockHandler {
        CodeBlockHandler::new()
            .with_highlighter(Highlighter::new())
            .with_mermaid(MERMAID_SCRIPT_URL)
    }

    #[test]
    fn test_highlighted_block() {
        let html = render_with(full(), "```rust\nfn main() {}\n```");
        assert!(html.starts_with("<pre class=\"highlight\"><code class=\"language-rust\"><span class=\"hl-"));
        assert!(html.ends_with("</code></pre>\n"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_unknown_language_plain() {
        assert_eq!(
            render_with(full(), "```no-such-language\na < b\n```"),
            "<pre><code class=\"language-no-such-language\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_without_highlighter_matches_default() {
        assert_eq!(
            render_with(CodeBlockHandler::new(), "```rust\nlet x = 1;\n```\n\n    indented\n"),
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>\n<pre><code>indented\n</code></pre>\n"
        );
    }

    #[test]
    fn test_mermaid_block_and_script() {
        let html = render_with(full(), "# Flow\n\n```mermaid\ngraph TD; A-->B\n```\n\nEnd");
        assert_eq!(
            html,
            "<h1 id=\"flow\">Flow</h1>\n<pre class=\"mermaid\">graph TD; A--&gt;B\n</pre>\n<p>End</p>\n\
             <script src=\"https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js\"></script>\n\
             <script>mermaid.initialize({startOnLoad: true});</script>\n"
        );
    }

    #[test]
    fn test_mermaid_nested_in_list_detected() {
        let html = render_with(full(), "- item\n\n  ```mermaid\n  graph LR; A-->B\n  ```\n");
        assert!(html.contains("<pre class=\"mermaid\">graph LR; A--&gt;B\n</pre>"));
        assert!(html.ends_with("mermaid.initialize({startOnLoad: true});</script>\n"));
    }

    #[test]
    fn test_mermaid_disabled_renders_code() {
        let handler = CodeBlockHandler::new().with_highlighter(Highlighter::new());
        let html = render_with(handler, "```mermaid\ngraph TD; A-->B\n```");
        assert!(!html.contains("class=\"mermaid\""));
        assert!(!html.contains("<script"));
    }
}
