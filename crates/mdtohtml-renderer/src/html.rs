//! Default HTML handler.
//!
//! Renders every node kind to plain HTML: `<p>` paragraphs, `<hN id>`
//! headings, `<pre><code>` blocks, GFM tables, task checkboxes and a trailing
//! footnote section. Void elements close as `<br />` in XHTML mode.

use std::io;

use pulldown_cmark::Alignment;

use crate::ast::{Node, NodeKind, NodeValue};
use crate::escape::{escape_html, escape_url, is_dangerous_url};
use crate::renderer::{NodeHandler, RenderContext, WalkStatus};

/// Attributes allowed on every element.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "lang",
    "part",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
];

/// Extra attributes allowed on `<img>`.
pub(crate) const IMAGE_ATTRIBUTES: &[&str] = &[
    "align",
    "border",
    "crossorigin",
    "decoding",
    "height",
    "importance",
    "intrinsicsize",
    "ismap",
    "loading",
    "referrerpolicy",
    "sizes",
    "srcset",
    "usemap",
    "width",
];

/// Extra attributes allowed on `<li>`.
pub(crate) const LIST_ITEM_ATTRIBUTES: &[&str] = &["value"];

const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Write ` name="value"` for each node attribute in the global list, in
/// `extra`, or prefixed with `data-`.
pub(crate) fn write_attributes(
    ctx: &mut RenderContext<'_>,
    node: &Node,
    extra: &[&str],
) -> io::Result<()> {
    let Some(attributes) = &node.attributes else {
        return Ok(());
    };
    for (name, value) in attributes {
        let name = name.as_str();
        let allowed = GLOBAL_ATTRIBUTES.contains(&name)
            || extra.contains(&name)
            || name.starts_with("data-");
        if !allowed {
            continue;
        }
        ctx.write_str(" ")?;
        ctx.write_str(name)?;
        ctx.write_str("=\"")?;
        ctx.write_escaped(value)?;
        ctx.write_str("\"")?;
    }
    Ok(())
}

/// Write a link or image destination unless it is dangerous in safe mode.
pub(crate) fn write_destination(ctx: &mut RenderContext<'_>, destination: &str) -> io::Result<()> {
    if ctx.options().allow_unsafe || !is_dangerous_url(destination) {
        let escaped = escape_url(destination);
        ctx.write_str(&escape_html(&escaped))?;
    }
    Ok(())
}

/// Close an `<img` tag after its `src` value: alt, title, attributes and the
/// void-element terminator.
pub(crate) fn finish_image_tag(
    ctx: &mut RenderContext<'_>,
    node: &Node,
    title: &str,
) -> io::Result<()> {
    ctx.write_str("\" alt=\"")?;
    ctx.write_escaped(&node.text())?;
    ctx.write_str("\"")?;
    if !title.is_empty() {
        ctx.write_str(" title=\"")?;
        ctx.write_escaped(title)?;
        ctx.write_str("\"")?;
    }
    write_attributes(ctx, node, IMAGE_ATTRIBUTES)?;
    let close = void_close(ctx);
    ctx.write_str(close)
}

/// First word of a fence info string.
pub(crate) fn code_language(info: Option<&str>) -> Option<&str> {
    info.and_then(|info| info.split_whitespace().next())
}

/// Write an unhighlighted `<pre><code>` block.
pub(crate) fn write_code_block(
    ctx: &mut RenderContext<'_>,
    language: Option<&str>,
    literal: &str,
) -> io::Result<()> {
    match language {
        Some(language) => {
            ctx.write_str("<pre><code class=\"language-")?;
            ctx.write_escaped(language)?;
            ctx.write_str("\">")?;
        }
        None => ctx.write_str("<pre><code>")?,
    }
    ctx.write_escaped(literal)?;
    ctx.write_str("</code></pre>\n")
}

fn void_close(ctx: &RenderContext<'_>) -> &'static str {
    if ctx.options().xhtml { " />" } else { ">" }
}

fn alignment_name(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

/// Renders every node kind to HTML.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHtmlHandler;

impl NodeHandler for DefaultHtmlHandler {
    fn kinds(&self) -> &[NodeKind] {
        NodeKind::ALL
    }

    #[allow(clippy::too_many_lines)]
    fn render<'a>(
        &self,
        ctx: &mut RenderContext<'a>,
        node: &'a Node,
        entering: bool,
    ) -> io::Result<WalkStatus> {
        match &node.value {
            NodeValue::Document => {}
            NodeValue::Paragraph => {
                ctx.write_str(if entering { "<p>" } else { "</p>\n" })?;
            }
            NodeValue::TextBlock => {
                if !entering && ctx.next_sibling().is_some() && !node.children.is_empty() {
                    ctx.write_str("\n")?;
                }
            }
            NodeValue::Heading { level } => {
                if entering {
                    ctx.write_str(&format!("<h{level}"))?;
                    write_attributes(ctx, node, &[])?;
                    ctx.write_str(">")?;
                } else {
                    ctx.write_str(&format!("</h{level}>\n"))?;
                }
            }
            NodeValue::BlockQuote => {
                ctx.write_str(if entering {
                    "<blockquote>\n"
                } else {
                    "</blockquote>\n"
                })?;
            }
            NodeValue::CodeBlock { info, literal } => {
                if entering {
                    write_code_block(ctx, code_language(info.as_deref()), literal)?;
                }
                return Ok(WalkStatus::SkipChildren);
            }
            NodeValue::HtmlBlock { literal } => {
                if entering {
                    if ctx.options().allow_unsafe {
                        ctx.write_str(literal)?;
                    } else {
                        ctx.write_str(RAW_HTML_OMITTED)?;
                        ctx.write_str("\n")?;
                    }
                }
                return Ok(WalkStatus::SkipChildren);
            }
            NodeValue::List { start } => {
                let tag = if start.is_some() { "ol" } else { "ul" };
                match start {
                    _ if !entering => ctx.write_str(&format!("</{tag}>\n"))?,
                    Some(n) if *n != 1 => ctx.write_str(&format!("<ol start=\"{n}\">\n"))?,
                    _ => ctx.write_str(&format!("<{tag}>\n"))?,
                }
            }
            NodeValue::ListItem => {
                if entering {
                    ctx.write_str("<li")?;
                    write_attributes(ctx, node, LIST_ITEM_ATTRIBUTES)?;
                    ctx.write_str(">")?;
                    if node
                        .first_child()
                        .is_some_and(|child| child.kind() != NodeKind::TextBlock)
                    {
                        ctx.write_str("\n")?;
                    }
                } else {
                    ctx.write_str("</li>\n")?;
                }
            }
            NodeValue::TaskCheckBox { checked } => {
                if entering {
                    ctx.write_str(if *checked {
                        "<input checked=\"\" disabled=\"\" type=\"checkbox\""
                    } else {
                        "<input disabled=\"\" type=\"checkbox\""
                    })?;
                    let close = void_close(ctx);
                    ctx.write_str(close)?;
                    ctx.write_str(" ")?;
                }
            }
            NodeValue::Table { .. } => {
                ctx.write_str(if entering { "<table>\n" } else { "</table>\n" })?;
            }
            NodeValue::TableHead => {
                ctx.write_str(if entering {
                    "<thead>\n<tr>\n"
                } else {
                    "</tr>\n</thead>\n"
                })?;
            }
            NodeValue::TableBody => {
                ctx.write_str(if entering { "<tbody>\n" } else { "</tbody>\n" })?;
            }
            NodeValue::TableRow => {
                ctx.write_str(if entering { "<tr>\n" } else { "</tr>\n" })?;
            }
            NodeValue::TableCell { header, alignment } => {
                let tag = if *header { "th" } else { "td" };
                if entering {
                    ctx.write_str("<")?;
                    ctx.write_str(tag)?;
                    if let Some(align) = alignment_name(*alignment) {
                        if ctx.options().xhtml {
                            ctx.write_str(&format!(" align=\"{align}\""))?;
                        } else {
                            ctx.write_str(&format!(" style=\"text-align:{align}\""))?;
                        }
                    }
                    ctx.write_str(">")?;
                } else {
                    ctx.write_str(&format!("</{tag}>\n"))?;
                }
            }
            NodeValue::ThematicBreak => {
                if entering {
                    ctx.write_str("<hr")?;
                    let close = void_close(ctx);
                    ctx.write_str(close)?;
                    ctx.write_str("\n")?;
                }
            }
            NodeValue::FootnoteList => {
                if entering {
                    ctx.write_str("<div class=\"footnotes\" role=\"doc-endnotes\">\n<hr")?;
                    let close = void_close(ctx);
                    ctx.write_str(close)?;
                    ctx.write_str("\n<ol>\n")?;
                } else {
                    ctx.write_str("</ol>\n</div>\n")?;
                }
            }
            NodeValue::FootnoteDefinition { index, .. } => {
                if entering {
                    ctx.write_str(&format!("<li id=\"fn:{index}\">\n"))?;
                } else {
                    ctx.write_str(&format!(
                        "<a href=\"#fnref:{index}\" class=\"footnote-backref\" role=\"doc-backlink\">&#x21a9;&#xfe0e;</a>\n</li>\n"
                    ))?;
                }
            }
            NodeValue::FootnoteReference { label, index } => {
                if entering {
                    match index {
                        Some(n) => ctx.write_str(&format!(
                            "<sup id=\"fnref:{n}\"><a href=\"#fn:{n}\" class=\"footnote-ref\" role=\"doc-noteref\">{n}</a></sup>"
                        ))?,
                        None => {
                            ctx.write_str("[^")?;
                            ctx.write_escaped(label)?;
                            ctx.write_str("]")?;
                        }
                    }
                }
            }
            NodeValue::DefinitionList => {
                ctx.write_str(if entering { "<dl>\n" } else { "</dl>\n" })?;
            }
            NodeValue::DefinitionTerm => {
                ctx.write_str(if entering { "<dt>" } else { "</dt>\n" })?;
            }
            NodeValue::DefinitionDetails => {
                ctx.write_str(if entering { "<dd>" } else { "</dd>\n" })?;
            }
            NodeValue::Metadata => return Ok(WalkStatus::SkipChildren),
            NodeValue::Emphasis => ctx.write_str(if entering { "<em>" } else { "</em>" })?,
            NodeValue::Strong => {
                ctx.write_str(if entering { "<strong>" } else { "</strong>" })?;
            }
            NodeValue::Strikethrough => {
                ctx.write_str(if entering { "<del>" } else { "</del>" })?;
            }
            NodeValue::Superscript => ctx.write_str(if entering { "<sup>" } else { "</sup>" })?,
            NodeValue::Subscript => ctx.write_str(if entering { "<sub>" } else { "</sub>" })?,
            NodeValue::Link { destination, title } => {
                if entering {
                    ctx.write_str("<a href=\"")?;
                    write_destination(ctx, destination)?;
                    ctx.write_str("\"")?;
                    if !title.is_empty() {
                        ctx.write_str(" title=\"")?;
                        ctx.write_escaped(title)?;
                        ctx.write_str("\"")?;
                    }
                    ctx.write_str(">")?;
                } else {
                    ctx.write_str("</a>")?;
                }
            }
            NodeValue::Image { destination, title } => {
                if entering {
                    ctx.write_str("<img src=\"")?;
                    write_destination(ctx, destination)?;
                    finish_image_tag(ctx, node, title)?;
                }
                return Ok(WalkStatus::SkipChildren);
            }
            NodeValue::CodeSpan { literal } => {
                if entering {
                    ctx.write_str("<code>")?;
                    ctx.write_escaped(literal)?;
                    ctx.write_str("</code>")?;
                }
            }
            NodeValue::Text { literal } => {
                if entering {
                    ctx.write_escaped(literal)?;
                }
            }
            NodeValue::RawHtml { literal } => {
                if entering {
                    if ctx.options().allow_unsafe {
                        ctx.write_str(literal)?;
                    } else {
                        ctx.write_str(RAW_HTML_OMITTED)?;
                    }
                }
            }
            NodeValue::SoftBreak => {
                if entering {
                    ctx.write_str("\n")?;
                }
            }
            NodeValue::HardBreak => {
                if entering {
                    ctx.write_str("<br")?;
                    let close = void_close(ctx);
                    ctx.write_str(close)?;
                    ctx.write_str("\n")?;
                }
            }
        }
        Ok(WalkStatus::Continue)
    }
}
