//! Handler-based markdown to HTML renderer.
//!
//! Markdown is parsed with `pulldown-cmark` into an owned [`Node`] tree, which
//! a [`Renderer`] walks depth-first. Each node kind is rendered by exactly one
//! [`NodeHandler`], resolved by priority when the renderer is built.
//!
//! # Architecture
//!
//! - [`DefaultHtmlHandler`]: renders every node kind to plain HTML
//! - [`EmbedImageHandler`]: inlines local images as base64 data URIs
//! - [`TaskListItemHandler`]: marks task list items with `class="task-list-item"`
//! - [`CodeBlockHandler`]: highlights fenced code and renders Mermaid diagrams
//!
//! Bare URLs are turned into links while parsing (see [`ParseOptions::linkify`]).
//!
//! Handlers registered with a lower priority number override the default
//! handler for the kinds they cover.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use mdtohtml_renderer::{RenderOptions, RendererBuilder};
//!
//! let renderer = RendererBuilder::new()
//!     .with_options(RenderOptions { allow_unsafe: false, xhtml: true })
//!     .with_default_handlers()
//!     .build();
//!
//! let mut out = Vec::new();
//! renderer
//!     .render_markdown("# Hello\n\n**Bold** text", Path::new("."), &mut out)
//!     .unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "<h1 id=\"hello\">Hello</h1>\n<p><strong>Bold</strong> text</p>\n"
//! );
//! ```

mod ast;
mod codeblock;
mod embed;
mod escape;
mod highlight;
mod html;
mod linkify;
mod renderer;
pub mod sniff;
mod tasklist;
mod util;

pub use ast::{Attributes, Node, NodeKind, NodeValue, ParseOptions, parse};
pub use codeblock::{CodeBlockHandler, MERMAID_SCRIPT_URL};
pub use embed::EmbedImageHandler;
pub use escape::{escape_html, escape_url, is_dangerous_url};
pub use highlight::{DEFAULT_THEME, HighlightError, Highlighter, highlight_css};
pub use html::DefaultHtmlHandler;
pub use renderer::{
    DEFAULT_PRIORITY, EXTENSION_PRIORITY, NodeHandler, RenderContext, RenderOptions,
    RenderOutcome, Renderer, RendererBuilder, WalkStatus,
};
pub use sniff::detect_content_type;
pub use tasklist::{TaskListItemHandler, is_task_item};
pub use util::{may_exist, slugify};
