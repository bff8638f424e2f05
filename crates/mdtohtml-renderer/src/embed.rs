//! Image handler that inlines local files as base64 data URIs.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::write::EncoderWriter;

use crate::ast::{Node, NodeKind, NodeValue};
use crate::escape::{escape_html, escape_url, is_dangerous_url};
use crate::html::finish_image_tag;
use crate::renderer::{NodeHandler, RenderContext, WalkStatus};
use crate::sniff::detect_content_type;
use crate::util::may_exist;

const SVG: &str = "image/svg+xml";

/// Renders images, embedding destinations that resolve to local files.
///
/// The destination is resolved against [`RenderContext::base_dir`]. A file
/// that exists is written as `data:<type>;base64,<payload>` with the type
/// sniffed from its content and the payload unpadded. Anything else (remote
/// URLs, missing files) keeps its URL- and HTML-escaped destination.
///
/// A file that exists but cannot be read leaves `src=""` and records a
/// warning; rendering continues.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbedImageHandler;

impl NodeHandler for EmbedImageHandler {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::Image]
    }

    fn render<'a>(
        &self,
        ctx: &mut RenderContext<'a>,
        node: &'a Node,
        entering: bool,
    ) -> io::Result<WalkStatus> {
        let NodeValue::Image { destination, title } = &node.value else {
            return Ok(WalkStatus::Continue);
        };
        if !entering {
            return Ok(WalkStatus::SkipChildren);
        }

        ctx.write_str("<img src=\"")?;
        if ctx.options().allow_unsafe || !is_dangerous_url(destination) {
            let path = ctx.base_dir().join(destination);
            if !destination.is_empty() && may_exist(&path) {
                embed_file(ctx, node, &path)?;
            } else {
                let escaped = escape_url(destination);
                ctx.write_str(&escape_html(&escaped))?;
            }
        }
        finish_image_tag(ctx, node, title)?;
        Ok(WalkStatus::SkipChildren)
    }
}

fn embed_file(ctx: &mut RenderContext<'_>, node: &Node, path: &Path) -> io::Result<()> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to embed image");
            ctx.warn(
                node,
                &format!("failed to embed image '{}': {e}", path.display()),
            );
            return Ok(());
        }
    };

    ctx.write_str("data:")?;
    ctx.write_str(content_type(&bytes, path))?;
    ctx.write_str(";base64,")?;
    let mut encoder = EncoderWriter::new(ctx.writer(), &STANDARD_NO_PAD);
    encoder.write_all(&bytes)?;
    encoder.finish()?;
    Ok(())
}

/// Sniffed MIME type, with SVG recognised by extension since its content
/// sniffs as text.
fn content_type(bytes: &[u8], path: &Path) -> &'static str {
    let sniffed = detect_content_type(bytes);
    if sniffed.starts_with("text/")
        && mime_guess::from_path(path)
            .first_raw()
            .is_some_and(|guess| guess == SVG)
    {
        return SVG;
    }
    sniffed
}
