//! HTML page wrapped around the rendered markdown.
//!
//! The page inlines every stylesheet and the script so the output file has
//! no external references.

use std::borrow::Cow;
use std::io::{self, Write};

use mdtohtml_assets::{MARKDOWN_CSS, PAGE_CSS, PAGE_SCRIPT};
use mdtohtml_renderer::escape_html;

use crate::converter::ConvertError;

/// Preassembled page head styles and trailing script.
pub(crate) struct Template {
    styles: String,
    script: Cow<'static, str>,
}

impl Template {
    /// Load the embedded assets.
    ///
    /// Styles are ordered markdown, `highlight_css`, page, then `extra_css`.
    pub(crate) fn new(
        highlight_css: Option<&str>,
        extra_css: Option<&str>,
    ) -> Result<Self, ConvertError> {
        let mut styles = asset(MARKDOWN_CSS)?.into_owned();
        if let Some(css) = highlight_css {
            styles.push_str(css);
        }
        styles.push_str(&asset(PAGE_CSS)?);
        if let Some(css) = extra_css {
            styles.push_str(css);
        }
        Ok(Self {
            styles,
            script: asset(PAGE_SCRIPT)?,
        })
    }

    /// Write everything up to the opening content container.
    pub(crate) fn write_head(&self, out: &mut dyn Write, title: &str) -> io::Result<()> {
        out.write_all(b"<!DOCTYPE html>\n<html>\n<head>\n")?;
        out.write_all(
            b"\t<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\"/>\n",
        )?;
        out.write_all(
            b"\t<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        )?;
        write!(out, "\t<title>{}</title>\n\t<style>\n", escape_html(title))?;
        out.write_all(self.styles.as_bytes())?;
        out.write_all(b"\t</style>\n</head>\n<body>\n\t<div class=\"markdown-body\">\n")
    }

    /// Close the content container and append the script.
    pub(crate) fn write_foot(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(b"\t</div>\n\t<script>\n")?;
        out.write_all(self.script.as_bytes())?;
        out.write_all(b"\t</script>\n</body>\n</html>\n")
    }
}

fn asset(name: &'static str) -> Result<Cow<'static, str>, ConvertError> {
    mdtohtml_assets::text(name).ok_or(ConvertError::MissingAsset(name))
}
