//! Markdown file to HTML page conversion.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdtohtml_config::{Config, RenderConfig};
use mdtohtml_renderer::{
    CodeBlockHandler, EXTENSION_PRIORITY, EmbedImageHandler, HighlightError, Highlighter,
    ParseOptions, RenderOptions, RenderOutcome, Renderer, RendererBuilder, TaskListItemHandler,
    highlight_css, may_exist,
};

use crate::prompt::OverwritePrompt;
use crate::template::Template;

/// Error converting a single file.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read '{}': {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to render '{}': {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write '{}': {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read stylesheet '{}': {source}", path.display())]
    ReadStylesheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Embedded asset missing: {0}")]
    MissingAsset(&'static str),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
}

/// Outcome of converting one file.
#[derive(Debug)]
pub enum ConvertStatus {
    /// The page was written.
    Written {
        path: PathBuf,
        /// Images that could not be embedded.
        warnings: Vec<String>,
    },
    /// The output existed and overwriting was declined.
    Skipped { path: PathBuf },
}

/// Build a renderer with the default handlers plus the interceptors enabled
/// in `config`.
#[must_use]
pub fn build_renderer(config: &RenderConfig) -> Renderer {
    let mut builder = RendererBuilder::new()
        .with_options(RenderOptions {
            allow_unsafe: config.allow_unsafe,
            xhtml: config.xhtml,
        })
        .with_parse_options(ParseOptions {
            gfm: config.gfm,
            heading_ids: config.heading_ids,
            linkify: config.linkify,
        })
        .with_default_handlers();
    if config.highlight || config.mermaid {
        let mut code_blocks = CodeBlockHandler::new();
        if config.highlight {
            code_blocks = code_blocks.with_highlighter(Highlighter::new());
        }
        if config.mermaid {
            code_blocks = code_blocks.with_mermaid(config.mermaid_script.clone());
        }
        builder = builder.with_handler(code_blocks, EXTENSION_PRIORITY);
    }
    if config.embed_images {
        builder = builder.with_handler(EmbedImageHandler, EXTENSION_PRIORITY);
    }
    if config.task_list_class {
        builder = builder.with_handler(TaskListItemHandler, EXTENSION_PRIORITY);
    }
    builder.build()
}

/// Converts markdown files into self-contained HTML pages.
pub struct Converter {
    renderer: Renderer,
    template: Template,
    extension: String,
    overwrite: bool,
}

impl Converter {
    /// Create a converter from loaded configuration.
    ///
    /// Reads `page.extra_css` once, if configured, and generates the highlight
    /// stylesheet when highlighting is enabled.
    pub fn from_config(config: &Config) -> Result<Self, ConvertError> {
        let extra_css = match &config.page_resolved.extra_css {
            Some(path) => Some(fs::read_to_string(path).map_err(|source| {
                ConvertError::ReadStylesheet {
                    path: path.clone(),
                    source,
                }
            })?),
            None => None,
        };
        let highlight_css = if config.render.highlight {
            Some(highlight_css(&config.render.highlight_theme)?)
        } else {
            None
        };

        Ok(Self {
            renderer: build_renderer(&config.render),
            template: Template::new(highlight_css.as_deref(), extra_css.as_deref())?,
            extension: config.output.extension.clone(),
            overwrite: config.output.overwrite,
        })
    }

    /// Output path for `source`: `<dir>/<stem>.<extension>`.
    #[must_use]
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let mut name = source.file_stem().map(OsString::from).unwrap_or_default();
        name.push(".");
        name.push(&self.extension);
        source.with_file_name(name)
    }

    /// Render a complete page into `out`, clearing it first.
    ///
    /// `title` is the unescaped page title; `base_dir` is where relative image
    /// paths resolve.
    pub fn render_page(
        &self,
        source: &str,
        title: &str,
        base_dir: &Path,
        out: &mut Vec<u8>,
    ) -> io::Result<RenderOutcome> {
        out.clear();
        self.template.write_head(out, title)?;
        let outcome = self.renderer.render_markdown(source, base_dir, out)?;
        self.template.write_foot(out)?;
        Ok(outcome)
    }

    /// Convert one file, reusing `buffer` for the page.
    ///
    /// An existing output is replaced only when overwriting is forced or
    /// `prompt` confirms it.
    pub fn convert_file(
        &self,
        path: &Path,
        prompt: &mut dyn OverwritePrompt,
        buffer: &mut Vec<u8>,
    ) -> Result<ConvertStatus, ConvertError> {
        let bytes = fs::read(path).map_err(|source| ConvertError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes);

        let output = self.output_path(path);
        if !self.overwrite && may_exist(&output) && !prompt.confirm_overwrite(&output) {
            tracing::info!(path = %output.display(), "Skipping existing file");
            return Ok(ConvertStatus::Skipped { path: output });
        }

        let title = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let base_dir = path.parent().unwrap_or(Path::new(""));
        let outcome = self
            .render_page(&source, &title, base_dir, buffer)
            .map_err(|source| ConvertError::Render {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = buffer.len(), "Rendered page");

        fs::write(&output, &buffer).map_err(|source| ConvertError::WriteOutput {
            path: output.clone(),
            source,
        })?;
        tracing::info!(path = %output.display(), "Wrote page");

        Ok(ConvertStatus::Written {
            path: output,
            warnings: outcome.warnings,
        })
    }

    /// Convert files in order, sharing one page buffer.
    ///
    /// Yields one result per input path; a failed file does not stop the rest.
    pub fn convert_all<'a, I>(
        &'a self,
        paths: I,
        prompt: &'a mut dyn OverwritePrompt,
    ) -> impl Iterator<Item = (PathBuf, Result<ConvertStatus, ConvertError>)> + 'a
    where
        I: IntoIterator<Item = PathBuf>,
        I::IntoIter: 'a,
    {
        let mut buffer = Vec::new();
        paths.into_iter().map(move |path| {
            let result = self.convert_file(&path, &mut *prompt, &mut buffer);
            (path, result)
        })
    }
}
