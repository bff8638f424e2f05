//! Class-based syntax highlighting with `syntect`.
//!
//! Highlighted code carries `hl-`-prefixed scope classes; the matching
//! stylesheet comes from [`highlight_css`] so pages stay self-contained.

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Scope class naming shared by markup and stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Built-in theme closest to GitHub's code colours.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Error producing the highlight stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Unknown highlight theme '{0}'")]
    UnknownTheme(String),
    #[error("Failed to generate highlight stylesheet: {0}")]
    Stylesheet(#[from] syntect::Error),
}

/// Highlights code using the bundled syntax definitions.
#[derive(Debug)]
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight `code` as `language` (a name or file extension).
    ///
    /// Returns `None` for unknown languages so the caller can fall back to
    /// plain output.
    #[must_use]
    pub fn highlight(&self, code: &str, language: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!(language, error = %e, "Highlighting failed");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

/// Stylesheet for highlighted code using the built-in `theme`.
pub fn highlight_css(theme: &str) -> Result<String, HighlightError> {
    let themes = ThemeSet::load_defaults();
    let theme = themes
        .themes
        .get(theme)
        .ok_or_else(|| HighlightError::UnknownTheme(theme.to_owned()))?;
    Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
}
