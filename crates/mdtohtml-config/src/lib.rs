//! Configuration management for mdtohtml.
//!
//! Parses `mdtohtml.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! `page.extra_css` supports environment variable and home directory
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - `~/` - expands to the home directory
//!
//! Relative paths resolve against the config file's directory.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Overwrite existing output files without asking.
    pub overwrite: Option<bool>,
    /// Disable raw HTML passthrough and dangerous URLs.
    pub safe: Option<bool>,
    /// Emit HTML5 void tags instead of XHTML.
    pub html5: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdtohtml.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown rendering configuration.
    pub render: RenderConfig,
    /// Output file configuration.
    pub output: OutputConfig,
    /// Page template configuration (paths are strings from TOML).
    page: PageConfigRaw,

    /// Resolved page configuration (set after loading).
    #[serde(skip)]
    pub page_resolved: PageConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Pass raw HTML through and keep dangerous URLs.
    #[serde(rename = "unsafe")]
    pub allow_unsafe: bool,
    /// Close void elements XHTML-style.
    pub xhtml: bool,
    /// Tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    /// Generate heading ids.
    pub heading_ids: bool,
    /// Inline local images as data URIs.
    pub embed_images: bool,
    /// Mark task list items with `class="task-list-item"`.
    pub task_list_class: bool,
    /// Turn bare URLs and email addresses into links.
    pub linkify: bool,
    /// Syntax-highlight fenced code blocks.
    pub highlight: bool,
    /// Built-in highlight theme the stylesheet is generated from.
    pub highlight_theme: String,
    /// Render `mermaid` code blocks as diagrams.
    pub mermaid: bool,
    /// URL of the Mermaid script added to pages with diagrams.
    pub mermaid_script: String,
}

/// Default highlight theme.
const DEFAULT_HIGHLIGHT_THEME: &str = "InspiredGitHub";

/// Default Mermaid script location.
const DEFAULT_MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            allow_unsafe: true,
            xhtml: true,
            gfm: true,
            heading_ids: true,
            embed_images: true,
            task_list_class: true,
            linkify: true,
            highlight: true,
            highlight_theme: DEFAULT_HIGHLIGHT_THEME.to_owned(),
            mermaid: true,
            mermaid_script: DEFAULT_MERMAID_SCRIPT.to_owned(),
        }
    }
}

/// Output file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Overwrite existing files without asking.
    pub overwrite: bool,
    /// Extension of generated files, without the dot.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            extension: "html".to_owned(),
        }
    }
}

/// Raw page configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PageConfigRaw {
    extra_css: Option<String>,
}

/// Resolved page configuration with absolute paths.
#[derive(Debug, Default)]
pub struct PageConfig {
    /// Stylesheet appended after the built-in styles.
    pub extra_css: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`page.extra_css`").
        field: String,
        /// Error message (e.g., "${`STYLE_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdtohtml.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(overwrite) = settings.overwrite {
            self.output.overwrite = overwrite;
        }
        if let Some(safe) = settings.safe {
            self.render.allow_unsafe = !safe;
        }
        if let Some(html5) = settings.html5 {
            self.render.xhtml = !html5;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        discover_from(&std::env::current_dir().ok()?)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extension = &self.output.extension;
        if extension.is_empty() {
            return Err(ConfigError::Validation(
                "output.extension cannot be empty".to_owned(),
            ));
        }
        if extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "output.extension must be a bare extension without dots or separators, got '{extension}'"
            )));
        }
        if self.render.highlight && self.render.highlight_theme.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.highlight_theme cannot be empty when highlighting is enabled".to_owned(),
            ));
        }
        if self.render.mermaid && self.render.mermaid_script.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.mermaid_script cannot be empty when mermaid is enabled".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand and resolve `page.extra_css` against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let extra_css = match &self.page.extra_css {
            Some(raw) => Some(config_dir.join(expand::expand_path(raw, "page.extra_css")?)),
            None => None,
        };
        self.page_resolved = PageConfig { extra_css };
        Ok(())
    }
}

/// Walk from `start` up through its parents looking for the config file.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
