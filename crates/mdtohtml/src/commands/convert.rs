//! Markdown to HTML conversion command.

use std::path::PathBuf;

use clap::Args;
use mdtohtml_config::{CliSettings, Config};
use mdtohtml_convert::{ConvertStatus, Converter};

use crate::error::CliError;
use crate::output::Output;
use crate::prompt::TerminalPrompt;

/// Arguments for converting markdown files.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Don't ask, overwrite all files.
    #[arg(short = 'y', long)]
    overwrite: bool,

    /// Omit raw HTML and dangerous URLs.
    #[arg(long)]
    safe: bool,

    /// Emit HTML5 void tags (`<br>`) instead of XHTML (`<br />`).
    #[arg(long)]
    html5: bool,

    /// Path to configuration file (default: auto-discover mdtohtml.toml).
    #[arg(short, long, env = "MDTOHTML_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Markdown files to convert.
    files: Vec<PathBuf>,
}

impl ConvertArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            overwrite: self.overwrite.then_some(true),
            safe: self.safe.then_some(true),
            html5: self.html5.then_some(true),
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let converter = Converter::from_config(&config)?;
        let mut prompt = TerminalPrompt::new();
        let total = self.files.len();
        let mut failed = 0;

        for (path, result) in converter.convert_all(self.files, &mut prompt) {
            match result {
                Ok(ConvertStatus::Written { path, warnings }) => {
                    output.info(&format!("Writing '{}'", path.display()));
                    for warning in warnings {
                        output.warning(&format!("  {warning}"));
                    }
                }
                Ok(ConvertStatus::Skipped { path }) => {
                    output.warning(&format!("Skipped '{}'", path.display()));
                }
                Err(err) => {
                    failed += 1;
                    output.error(&format!("ERROR '{}': {err}", path.display()));
                }
            }
        }

        if failed > 0 {
            return Err(CliError::FilesFailed { failed, total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn parse(args: &[&str]) -> ConvertArgs {
        TestCli::try_parse_from(std::iter::once("mdtohtml").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_parse_files_and_flags() {
        let args = parse(&["-y", "--safe", "a.md", "b.md"]);
        assert!(args.overwrite);
        assert!(args.safe);
        assert!(!args.html5);
        assert_eq!(args.files, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let settings = parse(&["a.md"]).cli_settings();
        assert_eq!(settings.overwrite, None);
        assert_eq!(settings.safe, None);
        assert_eq!(settings.html5, None);
    }

    #[test]
    fn test_flags_map_to_settings() {
        let settings = parse(&["--overwrite", "--html5", "a.md"]).cli_settings();
        assert_eq!(settings.overwrite, Some(true));
        assert_eq!(settings.safe, None);
        assert_eq!(settings.html5, Some(true));
    }

    #[test]
    fn test_config_and_verbose() {
        let args = parse(&["-c", "custom.toml", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert!(args.verbose);
        assert!(args.files.is_empty());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(TestCli::try_parse_from(["mdtohtml", "--bogus"]).is_err());
    }
}
