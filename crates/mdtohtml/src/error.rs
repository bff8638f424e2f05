//! CLI error types.

use mdtohtml_config::ConfigError;
use mdtohtml_convert::ConvertError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{failed} of {total} files failed")]
    FilesFailed { failed: usize, total: usize },
}
