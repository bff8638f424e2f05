//! Interactive overwrite confirmation on the terminal.

use std::path::Path;

use console::Term;
use mdtohtml_convert::{OverwritePrompt, is_affirmative};

/// Asks on stderr and reads the answer from the terminal.
///
/// A failed read counts as "no".
pub(crate) struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl OverwritePrompt for TerminalPrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        let question = format!("'{}' already exists. Overwrite? (y/N): ", path.display());
        if self.term.write_str(&question).is_err() {
            return false;
        }
        match self.term.read_line() {
            Ok(answer) => is_affirmative(&answer),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read overwrite answer");
                false
            }
        }
    }
}
