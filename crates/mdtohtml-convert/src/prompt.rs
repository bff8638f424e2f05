//! Overwrite confirmation.

use std::path::Path;

/// Asks whether an existing output file may be replaced.
pub trait OverwritePrompt {
    /// Return `true` to overwrite `path`, `false` to skip it.
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Overwrites every existing file without asking.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysOverwrite;

impl OverwritePrompt for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Skips every existing file.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverOverwrite;

impl OverwritePrompt for NeverOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        false
    }
}

/// Whether a typed answer confirms: `y` or `yes`, case-insensitive.
///
/// # Examples
///
/// ```
/// use mdtohtml_convert::is_affirmative;
///
/// assert!(is_affirmative("Y\n"));
/// assert!(!is_affirmative(""));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "Y", "yes", "YES", "Yes", " y \n"] {
            assert!(is_affirmative(answer), "{answer:?} should confirm");
        }
    }

    #[test]
    fn test_other_answers_skip() {
        for answer in ["", "\n", "n", "no", "N", "yep", "ye", "sure", "y y"] {
            assert!(!is_affirmative(answer), "{answer:?} should skip");
        }
    }

    #[test]
    fn test_fixed_prompts() {
        let path = Path::new("out.html");
        assert!(AlwaysOverwrite.confirm_overwrite(path));
        assert!(!NeverOverwrite.confirm_overwrite(path));
    }
}
