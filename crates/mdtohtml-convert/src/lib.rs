//! Conversion of markdown files into self-contained HTML pages.
//!
//! A [`Converter`] renders each file with image embedding and task list
//! classes enabled, wraps the fragment in a styled page and writes it next to
//! the source as `<stem>.html`. Existing files are only replaced when
//! overwriting is forced or an [`OverwritePrompt`] confirms it.

mod converter;
mod prompt;
mod template;

pub use converter::{ConvertError, ConvertStatus, Converter, build_renderer};
pub use prompt::{AlwaysOverwrite, NeverOverwrite, OverwritePrompt, is_affirmative};
