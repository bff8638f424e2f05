//! Static parts of generated pages.
//!
//! Stylesheets and the trailing script are compiled into the binary via
//! `rust-embed` from the crate's `assets/` directory.

use std::borrow::Cow;

#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
struct Assets;

/// GitHub-flavoured markdown stylesheet.
pub const MARKDOWN_CSS: &str = "markdown.css";

/// Page layout, anchor link and copy button styles.
pub const PAGE_CSS: &str = "page.css";

/// Script adding heading anchor links and copy-to-clipboard buttons.
pub const PAGE_SCRIPT: &str = "page.js";

/// Get an asset's bytes by file name.
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get an asset as text. Returns `None` for missing or non-UTF-8 assets.
pub fn text(path: &str) -> Option<Cow<'static, str>> {
    match get(path)? {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
    }
}

/// Iterate all asset names.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_page_assets_present() {
        for name in [MARKDOWN_CSS, PAGE_CSS, PAGE_SCRIPT] {
            let content = text(name).unwrap();
            assert!(!content.trim().is_empty(), "{name} is empty");
        }
    }

    #[test]
    fn test_page_css_styles_body_and_buttons() {
        let css = text(PAGE_CSS).unwrap();
        assert!(css.contains(".markdown-body"));
        assert!(css.contains(".copy-button"));
        assert!(css.contains(".anchor-link"));
    }

    #[test]
    fn test_markdown_css_styles_task_items() {
        assert!(text(MARKDOWN_CSS).unwrap().contains(".task-list-item"));
    }

    #[test]
    fn test_script_has_no_closing_script_tag() {
        assert!(!text(PAGE_SCRIPT).unwrap().contains("</script"));
    }

    #[test]
    fn test_iter_lists_assets() {
        let mut names: Vec<_> = iter().map(Cow::into_owned).collect();
        names.sort();
        assert_eq!(names, vec!["markdown.css", "page.css", "page.js"]);
    }

    #[test]
    fn test_get_nonexistent_asset() {
        assert!(get("nonexistent_file_that_does_not_exist.txt").is_none());
    }
}
