//! HTML and URL escaping, plus the dangerous-URL check.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes that may stay unescaped in a link or image destination.
///
/// `%` is handled separately: it is kept when it already starts a valid
/// escape sequence and encoded otherwise.
const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

/// Escape HTML special characters (`&`, `<`, `>`, `"`).
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'"')) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Percent-encode characters that are not safe in a URL.
///
/// Existing `%XX` sequences are preserved so already-encoded destinations
/// are not double-encoded.
///
/// # Examples
///
/// ```
/// use mdtohtml_renderer::escape_url;
///
/// assert_eq!(escape_url("my image.png"), "my%20image.png");
/// assert_eq!(escape_url("a%20b"), "a%20b");
/// assert_eq!(escape_url("100%"), "100%25");
/// ```
pub fn escape_url(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.extend(utf8_percent_encode(&url[start..i], URL_ESCAPE));
            out.push_str(&url[i..i + 3]);
            i += 3;
            start = i;
        } else {
            i += 1;
        }
    }
    out.extend(utf8_percent_encode(&url[start..], URL_ESCAPE));
    out
}

/// Whether a destination uses a scheme that can run script.
///
/// `javascript:`, `vbscript:`, `file:` and `data:` are dangerous, except
/// `data:` URIs carrying PNG, GIF, JPEG, WebP or SVG images. Matching is
/// case-insensitive.
pub fn is_dangerous_url(url: &str) -> bool {
    const SAFE_DATA_IMAGES: [&str; 5] = ["png;", "gif;", "jpeg;", "webp;", "svg+xml;"];

    if let Some(rest) = strip_prefix_ignore_case(url, "data:image/") {
        return !SAFE_DATA_IMAGES
            .iter()
            .any(|kind| strip_prefix_ignore_case(rest, kind).is_some());
    }
    ["javascript:", "vbscript:", "file:", "data:"]
        .iter()
        .any(|scheme| strip_prefix_ignore_case(url, scheme).is_some())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    #[test]
    fn test_escape_html_special_characters() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("\"hello\""), "&quot;hello&quot;");
    }

    #[test]
    fn test_escape_html_borrows_when_clean() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_url_keeps_reserved() {
        assert_eq!(
            escape_url("https://example.com/x.png?a=1&b=2#top"),
            "https://example.com/x.png?a=1&b=2#top"
        );
    }

    #[test]
    fn test_escape_url_encodes_space_and_unicode() {
        assert_eq!(escape_url("dir/ä b.png"), "dir/%C3%A4%20b.png");
    }

    #[test]
    fn test_escape_url_encodes_brackets_and_quotes() {
        assert_eq!(escape_url("a[1]\"<b>"), "a%5B1%5D%22%3Cb%3E");
    }

    #[test]
    fn test_escape_url_preserves_valid_percent_sequences() {
        assert_eq!(escape_url("a%2Fb"), "a%2Fb");
        assert_eq!(escape_url("%zz"), "%25zz");
        assert_eq!(escape_url("50%"), "50%25");
    }

    #[test]
    fn test_escape_url_round_trip() {
        for input in [
            "https://example.com/x.png",
            "images/my photo.png",
            "ünïcödé/päth.jpg",
            "a b[c]{d}|e^f`g<h>\"i\\j",
            "",
        ] {
            let escaped = escape_url(input);
            let decoded = percent_decode_str(&escaped).decode_utf8().unwrap();
            assert_eq!(decoded, input);
        }
    }

    #[test]
    fn test_dangerous_urls() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url("JavaScript:alert(1)"));
        assert!(is_dangerous_url("vbscript:msgbox"));
        assert!(is_dangerous_url("file:///etc/passwd"));
        assert!(is_dangerous_url("data:text/html;base64,PHNjcmlwdD4="));
        assert!(is_dangerous_url("data:image/bmp;base64,AAAA"));
    }

    #[test]
    fn test_safe_urls() {
        assert!(!is_dangerous_url("https://example.com/x.png"));
        assert!(!is_dangerous_url("./diagram.png"));
        assert!(!is_dangerous_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_dangerous_url("DATA:IMAGE/JPEG;base64,/9j/"));
        assert!(!is_dangerous_url("data:image/svg+xml;utf8,<svg/>"));
        assert!(!is_dangerous_url(""));
    }

    #[test]
    fn test_strip_prefix_ignore_case_non_ascii_boundary() {
        assert_eq!(strip_prefix_ignore_case("ä", "a"), None);
    }
}
