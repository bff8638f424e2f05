//! Bare URL and email detection in text.
//!
//! Recognises `http://`, `https://` and `ftp://` URLs, `www.` hosts and
//! email addresses in text nodes and turns them into [`NodeValue::Link`]s.
//! Text inside links and images is left alone.

use std::ops::Range;

use crate::ast::{Node, NodeKind, NodeValue};

const SCHEMES: [&str; 3] = ["https://", "http://", "ftp://"];

/// Characters dropped from the end of a candidate URL.
const TRAILING_PUNCTUATION: &[u8] = b"?!.,:;*_~'\"";

/// A link found in a text literal.
#[derive(Debug, PartialEq, Eq)]
struct Found {
    range: Range<usize>,
    destination: String,
}

/// Replace URLs in the text nodes under `node` with links.
pub(crate) fn linkify(node: &mut Node) {
    if matches!(node.kind(), NodeKind::Link | NodeKind::Image) {
        return;
    }
    let children = std::mem::take(&mut node.children);
    for mut child in children {
        if let NodeValue::Text { literal } = &child.value {
            let found = find_links(literal);
            if !found.is_empty() {
                split_text(literal, &child.span, &found, &mut node.children);
                continue;
            }
        } else {
            linkify(&mut child);
        }
        node.children.push(child);
    }
}

fn split_text(literal: &str, span: &Range<usize>, found: &[Found], out: &mut Vec<Node>) {
    let text = |s: &str| {
        Node::new(
            NodeValue::Text {
                literal: s.to_owned(),
            },
            span.clone(),
        )
    };
    let mut last = 0;
    for link in found {
        if link.range.start > last {
            out.push(text(&literal[last..link.range.start]));
        }
        let mut node = Node::new(
            NodeValue::Link {
                destination: link.destination.clone(),
                title: String::new(),
            },
            span.clone(),
        );
        node.children.push(text(&literal[link.range.clone()]));
        out.push(node);
        last = link.range.end;
    }
    if last < literal.len() {
        out.push(text(&literal[last..]));
    }
}

fn find_links(text: &str) -> Vec<Found> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if at_word_start(bytes, i)
            && let Some(link) = url_at(text, i).or_else(|| email_at(text, i))
        {
            i = link.range.end;
            found.push(link);
            continue;
        }
        i += 1;
    }
    found
}

fn at_word_start(bytes: &[u8], i: usize) -> bool {
    bytes[i].is_ascii_alphanumeric()
        && (i == 0
            || matches!(
                bytes[i - 1],
                b' ' | b'\t' | b'\n' | b'\r' | b'*' | b'_' | b'~' | b'(' | b'"' | b'\''
            ))
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &str) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn url_at(text: &str, start: usize) -> Option<Found> {
    let rest = &text.as_bytes()[start..];
    let (host_offset, www) = if let Some(scheme) = SCHEMES
        .iter()
        .find(|scheme| starts_with_ignore_case(rest, scheme))
    {
        (scheme.len(), false)
    } else if starts_with_ignore_case(rest, "www.") {
        (0, true)
    } else {
        return None;
    };

    let extent = rest
        .iter()
        .position(|&b| b.is_ascii_whitespace() || b == b'<')
        .unwrap_or(rest.len());
    let end = start + trim_trailing(&rest[..extent]);
    let host_start = start + host_offset;
    if end <= host_start {
        return None;
    }

    let url = &text[start..end];
    let host = text[host_start..end]
        .split(['/', '?', '#', ':'])
        .next()
        .unwrap_or_default();
    if !is_domain(host, if www { 2 } else { 1 }) {
        return None;
    }

    let destination = if www {
        format!("http://{url}")
    } else {
        url.to_owned()
    };
    Some(Found {
        range: start..end,
        destination,
    })
}

/// Length of `url` once trailing punctuation and unbalanced `)` are removed.
fn trim_trailing(url: &[u8]) -> usize {
    let mut end = url.len();
    while end > 0 {
        let last = url[end - 1];
        if TRAILING_PUNCTUATION.contains(&last) {
            end -= 1;
        } else if last == b')' {
            let opened = url[..end].iter().filter(|&&b| b == b'(').count();
            let closed = url[..end].iter().filter(|&&b| b == b')').count();
            if closed <= opened {
                break;
            }
            end -= 1;
        } else {
            break;
        }
    }
    end
}

/// Dot-separated labels of letters, digits, `-` and `_`.
fn is_domain(host: &str, min_labels: usize) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= min_labels
        && labels.iter().all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

fn email_at(text: &str, start: usize) -> Option<Found> {
    let rest = &text.as_bytes()[start..];
    let local = rest
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-' | b'_')))?;
    if local == 0 || rest[local] != b'@' {
        return None;
    }

    let domain = &rest[local + 1..];
    let mut len = domain
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_')))
        .unwrap_or(domain.len());
    while len > 0 && domain[len - 1] == b'.' {
        len -= 1;
    }
    if len == 0 || !domain[len - 1].is_ascii_alphanumeric() {
        return None;
    }

    let end = start + local + 1 + len;
    let host = &text[start + local + 1..end];
    if !is_domain(host, 2) {
        return None;
    }
    Some(Found {
        range: start..end,
        destination: format!("mailto:{}", &text[start..end]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    fn links(text: &str) -> Vec<(&str, String)> {
        find_links(text)
            .into_iter()
            .map(|found| (&text[found.range], found.destination))
            .collect()
    }

    #[test]
    fn test_scheme_urls() {
        assert_eq!(
            links("see https://example.com/path?q=1 and ftp://files.example.org"),
            vec![
                (
                    "https://example.com/path?q=1",
                    "https://example.com/path?q=1".to_owned()
                ),
                (
                    "ftp://files.example.org",
                    "ftp://files.example.org".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn test_www_gets_http_scheme() {
        assert_eq!(
            links("Visit www.example.com."),
            vec![("www.example.com", "http://www.example.com".to_owned())]
        );
    }

    #[test]
    fn test_trailing_punctuation_trimmed() {
        assert_eq!(
            links("Done: https://example.com/a!"),
            vec![("https://example.com/a", "https://example.com/a".to_owned())]
        );
    }

    #[test]
    fn test_balanced_parentheses_kept() {
        assert_eq!(
            links("(https://example.com/a_(b))"),
            vec![(
                "https://example.com/a_(b)",
                "https://example.com/a_(b)".to_owned()
            )]
        );
    }

    #[test]
    fn test_email() {
        assert_eq!(
            links("mail jane.doe+x@example.org."),
            vec![(
                "jane.doe+x@example.org",
                "mailto:jane.doe+x@example.org".to_owned()
            )]
        );
    }

    #[test]
    fn test_incomplete_candidates_ignored() {
        assert!(links("http:// and www. and a@b and user@").is_empty());
    }

    #[test]
    fn test_mid_word_not_linked() {
        assert!(links("xhttps://example.com").is_empty());
    }

    #[test]
    fn test_port_and_fragment() {
        assert_eq!(
            links("http://localhost:8080/#top"),
            vec![(
                "http://localhost:8080/#top",
                "http://localhost:8080/#top".to_owned()
            )]
        );
    }

    #[test]
    fn test_text_split_around_link() {
        let doc = parse("Go to https://example.com now", &ParseOptions::default());
        let paragraph = &doc.children[0];
        assert_eq!(
            paragraph.children.iter().map(Node::kind).collect::<Vec<_>>(),
            vec![NodeKind::Text, NodeKind::Link, NodeKind::Text]
        );
        assert_eq!(paragraph.children[1].text(), "https://example.com");
        assert_eq!(paragraph.text(), "Go to https://example.com now");
    }

    #[test]
    fn test_existing_links_and_code_untouched() {
        let doc = parse(
            "[https://a.com](https://b.com) `https://c.com`",
            &ParseOptions::default(),
        );
        let paragraph = &doc.children[0];
        assert_eq!(
            paragraph.children.iter().map(Node::kind).collect::<Vec<_>>(),
            vec![NodeKind::Link, NodeKind::Text, NodeKind::CodeSpan]
        );
        assert_eq!(paragraph.children[0].children.len(), 1);
    }

    #[test]
    fn test_disabled() {
        let options = ParseOptions {
            linkify: false,
            ..ParseOptions::default()
        };
        let doc = parse("https://example.com", &options);
        assert_eq!(doc.children[0].children[0].kind(), NodeKind::Text);
    }
}
