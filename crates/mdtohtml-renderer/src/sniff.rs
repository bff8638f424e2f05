//! Content type detection from leading bytes.
//!
//! Implements the WHATWG MIME sniffing signature table: HTML and XML
//! markers, document, image, audio/video, font and archive magic numbers,
//! then a plain-text heuristic. Only the first 512 bytes are considered.

/// Maximum number of bytes inspected.
const SNIFF_LEN: usize = 512;

/// Fallback for content that matches no signature and is not text.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";

enum Signature {
    /// Case-insensitive HTML tag prefix followed by a space or `>`.
    Html(&'static [u8]),
    /// Byte pattern compared after applying a mask.
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_whitespace: bool,
        content_type: &'static str,
    },
    /// Exact byte prefix.
    Exact(&'static [u8], &'static str),
    /// ISO base media file with an `mp4` brand.
    Mp4,
    /// No binary control bytes.
    Text,
}

const RIFF_MASK: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];

const EOT_MASK: &[u8] = &[
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0xFF, 0xFF,
];
const EOT_PATTERN: &[u8] = &[
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, b'L', b'P',
];

const SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
        pattern: b"<?xml",
        skip_whitespace: true,
        content_type: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    // Byte order marks
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0x00, 0x00],
        pattern: &[0xFE, 0xFF, 0x00, 0x00],
        skip_whitespace: false,
        content_type: "text/plain; charset=utf-16be",
    },
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0x00, 0x00],
        pattern: &[0xFF, 0xFE, 0x00, 0x00],
        skip_whitespace: false,
        content_type: "text/plain; charset=utf-16le",
    },
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0xFF, 0x00],
        pattern: &[0xEF, 0xBB, 0xBF, 0x00],
        skip_whitespace: false,
        content_type: TEXT_PLAIN_UTF8,
    },
    // Images
    Signature::Exact(&[0x00, 0x00, 0x01, 0x00], "image/x-icon"),
    Signature::Exact(&[0x00, 0x00, 0x02, 0x00], "image/x-icon"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    Signature::Masked {
        mask: &[
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ],
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_whitespace: false,
        content_type: "image/webp",
    },
    // Audio and video
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_whitespace: false,
        content_type: "audio/aiff",
    },
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0xFF],
        pattern: b"ID3",
        skip_whitespace: false,
        content_type: "audio/mpeg",
    },
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
        pattern: b"OggS\x00",
        skip_whitespace: false,
        content_type: "application/ogg",
    },
    Signature::Masked {
        mask: &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
        pattern: b"MThd\x00\x00\x00\x06",
        skip_whitespace: false,
        content_type: "audio/midi",
    },
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_whitespace: false,
        content_type: "video/avi",
    },
    Signature::Masked {
        mask: RIFF_MASK,
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_whitespace: false,
        content_type: "audio/wave",
    },
    Signature::Mp4,
    Signature::Exact(&[0x1A, 0x45, 0xDF, 0xA3], "video/webm"),
    // Fonts
    Signature::Masked {
        mask: EOT_MASK,
        pattern: EOT_PATTERN,
        skip_whitespace: false,
        content_type: "application/vnd.ms-fontobject",
    },
    Signature::Exact(&[0x00, 0x01, 0x00, 0x00], "font/ttf"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"ttcf", "font/collection"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    // Archives
    Signature::Exact(&[0x1F, 0x8B, 0x08], "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(&[0x00, 0x61, 0x73, 0x6D], "application/wasm"),
    Signature::Text,
];

impl Signature {
    fn matches(&self, data: &[u8], first_non_ws: usize) -> Option<&'static str> {
        match self {
            Self::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let same = tag.iter().zip(data).all(|(&t, &d)| {
                    let d = if t.is_ascii_uppercase() { d & 0xDF } else { d };
                    t == d
                });
                (same && matches!(data[tag.len()], b' ' | b'>')).then_some(TEXT_HTML_UTF8)
            }
            Self::Masked {
                mask,
                pattern,
                skip_whitespace,
                content_type,
            } => {
                let data = if *skip_whitespace {
                    &data[first_non_ws..]
                } else {
                    data
                };
                if pattern.len() != mask.len() || data.len() < pattern.len() {
                    return None;
                }
                pattern
                    .iter()
                    .zip(mask.iter())
                    .zip(data)
                    .all(|((&p, &m), &d)| d & m == p)
                    .then_some(*content_type)
            }
            Self::Exact(sig, content_type) => data.starts_with(sig).then_some(*content_type),
            Self::Mp4 => is_mp4(data).then_some("video/mp4"),
            Self::Text => data[first_non_ws..]
                .iter()
                .all(|&b| !is_binary_byte(b))
                .then_some(TEXT_PLAIN_UTF8),
        }
    }
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    // Offset 12 holds the major brand version, not a brand.
    (8..box_size)
        .step_by(4)
        .filter(|&start| start != 12)
        .any(|start| &data[start..start + 3] == b"mp4")
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Determine the media type of `data` from its leading bytes.
///
/// Never fails: content matching no signature is `text/plain; charset=utf-8`
/// when it contains no binary control bytes (this includes empty input) and
/// [`OCTET_STREAM`] otherwise.
///
/// # Examples
///
/// ```
/// use mdtohtml_renderer::detect_content_type;
///
/// assert_eq!(detect_content_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "image/png");
/// assert_eq!(detect_content_type(b"GIF89a..."), "image/gif");
/// assert_eq!(detect_content_type(&[0x00, 0xFF, 0x10]), "application/octet-stream");
/// ```
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(data.len());
    SIGNATURES
        .iter()
        .find_map(|signature| signature.matches(data, first_non_ws))
        .unwrap_or(OCTET_STREAM)
}
