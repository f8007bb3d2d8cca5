use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::Regex;

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode a page from disk into UTF-8 using: BOM -> meta charset -> chardetng fallback.
///
/// Decoding is lossy; callers decide whether `had_errors` is worth a warning.
pub fn decode_html(bytes: &[u8]) -> DecodedHtml {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(enc) = sniff_meta_charset(bytes).and_then(|l| Encoding::for_label(l.as_bytes())) {
        // A UTF-16 label in an ASCII-compatible meta tag cannot be right.
        let enc = if enc == UTF_16LE || enc == UTF_16BE {
            UTF_8
        } else {
            enc
        };
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let end = tag.find('>').unwrap_or(tag.len());
        let tag = &tag[..end];
        if let Some(pos) = tag.find("charset=") {
            let value = tag[pos + "charset=".len()..].trim_start_matches(&['"', '\'', ' '][..]);
            let label: String = value
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest[start + end..];
    }
    None
}

/// Points every `<meta>` charset declaration at UTF-8, the encoding outputs are written in.
pub fn declare_utf8(html: &str) -> String {
    static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)(<meta\b[^>]*?charset\s*=\s*["']?)[A-Za-z0-9_:.\-]+"#)
            .expect("valid meta charset regex")
    });
    META_CHARSET.replace_all(html, "${1}utf-8").into_owned()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedHtml {
    let (text, had_errors) = enc.decode_without_bom_handling(bytes);
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_wins_and_is_stripped() {
        let bytes = b"\xEF\xBB\xBF<p>caf\xC3\xA9</p>";
        let decoded = decode_html(bytes);
        assert_eq!(decoded.encoding_label, "UTF-8");
        assert_eq!(decoded.html, "<p>café</p>");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn meta_charset_is_honored() {
        let bytes = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xE9</body></html>";
        let decoded = decode_html(bytes);
        assert_eq!(decoded.encoding_label, "windows-1252");
        assert!(decoded.html.contains("café"));
    }

    #[test]
    fn http_equiv_content_type_is_honored() {
        let bytes = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\"><p>\xE9</p>";
        let decoded = decode_html(bytes);
        assert_eq!(decoded.encoding_label, "windows-1252");
        assert!(decoded.html.contains('é'));
    }

    #[test]
    fn utf16_meta_label_falls_back_to_utf8() {
        let decoded = decode_html(b"<meta charset=\"utf-16\"><p>ok</p>");
        assert_eq!(decoded.encoding_label, "UTF-8");
        assert_eq!(decoded.html, "<meta charset=\"utf-16\"><p>ok</p>");
    }

    #[test]
    fn charset_declarations_are_rewritten() {
        let html = r#"<meta charset="windows-1252"><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(
            declare_utf8(html),
            r#"<meta charset="utf-8"><meta http-equiv="Content-Type" content="text/html; charset=utf-8">"#
        );
        assert_eq!(declare_utf8("<p>charset=latin1</p>"), "<p>charset=latin1</p>");
    }

    #[test]
    fn plain_utf8_is_detected() {
        let decoded = decode_html("<p>日本語のページ</p>".as_bytes());
        assert_eq!(decoded.html, "<p>日本語のページ</p>");
    }
}
