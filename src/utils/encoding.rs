// src/utils/encoding.rs

//! Response body decoding.
//!
//! Product pages are decoded from their bytes rather than from the
//! `Content-Type` header, which the site does not set reliably.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;

/// How far into the document a `<meta charset>` declaration is looked for.
const SNIFF_LIMIT: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("static charset pattern")
});

/// Detect the encoding of an HTML body.
///
/// Order: byte-order mark, `<meta>` declaration, valid UTF-8, `fallback`.
/// UTF-16 labels on an ASCII-compatible page are read as UTF-8.
pub fn detect(bytes: &[u8], fallback: &'static Encoding) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    // A declared UTF-8 is only believed when the bytes are valid UTF-8.
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    if let Some(declared) = META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .map(Encoding::output_encoding)
        .filter(|&encoding| encoding != UTF_8)
    {
        return declared;
    }

    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        fallback
    }
}

/// Decode an HTML body to a string using [`detect`].
pub fn decode_html(bytes: &[u8], fallback: &'static Encoding) -> String {
    let encoding = detect(bytes, fallback);
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("Malformed {} sequences replaced while decoding", actual.name());
    }
    text.into_owned()
}

/// Look up an encoding by label, defaulting to UTF-8 for unknown labels.
pub fn encoding_for_label(label: &str) -> &'static Encoding {
    Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;

    #[test]
    fn test_utf8_body() {
        let html = "<html><body>Костюм</body></html>";
        assert_eq!(decode_html(html.as_bytes(), WINDOWS_1251), html);
    }

    #[test]
    fn test_bom_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Пиджак".as_bytes());
        assert_eq!(detect(&bytes, WINDOWS_1251), UTF_8);
        assert_eq!(decode_html(&bytes, WINDOWS_1251), "Пиджак");
    }

    #[test]
    fn test_meta_charset_declaration() {
        let (encoded, _, _) = WINDOWS_1251.encode("<meta charset=\"windows-1251\"><p>Смокинг</p>");
        assert_eq!(detect(&encoded, UTF_8), WINDOWS_1251);
        assert!(decode_html(&encoded, UTF_8).contains("Смокинг"));
    }

    #[test]
    fn test_declared_utf8_with_legacy_bytes_uses_fallback() {
        let page = "<meta charset=\"utf-8\"><h1>Костюм</h1>";
        let (encoded, _, _) = WINDOWS_1251.encode(page);
        assert_eq!(detect(&encoded, WINDOWS_1251), WINDOWS_1251);
        assert_eq!(decode_html(&encoded, WINDOWS_1251), page);
    }

    #[test]
    fn test_utf16_label_reads_as_utf8() {
        let page = "<meta charset=\"utf-16\"><h1>Костюм</h1>";
        assert_eq!(detect(page.as_bytes(), WINDOWS_1251), UTF_8);
        assert_eq!(decode_html(page.as_bytes(), WINDOWS_1251), page);
    }

    #[test]
    fn test_invalid_utf8_uses_fallback() {
        let (encoded, _, _) = WINDOWS_1251.encode("<p>Брюки</p>");
        assert_eq!(detect(&encoded, WINDOWS_1251), WINDOWS_1251);
        assert_eq!(decode_html(&encoded, WINDOWS_1251), "<p>Брюки</p>");
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(encoding_for_label("no-such-encoding"), UTF_8);
        assert_eq!(encoding_for_label("cp1251"), WINDOWS_1251);
    }
}
