use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMarkup {
    pub markup: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decodes response bytes leniently: BOM, then Content-Type charset, then
/// strict UTF-8, then chardetng's guess.
pub fn decode_markup(bytes: &[u8], content_type: Option<&str>) -> DecodedMarkup {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    if std::str::from_utf8(bytes).is_ok() {
        return decode_with(bytes, UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches([' ', '"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedMarkup {
    let (text, used, had_errors) = enc.decode(bytes);
    DecodedMarkup {
        markup: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_header_is_honoured() {
        let decoded = decode_markup(b"caf\xe9", Some("text/html; Charset=\"ISO-8859-1\""));
        assert_eq!(decoded.markup, "café");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn bom_wins_over_header() {
        let decoded = decode_markup(b"\xEF\xBB\xBFhello", Some("text/html; charset=latin1"));
        assert_eq!(decoded.markup, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn invalid_bytes_are_replaced_not_rejected() {
        let decoded = decode_markup(b"ok \xff\xfe\xfd", Some("text/html; charset=utf-8"));
        assert!(decoded.had_errors);
        assert!(decoded.markup.starts_with("ok "));
        assert!(decoded.markup.contains('\u{FFFD}'));
    }

    #[test]
    fn plain_utf8_without_header() {
        let decoded = decode_markup("漏洞".as_bytes(), None);
        assert_eq!(decoded.markup, "漏洞");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }
}
