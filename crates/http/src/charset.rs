//! Text encoding detection and decoding for response bodies.
//!
//! The body carries no trusted charset, so the encoding is guessed from the bytes with
//! [`chardetng`] and the bytes are decoded with [`encoding_rs`]. Decoding never fails:
//! malformed sequences become U+FFFD and unknown labels fall back to `windows-1252`,
//! which maps every byte to a character.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, GBK, WINDOWS_1252_INIT};
use tracing::{debug, warn};

use crate::protocol::Document;

/// Encoding used when detection gives nothing usable.
pub static FALLBACK_ENCODING: &Encoding = &WINDOWS_1252_INIT;

/// Guesses the charset of `bytes`, `None` for an empty body.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    Some(detector.guess(None, true).name())
}

/// Maps GB2312 to its GBK superset, every other label is returned as is.
///
/// Labels from [`sniff`] are already canonical and encoding_rs maps `gb2312` to GBK on
/// its own, so this only changes labels that come from elsewhere, such as a
/// `Content-Type` charset or a caller.
pub fn normalize(label: &str) -> &str {
    if label.trim().eq_ignore_ascii_case("gb2312") { GBK.name() } else { label }
}

/// Looks up the normalized `label`, falling back to [`FALLBACK_ENCODING`].
pub fn resolve(label: &str) -> &'static Encoding {
    let label = normalize(label);
    match Encoding::for_label_no_replacement(label.as_bytes()) {
        Some(encoding) => encoding,
        None => {
            debug!(label = %label, fallback = FALLBACK_ENCODING.name(), "unknown charset label");
            FALLBACK_ENCODING
        }
    }
}

/// Sniffs and decodes `bytes`, returning the text and the encoding actually used.
pub fn decode(bytes: &[u8]) -> (String, &'static Encoding) {
    let encoding = match sniff(bytes) {
        Some(label) => resolve(label),
        None => FALLBACK_ENCODING,
    };
    decode_with(bytes, encoding)
}

/// Decodes `bytes` with `encoding` unless a byte order mark names another one.
pub fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> (String, &'static Encoding) {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "malformed byte sequences replaced with U+FFFD");
    }
    debug!(sniffed = encoding.name(), used = used.name(), len = bytes.len(), "decoded body");
    (text.into_owned(), used)
}

/// Decodes a body into a [`Document`].
pub fn decode_document(bytes: &[u8], view_source: bool) -> Document {
    let (text, encoding) = decode(bytes);
    Document::new(encoding.name(), text, view_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn gb2312_uses_gbk_rules() {
        assert_eq!(normalize("GB2312"), "GBK");
        assert_eq!(normalize("gb2312"), "GBK");
        assert_eq!(normalize("utf-8"), "utf-8");

        let encoding = resolve("GB2312");
        assert_eq!(encoding, GBK);

        let (text, used) = decode_with(&[0xD6, 0xD0, 0xCE, 0xC4], encoding);
        assert_eq!(text, "中文");
        assert_eq!(used, GBK);
    }

    #[test]
    fn sniffs_chinese_text() {
        let source = "中华人民共和国是一个位于东亚的国家，首都是北京。这个国家有着悠久的历史和灿烂的文化，人口众多，经济发展迅速。";
        let repeated = source.repeat(4);
        let (bytes, _, _) = GBK.encode(&repeated);

        let (text, used) = decode(&bytes);
        assert_eq!(used, GBK);
        assert_eq!(text, repeated);
    }

    #[test]
    fn invalid_sequences_become_replacement_characters() {
        let (text, used) = decode_with(b"\xD6\xD0 and \xFF", GBK);
        assert_eq!(used, GBK);
        assert!(text.starts_with("中 and "));
        assert!(text.contains('\u{FFFD}'));

        let (text, _) = decode_with(b"ok \xC3\x28", UTF_8);
        assert_eq!(text, "ok \u{FFFD}(");
    }

    #[test]
    fn byte_order_mark_wins() {
        let (text, used) = decode_with(b"\xEF\xBB\xBFcaf\xC3\xA9", WINDOWS_1252);
        assert_eq!(used, UTF_8);
        assert_eq!(text, "café");
    }

    #[test]
    fn unknown_label_falls_back() {
        assert_eq!(resolve("no-such-charset"), FALLBACK_ENCODING);
        assert_eq!(resolve("replacement"), FALLBACK_ENCODING);
        assert_eq!(resolve("utf-8"), UTF_8);
    }

    #[test]
    fn empty_body() {
        assert_eq!(sniff(b""), None);

        let document = decode_document(b"", true);
        assert_eq!(document.text(), "");
        assert_eq!(document.encoding(), FALLBACK_ENCODING.name());
        assert!(document.view_source());
    }

    #[test]
    fn ascii_document() {
        let document = decode_document(b"<p>plain ascii</p>", false);
        assert_eq!(document.text(), "<p>plain ascii</p>");
        assert!(!document.view_source());
    }
}
