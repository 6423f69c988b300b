//! Byte-order-mark detection.
//!
//! A single function rather than a feed loop: the longest BOM this crate
//! recognizes is 4 bytes, so there is no need for the incremental
//! byte-at-a-time state machine a streaming detector would use. UTF-32LE
//! must be checked before UTF-16LE: `FF FE 00 00` is a valid prefix of
//! both, and XML 1.0 Appendix F resolves the ambiguity in favor of the
//! 4-byte mark.

use super::Encoding;

/// Result of inspecting a document's leading bytes for a byte-order mark.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BomMatch {
    /// Encoding implied by the mark.
    pub encoding: Encoding,
    /// Number of leading bytes the mark occupies; these are not part of
    /// the document's character data and must be consumed before the
    /// first codepoint is decoded.
    pub len: usize,
}

/// Inspects up to the first 4 bytes of `prefix` for a recognized BOM.
/// Returns `None` if no known mark is present; `prefix` is then presumed
/// to be UTF-8 (§4.3's fallback) unless an external transport-level
/// encoding is already known.
pub fn detect(prefix: &[u8]) -> Option<BomMatch> {
    if prefix.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return Some(BomMatch { encoding: Encoding::Utf32Be, len: 4 });
    }
    if prefix.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return Some(BomMatch { encoding: Encoding::Utf32Le, len: 4 });
    }
    if prefix.starts_with(&[0xFE, 0xFF]) {
        return Some(BomMatch { encoding: Encoding::Utf16Be, len: 2 });
    }
    if prefix.starts_with(&[0xFF, 0xFE]) {
        return Some(BomMatch { encoding: Encoding::Utf16Le, len: 2 });
    }
    if prefix.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(BomMatch { encoding: Encoding::Utf8, len: 3 });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_utf8_bom() {
        let m = detect(&[0xEF, 0xBB, 0xBF, b'<']).unwrap();
        assert_eq!(m.encoding, Encoding::Utf8);
        assert_eq!(m.len, 3);
    }

    #[test]
    fn detects_utf16_be_bom() {
        let m = detect(&[0xFE, 0xFF, 0x00, b'<']).unwrap();
        assert_eq!(m.encoding, Encoding::Utf16Be);
        assert_eq!(m.len, 2);
    }

    #[test]
    fn detects_utf16_le_bom() {
        let m = detect(&[0xFF, 0xFE, b'<', 0x00]).unwrap();
        assert_eq!(m.encoding, Encoding::Utf16Le);
        assert_eq!(m.len, 2);
    }

    #[test]
    fn detects_utf32_be_bom() {
        let m = detect(&[0x00, 0x00, 0xFE, 0xFF]).unwrap();
        assert_eq!(m.encoding, Encoding::Utf32Be);
        assert_eq!(m.len, 4);
    }

    #[test]
    fn utf32_le_wins_over_utf16_le_prefix_ambiguity() {
        let m = detect(&[0xFF, 0xFE, 0x00, 0x00]).unwrap();
        assert_eq!(m.encoding, Encoding::Utf32Le);
        assert_eq!(m.len, 4);
    }

    #[test]
    fn short_prefix_that_would_be_utf16_le_still_matches() {
        let m = detect(&[0xFF, 0xFE, b'<']).unwrap();
        assert_eq!(m.encoding, Encoding::Utf16Le);
        assert_eq!(m.len, 2);
    }

    #[test]
    fn no_mark_returns_none() {
        assert_eq!(detect(b"<?xml"), None);
    }

    #[test]
    fn empty_prefix_returns_none() {
        assert_eq!(detect(&[]), None);
    }

    #[test]
    fn prefix_shorter_than_mark_does_not_panic() {
        assert_eq!(detect(&[0xEF]), None);
        assert_eq!(detect(&[0xEF, 0xBB]), None);
    }
}
