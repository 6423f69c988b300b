//! The output encoding layer: the inverse of [`crate::decode`].
//!
//! Where a [`crate::decode::CodepointReader`] turns bytes into codepoints,
//! an [`Encoder`] turns codepoints back into bytes in a caller-selected
//! encoding, so a [`crate::node::Node`]'s textual fields can be produced as
//! plain `String`s (always UTF-8, since that's what Rust's `String`
//! requires) while the raw byte form is still available to callers that
//! need to round-trip through another encoding.

use crate::decode::Encoding;

/// Appends the UTF-8 encoding of `cp` to `out`.
///
/// `cp` must already satisfy [`crate::chars::is_char`]; this is enforced
/// by construction since every `Node` field is built only from codepoints
/// the decoder already validated.
pub fn put_utf8(cp: u32, out: &mut Vec<u8>) {
    if cp < 0x80 {
        out.push(cp as u8);
    } else if cp < 0x800 {
        out.push(0xC0 | (cp >> 6) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else if cp < 0x1_0000 {
        out.push(0xE0 | (cp >> 12) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    } else {
        out.push(0xF0 | (cp >> 18) as u8);
        out.push(0x80 | ((cp >> 12) & 0x3F) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
        out.push(0x80 | (cp & 0x3F) as u8);
    }
}

/// Appends the UTF-16 encoding of `cp` to `out`, splitting it into a
/// surrogate pair above the BMP.
pub fn put_utf16(cp: u32, big_endian: bool, out: &mut Vec<u8>) {
    let mut push_unit = |unit: u16, out: &mut Vec<u8>| {
        let bytes = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        out.extend_from_slice(&bytes);
    };
    if cp < 0x1_0000 {
        push_unit(cp as u16, out);
    } else {
        let v = cp - 0x1_0000;
        push_unit(0xD800 + (v >> 10) as u16, out);
        push_unit(0xDC00 + (v & 0x3FF) as u16, out);
    }
}

/// Appends the UTF-32 encoding of `cp` to `out`.
pub fn put_utf32(cp: u32, big_endian: bool, out: &mut Vec<u8>) {
    let bytes = if big_endian {
        cp.to_be_bytes()
    } else {
        cp.to_le_bytes()
    };
    out.extend_from_slice(&bytes);
}

/// Stateless codepoint-to-bytes encoder for one of the five encodings this
/// crate can also decode. Distinct from [`crate::decode::Encoding`] only in
/// that it is consumed by `put_character` rather than produced by BOM
/// detection; the two share the same five-way tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Encoder {
    encoding: Encoding,
}

impl Encoder {
    pub fn new(encoding: Encoding) -> Self {
        Encoder { encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Appends the encoding of `cp` to `out` in this encoder's target
    /// encoding.
    pub fn put_character(&self, cp: u32, out: &mut Vec<u8>) {
        match self.encoding {
            Encoding::Utf8 => put_utf8(cp, out),
            Encoding::Utf16Be => put_utf16(cp, true, out),
            Encoding::Utf16Le => put_utf16(cp, false, out),
            Encoding::Utf32Be => put_utf32(cp, true, out),
            Encoding::Utf32Le => put_utf32(cp, false, out),
        }
    }

    /// Encodes a whole string's codepoints into a fresh byte buffer.
    pub fn encode_str(&self, s: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            self.put_character(ch as u32, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_round_trips_every_band() {
        for cp in [b'a' as u32, 0xE9, 0x20AC, 0x1F600] {
            let mut out = Vec::new();
            put_utf8(cp, &mut out);
            let s = std::str::from_utf8(&out).unwrap();
            assert_eq!(s.chars().next().unwrap() as u32, cp);
        }
    }

    #[test]
    fn utf16_splits_supplementary_plane_into_surrogate_pair() {
        let mut out = Vec::new();
        put_utf16(0x1F600, true, &mut out);
        assert_eq!(out, vec![0xD8, 0x3D, 0xDE, 0x00]);
    }

    #[test]
    fn utf16_bmp_is_single_unit() {
        let mut out = Vec::new();
        put_utf16('A' as u32, false, &mut out);
        assert_eq!(out, vec![b'A', 0x00]);
    }

    #[test]
    fn utf32_is_four_bytes_either_endian() {
        let mut be = Vec::new();
        let mut le = Vec::new();
        put_utf32(0x1F600, true, &mut be);
        put_utf32(0x1F600, false, &mut le);
        assert_eq!(be, vec![0x00, 0x01, 0xF6, 0x00]);
        assert_eq!(le, vec![0x00, 0xF6, 0x01, 0x00]);
    }

    #[test]
    fn encoder_encode_str_matches_std_utf8() {
        let enc = Encoder::new(Encoding::Utf8);
        assert_eq!(enc.encode_str("héllo"), "héllo".as_bytes());
    }

    #[test]
    fn encoder_round_trips_through_decoder() {
        use crate::decode::{CodepointReader, SliceByteSource};
        let enc = Encoder::new(Encoding::Utf16Le);
        let bytes = enc.encode_str("A€𝄞");
        let mut reader = CodepointReader::new(SliceByteSource::new(&bytes), Encoding::Utf16Le);
        let mut got = Vec::new();
        loop {
            match reader.read_character() {
                crate::decode::ReadResult::Ok(cp) => got.push(cp),
                crate::decode::ReadResult::EndOfInput => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        let expected: Vec<u32> = "A€𝄞".chars().map(|c| c as u32).collect();
        assert_eq!(got, expected);
    }
}
