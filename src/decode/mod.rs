//! The Unicode decoding layer: turns a byte source into a sequence of
//! validated codepoints, one call at a time.
//!
//! This module is deliberately split from [`crate::parser`]: the state
//! machine never looks at a byte directly, it only ever asks a
//! [`CodepointReader`] for the next [`ReadResult`]. That keeps the five
//! supported encodings (UTF-8, UTF-16 BE/LE, UTF-32 BE/LE) and the two
//! supported source shapes (a blocking byte stream, a borrowed byte slice)
//! fully orthogonal to parsing: the state machine is generic over
//! [`ByteSource`] and dispatches encoding with one `match` on an
//! [`Encoding`] tag rather than a virtual call per codepoint.

pub mod bom;
mod utf16;
mod utf32;
mod utf8;

use std::io::Read;

/// One encoding this crate can decode codepoints from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
}

/// The outcome of one [`CharacterReader::read_character`] call.
///
/// `EndOfInput` and `SourceError` are sticky at the [`CodepointReader`]
/// level: once either is produced, every subsequent call returns the same
/// tag again without touching the underlying source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadResult {
    /// One codepoint was decoded and [`crate::chars::is_char`] holds for it.
    Ok(u32),
    /// Clean end of source at a code-unit boundary.
    EndOfInput,
    /// The byte sequence was malformed, or decoded to a codepoint the
    /// `Char` production disallows. Carries the raw codepoint when one
    /// could be assembled (useful for error messages), or `None` when the
    /// sequence was truncated or structurally invalid before a codepoint
    /// value existed.
    InvalidCharacter(Option<u32>),
    /// The underlying byte source failed before reaching end-of-input.
    /// Never produced by a slice/iterator source.
    SourceError,
}

/// A source of raw bytes, abstracting over "a blocking stream" and "a
/// borrowed range" the way §4.2 requires: the iterator-range variant must
/// never produce [`NextByte::Error`].
pub trait ByteSource {
    fn next_byte(&mut self) -> NextByte;
}

/// One pull from a [`ByteSource`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextByte {
    Byte(u8),
    End,
    Error,
}

/// Adapts any [`std::io::Read`] into a [`ByteSource`]. Blocks the calling
/// thread on `next_byte` exactly like the underlying reader would.
pub struct ReadByteSource<R: Read> {
    inner: R,
}

impl<R: Read> ReadByteSource<R> {
    pub fn new(inner: R) -> Self {
        ReadByteSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> ByteSource for ReadByteSource<R> {
    fn next_byte(&mut self) -> NextByte {
        let mut buf = [0u8; 1];
        loop {
            return match self.inner.read(&mut buf) {
                Ok(0) => NextByte::End,
                Ok(_) => NextByte::Byte(buf[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => NextByte::Error,
            };
        }
    }
}

/// Adapts a borrowed byte slice into a [`ByteSource`]. Never produces
/// [`NextByte::Error`]; exhaustion is always reported as [`NextByte::End`].
pub struct SliceByteSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceByteSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceByteSource { bytes, pos: 0 }
    }

    /// Number of bytes already consumed from the original slice.
    pub fn offset(&self) -> usize {
        self.pos
    }
}

impl<'a> ByteSource for SliceByteSource<'a> {
    fn next_byte(&mut self) -> NextByte {
        match self.bytes.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                NextByte::Byte(b)
            }
            None => NextByte::End,
        }
    }
}

/// Per-encoding decode step. Implemented once per supported encoding in
/// [`utf8`], [`utf16`] and [`utf32`]; [`CodepointReader`] is the only
/// caller.
trait CharacterReader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult;
}

/// Decodes one codepoint at a time from a [`ByteSource`], dispatching on a
/// fixed [`Encoding`] tag and enforcing the "sticky terminal result" rule
/// from §3: once `EndOfInput` or `SourceError` has been produced, every
/// later call returns it again without consuming more bytes.
pub struct CodepointReader<S: ByteSource> {
    source: S,
    encoding: Encoding,
    terminal: Option<ReadResult>,
}

impl<S: ByteSource> CodepointReader<S> {
    pub fn new(source: S, encoding: Encoding) -> Self {
        CodepointReader {
            source,
            encoding,
            terminal: None,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Re-targets this reader at a fresh source and encoding, clearing any
    /// latched terminal result.
    pub fn reset(&mut self, source: S, encoding: Encoding) {
        self.source = source;
        self.encoding = encoding;
        self.terminal = None;
    }

    pub fn read_character(&mut self) -> ReadResult {
        if let Some(terminal) = self.terminal {
            return terminal;
        }
        let result = match self.encoding {
            Encoding::Utf8 => utf8::Utf8Reader::read_character(&mut self.source),
            Encoding::Utf16Be => utf16::Utf16BeReader::read_character(&mut self.source),
            Encoding::Utf16Le => utf16::Utf16LeReader::read_character(&mut self.source),
            Encoding::Utf32Be => utf32::Utf32BeReader::read_character(&mut self.source),
            Encoding::Utf32Le => utf32::Utf32LeReader::read_character(&mut self.source),
        };
        if matches!(result, ReadResult::EndOfInput | ReadResult::SourceError) {
            self.terminal = Some(result);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_source_yields_end_on_empty() {
        let mut src = ReadByteSource::new(&b""[..]);
        assert_eq!(src.next_byte(), NextByte::End);
    }

    #[test]
    fn slice_source_tracks_offset() {
        let mut src = SliceByteSource::new(b"ab");
        assert_eq!(src.next_byte(), NextByte::Byte(b'a'));
        assert_eq!(src.offset(), 1);
        assert_eq!(src.next_byte(), NextByte::Byte(b'b'));
        assert_eq!(src.next_byte(), NextByte::End);
        assert_eq!(src.next_byte(), NextByte::End);
    }

    #[test]
    fn terminal_result_is_sticky() {
        let mut reader = CodepointReader::new(SliceByteSource::new(b""), Encoding::Utf8);
        assert_eq!(reader.read_character(), ReadResult::EndOfInput);
        assert_eq!(reader.read_character(), ReadResult::EndOfInput);
    }

    #[test]
    fn reset_clears_terminal_result() {
        let mut reader = CodepointReader::new(SliceByteSource::new(b""), Encoding::Utf8);
        assert_eq!(reader.read_character(), ReadResult::EndOfInput);
        reader.reset(SliceByteSource::new(b"a"), Encoding::Utf8);
        assert_eq!(reader.read_character(), ReadResult::Ok(b'a' as u32));
    }
}
