//! UTF-16 decoding, big- and little-endian. Each code unit is two bytes;
//! a codepoint above U+FFFF is assembled from a high/low surrogate pair.

use super::{ByteSource, CharacterReader, NextByte, ReadResult};
use crate::chars::is_char;

fn read_unit(source: &mut impl ByteSource, big_endian: bool) -> Result<u16, ReadResult> {
    let first = match source.next_byte() {
        NextByte::Byte(b) => b,
        NextByte::End => return Err(ReadResult::EndOfInput),
        NextByte::Error => return Err(ReadResult::SourceError),
    };
    let second = match source.next_byte() {
        NextByte::Byte(b) => b,
        // A lone trailing byte: the stream ended mid-code-unit.
        NextByte::End => return Err(ReadResult::InvalidCharacter(None)),
        NextByte::Error => return Err(ReadResult::SourceError),
    };
    Ok(if big_endian {
        u16::from_be_bytes([first, second])
    } else {
        u16::from_le_bytes([first, second])
    })
}

fn read_character(source: &mut impl ByteSource, big_endian: bool) -> ReadResult {
    let first = match read_unit(source, big_endian) {
        Ok(u) => u,
        Err(terminal) => return terminal,
    };

    if (0xD800..=0xDBFF).contains(&first) {
        let second = match read_unit(source, big_endian) {
            Ok(u) => u,
            Err(ReadResult::EndOfInput) => return ReadResult::InvalidCharacter(Some(first as u32)),
            Err(terminal) => return terminal,
        };
        if !(0xDC00..=0xDFFF).contains(&second) {
            return ReadResult::InvalidCharacter(Some(first as u32));
        }
        let cp = 0x10000
            + ((first as u32 - 0xD800) << 10)
            + (second as u32 - 0xDC00);
        return ReadResult::Ok(cp);
    }
    if (0xDC00..=0xDFFF).contains(&first) {
        // An unpaired low surrogate can never start a valid code point.
        return ReadResult::InvalidCharacter(Some(first as u32));
    }

    let cp = first as u32;
    if is_char(cp) {
        ReadResult::Ok(cp)
    } else {
        ReadResult::InvalidCharacter(Some(cp))
    }
}

pub struct Utf16BeReader;

impl CharacterReader for Utf16BeReader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult {
        read_character(source, true)
    }
}

pub struct Utf16LeReader;

impl CharacterReader for Utf16LeReader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult {
        read_character(source, false)
    }
}
