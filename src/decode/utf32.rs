//! UTF-32 decoding, big- and little-endian. One code unit is one codepoint;
//! no assembly required beyond validating it against the `Char` production.

use super::{ByteSource, CharacterReader, NextByte, ReadResult};
use crate::chars::is_char;

fn read_character(source: &mut impl ByteSource, big_endian: bool) -> ReadResult {
    let mut bytes = [0u8; 4];
    for (i, slot) in bytes.iter_mut().enumerate() {
        *slot = match source.next_byte() {
            NextByte::Byte(b) => b,
            NextByte::End => {
                return if i == 0 {
                    ReadResult::EndOfInput
                } else {
                    ReadResult::InvalidCharacter(None)
                };
            }
            NextByte::Error => return ReadResult::SourceError,
        };
    }
    let cp = if big_endian {
        u32::from_be_bytes(bytes)
    } else {
        u32::from_le_bytes(bytes)
    };
    if cp <= 0x10_FFFF && is_char(cp) {
        ReadResult::Ok(cp)
    } else {
        ReadResult::InvalidCharacter(Some(cp))
    }
}

pub struct Utf32BeReader;

impl CharacterReader for Utf32BeReader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult {
        read_character(source, true)
    }
}

pub struct Utf32LeReader;

impl CharacterReader for Utf32LeReader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult {
        read_character(source, false)
    }
}
