//! UTF-8 decoding: one leading-byte lookup plus up to three continuation
//! bytes, with overlong encodings and surrogates rejected per §4.2.

use super::{ByteSource, CharacterReader, NextByte, ReadResult};
use crate::chars::is_char;

/// Maps a leading byte to the number of bytes in its sequence (1..4), or
/// `0` for a byte that can never start a valid UTF-8 sequence (a lone
/// continuation byte or an overlong-only prefix such as `0xC0`/`0xC1`).
const SEQUENCE_LEN: [u8; 256] = build_sequence_len_table();

const fn build_sequence_len_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut b = 0usize;
    while b < 256 {
        table[b] = if b < 0x80 {
            1
        } else if b < 0xC2 {
            0 // continuation bytes (0x80..0xBF) and overlong-only leads (0xC0, 0xC1)
        } else if b < 0xE0 {
            2
        } else if b < 0xF0 {
            3
        } else if b < 0xF5 {
            4
        } else {
            0 // 0xF5..0xFF can only encode codepoints above U+10FFFF
        };
        b += 1;
    }
    table
}

pub struct Utf8Reader;

impl CharacterReader for Utf8Reader {
    fn read_character<S: ByteSource>(source: &mut S) -> ReadResult {
        let leading = match source.next_byte() {
            NextByte::Byte(b) => b,
            NextByte::End => return ReadResult::EndOfInput,
            NextByte::Error => return ReadResult::SourceError,
        };

        let len = SEQUENCE_LEN[leading as usize];
        if len == 0 {
            return ReadResult::InvalidCharacter(Some(leading as u32));
        }
        if len == 1 {
            return if is_char(leading as u32) {
                ReadResult::Ok(leading as u32)
            } else {
                ReadResult::InvalidCharacter(Some(leading as u32))
            };
        }

        let mut cp = match len {
            2 => (leading as u32) & 0x1F,
            3 => (leading as u32) & 0x0F,
            _ => (leading as u32) & 0x07,
        };

        for i in 1..len {
            let cont = match source.next_byte() {
                NextByte::Byte(b) => b,
                NextByte::End => {
                    // Leading byte promised a continuation that never came.
                    return ReadResult::InvalidCharacter(Some(leading as u32));
                }
                NextByte::Error => return ReadResult::SourceError,
            };
            if cont & 0xC0 != 0x80 {
                return ReadResult::InvalidCharacter(Some(leading as u32));
            }
            cp = (cp << 6) | (cont as u32 & 0x3F);
            let _ = i;
        }

        let valid = match len {
            2 => cp > 0x7F,
            3 => cp > 0x7FF && !(0xD800..=0xDFFF).contains(&cp),
            _ => cp > 0xFFFF && cp <= 0x10_FFFF,
        };
        if valid && is_char(cp) {
            ReadResult::Ok(cp)
        } else {
            ReadResult::InvalidCharacter(Some(cp))
        }
    }
}
