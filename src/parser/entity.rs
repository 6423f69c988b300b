//! Entity and character reference resolution.
//!
//! No DTD is read (an explicit non-goal), so the only entities this crate
//! can resolve are the five predefined ones and numeric character
//! references; any other named entity is a well-formedness error.

use super::Parser;
use crate::chars::hex_digit_value;
use crate::decode::ByteSource;
use crate::error::{Error, ErrorCode};
use crate::node::NodeKind;

impl<S: ByteSource> Parser<S> {
    /// Consumes content-level `'&' Name ';'` or `'&#' Digits ';'` etc. and
    /// emits a standalone [`NodeKind::EntityReference`] node for it.
    pub(super) fn parse_entity_reference(&mut self) -> Result<bool, Error> {
        self.position.mark_node_start();
        let (row, column) = (self.position.last_row(), self.position.last_column());
        let (name, resolved) = self.read_entity_reference_raw()?;
        self.node.reset();
        self.node.kind = NodeKind::EntityReference;
        self.node.name = name;
        self.node.value = char::from_u32(resolved)
            .expect("validated by entity resolution")
            .to_string();
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    /// Consumes one `&...;` reference at the current cursor (which must be
    /// sitting exactly on `&`) and resolves it to a single codepoint.
    /// Shared by content-level entity references and inline resolution
    /// inside attribute values.
    pub(super) fn read_entity_reference_raw(&mut self) -> Result<(String, u32), Error> {
        let (row, column) = (self.position.current_row(), self.position.current_column());
        self.next_cp()?; // consume '&'

        if matches!(self.peek_cp()?, Some(cp) if cp == '#' as u32) {
            self.next_cp()?; // consume '#'
            return self.read_character_reference(row, column);
        }

        let mut name = String::new();
        loop {
            match self.peek_cp()? {
                Some(cp) if cp == ';' as u32 => {
                    self.next_cp()?;
                    break;
                }
                Some(cp) if crate::chars::is_name_char(cp) => {
                    name.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
                Some(_) => {
                    return Err(self.error_here(ErrorCode::InvalidSyntax, "invalid entity name"))
                }
                None => {
                    return Err(
                        self.error_here(ErrorCode::UnclosedToken, "unterminated entity reference")
                    )
                }
            }
        }
        if name.is_empty() {
            return Err(Error::new(
                ErrorCode::InvalidSyntax,
                "an entity reference must name an entity",
                row,
                column,
            ));
        }
        let resolved = match name.as_str() {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "apos" => '\'',
            "quot" => '"',
            _ => {
                return Err(Error::new(
                    ErrorCode::InvalidSyntax,
                    format!(
                        "entity \"&{};\" does not resolve: no DTD is read by this parser",
                        name
                    ),
                    row,
                    column,
                ))
            }
        };
        Ok((name, resolved as u32))
    }

    fn read_character_reference(&mut self, row: u64, column: u64) -> Result<(String, u32), Error> {
        let hex = matches!(self.peek_cp()?, Some(cp) if cp == 'x' as u32);
        let mut name = String::from("#");
        if hex {
            self.next_cp()?;
            name.push('x');
        }
        let radix: u32 = if hex { 16 } else { 10 };
        let mut value: u32 = 0;
        let mut any_digits = false;
        loop {
            match self.peek_cp()? {
                Some(cp) if cp == ';' as u32 => {
                    self.next_cp()?;
                    break;
                }
                Some(cp) => {
                    let digit = if hex {
                        hex_digit_value(cp)
                    } else if (b'0' as u32..=b'9' as u32).contains(&cp) {
                        (cp - b'0' as u32) as i8
                    } else {
                        -1
                    };
                    if digit < 0 {
                        return Err(self.error_here(
                            ErrorCode::InvalidSyntax,
                            "invalid digit in character reference",
                        ));
                    }
                    any_digits = true;
                    value = value
                        .checked_mul(radix)
                        .and_then(|v| v.checked_add(digit as u32))
                        .ok_or_else(|| {
                            self.error_here(
                                ErrorCode::InvalidSyntax,
                                "character reference value is out of range",
                            )
                        })?;
                    name.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
                None => {
                    return Err(self.error_here(
                        ErrorCode::UnclosedToken,
                        "unterminated character reference",
                    ))
                }
            }
        }
        if !any_digits {
            return Err(Error::new(
                ErrorCode::InvalidSyntax,
                "a character reference must have at least one digit",
                row,
                column,
            ));
        }
        if value > 0x10_FFFF || !crate::chars::is_char(value) {
            return Err(Error::new(
                ErrorCode::InvalidSyntax,
                format!("character reference U+{:X} is not a legal XML character", value),
                row,
                column,
            ));
        }
        Ok((name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Encoding, SliceByteSource};

    fn parser(input: &str) -> Parser<SliceByteSource<'_>> {
        Parser::new(SliceByteSource::new(input.as_bytes()), Encoding::Utf8)
    }

    #[test]
    fn predefined_entities_resolve_inside_content() {
        let mut p = parser("<a>&amp;&lt;&gt;</a>");
        assert!(p.read_node()); // Start
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EntityReference);
        assert_eq!(p.node().name, "amp");
        assert_eq!(p.node().value, "&");
        assert!(p.read_node());
        assert_eq!(p.node().value, "<");
        assert!(p.read_node());
        assert_eq!(p.node().value, ">");
        assert!(p.read_node()); // End
    }

    #[test]
    fn decimal_and_hex_character_references() {
        let mut p = parser("<a>&#65;&#x41;</a>");
        assert!(p.read_node());
        assert!(p.read_node());
        assert_eq!(p.node().value, "A");
        assert!(p.read_node());
        assert_eq!(p.node().value, "A");
    }

    #[test]
    fn unknown_named_entity_is_an_error() {
        let mut p = parser("<a>&nbsp;</a>");
        assert!(p.read_node());
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::InvalidSyntax);
    }

    #[test]
    fn unterminated_entity_reference_is_unclosed_token() {
        let mut p = parser("<a>&amp");
        assert!(p.read_node());
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::UnclosedToken);
    }
}
