//! Comments, CDATA sections, processing instructions, the XML
//! declaration, and the opaque DOCTYPE skip.

use super::Parser;
use crate::decode::ByteSource;
use crate::error::{Error, ErrorCode};
use crate::node::NodeKind;

impl<S: ByteSource> Parser<S> {
    /// `<!--` already dispatched on its first `-`; consumes the rest.
    pub(super) fn parse_comment(&mut self, row: u64, column: u64) -> Result<bool, Error> {
        self.expect_literal("--", ErrorCode::InvalidSyntax, "expected \"<!--\"")?;
        let value = self.scan_until_literal("--", row, column)?;
        match self.next_cp()? {
            Some(cp) if cp == '>' as u32 => {}
            _ => {
                return Err(self.error_here(
                    ErrorCode::InvalidSyntax,
                    "\"--\" is not allowed inside a comment",
                ))
            }
        }
        self.node.reset();
        self.node.kind = NodeKind::Comment;
        self.node.value = value;
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    /// `<![` already dispatched on `[`; consumes `CDATA[` and the section.
    pub(super) fn parse_cdata(&mut self, row: u64, column: u64) -> Result<bool, Error> {
        self.expect_literal("[CDATA[", ErrorCode::InvalidSyntax, "expected \"<![CDATA[\"")?;
        let value = self.scan_until_literal("]]>", row, column)?;
        self.node.reset();
        self.node.kind = NodeKind::CData;
        self.node.value = value;
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    /// `<!D...` already dispatched on a name-start char; consumes
    /// `DOCTYPE` and skips the whole declaration, including a bracketed
    /// internal subset, as an opaque block.
    pub(super) fn parse_doctype(&mut self, row: u64, column: u64) -> Result<bool, Error> {
        self.expect_literal("DOCTYPE", ErrorCode::InvalidSyntax, "expected \"<!DOCTYPE\"")?;
        let mut depth = 1u32; // the '<' that opened this DOCTYPE
        loop {
            match self.next_cp()? {
                None => {
                    return Err(self.error_here(
                        ErrorCode::UnclosedToken,
                        "DOCTYPE declaration was not closed before end of input",
                    ))
                }
                Some(cp) if cp == '<' as u32 => depth += 1,
                Some(cp) if cp == '>' as u32 => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        self.node.reset();
        self.node.kind = NodeKind::DocumentType;
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    /// `<?` already dispatched; reads the PI target and decides between a
    /// plain processing instruction and the XML declaration.
    pub(super) fn parse_processing_instruction(&mut self, row: u64, column: u64) -> Result<bool, Error> {
        self.next_cp()?; // consume '?'
        let at_document_start = row == 1 && column == 1 && !self.root_seen && self.stack.is_empty();

        let target_start = (self.position.current_row(), self.position.current_column());
        let mut target = String::new();
        loop {
            match self.peek_cp()? {
                Some(cp) if crate::chars::is_name_char(cp) => {
                    target.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
                _ => break,
            }
        }
        if target.is_empty() {
            return Err(self.error_here(ErrorCode::InvalidTagName, "a processing instruction needs a target name"));
        }
        let is_xml_decl = at_document_start && target == "xml";
        if !is_xml_decl && target.eq_ignore_ascii_case("xml") {
            return Err(Error::new(
                ErrorCode::InvalidTagName,
                "the target name \"xml\" (in any case) is reserved",
                target_start.0,
                target_start.1,
            ));
        }

        self.skip_pi_separator()?;
        let value = self.scan_until_literal("?>", row, column)?;
        if is_xml_decl {
            validate_encoding_pseudo_attribute(&value, row, column)?;
        }

        self.node.reset();
        self.node.kind = if is_xml_decl {
            NodeKind::XmlDeclaration
        } else {
            NodeKind::ProcessingInstruction
        };
        self.node.name = target;
        self.node.value = value;
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    fn skip_pi_separator(&mut self) -> Result<(), Error> {
        if matches!(self.peek_cp()?, Some(cp) if crate::chars::is_whitespace(cp)) {
            while matches!(self.peek_cp()?, Some(cp) if crate::chars::is_whitespace(cp)) {
                self.next_cp()?;
            }
        }
        Ok(())
    }

    /// Consumes exactly the ASCII `literal` from the current cursor,
    /// codepoint by codepoint.
    fn expect_literal(&mut self, literal: &str, code: ErrorCode, message: &str) -> Result<(), Error> {
        for expected in literal.chars() {
            match self.next_cp()? {
                Some(cp) if cp == expected as u32 => {}
                _ => return Err(self.error_here(code, message)),
            }
        }
        Ok(())
    }

    /// Reads codepoints until `terminator` (an ASCII literal) is found,
    /// consuming the terminator and returning everything before it.
    ///
    /// Appends every character to `value` and checks its tail against
    /// `terminator` after each one, rather than a restart-on-mismatch
    /// scan: `terminator` can have a self-overlapping prefix (`"]]>"` over
    /// input like `"]]]>"`), which a naive single-pass match gets wrong.
    fn scan_until_literal(&mut self, terminator: &str, start_row: u64, start_column: u64) -> Result<String, Error> {
        let mut value = String::new();
        loop {
            match self.next_cp()? {
                None => {
                    return Err(Error::new(
                        ErrorCode::UnclosedToken,
                        format!("expected \"{}\" before end of input", terminator),
                        start_row,
                        start_column,
                    ))
                }
                Some(cp) => {
                    value.push(char::from_u32(cp).expect("validated by the decoder"));
                    if value.ends_with(terminator) {
                        value.truncate(value.len() - terminator.len());
                        return Ok(value);
                    }
                }
            }
        }
    }
}

/// Finds `encoding="..."`/`encoding='...'` inside an `XmlDeclaration`
/// node's raw value and validates it against the `EncName` production
/// (XML 1.0 §4.3.3), rather than leaving it unchecked like the rest of
/// the declaration's opaque text. Absence of the pseudo-attribute is not
/// an error here: `version` is the only mandatory one.
fn validate_encoding_pseudo_attribute(value: &str, row: u64, column: u64) -> Result<(), Error> {
    let at = match value.find("encoding") {
        Some(at) => at,
        None => return Ok(()),
    };
    let rest = value[at + "encoding".len()..].trim_start();
    let rest = match rest.strip_prefix('=') {
        Some(rest) => rest.trim_start(),
        None => return Ok(()),
    };
    let quote = match rest.chars().next() {
        Some(c) if c == '"' || c == '\'' => c,
        _ => return Ok(()),
    };
    let rest = &rest[quote.len_utf8()..];
    let end = match rest.find(quote) {
        Some(end) => end,
        None => {
            return Err(Error::new(
                ErrorCode::InvalidSyntax,
                "unterminated \"encoding\" pseudo-attribute in the XML declaration",
                row,
                column,
            ))
        }
    };
    let enc_name = &rest[..end];
    let mut chars = enc_name.chars();
    let valid = match chars.next() {
        Some(first) => {
            crate::chars::is_enc_name_start_char(first as u32)
                && chars.all(|c| crate::chars::is_enc_name_char(c as u32))
        }
        None => false,
    };
    if !valid {
        return Err(Error::new(
            ErrorCode::InvalidSyntax,
            format!("\"{}\" is not a legal encoding name", enc_name),
            row,
            column,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Encoding, SliceByteSource};

    fn parser(input: &str) -> Parser<SliceByteSource<'_>> {
        Parser::new(SliceByteSource::new(input.as_bytes()), Encoding::Utf8)
    }

    #[test]
    fn comment_at_top_level() {
        let mut p = parser("<!-- a comment --><root/>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::Comment);
        assert_eq!(p.node().value, " a comment ");
    }

    #[test]
    fn cdata_section_is_passed_through_literally() {
        let mut p = parser("<a><![CDATA[<not a tag>]]></a>");
        assert!(p.read_node());
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::CData);
        assert_eq!(p.node().value, "<not a tag>");
    }

    #[test]
    fn processing_instruction() {
        let mut p = parser("<?style href=\"x.css\"?><root/>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::ProcessingInstruction);
        assert_eq!(p.node().name, "style");
        assert_eq!(p.node().value, "href=\"x.css\"");
    }

    #[test]
    fn xml_declaration_only_at_document_start() {
        let mut p = parser("<?xml version=\"1.0\"?><root/>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::XmlDeclaration);
        assert_eq!(p.node().value, "version=\"1.0\"");
    }

    #[test]
    fn xml_target_elsewhere_is_rejected() {
        let mut p = parser("<root><?xml bogus?></root>");
        assert!(p.read_node());
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::InvalidTagName);
    }

    #[test]
    fn xml_declaration_with_valid_encoding_name() {
        let mut p = parser("<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::XmlDeclaration);
    }

    #[test]
    fn xml_declaration_with_illegal_encoding_name_is_rejected() {
        let mut p = parser("<?xml version=\"1.0\" encoding=\"8BIT\"?><root/>");
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::InvalidSyntax);
    }

    #[test]
    fn doctype_is_skipped_as_opaque_block() {
        let mut p = parser("<!DOCTYPE root [<!ELEMENT root (#PCDATA)>]><root/>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::DocumentType);
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EmptyElement);
    }

    #[test]
    fn unclosed_comment_is_unclosed_token() {
        let mut p = parser("<!-- never closed");
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::UnclosedToken);
    }
}
