//! The XML pull state machine: the one component that ties every other
//! module together. [`Parser::read_node`] is the sole entry point a
//! caller-facing [`crate::reader::Reader`] drives; everything else here is
//! private machinery reachable only through it.
//!
//! Submodules split the state machine along the same lines §4.7 does:
//! [`element`] owns start/end-tag and attribute parsing, [`markup`] owns
//! comments/CDATA/PIs/the DOCTYPE skip, [`entity`] owns predefined and
//! numeric character references.

mod element;
mod entity;
mod markup;

use crate::chars::is_name_start_char;
use crate::decode::{ByteSource, CodepointReader, Encoding, ReadResult};
use crate::error::{Error, ErrorCode};
use crate::namespace::NamespaceStack;
use crate::node::{Node, NodeKind};
use crate::position::PositionTracker;

/// One still-open element, in the order it was pushed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct StackFrame {
    pub qualified_name: String,
    pub prefix: Option<String>,
    pub local_name: String,
    pub row: u64,
    pub column: u64,
}

/// A node the parser must emit on its *next* step without consuming any
/// further input — currently only the implicit end of an `EmptyElement`.
#[derive(Clone, Debug)]
enum Pending {
    EndElement {
        qualified_name: String,
        prefix: Option<String>,
        local_name: String,
        namespace_uri: String,
        depth: u64,
        row: u64,
        column: u64,
    },
}

/// The state machine itself.
///
/// Generic over [`ByteSource`] the same way [`CodepointReader`] is, so a
/// `Parser<ReadByteSource<File>>` and a `Parser<SliceByteSource>` share
/// every line of parsing logic and differ only in where bytes come from.
pub struct Parser<S: ByteSource> {
    reader: CodepointReader<S>,
    position: PositionTracker,
    namespaces: NamespaceStack,
    stack: Vec<StackFrame>,
    node: Node,
    error: Option<Error>,
    pushback: Option<u32>,
    raw_pushback: Option<RawCp>,
    root_seen: bool,
    pending: Option<Pending>,
}

/// One decoded-but-not-yet-normalized codepoint, used only inside the CR
/// lookahead in [`Parser::next_raw`].
#[derive(Clone, Copy, Debug)]
enum RawCp {
    Cp(u32),
    Eof,
}

impl<S: ByteSource> Parser<S> {
    pub fn new(source: S, encoding: Encoding) -> Self {
        Parser {
            reader: CodepointReader::new(source, encoding),
            position: PositionTracker::new(),
            namespaces: NamespaceStack::new(),
            stack: Vec::new(),
            node: Node::new(),
            error: None,
            pushback: None,
            raw_pushback: None,
            root_seen: false,
            pending: None,
        }
    }

    /// Re-initializes the parser with a new source, clearing every error,
    /// stack and buffer as if freshly constructed.
    pub fn reset(&mut self, source: S, encoding: Encoding) {
        self.reader.reset(source, encoding);
        self.position = PositionTracker::new();
        self.namespaces = NamespaceStack::new();
        self.stack.clear();
        self.node.reset();
        self.error = None;
        self.pushback = None;
        self.raw_pushback = None;
        self.root_seen = false;
        self.pending = None;
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn depth(&self) -> u64 {
        self.stack.len() as u64
    }

    /// Advances to the next node. Returns `false` on a clean end of
    /// document or on any error; callers distinguish the two via
    /// [`Parser::error`].
    pub fn read_node(&mut self) -> bool {
        if self.error.is_some() {
            self.node.reset();
            return false;
        }
        if let Some(pending) = self.pending.take() {
            self.emit_pending(pending);
            return true;
        }
        match self.advance() {
            Ok(true) => true,
            Ok(false) => {
                self.node.reset();
                false
            }
            Err(err) => {
                self.error = Some(err);
                self.node.reset();
                false
            }
        }
    }

    fn emit_pending(&mut self, pending: Pending) {
        let Pending::EndElement {
            qualified_name,
            prefix,
            local_name,
            namespace_uri,
            depth,
            row,
            column,
        } = pending;
        self.node.reset();
        self.node.kind = NodeKind::EndElement;
        self.node.name = qualified_name;
        self.node.prefix = prefix;
        self.node.local_name = local_name;
        self.node.namespace_uri = namespace_uri;
        self.node.depth = depth;
        self.node.row = row;
        self.node.column = column;
    }

    /// One full step: produces exactly one real [`Node`], or signals clean
    /// end of document, or fails.
    fn advance(&mut self) -> Result<bool, Error> {
        match self.peek_cp()? {
            None => self.handle_eof(),
            Some(cp) if cp == '<' as u32 => self.parse_markup(),
            Some(cp) if cp == '&' as u32 => {
                if self.stack.is_empty() {
                    Err(self.error_here(
                        ErrorCode::InvalidSyntax,
                        "an entity reference is not allowed outside an element",
                    ))
                } else {
                    self.parse_entity_reference()
                }
            }
            Some(_) => self.parse_text_or_whitespace(),
        }
    }

    fn handle_eof(&mut self) -> Result<bool, Error> {
        if let Some(top) = self.stack.last() {
            let (row, column) = (top.row, top.column);
            let name = top.qualified_name.clone();
            return Err(Error::new(
                ErrorCode::UnclosedTag,
                format!("element <{}> was never closed", name),
                row,
                column,
            ));
        }
        if !self.root_seen {
            return Err(Error::new(
                ErrorCode::NoElement,
                "end of input reached before any element was opened",
                self.position.current_row(),
                self.position.current_column(),
            ));
        }
        Ok(false)
    }

    fn parse_text_or_whitespace(&mut self) -> Result<bool, Error> {
        let top_level = self.stack.is_empty();
        self.position.mark_node_start();
        let (row, column) = (self.position.last_row(), self.position.last_column());
        let mut value = String::new();
        let mut all_whitespace = true;
        loop {
            match self.peek_cp()? {
                None => break,
                Some(cp) if cp == '<' as u32 || cp == '&' as u32 => break,
                Some(cp) => {
                    let is_ws = crate::chars::is_whitespace(cp);
                    if top_level && !is_ws {
                        return Err(self.error_here(
                            ErrorCode::InvalidSyntax,
                            "non-whitespace content is not allowed outside the root element",
                        ));
                    }
                    if !is_ws {
                        all_whitespace = false;
                    }
                    value.push(char::from_u32(cp).expect("validated by the decoder"));
                    self.next_cp()?;
                }
            }
        }
        self.node.reset();
        self.node.kind = if all_whitespace {
            NodeKind::Whitespace
        } else {
            NodeKind::Text
        };
        self.node.value = value;
        self.node.row = row;
        self.node.column = column;
        self.node.depth = self.depth();
        Ok(true)
    }

    fn parse_markup(&mut self) -> Result<bool, Error> {
        self.position.mark_node_start();
        let (row, column) = (self.position.last_row(), self.position.last_column());
        self.next_cp()?; // consume '<'
        match self.peek_cp()? {
            Some(cp) if cp == '/' as u32 => self.parse_end_tag(row, column),
            Some(cp) if cp == '?' as u32 => self.parse_processing_instruction(row, column),
            Some(cp) if cp == '!' as u32 => self.parse_bang(row, column),
            Some(cp) if is_name_start_char(cp) => self.parse_start_or_empty_element(row, column),
            Some(_) => Err(self.error_here(
                ErrorCode::InvalidSyntax,
                "expected a name, '/', '?' or '!' after '<'",
            )),
            None => Err(self.error_here(ErrorCode::UnclosedToken, "'<' at end of input")),
        }
    }

    fn parse_bang(&mut self, row: u64, column: u64) -> Result<bool, Error> {
        self.next_cp()?; // consume '!'
        match self.peek_cp()? {
            Some(cp) if cp == '-' as u32 => self.parse_comment(row, column),
            Some(cp) if cp == '[' as u32 => self.parse_cdata(row, column),
            Some(cp) if is_name_start_char(cp) => self.parse_doctype(row, column),
            _ => Err(self.error_here(
                ErrorCode::InvalidSyntax,
                "expected '--', '[CDATA[' or 'DOCTYPE' after '<!'",
            )),
        }
    }

    // -- low-level codepoint cursor -----------------------------------

    /// Reads one raw (not-yet-line-end-normalized) codepoint from the
    /// decoder, translating a terminal [`ReadResult`] into `Ok(RawCp::Eof)`
    /// or an [`Error`].
    fn read_raw(&mut self) -> Result<RawCp, Error> {
        match self.reader.read_character() {
            ReadResult::Ok(cp) => Ok(RawCp::Cp(cp)),
            ReadResult::EndOfInput => Ok(RawCp::Eof),
            ReadResult::InvalidCharacter(_) => Err(Error::new(
                ErrorCode::InvalidByteSequence,
                "malformed byte sequence or disallowed character",
                self.position.current_row(),
                self.position.current_column(),
            )),
            ReadResult::SourceError => Err(Error::new(
                ErrorCode::StreamError,
                "the underlying byte source failed",
                self.position.current_row(),
                self.position.current_column(),
            )),
        }
    }

    /// One raw codepoint, applying XML 1.0 §2.11 line-end normalization:
    /// `"\r\n"` and a lone `"\r"` both become a single `"\n"`.
    fn next_raw_normalized(&mut self) -> Result<Option<u32>, Error> {
        let first = match self.raw_pushback.take() {
            Some(cp) => cp,
            None => self.read_raw()?,
        };
        match first {
            RawCp::Eof => Ok(None),
            RawCp::Cp(cp) if cp == 0x0D => {
                let next = self.read_raw()?;
                if !matches!(next, RawCp::Cp(n) if n == 0x0A) {
                    self.raw_pushback = Some(next);
                }
                Ok(Some(0x0A))
            }
            RawCp::Cp(cp) => Ok(Some(cp)),
        }
    }

    /// Returns the next normalized codepoint without consuming it or
    /// moving the position tracker.
    fn peek_cp(&mut self) -> Result<Option<u32>, Error> {
        if self.pushback.is_none() {
            self.pushback = self.next_raw_normalized()?;
        }
        Ok(self.pushback)
    }

    /// Consumes and returns the next normalized codepoint, advancing the
    /// position tracker over it.
    fn next_cp(&mut self) -> Result<Option<u32>, Error> {
        let cp = match self.pushback.take() {
            Some(cp) => Some(cp),
            None => self.next_raw_normalized()?,
        };
        if let Some(cp) = cp {
            self.position.advance(cp);
        }
        Ok(cp)
    }

    /// Builds an [`Error`] pinned at the read cursor's current position —
    /// the right anchor for syntax errors detected mid-token.
    fn error_here(&self, code: ErrorCode, message: impl Into<String>) -> Error {
        Error::new(
            code,
            message,
            self.position.current_row(),
            self.position.current_column(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SliceByteSource;

    fn parser(input: &str) -> Parser<SliceByteSource<'_>> {
        Parser::new(SliceByteSource::new(input.as_bytes()), Encoding::Utf8)
    }

    #[test]
    fn scenario_1_unclosed_root() {
        let mut p = parser("<element>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::StartElement);
        assert_eq!(p.node().name, "element");
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 1, 0));
        assert!(!p.read_node());
        assert_eq!(p.error().unwrap().code(), ErrorCode::UnclosedTag);
    }

    #[test]
    fn scenario_2_minimal_element() {
        let mut p = parser("<a></a>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::StartElement);
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 1, 0));
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EndElement);
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 4, 0));
        assert!(!p.read_node());
        assert!(p.error().is_none());
    }

    #[test]
    fn scenario_3_text_content() {
        let mut p = parser("<root>bytes test</root>");
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::StartElement);
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::Text);
        assert_eq!(p.node().value, "bytes test");
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 7, 1));
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EndElement);
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 17, 0));
    }

    #[test]
    fn scenario_4_whitespace_with_no_root() {
        let bytes: &[u8] = &[0x0D, 0x09, 0x0D, 0x0A, 0x20, 0x0A, 0x0D, 0x20, 0x0D];
        let mut p = Parser::new(SliceByteSource::new(bytes), Encoding::Utf8);
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::Whitespace);
        assert_eq!(p.node().value, "\n\t\n \n\n \n");
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 1, 0));
        assert!(!p.read_node());
        let err = p.error().unwrap();
        assert_eq!(err.code(), ErrorCode::NoElement);
        assert_eq!((err.row(), err.column()), (6, 1));
    }

    #[test]
    fn scenario_5_xml_prefix_is_predeclared() {
        let mut p = parser("<xml:local>");
        assert!(p.read_node());
        let n = p.node();
        assert_eq!(n.name, "xml:local");
        assert_eq!(n.prefix.as_deref(), Some("xml"));
        assert_eq!(n.local_name, "local");
        assert_eq!(n.namespace_uri, crate::namespace::XML_URI);
        assert_eq!((n.row, n.column, n.depth), (1, 1, 0));
    }

    #[test]
    fn scenario_6_xmlns_prefix_is_rejected() {
        let mut p = parser("<xmlns:local>");
        assert!(!p.read_node());
        let err = p.error().unwrap();
        assert_eq!(err.code(), ErrorCode::PrefixWithoutAssignedNamespace);
        assert_eq!((err.row(), err.column()), (1, 2));
    }

    #[test]
    fn scenario_7_unclosed_ancestor_reports_its_own_position() {
        let mut p = parser("<a><b><c></c>");
        assert!(p.read_node());
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 1, 0));
        assert!(p.read_node());
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 4, 1));
        assert!(p.read_node());
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 7, 2));
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EndElement);
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 10, 2));
        assert!(!p.read_node());
        let err = p.error().unwrap();
        assert_eq!(err.code(), ErrorCode::UnclosedTag);
        assert_eq!((err.row(), err.column()), (1, 4));
    }

    #[test]
    fn scenario_8_multiline_text() {
        let mut p = parser("<element>\n  some !@#*(;:[>  text  \n</element>");
        assert!(p.read_node());
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 1, 0));
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::Text);
        assert_eq!(p.node().value, "\n  some !@#*(;:[>  text  \n");
        assert_eq!((p.node().row, p.node().column, p.node().depth), (1, 10, 1));
        assert!(p.read_node());
        assert_eq!(p.node().kind, NodeKind::EndElement);
        assert_eq!((p.node().row, p.node().column, p.node().depth), (3, 1, 0));
    }

    #[test]
    fn error_sticky_across_repeated_calls() {
        let mut p = parser("<a><b>");
        assert!(p.read_node());
        assert!(p.read_node());
        assert!(!p.read_node());
        let first = p.error().unwrap().clone();
        assert!(!p.read_node());
        let second = p.error().unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(p.node().kind, NodeKind::None);
    }

    #[test]
    fn reset_clears_error_and_stacks() {
        let mut p = parser("<a>");
        assert!(p.read_node());
        assert!(!p.read_node());
        assert!(p.error().is_some());
        p.reset(SliceByteSource::new(b"<a></a>"), Encoding::Utf8);
        assert!(p.error().is_none());
        assert!(p.read_node());
        assert!(p.read_node());
        assert!(!p.read_node());
        assert!(p.error().is_none());
    }
}
