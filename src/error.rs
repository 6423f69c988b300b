//! Error reporting.
//!
//! The parser never recovers from a well-formedness violation: the first
//! [`Error`] it produces is latched into the reader and is reported again,
//! unchanged, by every subsequent [`crate::reader::Reader::read_node`] call.

use std::fmt;

/// The closed set of error categories the parser can report.
///
/// Variants are grouped the way source, encoding, syntax, structural and
/// namespace failures are grouped in the design: a caller that only cares
/// about "did the byte source fail" or "was this well-formed" can match on
/// this enum without inspecting [`Error::message`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// No error has occurred yet. Never appears in a raised [`Error`]; this
    /// is the state reported by [`crate::reader::Reader::error_code`] before
    /// the first failure.
    None,
    /// The underlying byte source failed without reaching end-of-input.
    StreamError,
    /// A byte sequence was malformed, or decoded to a codepoint that is not
    /// allowed by the `Char` production.
    InvalidByteSequence,
    /// The grammar was violated: a token did not match any production
    /// expected at this point.
    InvalidSyntax,
    /// An element or attribute name was not a legal `Name`.
    InvalidTagName,
    /// End of input was reached before any element was opened.
    NoElement,
    /// A quoted value, comment, CDATA section or processing instruction was
    /// not closed before end of input.
    UnclosedToken,
    /// End of input, or the document's trailing material, was reached while
    /// the element stack was non-empty.
    UnclosedTag,
    /// An end-tag was seen that does not match the top of the element stack.
    UnexpectedEndTag,
    /// A namespace prefix has no assigned namespace, including the
    /// specific case of `xmlns` used as an element or attribute prefix.
    PrefixWithoutAssignedNamespace,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::None => "None",
            ErrorCode::StreamError => "StreamError",
            ErrorCode::InvalidByteSequence => "InvalidByteSequence",
            ErrorCode::InvalidSyntax => "InvalidSyntax",
            ErrorCode::InvalidTagName => "InvalidTagName",
            ErrorCode::NoElement => "NoElement",
            ErrorCode::UnclosedToken => "UnclosedToken",
            ErrorCode::UnclosedTag => "UnclosedTag",
            ErrorCode::UnexpectedEndTag => "UnexpectedEndTag",
            ErrorCode::PrefixWithoutAssignedNamespace => "PrefixWithoutAssignedNamespace",
        };
        f.write_str(name)
    }
}

/// A single parse failure, pinned to the position of the offending
/// codepoint.
///
/// `row`/`column` follow the same normalization rules as a [`Node`]'s
/// position (see [`crate::position`]): they point at `last`, the start of
/// the token that could not be completed.
///
/// [`Node`]: crate::node::Node
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    row: u64,
    column: u64,
}

impl Error {
    pub(crate) fn new(code: ErrorCode, message: impl Into<String>, row: u64, column: u64) -> Self {
        Error {
            code,
            message: message.into(),
            row,
            column,
        }
    }

    /// The category of this failure.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// A human-readable, free-form description. Stable across repeated
    /// calls for the same underlying failure, but not an API contract: do
    /// not pattern-match on its text, match on [`Error::code`] instead.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based row of the codepoint that triggered this error.
    pub fn row(&self) -> u64 {
        self.row
    }

    /// 1-based column of the codepoint that triggered this error.
    pub fn column(&self) -> u64 {
        self.column
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.code, self.row, self.column, self.message
        )
    }
}

impl std::error::Error for Error {}
