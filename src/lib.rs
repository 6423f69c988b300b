//! A forward-only, pull-style XML 1.0 parser.
//!
//! There is no DOM and no callback registration: a caller drives
//! [`Reader::read_node`] itself, one node at a time, and reads the current
//! node's fields off the reader between calls. The crate is split into
//! three layers that mirror the three concerns a conforming parser has to
//! get right independently:
//!
//! - [`decode`] / [`encode`]: turn bytes into Unicode codepoints and back,
//!   for UTF-8 and UTF-16/UTF-32 in both byte orders.
//! - [`namespace`] / [`name`] / [`node`]: the data model namespace
//!   resolution and qualified names are built out of.
//! - [`parser`]: the XML 1.0 grammar itself, driven one codepoint at a time
//!   over whichever [`decode::ByteSource`] the caller supplied.
//!
//! [`reader::Reader`] is the only type most callers need; the rest is
//! exposed for embedders that want to drive the state machine directly.

pub mod chars;
pub mod decode;
pub mod encode;
pub mod error;
pub mod name;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod position;
pub mod reader;

pub use error::{Error, ErrorCode};
pub use name::QName;
pub use node::{Attribute, Node, NodeKind};
pub use reader::{Config, Reader};
