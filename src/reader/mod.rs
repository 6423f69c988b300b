//! The caller-facing pull interface (§6): wraps a [`crate::parser::Parser`]
//! with the input-source constructors and output-encoding selection the
//! core spells out, and is the only public entry point into this crate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::decode::{self, ByteSource, Encoding, ReadByteSource, SliceByteSource};
use crate::encode::Encoder;
use crate::error::Error;
use crate::node::{Attribute, Node, NodeKind};
use crate::parser::Parser;

/// Construction-time options. Grounded on the teacher's `Config`/builder
/// pattern (`quick_xml::reader::Config`): every field has a sensible
/// default and is set through a `with_*` builder method, not a public
/// struct literal, so new options can be added without breaking callers.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    output_encoding: Encoding,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_encoding: Encoding::Utf8,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Selects the encoding [`Reader::encode_value`] and friends re-encode
    /// node strings into (§4.4, §6). Parsing itself is unaffected: the
    /// parser's internal representation is always a Rust `String`.
    pub fn with_output_encoding(mut self, encoding: Encoding) -> Self {
        self.output_encoding = encoding;
        self
    }
}

/// The pull-style reader. Generic over the byte source the same way
/// [`Parser`] is; [`Reader::from_path`], [`Reader::from_stream`] and
/// [`Reader::from_slice`] each pick a concrete `S`.
pub struct Reader<S: ByteSource> {
    parser: Parser<S>,
    config: Config,
}

impl<S: ByteSource> Reader<S> {
    /// Builds a reader directly from a byte source and a pre-detected (or
    /// user-declared) encoding, bypassing BOM sniffing entirely. This is
    /// the "user-implemented character reader" input variant from §6: the
    /// caller asserts the encoding itself.
    pub fn with_encoding(source: S, encoding: Encoding, config: Config) -> Self {
        Reader {
            parser: Parser::new(source, encoding),
            config,
        }
    }

    /// Re-initializes this reader with a new source, clearing errors,
    /// stacks, and the current node.
    pub fn reset(&mut self, source: S, encoding: Encoding) {
        self.parser.reset(source, encoding);
    }

    /// Releases no resources beyond what `reset` already clears: there is
    /// no background task or file handle this type owns independently of
    /// `S` itself. Provided for parity with §6's `Clear()`.
    pub fn clear(&mut self, source: S, encoding: Encoding) {
        self.reset(source, encoding);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Advances to the next node. `false` means either a clean end of
    /// document or a failure — check [`Reader::error`] to distinguish.
    pub fn read_node(&mut self) -> bool {
        self.parser.read_node()
    }

    fn node(&self) -> &Node {
        self.parser.node()
    }

    pub fn node_type(&self) -> NodeKind {
        self.node().kind
    }

    pub fn name(&self) -> &str {
        &self.node().name
    }

    pub fn local_name(&self) -> &str {
        &self.node().local_name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.node().prefix.as_deref()
    }

    pub fn namespace_uri(&self) -> &str {
        &self.node().namespace_uri
    }

    pub fn value(&self) -> &str {
        &self.node().value
    }

    pub fn has_attributes(&self) -> bool {
        self.node().has_attributes()
    }

    pub fn attributes_count(&self) -> usize {
        self.node().attributes_count()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.node().attributes.iter()
    }

    pub fn attribute(&self, namespace_uri: &str, local_name: &str) -> Option<&Attribute> {
        self.node().attribute(namespace_uri, local_name)
    }

    pub fn error_code(&self) -> crate::error::ErrorCode {
        self.parser
            .error()
            .map(Error::code)
            .unwrap_or(crate::error::ErrorCode::None)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.parser.error().map(Error::message)
    }

    pub fn error(&self) -> Option<&Error> {
        self.parser.error()
    }

    pub fn row(&self) -> u64 {
        self.node().row
    }

    pub fn column(&self) -> u64 {
        self.node().column
    }

    pub fn depth(&self) -> u64 {
        self.node().depth
    }

    /// Re-encodes `s` into this reader's configured output encoding
    /// (§4.4), for callers that need the byte form of a name/value/
    /// namespace URI field rather than the `&str` accessors above.
    pub fn encode_value(&self, s: &str) -> Vec<u8> {
        Encoder::new(self.config.output_encoding).encode_str(s)
    }
}

impl Reader<ReadByteSource<File>> {
    /// Opens `path`, sniffs its BOM, and builds a reader over it. The
    /// parser owns the file handle and closes it when dropped.
    pub fn from_path(path: impl AsRef<Path>, config: Config) -> std::io::Result<Self> {
        let mut file = File::open(path)?;
        let mut prefix = [0u8; 4];
        let mut prefix_len = 0usize;
        while prefix_len < 4 {
            match file.read(&mut prefix[prefix_len..]) {
                Ok(0) => break,
                Ok(n) => prefix_len += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        let bom = decode::bom::detect(&prefix[..prefix_len]);
        let (encoding, consumed) = match bom {
            Some(m) => (m.encoding, m.len),
            None => (Encoding::Utf8, 0),
        };
        let leftover = prefix[consumed..prefix_len].to_vec();
        let source = ReadByteSource::new(PrefixedRead::new(leftover, file));
        Ok(Reader::with_encoding(source, encoding, config))
    }
}

impl<'a> Reader<SliceByteSource<'a>> {
    /// Builds a reader over a borrowed byte slice (the "pair of forward
    /// iterators over bytes" input variant from §6), sniffing its BOM.
    pub fn from_slice(bytes: &'a [u8], config: Config) -> Self {
        let (encoding, consumed) = match decode::bom::detect(bytes) {
            Some(m) => (m.encoding, m.len),
            None => (Encoding::Utf8, 0),
        };
        Reader::with_encoding(SliceByteSource::new(&bytes[consumed..]), encoding, config)
    }
}

impl<R: Read> Reader<ReadByteSource<R>> {
    /// Builds a reader over a pre-opened, caller-owned byte stream,
    /// sniffing its BOM off the front.
    pub fn from_stream(mut stream: R, config: Config) -> std::io::Result<Self> {
        let mut prefix = [0u8; 4];
        let mut prefix_len = 0usize;
        while prefix_len < 4 {
            match stream.read(&mut prefix[prefix_len..]) {
                Ok(0) => break,
                Ok(n) => prefix_len += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        let bom = decode::bom::detect(&prefix[..prefix_len]);
        let (encoding, consumed) = match bom {
            Some(m) => (m.encoding, m.len),
            None => (Encoding::Utf8, 0),
        };
        let leftover = prefix[consumed..prefix_len].to_vec();
        let source = ReadByteSource::new(PrefixedRead::new(leftover, stream));
        Ok(Reader::with_encoding(source, encoding, config))
    }
}

/// Splices bytes already pulled off the front of a stream (while sniffing
/// its BOM) back in front of the stream itself, so the decoder sees an
/// unbroken sequence starting right after the consumed BOM bytes.
struct PrefixedRead<R: Read> {
    prefix: Vec<u8>,
    prefix_pos: usize,
    inner: R,
}

impl<R: Read> PrefixedRead<R> {
    fn new(prefix: Vec<u8>, inner: R) -> Self {
        PrefixedRead {
            prefix,
            prefix_pos: 0,
            inner,
        }
    }
}

impl<R: Read> Read for PrefixedRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.prefix_pos < self.prefix.len() {
            let remaining = &self.prefix[self.prefix_pos..];
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.prefix_pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}
