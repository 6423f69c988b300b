//! Qualified-name splitting: `prefix ":" localName`, or just `localName`.
//!
//! Grounded on the same "split on first colon, validate both halves"
//! shape the teacher's `NamespaceResolver` uses internally, but exposed
//! here as a free function since this crate's element-stack frames need
//! the split eagerly rather than lazily.

use crate::chars::{is_name_char, is_name_start_char};

/// A name split into its optional prefix and mandatory local part.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_name: String,
}

impl QName {
    /// Reassembles the qualified form, e.g. `"xml:lang"` or `"id"`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Splits `name` at its first `:`, provided `name` is itself a legal XML
/// `Name` (validated codepoint-by-codepoint, not just "non-empty").
///
/// Returns `None` if `name` is empty, contains more than one `:`, has a
/// non-name-start-char immediately after the split point, or contains any
/// codepoint `IsNameChar` rejects.
pub fn split_qname(name: &str) -> Option<QName> {
    let mut char_indices = name.char_indices();
    let (_, first) = char_indices.next()?;
    if !is_name_start_char(first as u32) {
        return None;
    }

    // A leading colon is only a legal prefix separator if there is a
    // non-empty prefix on its left, which a colon at position 0 never has.
    // The sole exception is ":" itself: with nothing to split into two
    // non-empty halves, it is simplest to treat the whole thing as an
    // unprefixed name rather than reject a single legal NameStartChar.
    if first == ':' {
        return if name.len() == 1 {
            Some(QName {
                prefix: None,
                local_name: name.to_string(),
            })
        } else {
            None
        };
    }

    let mut colon_byte_index: Option<usize> = None;
    for (byte_index, ch) in char_indices {
        if ch == ':' {
            if colon_byte_index.is_some() {
                return None; // at most one colon
            }
            colon_byte_index = Some(byte_index);
        } else if !is_name_char(ch as u32) {
            return None;
        }
    }

    match colon_byte_index {
        None => Some(QName {
            prefix: None,
            local_name: name.to_string(),
        }),
        Some(at) => {
            let prefix = &name[..at];
            let local = &name[at + 1..];
            let local_first = local.chars().next()?;
            if prefix.is_empty() || local.is_empty() || !is_name_start_char(local_first as u32) {
                return None;
            }
            Some(QName {
                prefix: Some(prefix.to_string()),
                local_name: local.to_string(),
            })
        }
    }
}
