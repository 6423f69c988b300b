//! The namespace scope stack: one binding frame per open element.
//!
//! Grounded on the teacher's `NamespaceResolver` (`src/name.rs`), but
//! reshaped into an explicit per-element `Vec<Binding>` stack rather than a
//! flat buffer-offset list: §3's `Element-stack frame` already carries its
//! own `declaredPrefixBindings`, so the namespace stack and the element
//! stack are the same data structure here, not two parallel ones.

use std::fmt;

/// Canonical URI of the predeclared `xml` prefix.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// Canonical URI of the predeclared `xmlns` prefix.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// One `prefix -> uri` binding declared in a single element's start-tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
    /// `None` for a default-namespace declaration (`xmlns="..."`).
    pub prefix: Option<String>,
    pub uri: String,
}

/// Why a `xmlns*` declaration was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindingError {
    /// `xmlns` declared as a prefix (`xmlns:xmlns="..."`), which is
    /// forbidden regardless of the URI supplied.
    XmlnsPrefixReserved,
    /// `xml` bound to something other than its canonical URI.
    XmlPrefixLocked,
    /// The canonical `xmlns` URI bound to a prefix other than `xmlns`.
    XmlnsUriReserved,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BindingError::XmlnsPrefixReserved => "the prefix \"xmlns\" may not be declared",
            BindingError::XmlPrefixLocked => {
                "the prefix \"xml\" may only be bound to its canonical namespace URI"
            }
            BindingError::XmlnsUriReserved => {
                "the xmlns namespace URI may not be bound to any prefix but \"xmlns\""
            }
        };
        f.write_str(msg)
    }
}

/// Checks one proposed declaration against the fixed rules in §4.6 before
/// it is pushed onto a frame. `prefix` is `None` for a default-namespace
/// declaration.
pub fn validate_binding(prefix: Option<&str>, uri: &str) -> Result<(), BindingError> {
    if prefix == Some("xmlns") {
        return Err(BindingError::XmlnsPrefixReserved);
    }
    if prefix == Some("xml") && uri != XML_URI {
        return Err(BindingError::XmlPrefixLocked);
    }
    if uri == XMLNS_URI && prefix != Some("xmlns") {
        return Err(BindingError::XmlnsUriReserved);
    }
    Ok(())
}

/// The namespace scope stack. Each element of `frames` holds the bindings
/// declared directly on one open element, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct NamespaceStack {
    frames: Vec<Vec<Binding>>,
}

impl NamespaceStack {
    pub fn new() -> Self {
        NamespaceStack { frames: Vec::new() }
    }

    /// Opens a new, empty frame for an element about to be pushed onto the
    /// element stack.
    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Closes the innermost frame, discarding its bindings.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Declares a binding in the innermost open frame. Caller must have
    /// already validated it with [`validate_binding`].
    pub fn declare(&mut self, prefix: Option<String>, uri: String) {
        if let Some(top) = self.frames.last_mut() {
            top.push(Binding { prefix, uri });
        }
    }

    /// Current nesting depth, i.e. number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Resolves `prefix` (`None` for the default namespace) to a URI,
    /// searching frames innermost-first, then the two predeclared
    /// bindings. An empty-string URI from an unbinding declaration
    /// (`xmlns=""`) is returned as-is, not treated as "not found".
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        for frame in self.frames.iter().rev() {
            for binding in frame.iter().rev() {
                if binding.prefix.as_deref() == prefix {
                    return Some(binding.uri.as_str());
                }
            }
        }
        match prefix {
            Some("xml") => Some(XML_URI),
            Some("xmlns") => Some(XMLNS_URI),
            _ => None,
        }
    }

    /// Resolves an element's namespace URI for `prefix`: unprefixed
    /// element names fall back to whatever default namespace is bound
    /// (possibly none).
    pub fn resolve_element(&self, prefix: Option<&str>) -> Option<&str> {
        self.resolve(prefix)
    }

    /// Resolves an attribute's namespace URI for `prefix`. Unlike
    /// elements, an unprefixed attribute never picks up the default
    /// namespace: it always has the empty URI.
    pub fn resolve_attribute(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            None => Some(""),
            Some(_) => self.resolve(prefix),
        }
    }
}
