//! The node record the parser exposes to callers: reset once at
//! construction, overwritten on every successful step, reset again (with
//! the error record taking over as authoritative) on failure.

/// What kind of node is currently exposed.
///
/// Only `None`, `StartElement`/`EndElement`/`EmptyElement`, `Text` and
/// `Whitespace` are guaranteed to be produced by the core grammar; the
/// remaining tags are forward-compatible and are emitted where §4.7 names
/// them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    None,
    StartElement,
    EndElement,
    EmptyElement,
    Text,
    Whitespace,
    CData,
    Comment,
    ProcessingInstruction,
    XmlDeclaration,
    DocumentType,
    EntityReference,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::None
    }
}

/// One attribute on a `StartElement`/`EmptyElement` node, in document order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub local_name: String,
    pub qualified_name: String,
    pub namespace_uri: String,
    pub value: String,
}

/// The parser's currently-exposed record.
///
/// `row`/`column`/`depth` describe where the node *started*, not the
/// reader's current position (see [`crate::position::PositionTracker`]).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub local_name: String,
    pub prefix: Option<String>,
    pub namespace_uri: String,
    pub value: String,
    pub attributes: Vec<Attribute>,
    pub row: u64,
    pub column: u64,
    pub depth: u64,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            kind: NodeKind::None,
            name: String::new(),
            local_name: String::new(),
            prefix: None,
            namespace_uri: String::new(),
            value: String::new(),
            attributes: Vec::new(),
            row: 1,
            column: 1,
            depth: 0,
        }
    }
}

impl Node {
    /// The sentinel state: `kind = None`, every string empty, no
    /// attributes, position pinned at the document start.
    pub fn new() -> Self {
        Node::default()
    }

    /// Resets every field back to the sentinel state in place, so the
    /// reader can reuse the allocation its `String`/`Vec` fields already
    /// hold instead of reallocating on every step.
    pub fn reset(&mut self) {
        self.kind = NodeKind::None;
        self.name.clear();
        self.local_name.clear();
        self.prefix = None;
        self.namespace_uri.clear();
        self.value.clear();
        self.attributes.clear();
        self.row = 1;
        self.column = 1;
        self.depth = 0;
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn attributes_count(&self) -> usize {
        self.attributes.len()
    }

    /// Looks up an attribute by its fully-resolved identity
    /// `(namespace_uri, local_name)`, the same key uniqueness is checked
    /// against while parsing.
    pub fn attribute(&self, namespace_uri: &str, local_name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.namespace_uri == namespace_uri && a.local_name == local_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_sentinel() {
        let n = Node::new();
        assert_eq!(n.kind, NodeKind::None);
        assert_eq!(n.name, "");
        assert!(!n.has_attributes());
        assert_eq!(n.row, 1);
        assert_eq!(n.column, 1);
    }

    #[test]
    fn reset_restores_sentinel_after_mutation() {
        let mut n = Node::new();
        n.kind = NodeKind::StartElement;
        n.name = "root".into();
        n.attributes.push(Attribute {
            local_name: "id".into(),
            qualified_name: "id".into(),
            ..Default::default()
        });
        n.row = 3;
        n.column = 5;
        n.depth = 2;
        n.reset();
        assert_eq!(n.kind, NodeKind::None);
        assert_eq!(n.name, "");
        assert!(n.attributes.is_empty());
        assert_eq!((n.row, n.column, n.depth), (1, 1, 0));
    }

    #[test]
    fn attribute_lookup_matches_on_resolved_identity() {
        let mut n = Node::new();
        n.attributes.push(Attribute {
            prefix: Some("xml".into()),
            local_name: "lang".into(),
            qualified_name: "xml:lang".into(),
            namespace_uri: "http://www.w3.org/XML/1998/namespace".into(),
            value: "en".into(),
        });
        let found = n
            .attribute("http://www.w3.org/XML/1998/namespace", "lang")
            .unwrap();
        assert_eq!(found.value, "en");
        assert!(n.attribute("", "lang").is_none());
    }
}
