//! End-to-end pull-parsing tests over the public [`xmlpull::Reader`].

use pretty_assertions::assert_eq;
use xmlpull::decode::{Encoding, SliceByteSource};
use xmlpull::{Config, NodeKind, Reader};

#[test]
fn walks_a_simple_document_depth_first() {
    let mut r = Reader::from_slice(b"<root><a>text</a><b/></root>", Config::new());

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::StartElement);
    assert_eq!(r.name(), "root");
    assert_eq!(r.depth(), 0);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::StartElement);
    assert_eq!(r.name(), "a");
    assert_eq!(r.depth(), 1);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::Text);
    assert_eq!(r.value(), "text");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EndElement);
    assert_eq!(r.name(), "a");
    assert_eq!(r.depth(), 1);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EmptyElement);
    assert_eq!(r.name(), "b");
    assert_eq!(r.depth(), 1);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EndElement);
    assert_eq!(r.name(), "b");
    assert_eq!(r.depth(), 1);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EndElement);
    assert_eq!(r.name(), "root");
    assert_eq!(r.depth(), 0);

    assert!(!r.read_node());
    assert!(r.error().is_none());
}

#[test]
fn reset_reuses_the_reader_for_a_second_document() {
    let mut r = Reader::from_slice(b"<a/>", Config::new());
    assert!(r.read_node());
    assert_eq!(r.name(), "a");
    assert!(r.read_node());
    assert!(!r.read_node());

    r.reset(SliceByteSource::new(b"<b/>"), Encoding::Utf8);
    assert!(r.read_node());
    assert_eq!(r.name(), "b");
}

#[test]
fn comments_cdata_and_processing_instructions_surface_as_nodes() {
    let mut r = Reader::from_slice(
        b"<!--c--><root><![CDATA[<raw>]]><?pi data?></root>",
        Config::new(),
    );

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::Comment);
    assert_eq!(r.value(), "c");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::StartElement);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::CData);
    assert_eq!(r.value(), "<raw>");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::ProcessingInstruction);
    assert_eq!(r.name(), "pi");
    assert_eq!(r.value(), "data");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EndElement);
}

#[test]
fn entity_and_character_references_surface_as_their_own_nodes() {
    let mut r = Reader::from_slice(b"<a>&amp;&#65;&#x42;</a>", Config::new());
    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::StartElement);

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EntityReference);
    assert_eq!(r.name(), "amp");
    assert_eq!(r.value(), "&");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EntityReference);
    assert_eq!(r.value(), "A");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EntityReference);
    assert_eq!(r.value(), "B");

    assert!(r.read_node());
    assert_eq!(r.node_type(), NodeKind::EndElement);
}
