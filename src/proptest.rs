//! Proptest support
//!
//! Proptests allow you to test for *properties* of your code that must hold
//! for arbitrary data. This module helps you write a proptest by letting you
//! generate an arbitrary XML document as a [`fixed::Document`], which you
//! can write to any [`XmlWriter`](crate::XmlWriter).
//!
//! This can be enabled by adding the `proptest` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! xmlreplay = { version = "0.1", features = ["proptest"] }
//! ```
//!
//! See the [`proptest`](https://docs.rs/proptest/latest/proptest/)
//! documentation for more information.
//!
//! [`fixed::Document`]: crate::fixed::Document

use ahash::HashSet;
use proptest::prelude::*;

use crate::fixed::{Content, Document, DocumentContent, Element, Name, Prefix, ProcessingInstruction};

const NAMESPACES: &[&str] = &["", "http://example.com/x", "http://example.com/y"];
const PREFIXES: &[&str] = &["", "x", "y"];
const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "d", "e"];
const ATTRIBUTE_NAMES: &[&str] = &["q", "r", "s"];
const PI_NAMES: &[&str] = &["pi1", "pi2", "pi3", "pi4", "pi5"];
const XML_STRING: &str = "[\u{000a}\u{0009}][\u{0020}-\u{D7FF}][\u{E000}-\u{FFFD}]*";
const XML_STRING_WITHOUT_WHITESPACE: &str = "[\u{0020}-\u{D7FF}][\u{E000}-\u{FFFD}]*";

fn name(namespace: &str, localname: &str) -> Name {
    Name {
        namespace: namespace.to_string(),
        localname: localname.to_string(),
    }
}

fn arb_attribute() -> impl Strategy<Value = (Name, String)> {
    (
        prop::sample::select(ATTRIBUTE_NAMES),
        prop::sample::select(NAMESPACES),
        XML_STRING_WITHOUT_WHITESPACE,
    )
        .prop_map(|(localname, namespace, value)| (name(namespace, localname), value))
}

fn arb_prefix() -> impl Strategy<Value = Prefix> {
    (
        prop::sample::select(PREFIXES),
        prop::sample::select(NAMESPACES),
    )
        .prop_map(|(prefix, namespace)| Prefix {
            name: prefix.to_string(),
            namespace: namespace.to_string(),
        })
}

fn arb_comment() -> impl Strategy<Value = String> {
    XML_STRING.prop_filter("comment", |s| !s.contains('-'))
}

fn arb_processing_instruction() -> impl Strategy<Value = ProcessingInstruction> {
    (
        prop::sample::select(PI_NAMES),
        prop::option::of(
            XML_STRING_WITHOUT_WHITESPACE
                .prop_filter("non-empty string", |s| !s.is_empty() && !s.contains("?>")),
        ),
    )
        .prop_map(|(target, content)| ProcessingInstruction {
            target: target.to_string(),
            content,
        })
}

fn element(
    localname: &str,
    namespace: &str,
    children: Vec<Content>,
    attributes: Vec<(Name, String)>,
    prefixes: Vec<Prefix>,
) -> Element {
    Element {
        name: name(namespace, localname),
        attributes: unduplicate_attributes(attributes),
        prefixes: unduplicate_prefixes(namespace, prefixes),
        children,
    }
}

fn arb_content() -> impl Strategy<Value = Content> {
    let leaf = prop_oneof![
        XML_STRING.prop_map(Content::Text),
        arb_comment().prop_map(Content::Comment),
        arb_processing_instruction().prop_map(Content::ProcessingInstruction),
    ];

    leaf.prop_recursive(
        8,   // levels deep
        256, // maximum size of 256 nodes
        10,  // up to 10 items per collection
        |inner| {
            (
                prop::sample::select(ELEMENT_NAMES),
                prop::sample::select(NAMESPACES),
                prop::collection::vec(inner, 0..10),
                prop::collection::vec(arb_attribute(), 0..4),
                prop::collection::vec(arb_prefix(), 0..4),
            )
                .prop_map(|(localname, namespace, children, attributes, prefixes)| {
                    Content::Element(element(
                        localname, namespace, children, attributes, prefixes,
                    ))
                })
        },
    )
}

prop_compose! {
    fn arb_element()(localname in prop::sample::select(ELEMENT_NAMES),
                     namespace in prop::sample::select(NAMESPACES),
                     child in arb_content(),
                     attributes in prop::collection::vec(arb_attribute(), 0..4),
                     prefixes in prop::collection::vec(arb_prefix(), 0..4)) -> Element {
        element(localname, namespace, vec![child], attributes, prefixes)
    }
}

fn unduplicate_attributes(attributes: Vec<(Name, String)>) -> Vec<(Name, String)> {
    let mut seen = HashSet::default();
    attributes
        .into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .collect()
}

// an element in no namespace can't declare a default namespace
fn unduplicate_prefixes(namespace: &str, prefixes: Vec<Prefix>) -> Vec<Prefix> {
    let mut seen = HashSet::default();
    prefixes
        .into_iter()
        .filter(|prefix| !(namespace.is_empty() && prefix.name.is_empty()))
        .filter(|prefix| seen.insert(prefix.name.clone()))
        .collect()
}

/// Generate a random XML document.
///
/// Example:
///
/// ```notrust
/// use xmlreplay::proptest::arb_document;
/// use xmlreplay::{StreamWriter, WriterParameters};
///
/// proptest! {
///   #[test]
///   fn test_arb_document_can_be_written(document in arb_document()) {
///     let mut writer = StreamWriter::new(Vec::new(), WriterParameters::default());
///     prop_assert!(document.write_to(&mut writer).is_ok());
///   }
/// }
/// ```
pub fn arb_document() -> impl Strategy<Value = Document> {
    arb_document_with_config(Config {
        comments_and_pi_outside_document_element: true,
    })
}

/// Configure proptest
#[derive(Default)]
pub struct Config {
    /// Can generate comments and pi outside the document element
    pub comments_and_pi_outside_document_element: bool,
}

/// Generate a random XML document, with configuration.
pub fn arb_document_with_config(config: Config) -> BoxedStrategy<Document> {
    if config.comments_and_pi_outside_document_element {
        let before = prop::collection::vec(
            prop_oneof![
                arb_comment().prop_map(DocumentContent::Comment),
                arb_processing_instruction().prop_map(DocumentContent::ProcessingInstruction),
            ],
            0..10,
        );
        let after = before.clone();
        (before, arb_element(), after)
            .prop_map(|(before, document_element, after)| Document {
                before,
                document_element,
                after,
            })
            .boxed()
    } else {
        arb_element()
            .prop_map(|document_element| Document {
                before: vec![],
                document_element,
                after: vec![],
            })
            .boxed()
    }
}
