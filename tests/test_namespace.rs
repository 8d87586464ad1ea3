use rstest::rstest;

use xmlreplay::namespace::{XML_NS_URI, XMLNS_ATTRIBUTE_NS_URI};
use xmlreplay::{
    events, CombiningNamespaceContext, EventType, FragmentNamespaceContext, NamespaceContext,
    SimpleNamespaceContext, StrReader, XmlEvent, XmlReader,
};

#[test]
fn test_reader_context_matches_fragments() {
    let xml = r#"<doc xmlns="urn:d" xmlns:p="urn:p"><a xmlns:p="urn:q" xmlns:r="urn:p"><b/></a></doc>"#;
    let snapshots = events(StrReader::new(xml))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let declared = snapshots
        .iter()
        .filter_map(|e| match e {
            XmlEvent::StartElement(e) => Some(e.declared_namespaces()),
            _ => None,
        })
        .collect::<Vec<_>>();

    let root = FragmentNamespaceContext::root(declared[0].iter());
    let a = root.child(declared[1].iter());
    let b = a.child(declared[2].iter());

    let mut reader = StrReader::new(xml);
    while let Some(event_type) = reader.next_event().unwrap() {
        if event_type == EventType::StartElement && reader.local_name() == "b" {
            break;
        }
    }
    let in_reader = reader.namespace_context();
    for prefix in ["", "p", "r", "xml", "unbound"] {
        assert_eq!(in_reader.namespace_uri(prefix), b.namespace_uri(prefix), "{}", prefix);
    }
    assert_eq!(b.prefix("urn:p"), Some("r"));
    assert_eq!(in_reader.prefix("urn:p"), Some("r"));
    assert_eq!(b.prefixes("urn:p"), vec!["r"]);
    assert_eq!(b.depth(), 2);
}

#[rstest]
#[case("xml", Some(XML_NS_URI))]
#[case("xmlns", Some(XMLNS_ATTRIBUTE_NS_URI))]
#[case("", None)]
#[case("p", None)]
fn test_builtin_prefixes(#[case] prefix: &str, #[case] expected: Option<&str>) {
    let simple = SimpleNamespaceContext::new();
    let fragment = FragmentNamespaceContext::root(Vec::<(String, String)>::new());
    let combined = CombiningNamespaceContext::new(&simple, &fragment);
    assert_eq!(simple.namespace_uri(prefix), expected);
    assert_eq!(fragment.namespace_uri(prefix), expected);
    assert_eq!(combined.namespace_uri(prefix), expected);
}

#[test]
fn test_combining_prefers_primary() {
    let primary = SimpleNamespaceContext::from_bindings([("a", "urn:1"), ("b", "urn:2")]);
    let secondary = SimpleNamespaceContext::from_bindings([("a", "urn:3"), ("c", "urn:2")]);
    let combined = CombiningNamespaceContext::new(&primary, &secondary);
    assert_eq!(combined.namespace_uri("a"), Some("urn:1"));
    assert_eq!(combined.namespace_uri("c"), Some("urn:2"));
    assert_eq!(combined.prefix("urn:2"), Some("b"));
    assert_eq!(combined.prefix("urn:3"), Some("a"));
    assert_eq!(combined.prefixes("urn:2"), vec!["b", "c"]);
}

#[test]
fn test_fragment_over_reader_snapshot() {
    let snapshots = events(StrReader::new(r#"<doc xmlns:x="urn:x"/>"#))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let declared = match &snapshots[1] {
        XmlEvent::StartElement(e) => e.declared_namespaces(),
        other => panic!("unexpected {:?}", other),
    };
    let outer = FragmentNamespaceContext::root([("y", "urn:y")]);
    let inner = FragmentNamespaceContext::new(Some(&outer), declared.iter());
    assert_eq!(inner.namespace_uri("x"), Some("urn:x"));
    assert_eq!(inner.namespace_uri("y"), Some("urn:y"));
    assert_eq!(inner.parent().map(|p| p.depth()), Some(0));
}
