use insta::assert_snapshot;
use rstest::rstest;

use xmlreplay::{
    copy, copy_with, events, replay, CopyOptions, Error, EventReader, EventType, StrReader,
    StreamWriter, TextEvent, WriterParameters, XmlEvent, XmlReader, XmlWriter,
};

fn writer() -> StreamWriter<Vec<u8>> {
    StreamWriter::new(Vec::new(), WriterParameters::default())
}

fn copy_to_string(xml: &str) -> String {
    let mut w = writer();
    copy(&mut StrReader::new(xml), &mut w).unwrap();
    w.into_string().unwrap()
}

fn snapshot_to_string(xml: &str) -> String {
    let snapshots = events(StrReader::new(xml))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let mut w = writer();
    replay(&snapshots, &mut w).unwrap();
    w.into_string().unwrap()
}

#[rstest]
#[case(r#"<a:item a:id="1" xmlns:a="urn:ns"><!--c-->text</a:item>"#, r#"<a:item xmlns:a="urn:ns" a:id="1"><!--c-->text</a:item>"#)]
#[case(r#"<doc xmlns="urn:d"><e/></doc>"#, r#"<doc xmlns="urn:d"><e/></doc>"#)]
#[case(r#"<?xml version="1.0" encoding="UTF-8"?><doc/>"#, r#"<?xml version="1.0" encoding="UTF-8"?><doc/>"#)]
#[case(r#"<doc a="x &amp; y" b='q"'>1 &lt; 2</doc>"#, r#"<doc a="x &amp; y" b="q&quot;">1 &lt; 2</doc>"#)]
#[case(r#"<!DOCTYPE doc SYSTEM "doc.dtd"><doc>&ent;</doc>"#, r#"<!DOCTYPE doc SYSTEM "doc.dtd"><doc>&ent;</doc>"#)]
#[case("<doc><![CDATA[<x>]]><?pi data?></doc>", "<doc><![CDATA[<x>]]><?pi data?></doc>")]
#[case(r#"<doc xmlns:p="urn:p"><p:a p:b="1"/></doc>"#, r#"<doc xmlns:p="urn:p"><p:a p:b="1"/></doc>"#)]
#[case("<!--top--><doc/><!--end-->", "<!--top--><doc/><!--end-->")]
#[case("<?xml version=\"1.0\"?>\n<doc/>\n", "<?xml version=\"1.0\"?>\n<doc/>\n")]
#[case("<!--a-->\n\n<doc>\n</doc>", "<!--a-->\n\n<doc>\n</doc>")]
fn test_copy(#[case] xml: &str, #[case] expected: &str) {
    assert_eq!(copy_to_string(xml), expected);
}

#[rstest]
#[case(r#"<a:item a:id="1" xmlns:a="urn:ns"><!--c-->text</a:item>"#)]
#[case(r#"<?xml version="1.0" standalone="no"?><!DOCTYPE doc><doc xmlns="urn:d" xmlns:x="urn:x" x:a="1"><e x:b="2"/>t</doc>"#)]
#[case(r#"<doc xmlns:x="urn:x"><a xmlns:x="urn:y"><x:b/></a><x:c/></doc>"#)]
#[case("<doc>a &amp; &unknown; b<![CDATA[c]]></doc>")]
#[case("<?xml version=\"1.0\"?>\n<!--a-->\n<doc>\n  <e/>\n</doc>\n")]
fn test_direct_replay_equals_snapshot_replay(#[case] xml: &str) {
    assert_eq!(copy_to_string(xml), snapshot_to_string(xml));
}

#[test]
fn test_snapshot_sequence() {
    let snapshots = events(StrReader::new(
        r#"<a:item a:id="1" xmlns:a="urn:ns"><!--c-->text</a:item>"#,
    ))
    .collect::<Result<Vec<_>, _>>()
    .unwrap();
    let types = snapshots
        .iter()
        .map(XmlEvent::event_type)
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            EventType::StartDocument,
            EventType::StartElement,
            EventType::Comment,
            EventType::Text,
            EventType::EndElement,
            EventType::EndDocument
        ]
    );
    match &snapshots[1] {
        XmlEvent::StartElement(e) => {
            assert_eq!(e.namespace_uri, "urn:ns");
            assert_eq!(e.local_name, "item");
            assert_eq!(e.prefix, "a");
            assert_eq!(e.attribute("urn:ns", "id"), Some("1"));
            assert_eq!(e.namespace_decls.len(), 1);
            assert_eq!(e.namespace_decls[0].prefix, "a");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_ignorable_whitespace_snapshots() {
    let snapshots = events(StrReader::new("<!--a-->\n<doc/>\n"))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let whitespace = snapshots
        .iter()
        .filter(|e| e.event_type() == EventType::IgnorableWhitespace)
        .count();
    assert_eq!(whitespace, 2);
    let mut w = writer();
    replay(&snapshots, &mut w).unwrap();
    assert_eq!(w.into_string().unwrap(), "<!--a-->\n<doc/>\n");
}

#[test]
fn test_snapshot_outlives_reader_position() {
    let mut reader = StrReader::new("<doc><a>first</a><b>second</b></doc>");
    let mut texts = Vec::new();
    while let Some(event_type) = reader.next_event().unwrap() {
        if event_type == EventType::Text {
            texts.push(reader.to_event().unwrap());
        }
    }
    let mut w = writer();
    w.start_tag("", "out", "").unwrap();
    for text in &texts {
        text.write_to(&mut w).unwrap();
    }
    w.end_tag("", "out", "").unwrap();
    assert_snapshot!(w.into_string().unwrap(), @"<out>firstsecond</out>");
}

#[test]
fn test_event_reader_copies_like_source() {
    let xml = r#"<doc xmlns="urn:d" xmlns:p="urn:p"><p:a p:x="1"><b/></p:a></doc>"#;
    let snapshots = events(StrReader::new(xml))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let mut w = writer();
    copy(&mut EventReader::new(snapshots), &mut w).unwrap();
    assert_eq!(w.into_string().unwrap(), copy_to_string(xml));
}

#[test]
fn test_text_snapshot_replayed_as_other_kind() {
    let text = TextEvent::new(Default::default(), EventType::Text, "payload");
    let mut w = writer();
    w.start_tag("", "doc", "").unwrap();
    EventType::Comment.write_text_event(&mut w, &text).unwrap();
    EventType::CData.write_text_event(&mut w, &text).unwrap();
    assert!(matches!(
        EventType::StartElement.write_text_event(&mut w, &text),
        Err(Error::UnsupportedReplay(EventType::StartElement))
    ));
    w.end_tag("", "doc", "").unwrap();
    assert_snapshot!(
        w.into_string().unwrap(),
        @"<doc><!--payload--><![CDATA[payload]]></doc>"
    );
}

#[test]
fn test_skip_ignorable_keeps_content() {
    let mut w = writer();
    let options = CopyOptions {
        skip_ignorable: true,
        ..Default::default()
    };
    copy_with(
        &mut StrReader::new(r#"<?xml version="1.0"?><!--c--><doc><!--d--><e>t</e></doc>"#),
        &mut w,
        &options,
    )
    .unwrap();
    assert_snapshot!(w.into_string().unwrap(), @"<doc><e>t</e></doc>");
}

#[test]
fn test_rebound_prefix_is_repaired() {
    // the attribute namespace is shadowed on the inner element
    let xml = r#"<doc xmlns:x="urn:x"><a xmlns:x="urn:y"><b/></a></doc>"#;
    let snapshots = events(StrReader::new(xml))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let mut w = writer();
    for event in &snapshots {
        event.write_to(&mut w).unwrap();
        if let XmlEvent::StartElement(e) = event {
            if e.local_name == "b" {
                w.attribute("urn:x", "attr", Some("x"), "v").unwrap();
            }
        }
    }
    assert_snapshot!(
        w.into_string().unwrap(),
        @r#"<doc xmlns:x="urn:x"><a xmlns:x="urn:y"><b xmlns:n0="urn:x" n0:attr="v"/></a></doc>"#
    );
}
