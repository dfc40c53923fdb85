//! Parse / serialize round trips and parser policies

use pretty_assertions::assert_eq;
use xmpdom::{
    ArrayType, MergePolicy, ParseOptions, SerializeOptions, XmpError, XmpMeta, XmpPath, XmpValue,
};

const RICH_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:xmpMM="http://ns.adobe.com/xap/1.0/mm/"
        xmlns:stEvt="http://ns.adobe.com/xap/1.0/sType/ResourceEvent#"
        xmlns:exif="http://ns.adobe.com/exif/1.0/"
        xmp:CreatorTool="Editor 1.0"
        xmp:Rating="4">
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">A &amp; B</rdf:li>
          <rdf:li xml:lang="de-DE">A und B</rdf:li>
        </rdf:Alt>
      </dc:title>
      <dc:subject>
        <rdf:Bag>
          <rdf:li>one</rdf:li>
          <rdf:li>two</rdf:li>
        </rdf:Bag>
      </dc:subject>
      <xmpMM:History>
        <rdf:Seq>
          <rdf:li rdf:parseType="Resource">
            <stEvt:action>created</stEvt:action>
            <stEvt:when>2024-01-01T10:00:00Z</stEvt:when>
          </rdf:li>
          <rdf:li stEvt:action="saved" stEvt:when="2024-02-01T10:00:00Z"/>
        </rdf:Seq>
      </xmpMM:History>
      <exif:Flash>
        <rdf:Description exif:Fired="False" exif:Mode="2"/>
      </exif:Flash>
      <dc:source rdf:parseType="Resource">
        <rdf:value>scan</rdf:value>
        <xmp:Label>checked</xmp:Label>
      </dc:source>
      <xmp:BaseURL rdf:resource="http://example.com/base/"/>
      <dc:description xml:space="preserve">  padded  </dc:description>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

#[test]
fn round_trip_is_semantically_equal() {
    let original = XmpMeta::parse(RICH_XMP).unwrap();
    let packet = original.serialize_packet().unwrap();
    let reparsed = XmpMeta::parse(&packet).unwrap();

    assert!(original.root().semantic_eq(reparsed.root()), "{}", packet);
    assert_eq!(
        reparsed.get_property("dc:source").unwrap(),
        Some(XmpValue::from("scan"))
    );
    assert_eq!(
        reparsed.get_qualifier("dc:source", "xmp:Label").unwrap(),
        Some(XmpValue::from("checked"))
    );
    assert_eq!(
        reparsed.get_property("xmp:BaseURL").unwrap(),
        Some(XmpValue::Uri("http://example.com/base/".to_string()))
    );
    assert_eq!(
        reparsed.get_property("dc:description").unwrap(),
        Some(XmpValue::from("  padded  "))
    );
    assert_eq!(
        reparsed.get_property("dc:title[1]").unwrap(),
        Some(XmpValue::from("A & B"))
    );
}

#[test]
fn serialization_is_stable() {
    let first = XmpMeta::parse(RICH_XMP).unwrap().serialize_packet().unwrap();
    let second = XmpMeta::parse(&first).unwrap().serialize_packet().unwrap();
    assert_eq!(first, second);
}

#[test]
fn built_tree_round_trips() {
    let mut meta = XmpMeta::new();
    meta.set_localized_text("dc:rights", "", "en", "All rights reserved")
        .unwrap();
    meta.append_array_item("dc:subject", ArrayType::Unordered, "tag")
        .unwrap();
    meta.set_property("dc:subject[1]/@xmp:Label", "primary").unwrap();
    meta.set_property("exif:Flash/exif:Fired", "line\nbreak").unwrap();
    meta.set_property("xmp:Nickname", "").unwrap();
    meta.set_qualifier("xmp:Nickname", "xmp:Label", "empty").unwrap();

    let options = SerializeOptions::default().indent("\t").newline("\r\n");
    let packet = meta.serialize_with(&options).unwrap();
    let reparsed = XmpMeta::parse(&packet).unwrap();
    assert!(meta.root().semantic_eq(reparsed.root()), "{}", packet);
    assert_eq!(reparsed.serialize_with(&options).unwrap(), packet);
}

#[test]
fn iterator_paths_resolve_to_their_nodes() {
    let meta = XmpMeta::parse(RICH_XMP).unwrap();
    for item in meta.iter() {
        let text = item.path.to_string_with(meta.namespaces()).unwrap();
        let reparsed = XmpPath::parse(&text, meta.namespaces()).unwrap();
        assert_eq!(reparsed, item.path);

        let node = meta.get_node(&text).unwrap().unwrap();
        assert!(std::ptr::eq(node, item.node), "{}", text);
    }
}

#[test]
fn padding_is_ignored_by_the_parser() {
    let meta = XmpMeta::parse(RICH_XMP).unwrap();
    let packet = meta
        .serialize_with(&SerializeOptions::default().padding(10_000))
        .unwrap();
    let reparsed = XmpMeta::parse(&packet).unwrap();
    assert!(meta.root().semantic_eq(reparsed.root()));
}

const TWO_DESCRIPTIONS: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <rdf:Description rdf:about="uuid:1" xmp:Label="first" xmp:Rating="1"/>
    <rdf:Description rdf:about="uuid:1" xmp:Label="second" dc:format="image/png"/>
</rdf:RDF>"#;

#[test]
fn merge_last_wins() {
    let options = ParseOptions::default().merge_policy(MergePolicy::LastWins);
    let meta = XmpMeta::parse_with(TWO_DESCRIPTIONS, options).unwrap();

    assert_eq!(meta.about_uri(), Some("uuid:1"));
    assert_eq!(meta.get_property("xmp:Label").unwrap(), Some(XmpValue::from("second")));
    assert!(meta.has_property("xmp:Rating"));
    assert!(meta.has_property("dc:format"));
}

#[test]
fn merge_first_wins() {
    let options = ParseOptions::default().merge_policy(MergePolicy::FirstWins);
    let meta = XmpMeta::parse_with(TWO_DESCRIPTIONS, options).unwrap();

    assert_eq!(meta.get_property("xmp:Label").unwrap(), Some(XmpValue::from("first")));
    assert!(meta.has_property("xmp:Rating"));
    assert!(meta.has_property("dc:format"));
}

const REDEFINED: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/">
    <rdf:Description rdf:about="">
        <xmp:Label>one</xmp:Label>
        <xmp:Label>two</xmp:Label>
    </rdf:Description>
</rdf:RDF>"#;

#[test]
fn strict_rejects_redefinition() {
    let result = XmpMeta::parse(REDEFINED);
    assert!(matches!(result, Err(XmpError::RedefinedProperty { .. })));
}

#[test]
fn permissive_keeps_last_definition() {
    let meta = XmpMeta::parse_with(REDEFINED, ParseOptions::default().permissive()).unwrap();
    assert_eq!(meta.get_property("xmp:Label").unwrap(), Some(XmpValue::from("two")));
    assert_eq!(meta.warnings().len(), 1);
}

#[test]
fn incremental_matches_single_call() {
    let whole = XmpMeta::parse(RICH_XMP).unwrap();

    let mut meta = XmpMeta::new();
    meta.begin_incremental(ParseOptions::default());
    let bytes = RICH_XMP.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let mut end = (start + 37).min(bytes.len());
        while !RICH_XMP.is_char_boundary(end) {
            end += 1;
        }
        let done = meta
            .parse_chunk(&RICH_XMP[start..end], end == bytes.len())
            .unwrap();
        assert_eq!(done, end == bytes.len());
        start = end;
    }
    assert!(whole.root().semantic_eq(meta.root()));
}

const STRAY_ITEM: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <rdf:Description rdf:about="">
        <rdf:li>stray</rdf:li>
        <dc:format>image/jpeg</dc:format>
    </rdf:Description>
</rdf:RDF>"#;

#[test]
fn strict_rejects_item_outside_container() {
    let offset = STRAY_ITEM.find("<rdf:li>").unwrap();
    match XmpMeta::parse(STRAY_ITEM) {
        Err(err @ XmpError::RdfSyntax { .. }) => assert_eq!(err.offset(), Some(offset)),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn permissive_skips_item_outside_container() {
    let meta = XmpMeta::parse_with(STRAY_ITEM, ParseOptions::default().permissive()).unwrap();
    assert_eq!(meta.iter().count(), 1);
    assert_eq!(
        meta.get_property("dc:format").unwrap(),
        Some(XmpValue::from("image/jpeg"))
    );
    assert_eq!(meta.warnings().len(), 1);
    assert_eq!(meta.warnings()[0].offset, STRAY_ITEM.find("<rdf:li>").unwrap());

    let reparsed = XmpMeta::parse(&meta.serialize().unwrap()).unwrap();
    assert!(meta.root().semantic_eq(reparsed.root()));
}
