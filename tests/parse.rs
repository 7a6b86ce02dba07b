//! Tests of the parse side: event dispatch, grouping rules and coercion.

use osmdict::{parse, parse_str, DateParsers, Error, Item, Map, Parser, Value};

use pretty_assertions::assert_eq;

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(Map::from_iter(entries))
}

fn named(name: &str, value: Value) -> Item {
    Item::Named(name.to_owned(), value)
}

fn item(value: Value) -> Item {
    Item::Value(value)
}

fn timestamp(s: &str) -> Value {
    Value::Timestamp(s.parse().unwrap())
}

#[test]
fn empty_root_is_an_empty_map() {
    assert_eq!(parse(b"<osm/>").unwrap(), map([("osm", map([]))]));
    assert_eq!(parse(b"<osm></osm>").unwrap(), map([("osm", map([]))]));
}

#[test]
fn text_only_element_collapses_to_scalar() {
    assert_eq!(
        parse(b"<root><name>Alice</name></root>").unwrap(),
        map([("root", map([("name", Value::from("Alice"))]))])
    );
}

#[test]
fn text_only_root_collapses_to_scalar() {
    assert_eq!(
        parse(b"<greeting>hi</greeting>").unwrap(),
        map([("greeting", Value::from("hi"))])
    );
}

#[test]
fn scalars_are_coerced_per_key() {
    assert_eq!(
        parse(b"<root><id>42</id><lat>1.5</lat><visible>true</visible></root>").unwrap(),
        map([(
            "root",
            map([
                ("id", Value::Int(42)),
                ("lat", Value::Float(1.5)),
                ("visible", Value::Bool(true)),
            ])
        )])
    );
}

#[test]
fn attributes_are_coerced_by_bare_name() {
    assert_eq!(
        parse(br#"<osm version="0.6" generator="test"/>"#).unwrap(),
        map([(
            "osm",
            map([
                ("@version", Value::Float(0.6)),
                ("@generator", Value::from("test")),
            ])
        )])
    );
}

#[test]
fn force_list_names_wrap_single_occurrences() {
    assert_eq!(
        parse(br#"<root><tag k="a" v="b"/></root>"#).unwrap(),
        map([(
            "root",
            map([(
                "tag",
                Value::Seq(vec![item(map([
                    ("@k", Value::from("a")),
                    ("@v", Value::from("b")),
                ]))])
            )])
        )])
    );
}

#[test]
fn force_list_names_keep_appending() {
    assert_eq!(
        parse(br#"<way><nd ref="1"/><nd ref="2"/></way>"#).unwrap(),
        map([(
            "way",
            map([(
                "nd",
                Value::Seq(vec![
                    item(map([("@ref", Value::Int(1))])),
                    item(map([("@ref", Value::Int(2))])),
                ])
            )])
        )])
    );
}

#[test]
fn repeated_children_upgrade_to_a_sequence() {
    assert_eq!(
        parse(b"<root><x>1</x><x>2</x><x>3</x></root>").unwrap(),
        map([(
            "root",
            map([(
                "x",
                Value::Seq(vec![
                    item(Value::from("1")),
                    item(Value::from("2")),
                    item(Value::from("3")),
                ])
            )])
        )])
    );
}

#[test]
fn items_mode_groups_children_as_tuples() {
    let tree = parse(
        br#"<osmChange><create><node id="1"/></create><modify><way id="2"/></modify></osmChange>"#,
    )
    .unwrap();
    assert_eq!(
        tree,
        map([(
            "osmChange",
            Value::Seq(vec![
                named(
                    "create",
                    Value::Seq(vec![named("node", map([("@id", Value::Int(1))]))])
                ),
                named(
                    "modify",
                    Value::Seq(vec![named("way", map([("@id", Value::Int(2))]))])
                ),
            ])
        )])
    );
}

#[test]
fn items_mode_flushes_map_entries_to_the_tail() {
    let tree = parse(br#"<osm><changeset open="true"><bounds min_lat="1.0"/></changeset></osm>"#)
        .unwrap();
    assert_eq!(
        tree,
        map([(
            "osm",
            map([(
                "changeset",
                Value::Seq(vec![
                    named("bounds", map([("@min_lat", Value::Float(1.0))])),
                    named("@open", Value::Bool(true)),
                ])
            )])
        )])
    );
}

#[test]
fn timestamps_route_by_shape() {
    assert_eq!(
        parse(br#"<osm><node id="1" timestamp="2013-07-09T21:00:01Z"/></osm>"#).unwrap(),
        map([(
            "osm",
            Value::Seq(vec![named(
                "node",
                map([
                    ("@id", Value::Int(1)),
                    ("@timestamp", timestamp("2013-07-09T21:00:01+00:00")),
                ])
            )])
        )])
    );

    assert_eq!(
        parse(b"<root><date>2013-07-09 21:00:01 UTC</date></root>").unwrap(),
        map([(
            "root",
            map([("date", timestamp("2013-07-09T21:00:01+00:00"))])
        )])
    );
}

#[test]
fn repeated_text_replaces_earlier_text() {
    // the #text slot is written last-wins within one element
    assert_eq!(
        parse(b"<root><a>first<b/>second</a></root>").unwrap(),
        map([("root", map([("a", Value::from("second"))]))])
    );
}

#[test]
fn empty_children_contribute_nothing() {
    assert_eq!(
        parse(b"<root><empty/><a>x</a></root>").unwrap(),
        map([("root", map([("a", Value::from("x"))]))])
    );
}

#[test]
fn insignificant_whitespace_is_dropped() {
    let pretty = b"<root>\n    <name>Alice</name>\n    <id>7</id>\n</root>\n";
    assert_eq!(
        parse(pretty).unwrap(),
        map([(
            "root",
            map([("name", Value::from("Alice")), ("id", Value::Int(7))])
        )])
    );
}

#[test]
fn entities_are_unescaped() {
    assert_eq!(
        parse(br#"<root note="x &lt; y"><name>A &amp; B</name></root>"#).unwrap(),
        map([(
            "root",
            map([
                ("@note", Value::from("x < y")),
                ("name", Value::from("A & B")),
            ])
        )])
    );
}

#[test]
fn cdata_reads_back_as_text() {
    assert_eq!(
        parse(b"<root><name><![CDATA[A & B]]></name></root>").unwrap(),
        map([("root", map([("name", Value::from("A & B"))]))])
    );
}

#[test]
fn declaration_and_comments_are_skipped() {
    let doc = br#"<?xml version="1.0" encoding="UTF-8"?>
<!-- a comment -->
<root><name>Alice</name></root>
"#;
    assert_eq!(
        parse(doc).unwrap(),
        map([("root", map([("name", Value::from("Alice"))]))])
    );
}

#[test]
fn gpx_track_structure() {
    let doc = br#"<gpx version="1.1"><trk><trkseg><trkpt lat="1.5" lon="2.5"><ele>100.1</ele><time>2023-01-01T00:00:00Z</time></trkpt></trkseg></trk></gpx>"#;
    assert_eq!(
        parse(doc).unwrap(),
        map([(
            "gpx",
            map([
                ("@version", Value::Float(1.1)),
                (
                    "trk",
                    Value::Seq(vec![item(map([(
                        "trkseg",
                        Value::Seq(vec![item(map([(
                            "trkpt",
                            Value::Seq(vec![item(map([
                                ("@lat", Value::Float(1.5)),
                                ("@lon", Value::Float(2.5)),
                                ("ele", Value::Float(100.1)),
                                ("time", timestamp("2023-01-01T00:00:00+00:00")),
                            ]))])
                        )]))])
                    )]))])
                ),
            ])
        )])
    );
}

#[test]
fn bad_values_fail_the_parse() {
    match parse(b"<root><id>abc</id></root>") {
        Err(Error::BadValue { key, value }) => {
            assert_eq!(key, "id");
            assert_eq!(value, "abc");
        }
        other => panic!("expected BadValue, got {other:?}"),
    }

    assert!(matches!(
        parse(br#"<osm><node visible="maybe"/></osm>"#),
        Err(Error::BadValue { .. })
    ));
}

#[test]
fn nesting_is_bounded() {
    fn nested(depth: usize) -> String {
        let mut doc = String::new();
        for level in 0..depth {
            doc.push_str(&format!("<e{level}>"));
        }
        for level in (0..depth).rev() {
            doc.push_str(&format!("</e{level}>"));
        }
        doc
    }

    // eleven open elements keep ten saved parent frames
    assert!(parse_str(&nested(11)).is_ok());
    assert!(matches!(
        parse_str(&nested(12)),
        Err(Error::NestingTooDeep)
    ));
}

#[test]
fn malformed_documents_fail() {
    assert!(matches!(
        parse(b"<root><a></b></root>"),
        Err(Error::Xml(_))
    ));
}

#[test]
fn documents_without_a_root_fail() {
    assert!(matches!(parse(b""), Err(Error::EmptyDocument)));
    assert!(matches!(
        parse(b"<!-- only a comment -->"),
        Err(Error::EmptyDocument)
    ));
}

#[test]
fn text_before_the_root_is_ignored() {
    assert_eq!(
        parse(b"stray<root/>").unwrap(),
        map([("root", map([]))])
    );
}

#[test]
fn date_parsers_are_injectable() {
    fn fixed(_: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        Some("2000-01-01T00:00:00+00:00".parse().unwrap())
    }

    let parser = Parser::from_bytes(br#"<root><date>2013-07-09 21:00:01</date></root>"#)
        .with_date_parsers(DateParsers {
            iso: fixed,
            legacy: fixed,
        });
    assert_eq!(
        parser.parse().unwrap(),
        map([("root", map([("date", timestamp("2000-01-01T00:00:00+00:00"))]))])
    );
}
