//! Unparse: dictionary tree → XML document.
//!
//! The emitter is the exact inverse of the parse side for trees the parser
//! can produce. `@`-prefixed keys become attributes (collected onto the
//! start tag in insertion order), `#text` becomes the element's content and
//! everything else becomes child elements. Elements with no content are
//! written self-closing.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::datetime::format_timestamp;
use crate::error::{Error, Result};
use crate::value::{Item, Value, TEXT_KEY};

/// Unparses a tree to a UTF-8 encoded XML document.
///
/// `root` must be a [`Value::Map`] with exactly one entry; its key names the
/// document root element. The output carries an XML declaration and a
/// trailing newline.
pub fn to_bytes(root: &Value) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    newline(&mut writer)?;

    let (name, value) = root_entry(root)?;
    write_element(&mut writer, name, value, true)?;
    newline(&mut writer)?;
    Ok(writer.into_inner())
}

/// [`to_bytes`] with text output.
pub fn to_string(root: &Value) -> Result<String> {
    let bytes = to_bytes(root)?;
    // the writer only ever emits UTF-8
    String::from_utf8(bytes).map_err(|e| Error::Utf8(e.utf8_error()))
}

fn newline(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(())
}

fn root_entry(root: &Value) -> Result<(&str, &Value)> {
    let map = match root {
        Value::Map(map) => map,
        _ => return Err(Error::BadRoot("document root must be a map")),
    };
    if map.len() != 1 {
        return Err(Error::BadRoot("document root must hold exactly one entry"));
    }
    map.iter()
        .next()
        .ok_or(Error::BadRoot("document root must hold exactly one entry"))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: &Value,
    is_root: bool,
) -> Result<()> {
    match value {
        Value::Map(map) => write_items(writer, name, map.iter()),
        Value::Seq(items) => write_seq(writer, name, items, is_root),
        scalar => write_scalar(writer, name, scalar),
    }
}

/// Emits one element per map or scalar item, and a single shared element
/// holding every `(name, value)` tuple, placed where the first tuple occurs.
fn write_seq(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    items: &[Item],
    is_root: bool,
) -> Result<()> {
    let pairs: Vec<(&str, &Value)> = items
        .iter()
        .filter_map(|item| match item {
            Item::Named(key, value) => Some((key.as_str(), value)),
            Item::Value(_) => None,
        })
        .collect();

    let mut pairs_written = false;
    for item in items {
        match item {
            Item::Named(..) => {
                if !pairs_written {
                    write_items(writer, name, pairs.iter().copied())?;
                    pairs_written = true;
                }
            }
            Item::Value(Value::Map(map)) => {
                if is_root && items.len() > 1 {
                    return Err(Error::BadRoot("root element cannot repeat"));
                }
                write_items(writer, name, map.iter())?;
            }
            Item::Value(Value::Seq(_)) => {
                return Err(Error::BadRoot(
                    "sequence items must be maps, scalars or (name, value) tuples",
                ));
            }
            Item::Value(scalar) => {
                if is_root && items.len() > 1 {
                    return Err(Error::BadRoot("root element cannot repeat"));
                }
                write_scalar(writer, name, scalar)?;
            }
        }
    }
    Ok(())
}

/// Emits one element from an entry iterator, applying the item rule:
/// `@`-keys become attributes, `#text` becomes content, anything else a
/// child element. Attributes are gathered in a first pass so the start tag
/// carries them in insertion order.
fn write_items<'v, I>(writer: &mut Writer<Vec<u8>>, name: &str, entries: I) -> Result<()>
where
    I: Iterator<Item = (&'v str, &'v Value)> + Clone,
{
    let mut start = BytesStart::new(name);
    let mut has_content = false;
    for (key, value) in entries.clone() {
        match key.strip_prefix('@') {
            Some(attr) => start.push_attribute((attr, stringify(value)?.as_ref())),
            None => has_content = true,
        }
    }

    if !has_content {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for (key, value) in entries {
        if key.starts_with('@') {
            continue;
        }
        if key == TEXT_KEY {
            write_content(writer, value)?;
        } else {
            write_element(writer, key, value, false)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_scalar(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    if let Value::Cdata(text) = value {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        return Ok(());
    }

    let text = stringify(value)?;
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text.as_ref())))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

/// Element content in `#text` position.
fn write_content(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<()> {
    if let Value::Cdata(text) = value {
        writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
        return Ok(());
    }
    let text = stringify(value)?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text.as_ref())))?;
    }
    Ok(())
}

fn stringify(value: &Value) -> Result<Cow<'_, str>> {
    match value {
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Bool(true) => Ok(Cow::Borrowed("true")),
        Value::Bool(false) => Ok(Cow::Borrowed("false")),
        Value::Int(n) => Ok(Cow::Owned(n.to_string())),
        Value::Float(x) => Ok(Cow::Owned(x.to_string())),
        Value::Str(s) | Value::Cdata(s) => Ok(Cow::Borrowed(s)),
        Value::Timestamp(dt) => format_timestamp(dt).map(Cow::Owned),
        Value::Map(_) | Value::Seq(_) => Err(Error::BadRoot(
            "attribute and text values must be scalars",
        )),
    }
}
