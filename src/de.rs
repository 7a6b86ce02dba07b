//! Streaming parse: XML event stream → dictionary tree.
//!
//! A single pass over the tokenizer's pull events drives a stack machine.
//! Every open element owns a frame with two lazily-allocated slots: a map
//! for attributes, text and named children, and a sequence for items-mode
//! children. At close time the frame collapses to its result value and is
//! merged into the parent frame according to the name-policy tables.

use std::mem;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::coerce::coerce;
use crate::datetime::DateParsers;
use crate::error::{Error, Result};
use crate::names::{in_set, NameCache, FORCE_ITEMS, FORCE_LIST};
use crate::value::{Item, Map, Value, TEXT_KEY};

/// Hard limit on the number of saved parent frames. Pushing an eleventh
/// frame fails the parse with [`Error::NestingTooDeep`].
pub(crate) const MAX_DEPTH: usize = 10;

/// One element under construction: its name and the two container slots,
/// both absent until something forces them into existence.
#[derive(Debug, Default)]
struct Frame {
    name: String,
    dict: Option<Map>,
    list: Option<Vec<Item>>,
}

/// Fixed-capacity LIFO of parent frames. Frames are moved in and out;
/// nothing here is heap-allocated beyond what the frames themselves own.
#[derive(Debug, Default)]
struct Stack {
    depth: usize,
    frames: [Frame; MAX_DEPTH],
}

impl Stack {
    fn push(&mut self, frame: Frame) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        self.frames[self.depth] = frame;
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<Frame> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        Some(mem::take(&mut self.frames[self.depth]))
    }
}

/// A single-document parser over an in-memory buffer.
///
/// Construct with [`Parser::from_bytes`], optionally swap the timestamp
/// parsers, then call [`Parser::parse`]. The intern caches and the frame
/// stack are private to the instance, so independent parsers may run on
/// independent threads.
pub struct Parser<'i> {
    reader: Reader<&'i [u8]>,
    dates: DateParsers,
    stack: Stack,
    current: Option<Frame>,
    tags: NameCache,
    attrs: NameCache,
}

impl<'i> Parser<'i> {
    /// Creates a parser reading from an in-memory XML document.
    pub fn from_bytes(input: &'i [u8]) -> Self {
        Parser {
            reader: Reader::from_reader(input),
            dates: DateParsers::default(),
            stack: Stack::default(),
            current: None,
            tags: NameCache::new(),
            attrs: NameCache::new(),
        }
    }

    /// Replaces the timestamp parsers used for date-keyed values.
    pub fn with_date_parsers(mut self, dates: DateParsers) -> Self {
        self.dates = dates;
        self
    }

    /// Runs the parse to completion, returning a map with a single entry:
    /// the document root.
    pub fn parse(mut self) -> Result<Value> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => self.open(&e)?,
                Event::Empty(e) => {
                    self.open(&e)?;
                    if let Some(root) = self.close()? {
                        return Ok(root);
                    }
                }
                Event::End(_) => {
                    if let Some(root) = self.close()? {
                        return Ok(root);
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    self.text(&text)?;
                }
                // CDATA sections are read back as ordinary text.
                Event::CData(e) => {
                    let raw = e.into_inner();
                    self.text(str::from_utf8(raw.as_ref())?)?;
                }
                Event::Eof => return Err(Error::EmptyDocument),
                // declaration, comments, processing instructions, doctype
                _ => (),
            }
        }
    }

    /// Element-open: saves the enclosing frame and starts a new one, then
    /// delivers the element's attributes in document order.
    fn open(&mut self, e: &BytesStart) -> Result<()> {
        if let Some(parent) = self.current.take() {
            self.stack.push(parent)?;
        }

        let name = self.tags.tag(e.local_name().as_ref())?;
        let mut frame = Frame {
            name,
            dict: None,
            list: None,
        };

        for attr in e.attributes() {
            let attr = attr?;
            let local = attr.key.local_name();
            let raw = attr.unescape_value()?;
            // coercion is keyed by the bare attribute name
            let key = str::from_utf8(local.as_ref())?;
            let value = coerce(key, &raw, &self.dates).ok_or_else(|| Error::BadValue {
                key: key.to_owned(),
                value: raw.to_string(),
            })?;
            frame
                .dict
                .get_or_insert_with(Map::new)
                .insert(self.attrs.attr_key(local.as_ref())?, value);
        }

        self.current = Some(frame);
        Ok(())
    }

    /// Text inside the current element. Whitespace-only spans between
    /// elements are not preserved; real text occupies the single `#text`
    /// slot, last write winning.
    fn text(&mut self, raw: &str) -> Result<()> {
        if raw.bytes().all(|b| b.is_ascii_whitespace()) {
            return Ok(());
        }
        let Some(frame) = self.current.as_mut() else {
            // stray text outside the root
            return Ok(());
        };
        let value = coerce(&frame.name, raw, &self.dates).ok_or_else(|| Error::BadValue {
            key: frame.name.clone(),
            value: raw.to_owned(),
        })?;
        frame
            .dict
            .get_or_insert_with(Map::new)
            .insert(TEXT_KEY, value);
        Ok(())
    }

    /// Element-close: collapses the current frame to its result value and
    /// merges it into the parent. Returns the completed document when the
    /// root element closes.
    fn close(&mut self) -> Result<Option<Value>> {
        let frame = match self.current.take() {
            Some(frame) => frame,
            // the tokenizer rejects unmatched end tags before we see them
            None => return Ok(None),
        };
        let Frame { name, dict, list } = frame;

        let result = match (dict, list) {
            // an empty element contributes nothing to its parent
            (None, None) => None,
            (Some(dict), None) => {
                if dict.len() == 1 && dict.contains_key(TEXT_KEY) {
                    // text-only element collapses to the bare scalar
                    dict.into_iter().next().map(|(_, value)| value)
                } else {
                    Some(Value::Map(dict))
                }
            }
            (None, Some(list)) => Some(Value::Seq(list)),
            (Some(dict), Some(mut list)) => {
                // map entries flush onto the sequence tail in insertion order
                list.extend(dict.into_iter().map(|(k, v)| Item::Named(k, v)));
                Some(Value::Seq(list))
            }
        };

        let Some(mut parent) = self.stack.pop() else {
            // root closed; an empty root presents as an empty map
            let mut root = Map::with_capacity(1);
            root.insert(name, result.unwrap_or_else(|| Value::Map(Map::new())));
            return Ok(Some(Value::Map(root)));
        };

        if let Some(result) = result {
            merge(&mut parent, name, result);
        }
        self.current = Some(parent);
        Ok(None)
    }
}

/// Merges a finished child into its parent frame.
fn merge(parent: &mut Frame, name: String, result: Value) {
    // items mode: the child lands in the parent's sequence as a tuple
    if in_set(FORCE_ITEMS, &name) {
        parent
            .list
            .get_or_insert_with(Vec::new)
            .push(Item::Named(name, result));
        return;
    }

    // a repeated name appends to, or upgrades into, a sequence
    if let Some(dict) = parent.dict.as_mut() {
        if let Some(existing) = dict.get_mut(&name) {
            match existing {
                Value::Seq(items) => items.push(Item::Value(result)),
                _ => {
                    let first = mem::replace(existing, Value::Null);
                    *existing = Value::Seq(vec![Item::Value(first), Item::Value(result)]);
                }
            }
            return;
        }
    }

    let wrapped = if in_set(FORCE_LIST, &name) {
        Value::Seq(vec![Item::Value(result)])
    } else {
        result
    };
    parent
        .dict
        .get_or_insert_with(Map::new)
        .insert(name, wrapped);
}

/// Parses an in-memory XML document into its dictionary representation.
///
/// The returned value is always a [`Value::Map`] with exactly one entry,
/// keyed by the root element's name.
pub fn parse(input: &[u8]) -> Result<Value> {
    Parser::from_bytes(input).parse()
}

/// [`parse`] for string input.
pub fn parse_str(input: &str) -> Result<Value> {
    Parser::from_bytes(input.as_bytes()).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str) -> Frame {
        Frame {
            name: name.to_owned(),
            dict: None,
            list: None,
        }
    }

    #[test]
    fn stack_is_bounded() {
        let mut stack = Stack::default();
        for depth in 0..MAX_DEPTH {
            stack.push(frame(&format!("e{depth}"))).unwrap();
        }
        assert!(matches!(
            stack.push(frame("overflow")),
            Err(Error::NestingTooDeep)
        ));
    }

    #[test]
    fn stack_pops_in_reverse_order() {
        let mut stack = Stack::default();
        stack.push(frame("outer")).unwrap();
        stack.push(frame("inner")).unwrap();

        assert_eq!(stack.pop().map(|f| f.name).as_deref(), Some("inner"));
        assert_eq!(stack.pop().map(|f| f.name).as_deref(), Some("outer"));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn merge_upgrades_repeated_names() {
        let mut parent = frame("parent");
        merge(&mut parent, "x".to_owned(), Value::Int(1));
        merge(&mut parent, "x".to_owned(), Value::Int(2));
        merge(&mut parent, "x".to_owned(), Value::Int(3));

        let dict = parent.dict.unwrap();
        assert_eq!(
            dict.get("x"),
            Some(&Value::Seq(vec![
                Item::Value(Value::Int(1)),
                Item::Value(Value::Int(2)),
                Item::Value(Value::Int(3)),
            ]))
        );
    }

    #[test]
    fn merge_wraps_force_list_names() {
        let mut parent = frame("way");
        merge(&mut parent, "nd".to_owned(), Value::Int(7));

        let dict = parent.dict.unwrap();
        assert_eq!(
            dict.get("nd"),
            Some(&Value::Seq(vec![Item::Value(Value::Int(7))]))
        );
    }

    #[test]
    fn merge_routes_items_mode_to_list() {
        let mut parent = frame("osm");
        merge(&mut parent, "node".to_owned(), Value::Int(1));

        assert!(parent.dict.is_none());
        assert_eq!(
            parent.list,
            Some(vec![Item::Named("node".to_owned(), Value::Int(1))])
        );
    }
}
