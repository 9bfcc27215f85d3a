use quick_xml::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{debug, warn};

/// Value of one entry field as the feed happened to spell it.
///
/// A bare element is `Text`, an element carrying attributes is a `Node`,
/// and an element repeated inside the same entry collapses into `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Node {
        text: String,
        attrs: BTreeMap<String, String>,
    },
    Many(Vec<Field>),
}

impl Field {
    /// Text content, trimmed; for `Many` the first non-empty one
    pub fn text(&self) -> Option<&str> {
        match self {
            Field::Text(text) | Field::Node { text, .. } => non_empty(text),
            Field::Many(list) => list.iter().find_map(Field::text),
        }
    }

    /// Attribute value, trimmed; for `Many` the first candidate that has it
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Field::Text(_) => None,
            Field::Node { attrs, .. } => attrs.get(key).and_then(|v| non_empty(v)),
            Field::Many(list) => list.iter().find_map(|f| f.attr(key)),
        }
    }

    /// The individual candidates: a `Many` yields its members, anything else itself
    pub fn candidates(&self) -> Vec<&Field> {
        match self {
            Field::Many(list) => list.iter().collect(),
            single => vec![single],
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    (!t.is_empty()).then_some(t)
}

/// One `<item>` or `<entry>` with its child elements keyed by qualified name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    fields: BTreeMap<String, Field>,
}

impl RawEntry {
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// First non-empty text among `names`, in order
    pub fn first_text(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.get(name).and_then(Field::text))
    }

    fn insert(&mut self, name: String, field: Field) {
        match self.fields.remove(&name) {
            None => {
                self.fields.insert(name, field);
            }
            Some(Field::Many(mut list)) => {
                list.push(field);
                self.fields.insert(name, Field::Many(list));
            }
            Some(existing) => {
                self.fields.insert(name, Field::Many(vec![existing, field]));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Rdf,
    Atom,
}

#[derive(Debug, Default)]
struct Element {
    // qualified name, e.g. `dc:date`
    name: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    fn into_field(self) -> Field {
        if self.attrs.is_empty() {
            Field::Text(self.text)
        } else {
            Field::Node {
                text: self.text,
                attrs: self.attrs,
            }
        }
    }

    fn into_entry(self) -> RawEntry {
        let mut entry = RawEntry::default();
        for child in self.children {
            let name = child.name.clone();
            entry.insert(name, child.into_field());
        }
        entry
    }
}

fn element_from(e: &BytesStart<'_>) -> Element {
    let mut attrs = BTreeMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = escape::unescape(&raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string());
        attrs.insert(key, value);
    }
    Element {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        attrs,
        ..Default::default()
    }
}

fn current(stack: &mut [Element]) -> Result<&mut Element, Box<dyn Error>> {
    stack.last_mut().ok_or_else(|| "element stack underflow".into())
}

/// Build the element tree for a whole document (quick-xml 0.38)
fn parse_tree(xml: &str) -> Result<Element, Box<dyn Error>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::<u8>::new();
    // index 0 is the document itself
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(element_from(&e)),
            Event::Empty(e) => {
                let el = element_from(&e);
                current(&mut stack)?.children.push(el);
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err("unbalanced end tag".into());
                }
                let el = stack.pop().ok_or("element stack underflow")?;
                // text content is kept in document order, nested text included
                let parent = current(&mut stack)?;
                parent.text.push_str(&el.text);
                parent.children.push(el);
            }
            Event::Text(t) => {
                let raw = std::str::from_utf8(t.as_ref())?;
                let text = escape::unescape(raw).unwrap_or(Cow::Borrowed(raw));
                current(&mut stack)?.text.push_str(&text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                current(&mut stack)?.text.push_str(&text);
            }
            Event::GeneralRef(r) => {
                let name = std::str::from_utf8(r.as_ref())?;
                let reference = format!("&{name};");
                let text = escape::unescape(&reference)
                    .map(Cow::into_owned)
                    .unwrap_or(reference);
                current(&mut stack)?.text.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(format!("{} unclosed element(s) at end of document", stack.len() - 1).into());
    }
    stack
        .pop()
        .and_then(|doc| doc.children.into_iter().next())
        .ok_or_else(|| "document has no root element".into())
}

/// Parse a feed body into its raw entries.
///
/// Errors only on malformed XML; a well-formed document that is neither RSS
/// nor Atom gives `Ok` with no entries.
pub fn parse_entries(xml: &str) -> Result<(Option<FeedKind>, Vec<RawEntry>), Box<dyn Error>> {
    let root = parse_tree(xml)?;
    let root_name = root.local_name().to_string();

    let (kind, items): (Option<FeedKind>, Vec<Element>) = match root_name.as_str() {
        "rss" => {
            let items = root
                .children
                .into_iter()
                .filter(|c| c.local_name() == "channel")
                .flat_map(|channel| channel.children)
                .filter(|c| c.local_name() == "item")
                .collect();
            (Some(FeedKind::Rss), items)
        }
        // RSS 1.0 keeps items next to the channel, not inside it
        "RDF" => {
            let items = root
                .children
                .into_iter()
                .filter(|c| c.local_name() == "item")
                .collect();
            (Some(FeedKind::Rdf), items)
        }
        "feed" => {
            let items = root
                .children
                .into_iter()
                .filter(|c| c.local_name() == "entry")
                .collect();
            (Some(FeedKind::Atom), items)
        }
        other => {
            debug!(root = other, "Unrecognized feed root element");
            (None, Vec::new())
        }
    };

    Ok((kind, items.into_iter().map(Element::into_entry).collect()))
}

/// Like [`parse_entries`] but malformed input degrades to zero entries
pub fn parse_feed(xml: &str, feed_url: &str) -> Vec<RawEntry> {
    match parse_entries(xml) {
        Ok((kind, entries)) => {
            debug!(%feed_url, ?kind, count = entries.len(), "Parsed feed");
            entries
        }
        Err(e) => {
            warn!(%feed_url, error = %e, "Feed XML parse failed; skipping feed");
            Vec::new()
        }
    }
}
