//! XHTML parsing
//!
//! The engine only accepts well-formed markup: every element must be closed
//! (`<br/>`, not `<br>`), and attribute values must be quoted. Anything else
//! is reported as [`EngineError::MalformedHtml`]. HTML named entities that
//! commonly appear in documents are resolved alongside the XML ones.

use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{EngineError, Result};

/// Deepest element nesting accepted; the DOM is walked recursively
pub const MAX_NESTING_DEPTH: usize = 256;

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with lower-cased name and attribute keys
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth first, self excluded) with the given name
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => collect_text(inner, out),
        }
    }
}

/// Parse an XHTML document and return its root element
pub fn parse_document(html: &str) -> Result<Element> {
    let mut reader = Reader::from_str(html);
    let mut buf = Vec::new();
    let mut stack = vec![Element::new("#document")];

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if stack.len() > MAX_NESTING_DEPTH {
                    return Err(EngineError::MalformedHtml(format!(
                        "nesting too deep: more than {} levels",
                        MAX_NESTING_DEPTH
                    )));
                }
                stack.push(start_element(e)?);
            }
            Event::Empty(ref e) => {
                let element = start_element(e)?;
                append(&mut stack, Node::Element(element));
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    EngineError::MalformedHtml("unexpected closing tag".to_string())
                })?;
                if stack.is_empty() {
                    return Err(EngineError::MalformedHtml(format!(
                        "closing tag without matching <{}>",
                        element.name
                    )));
                }
                append(&mut stack, Node::Element(element));
            }
            Event::Text(ref e) => {
                let raw = std::str::from_utf8(e)
                    .map_err(|err| EngineError::MalformedHtml(err.to_string()))?;
                let text = unescape_with(raw, resolve_entity)
                    .map_err(|err| EngineError::MalformedHtml(err.to_string()))?;
                append(&mut stack, Node::Text(text.into_owned()));
            }
            Event::CData(ref e) => {
                let text = String::from_utf8_lossy(e).into_owned();
                append(&mut stack, Node::Text(text));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(EngineError::MalformedHtml(format!(
            "element <{}> is never closed",
            open
        )));
    }

    let document = stack.pop().unwrap_or_default();
    let mut roots = document.children.into_iter().filter_map(|node| match node {
        Node::Element(element) => Some(element),
        Node::Text(_) => None,
    });
    roots
        .next()
        .ok_or_else(|| EngineError::MalformedHtml("document has no root element".to_string()))
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
    let mut element = Element::new(name);

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|err| EngineError::MalformedHtml(err.to_string()))?;
        let value = unescape_with(raw, resolve_entity)
            .map_err(|err| EngineError::MalformedHtml(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "pound" => "\u{a3}",
        "euro" => "\u{20ac}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "times" => "\u{d7}",
        "deg" => "\u{b0}",
        _ => return None,
    };
    Some(value)
}
