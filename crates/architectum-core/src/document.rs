//! Generic XML element tree and its canonical serialization
//!
//! Every document the pipeline writes goes through [`XmlElement::to_canonical_string`],
//! and the differ re-serializes both inputs through it as well. The canonical form is:
//!
//! - a fixed XML declaration line
//! - one element per line, indented by two spaces per level
//! - elements in document order
//! - attributes in the schema order of their element, unknown attributes after, by name
//! - empty elements self-closed, text-only elements on a single line
//!
//! Comments, processing instructions, the original declaration and whitespace-only
//! text do not survive parsing, so they never show up in a comparison.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ArchitectumError, Result};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

const INDENT: &str = "  ";

/// Attribute order per element of the structural schema.
const ATTRIBUTE_ORDER: &[(&str, &[&str])] = &[
    ("Application", &["name", "domain"]),
    ("Component", &["name", "description"]),
    ("Type", &["name", "kind"]),
    ("Property", &["name", "type", "required"]),
    ("Function", &["name", "method", "path"]),
    ("Returns", &["type", "reference"]),
    ("Ref", &["name"]),
];

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a single-rooted XML document.
    pub fn parse(source: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| ArchitectumError::Xml {
                position,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start, position)?),
                Event::Empty(start) => {
                    let el = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| ArchitectumError::Xml {
                        position,
                        message: "closing tag without an open element".to_string(),
                    })?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| ArchitectumError::Xml {
                        position,
                        message: e.to_string(),
                    })?;
                    append_text(&mut stack, &text, position)?;
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    append_text(&mut stack, &String::from_utf8_lossy(&data), position)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ArchitectumError::Xml {
                position: source.len(),
                message: format!("unclosed element <{}>", open.name),
            });
        }
        root.ok_or_else(|| ArchitectumError::Xml {
            position: 0,
            message: "document has no root element".to_string(),
        })
    }

    /// Serialize this element as a complete canonical document.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_canonical(&mut out, 0);
        out
    }

    fn write_canonical(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in self.canonical_attributes() {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                out.push('>');
                out.push_str(&escape(text.as_str()));
                out.push_str("</");
                out.push_str(&self.name);
                out.push_str(">\n");
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    out.push_str(&indent);
                    out.push_str(INDENT);
                    out.push_str(&escape(text.as_str()));
                    out.push('\n');
                }
                for child in &self.children {
                    child.write_canonical(out, depth + 1);
                }
                out.push_str(&indent);
                out.push_str("</");
                out.push_str(&self.name);
                out.push_str(">\n");
            }
        }
    }

    /// Attributes sorted into canonical order.
    fn canonical_attributes(&self) -> Vec<(&String, &String)> {
        let schema = ATTRIBUTE_ORDER
            .iter()
            .find(|(element, _)| *element == self.name)
            .map(|(_, order)| *order)
            .unwrap_or(&[]);
        let rank = |key: &str| schema.iter().position(|k| *k == key).unwrap_or(usize::MAX);

        let mut attrs: Vec<(&String, &String)> =
            self.attributes.iter().map(|(k, v)| (k, v)).collect();
        attrs.sort_by(|a, b| rank(a.0).cmp(&rank(b.0)).then_with(|| a.0.cmp(b.0)));
        attrs
    }
}

fn element_from_start(start: &BytesStart<'_>, position: usize) -> Result<XmlElement> {
    let xml_error = |message: String| ArchitectumError::Xml { position, message };

    let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value().map_err(|e| xml_error(e.to_string()))?;
        el.attributes.push((key, value.into_owned()));
    }
    Ok(el)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
    position: usize,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(el);
        Ok(())
    } else if root.is_none() {
        *root = Some(el);
        Ok(())
    } else {
        Err(ArchitectumError::Xml {
            position,
            message: format!("second root element <{}>", el.name),
        })
    }
}

fn append_text(stack: &mut [XmlElement], text: &str, position: usize) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(current) => {
            match &mut current.text {
                Some(existing) => existing.push_str(text),
                None => current.text = Some(text.to_string()),
            }
            Ok(())
        }
        None => Err(ArchitectumError::Xml {
            position,
            message: "text outside of the root element".to_string(),
        }),
    }
}
