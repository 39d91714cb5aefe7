//! Generic XML element tree.
//!
//! The MusicXML reader first builds this tree from `quick-xml` events, then maps the parts it
//! understands onto the typed score model. Everything it does not model stays an
//! [`XmlElement`] and is written back unchanged.

use crate::error::ScoreError;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node inside an element: a child element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// An element holding a single text node, e.g. `<step>C</step>`.
    pub fn with_text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: vec![XmlNode::Text(text.to_string())],
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Trimmed text of the first child with this name.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|el| el.text().trim().to_string())
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![XmlNode::Text(text.to_string())];
    }

    /// Replace the text of the first child named `name`, appending the child if absent.
    pub fn set_child_text(&mut self, name: &str, text: &str) {
        match self.child_mut(name) {
            Some(child) => child.set_text(text),
            None => self.push(XmlElement::with_text(name, text)),
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert `child` right after the last child whose name is in `after`, or first if none.
    pub fn insert_after_last_of(&mut self, after: &[&str], child: XmlElement) {
        let position = self
            .children
            .iter()
            .rposition(|node| matches!(node, XmlNode::Element(el) if after.contains(&el.name.as_str())))
            .map(|i| i + 1)
            .unwrap_or(0);
        self.children.insert(position, XmlNode::Element(child));
    }

    /// Remove every child element with this name, returning how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(el) if el.name == name));
        before - self.children.len()
    }

    /// Parse a document and return its root element.
    ///
    /// The XML declaration, DOCTYPE, comments and processing instructions are dropped.
    /// Whitespace-only text is dropped; other text is trimmed.
    pub fn parse(xml: &str) -> Result<XmlElement, ScoreError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| xml_error(position, e))?;
            match event {
                Event::Start(start) => stack.push(element_from_start(&start, position)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| ScoreError::Xml {
                        position,
                        message: "closing tag without matching opening tag".to_string(),
                    })?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = text.unescape().map_err(|e| xml_error(position, e))?;
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(XmlNode::Text(value));
                    }
                }
                Event::Eof => break,
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ScoreError::Xml {
                position: reader.buffer_position(),
                message: format!("unclosed element <{}>", open.name),
            });
        }

        root.ok_or_else(|| ScoreError::Xml {
            position: 0,
            message: "document has no root element".to_string(),
        })
    }

    /// Serialize with two-space indentation starting at `depth`.
    ///
    /// Text-only elements stay on one line; mixed content is written without added whitespace.
    pub fn write(&self, out: &mut String, depth: usize) {
        indent(out, depth);
        self.write_inline(out, Some(depth));
        out.push('\n');
    }

    /// `depth` is `Some` while element-only content may still be broken onto indented lines.
    fn write_inline(&self, out: &mut String, depth: Option<usize>) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let has_text = self
            .children
            .iter()
            .any(|node| matches!(node, XmlNode::Text(_)));

        match depth {
            Some(depth) if !has_text => {
                out.push('\n');
                for child in self.elements() {
                    child.write(out, depth + 1);
                }
                indent(out, depth);
            }
            _ => {
                for node in &self.children {
                    match node {
                        XmlNode::Text(t) => out.push_str(&escape(t.as_str())),
                        XmlNode::Element(el) => el.write_inline(out, None),
                    }
                }
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn element_from_start(start: &BytesStart, position: usize) -> Result<XmlElement, ScoreError> {
    let mut element = XmlElement::new(&String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(position, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| xml_error(position, e))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: usize,
) -> Result<(), ScoreError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ScoreError::Xml {
            position,
            message: format!("second root element <{}>", element.name),
        }),
    }
}

fn xml_error(position: usize, error: impl std::fmt::Display) -> ScoreError {
    ScoreError::Xml {
        position,
        message: error.to_string(),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_and_attributes() {
        let root = XmlElement::parse(
            r#"<?xml version="1.0"?>
<!-- comment -->
<note default-x="12"><pitch><step>C</step><octave>4</octave></pitch><rest/></note>"#,
        )
        .unwrap();
        assert_eq!(root.name, "note");
        assert_eq!(root.attribute("default-x"), Some("12"));
        let pitch = root.child("pitch").unwrap();
        assert_eq!(pitch.child_text("step"), Some("C".to_string()));
        assert_eq!(pitch.child_text("octave"), Some("4".to_string()));
        assert!(root.has_child("rest"));
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let root = XmlElement::parse(r#"<credit-words a="x &amp; y">Rock &amp; Roll</credit-words>"#)
            .unwrap();
        assert_eq!(root.attribute("a"), Some("x & y"));
        assert_eq!(root.text(), "Rock & Roll");
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(XmlElement::parse("<a><b></a>").is_err());
    }

    #[test]
    fn test_parse_rejects_unclosed_root() {
        assert!(XmlElement::parse("<a><b/>").is_err());
    }

    #[test]
    fn test_write_indents_children_and_inlines_text() {
        let element = XmlElement::new("pitch")
            .with_child(XmlElement::with_text("step", "B"))
            .with_child(XmlElement::with_text("alter", "-1"));
        let mut out = String::new();
        element.write(&mut out, 1);
        assert_eq!(
            out,
            "  <pitch>\n    <step>B</step>\n    <alter>-1</alter>\n  </pitch>\n"
        );
    }

    #[test]
    fn test_write_escapes_and_self_closes() {
        let element = XmlElement::with_text("words", "a < b")
            .with_attribute("font", "\"x\"");
        let mut out = String::new();
        element.write(&mut out, 0);
        assert_eq!(out, "<words font=\"&quot;x&quot;\">a &lt; b</words>\n");

        let mut out = String::new();
        XmlElement::new("dot").write(&mut out, 0);
        assert_eq!(out, "<dot/>\n");
    }

    #[test]
    fn test_set_child_text_and_remove_children() {
        let mut element = XmlElement::new("score-part");
        element.set_child_text("part-name", "Trumpet");
        element.set_child_text("part-name", "Horn");
        assert_eq!(element.child_text("part-name"), Some("Horn".to_string()));
        element.push(XmlElement::new("x"));
        element.push(XmlElement::new("x"));
        assert_eq!(element.remove_children("x"), 2);
        assert_eq!(element.elements().count(), 1);
    }

    #[test]
    fn test_insert_after_last_of() {
        let mut attributes = XmlElement::new("attributes")
            .with_child(XmlElement::new("divisions"))
            .with_child(XmlElement::new("clef"))
            .with_child(XmlElement::new("measure-style"));
        attributes.insert_after_last_of(&["clef", "time"], XmlElement::new("transpose"));
        let names: Vec<&str> = attributes.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["divisions", "clef", "transpose", "measure-style"]);
    }
}
