// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! A small owned element tree over `quick-xml`.
//!
//! Audio control files are tiny and are queried the way a DOM is queried
//! (first child by tag, next sibling by tag, attribute by name), so they are
//! read into a tree once instead of being walked as an event stream.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

pub mod tags;

/// Errors raised while reading or writing XML documents.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("XML document has no root element")]
    NoRoot,

    #[error("XML element <{0}> is never closed")]
    Unclosed(String),

    #[error("Failed to write XML: {0}")]
    Write(String),
}

/// An XML element with its attributes and child elements. Text content is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an element without attributes or children.
    pub fn new(name: &str) -> XmlElement {
        XmlElement {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute and returns the element.
    pub fn with_attribute(mut self, name: &str, value: &str) -> XmlElement {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds a child and returns the element.
    pub fn with_child(mut self, child: XmlElement) -> XmlElement {
        self.children.push(child);
        self
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Parses a document and returns its root element.
    pub fn parse(data: &[u8]) -> Result<XmlElement, XmlError> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(Self::from_start(&e)?),
                Event::Empty(e) => {
                    let element = Self::from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        continue;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match stack.into_iter().next() {
            Some(unclosed) => Err(XmlError::Unclosed(unclosed.name)),
            None => Err(XmlError::NoRoot),
        }
    }

    fn from_start(start: &BytesStart) -> Result<XmlElement, XmlError> {
        let mut element = XmlElement::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the tag name matches, ignoring case.
    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// Returns the value of the named attribute (exact match).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of the named attribute, ignoring the case of the name.
    pub fn attribute_ignore_case(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns all child elements.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Returns the first child element, whatever its tag.
    pub fn first_element(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    /// Returns the first child element with the given tag.
    pub fn first_child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == tag)
    }

    /// Returns every child element with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == tag)
    }

    /// Serializes the element and its children.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| XmlError::Write(e.to_string()))?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = br#"<?xml version="1.0"?>
            <ATLConfig atl_name="test">
                <AudioTriggers>
                    <ATLTrigger atl_name="play">
                        <AmplitudeEvent amplitude_name="explosion"/>
                    </ATLTrigger>
                    <ATLTrigger atl_name="stop"></ATLTrigger>
                </AudioTriggers>
            </ATLConfig>"#;

        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.name(), "ATLConfig");
        assert_eq!(root.attribute("atl_name"), Some("test"));

        let triggers = root.first_child("AudioTriggers").unwrap();
        let names: Vec<_> = triggers
            .children_named("ATLTrigger")
            .filter_map(|t| t.attribute("atl_name"))
            .collect();
        assert_eq!(names, vec!["play", "stop"]);

        let event = triggers
            .first_child("ATLTrigger")
            .and_then(|t| t.first_child("AmplitudeEvent"))
            .unwrap();
        assert_eq!(event.attribute("amplitude_name"), Some("explosion"));
        assert_eq!(event.attribute("AMPLITUDE_NAME"), None);
        assert_eq!(event.attribute_ignore_case("AMPLITUDE_NAME"), Some("explosion"));
    }

    #[test]
    fn test_parse_empty_root() {
        let root = XmlElement::parse(b"<Root a=\"1\"/>").unwrap();
        assert!(root.is("root"));
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(XmlElement::parse(b""), Err(XmlError::NoRoot)));
        assert!(matches!(
            XmlElement::parse(b"<Root><Child>"),
            Err(XmlError::Unclosed(name)) if name == "Root"
        ));
        assert!(XmlElement::parse(b"<Root></Other>").is_err());
    }

    #[test]
    fn test_write_then_read() {
        let element = XmlElement::new("AmplitudeSwitch")
            .with_attribute("amplitude_id", "12")
            .with_attribute("amplitude_name", "surface")
            .with_child(
                XmlElement::new("AmplitudeSwitchState").with_attribute("amplitude_id", "3"),
            );

        let text = element.to_xml_string().unwrap();
        assert_eq!(XmlElement::parse(text.as_bytes()).unwrap(), element);
    }
}
