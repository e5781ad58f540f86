use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use super::DocxError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in a parsed XML part
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data, stored unescaped
    Text(String),
    /// Comments and CDATA sections, stored as written
    Raw(String),
}

/// An XML element with qualified name and raw (still escaped) attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute; the value is escaped here
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(text.to_string()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Attribute value, unescaped
    pub fn attr(&self, key: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| unescape_xml(v))
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = escaped,
            None => self.attrs.push((key.to_string(), escaped)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn find_child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(name))
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|c| match c {
            XmlNode::Element(e) if e.is(name) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize this element and its subtree
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to(out),
                XmlNode::Text(t) => out.push_str(&escape(t.as_str())),
                XmlNode::Raw(r) => out.push_str(r),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Raw(_) => {}
        }
    }
}

/// Parse an XML part into its root element
pub fn parse_xml(xml: &str) -> Result<XmlElement, DocxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false); // run text is whitespace-significant

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    // Raw text is buffered because entity references arrive as separate events
    let mut pending = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                flush_text(&mut pending, &mut stack);
                stack.push(element_from_start(e));
            }
            Ok(Event::Empty(ref e)) => {
                flush_text(&mut pending, &mut stack);
                attach(element_from_start(e), &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                flush_text(&mut pending, &mut stack);
                let element = stack
                    .pop()
                    .ok_or_else(|| DocxError::Xml("unbalanced end tag".to_string()))?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::Text(ref e)) => {
                pending.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(ref e)) => {
                pending.push('&');
                pending.push_str(&String::from_utf8_lossy(e.as_ref()));
                pending.push(';');
            }
            Ok(Event::CData(e)) => {
                flush_text(&mut pending, &mut stack);
                let raw = format!("<![CDATA[{}]]>", String::from_utf8_lossy(&e.into_inner()));
                push_raw(raw, &mut stack);
            }
            Ok(Event::Comment(ref e)) => {
                flush_text(&mut pending, &mut stack);
                let raw = format!("<!--{}-->", String::from_utf8_lossy(e.as_ref()));
                push_raw(raw, &mut stack);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocxError::Xml(format!(
                    "parse error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(DocxError::Xml(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }

    root.ok_or_else(|| DocxError::Xml("document has no root element".to_string()))
}

/// Serialize a root element with the standard OOXML declaration
pub fn write_xml(root: &XmlElement) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push_str("\r\n");
    root.write_to(&mut out);
    out
}

fn element_from_start(e: &BytesStart) -> XmlElement {
    XmlElement {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        attrs: e
            .attributes()
            .flatten()
            .map(|a| {
                (
                    String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&a.value).into_owned(),
                )
            })
            .collect(),
        children: Vec::new(),
    }
}

fn attach(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn flush_text(pending: &mut String, stack: &mut [XmlElement]) {
    if pending.is_empty() {
        return;
    }
    // Text outside the root element (prolog whitespace) is dropped
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Text(unescape_xml(pending)));
    }
    pending.clear();
}

fn push_raw(raw: String, stack: &mut [XmlElement]) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Raw(raw));
    }
}

/// Unescape the predefined XML entities and numeric character references
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let Some(semi) = after.find(';') else {
            out.push_str(&rest[amp..]);
            return out;
        };
        let entity = &after[..semi];
        match decode_entity(entity) {
            Some(c) => out.push(c),
            None => {
                out.push('&');
                out.push_str(entity);
                out.push(';');
            }
        }
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}
