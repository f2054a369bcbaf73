//! Namespace-resolved XML element tree
//!
//! Service-API payloads are small, so each response is read once into an
//! owned tree and then queried with ElementTree-style lookups. Element and
//! attribute names carry their resolved namespace URI; prefixes are gone.

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::slice;

use crate::error::{ParseError, ParseResult};
use crate::namespaces;

/// A namespace-qualified name to match elements and attributes against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name<'a> {
    pub namespace: Option<&'a str>,
    pub local: &'a str,
}

impl<'a> Name<'a> {
    /// Name in the given namespace
    pub const fn ns(namespace: &'a str, local: &'a str) -> Self {
        Name {
            namespace: Some(namespace),
            local,
        }
    }

    /// Name in no namespace
    pub const fn bare(local: &'a str) -> Self {
        Name {
            namespace: None,
            local,
        }
    }

    /// Name in an optional namespace (`None` = no namespace)
    pub const fn with(namespace: Option<&'a str>, local: &'a str) -> Self {
        Name { namespace, local }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Attribute {
    namespace: Option<String>,
    local: String,
    value: String,
}

impl Attribute {
    fn is(&self, name: Name<'_>) -> bool {
        self.local == name.local && self.namespace.as_deref() == name.namespace
    }
}

/// One element of a parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local: String,
    attributes: Vec<Attribute>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn is(&self, name: Name<'_>) -> bool {
        self.local == name.local && self.namespace.as_deref() == name.namespace
    }

    /// Character content directly inside this element, trimmed.
    ///
    /// Text runs on both sides of child elements are concatenated, so
    /// `<name>A<b/>B</name>` yields `"AB"`. `None` when the element has no
    /// text or only whitespace.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn attribute(&self, name: Name<'_>) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is(name))
            .map(|a| a.value.as_str())
    }

    pub fn children(&self) -> slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// First direct child with the given name
    pub fn child(&self, name: Name<'_>) -> Option<&Element> {
        self.children.iter().find(|c| c.is(name))
    }

    /// All elements below this one in document order (excluding itself)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// First descendant with the given name (`.//name`)
    pub fn find(&self, name: Name<'_>) -> Option<&Element> {
        self.descendants().find(|e| e.is(name))
    }

    /// All descendants with the given name (`.//name`)
    pub fn find_all<'a>(&'a self, name: Name<'a>) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |e| e.is(name))
    }

    /// Elements matching `.//first/second/.../last`: any descendant named
    /// `first`, then direct children along the remaining steps.
    pub fn select<'a>(&'a self, path: &[Name<'_>]) -> Vec<&'a Element> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&'a Element> = self.descendants().filter(|e| e.is(*first)).collect();
        for step in rest {
            current = current
                .into_iter()
                .flat_map(|e| e.children().filter(move |c| c.is(*step)))
                .collect();
        }
        current
    }

    /// First element matching [`Element::select`]
    pub fn select_first<'a>(&'a self, path: &[Name<'_>]) -> Option<&'a Element> {
        self.select(path).into_iter().next()
    }
}

/// Pre-order iterator over the descendants of an element
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(element) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a complete XML payload.
    ///
    /// The encoding named in the XML declaration is honored, so Latin-1
    /// payloads decode like UTF-8 ones.
    ///
    /// Fails with [`ParseError::Malformed`] on syntax errors, mismatched or
    /// unclosed tags, unbound prefixes, a missing root or content after it.
    pub fn parse(xml: &[u8]) -> ParseResult<Self> {
        let mut reader = NsReader::from_reader(xml);
        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            // Settled by the XML declaration, which is always the first event
            let decoder = reader.decoder();
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = resolved_namespace(decoder, resolved)?;

            match event {
                Event::Start(start) => {
                    if open.is_empty() && root.is_some() {
                        return Err(ParseError::malformed("content after the root element"));
                    }
                    open.push(open_element(&reader, namespace, &start)?);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, namespace, &start)?;
                    close_element(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| ParseError::malformed("closing tag without opening tag"))?;
                    close_element(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    append_text(&mut open, &text)?;
                }
                Event::CData(cdata) => {
                    let text = decode(decoder, &cdata)?;
                    append_text(&mut open, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(ParseError::malformed(format!(
                "unexpected end of document inside <{}>",
                unclosed.local
            )));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| ParseError::malformed("document has no root element"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn decode(decoder: Decoder, bytes: &[u8]) -> ParseResult<String> {
    decoder
        .decode(bytes)
        .map(|text| text.into_owned())
        .map_err(|e| ParseError::malformed(format!("undecodable text: {}", e)))
}

fn resolved_namespace(
    decoder: Decoder,
    resolved: ResolveResult<'_>,
) -> ParseResult<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(decode(decoder, ns.as_ref())?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(ParseError::malformed(format!(
            "unbound namespace prefix `{}`",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn open_element<R>(
    reader: &NsReader<R>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> ParseResult<Element> {
    let decoder = reader.decoder();
    let local = decode(decoder, start.local_name().as_ref())?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key;
        if key.as_namespace_binding().is_some() {
            continue;
        }

        let (namespace, local) = match key.prefix() {
            Some(prefix) if prefix.as_ref() == b"xml" => {
                (Some(namespaces::XML.to_string()), key.local_name())
            }
            _ => {
                let (resolved, local) = reader.resolve_attribute(key);
                (resolved_namespace(decoder, resolved)?, local)
            }
        };

        attributes.push(Attribute {
            namespace,
            local: decode(decoder, local.as_ref())?,
            value: attribute_value(decoder, &attr.value)?,
        });
    }

    Ok(Element {
        namespace,
        local,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attribute_value(decoder: Decoder, raw: &[u8]) -> ParseResult<String> {
    let decoded = decode(decoder, raw)?;
    unescape(&decoded)
        .map(|value| value.into_owned())
        .map_err(|e| ParseError::malformed(e.to_string()))
}

fn close_element(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> ParseResult<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ParseError::malformed("more than one root element")),
    }
    Ok(())
}

fn append_text(open: &mut [Element], text: &str) -> ParseResult<()> {
    match open.last_mut() {
        Some(parent) => parent.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(ParseError::malformed("text outside the root element")),
    }
    Ok(())
}
