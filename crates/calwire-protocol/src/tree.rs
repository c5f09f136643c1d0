//! A small namespace-resolved XML element tree.
//!
//! Multistatus responses are walked with deep searches: some servers wrap
//! `<response>` elements or property values in intermediate elements, so
//! [`Element::find`] and [`Element::find_all`] look at every descendant
//! rather than only direct children.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{DavError, DavResult};
use crate::namespace::QualifiedName;

/// Deepest element nesting accepted by [`XmlTree::parse`].
///
/// Dropping, cloning and printing a tree recurse once per level.
pub const MAX_DEPTH: usize = 256;

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct XmlTree {
    root: Element,
}

/// One element of an [`XmlTree`].
#[derive(Debug, Clone)]
pub struct Element {
    name: QualifiedName,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl XmlTree {
    /// Parses a UTF-8 XML document.
    ///
    /// # Errors
    ///
    /// Returns an invalid-response error for malformed documents, undeclared
    /// prefixes, nesting deeper than [`MAX_DEPTH`], or an empty body.
    pub fn parse(xml: &[u8]) -> DavResult<Self> {
        let mut reader = NsReader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_resolved_event_into(&mut buf)? {
                (ns, Event::Start(e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(DavError::invalid_response("XML nesting too deep"));
                    }
                    stack.push(Element::from_start(ns, &e)?);
                }
                (ns, Event::Empty(e)) => {
                    let element = Element::from_start(ns, &e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                (_, Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DavError::invalid_response("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                (_, Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&e.unescape()?);
                    }
                }
                (_, Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DavError::invalid_response("unexpected end of document"));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| DavError::invalid_response("empty XML document"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements named `name`, root included, in document order.
    pub fn find_all<'a, 'n>(
        &'a self,
        name: &'n QualifiedName,
    ) -> impl Iterator<Item = &'a Element> {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(move |e| e.name == *name)
    }

    /// The first element named `name`, root included.
    pub fn find<'a>(&'a self, name: &QualifiedName) -> Option<&'a Element> {
        self.find_all(name).next()
    }
}

impl Element {
    fn from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> DavResult<Self> {
        let namespace = match ns {
            ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
            ResolveResult::Unbound => String::new(),
            ResolveResult::Unknown(prefix) => {
                return Err(DavError::invalid_response(format!(
                    "undeclared namespace prefix: {}",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }

        Ok(Self {
            name: QualifiedName::new(namespace, local),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// The element's own text, untrimmed.
    ///
    /// Whitespace-only text (indentation between child elements) counts as
    /// no text at all.
    pub fn text(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// Attribute value by local name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order, namespace declarations excluded.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Every descendant in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All descendants named `name`, at any depth.
    pub fn find_all<'a, 'n>(
        &'a self,
        name: &'n QualifiedName,
    ) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.name == *name)
    }

    /// The first descendant named `name`, at any depth.
    pub fn find<'a>(&'a self, name: &QualifiedName) -> Option<&'a Element> {
        self.find_all(name).next()
    }
}

/// Pre-order iterator over the descendants of an [`Element`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> DavResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DavError::invalid_response("multiple root elements")),
    }
    Ok(())
}
