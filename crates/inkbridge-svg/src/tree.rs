//! Editable SVG element tree.
//!
//! This is the manipulation layer: callers find elements, change attributes,
//! append or remove nodes, then hand the tree back to a
//! [`VectorImage`](crate::VectorImage) to be re-rendered.

use std::fmt;
use std::str::FromStr;

use crate::error::{SvgError, SvgResult};
use crate::size::{parse_length, parse_view_box};

/// The SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
}

/// An SVG element with its attributes and children.
///
/// Names are qualified with their prefix when namespaced (`xlink:href`).
#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    name: String,
    /// Namespace declarations made on this element, as (prefix, uri).
    namespaces: Vec<(Option<String>, String)>,
    attributes: Vec<(String, String)>,
    children: Vec<SvgNode>,
}

impl SvgElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, name: &str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Declare a namespace on this element. `None` is the default namespace.
    pub fn with_namespace(mut self, prefix: Option<&str>, uri: &str) -> Self {
        let prefix = prefix.map(str::to_string);
        self.namespaces.retain(|(p, _)| *p != prefix);
        self.namespaces.push((prefix, uri.to_string()));
        self
    }

    /// Namespace declarations made on this element.
    pub fn namespaces(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, uri)| (prefix.as_deref(), uri.as_str()))
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Child nodes.
    pub fn children(&self) -> &[SvgNode] {
        &self.children
    }

    /// Mutable child nodes.
    pub fn children_mut(&mut self) -> &mut Vec<SvgNode> {
        &mut self.children
    }

    /// Child elements (text nodes skipped).
    pub fn elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|child| match child {
            SvgNode::Element(el) => Some(el),
            SvgNode::Text(_) => None,
        })
    }

    /// Append a child element and return a reference to it.
    pub fn append(&mut self, element: SvgElement) -> &mut SvgElement {
        self.children.push(SvgNode::Element(element));
        match self.children.last_mut() {
            Some(SvgNode::Element(el)) => el,
            _ => unreachable!("just pushed an element"),
        }
    }

    /// Concatenated text of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                SvgNode::Text(text) => Some(text.as_str()),
                SvgNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![SvgNode::Text(text.into())];
    }

    /// Depth-first search (including self) for an element with `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&SvgElement> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.elements().find_map(|el| el.find_by_id(id))
    }

    /// Mutable variant of [`find_by_id`](Self::find_by_id).
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut SvgElement> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        for child in &mut self.children {
            if let SvgNode::Element(el) = child {
                if let Some(found) = el.find_by_id_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendants (not including self) named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&SvgElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a SvgElement>) {
        for el in self.elements() {
            if el.name == name {
                found.push(el);
            }
            el.collect_named(name, found);
        }
    }

    /// Detach the first descendant with `id`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<SvgElement> {
        let direct = self
            .children
            .iter()
            .position(|child| matches!(child, SvgNode::Element(el) if el.attr("id") == Some(id)));
        if let Some(pos) = direct {
            return match self.children.remove(pos) {
                SvgNode::Element(el) => Some(el),
                SvgNode::Text(_) => None,
            };
        }
        self.children.iter_mut().find_map(|child| match child {
            SvgNode::Element(el) => el.remove_by_id(id),
            SvgNode::Text(_) => None,
        })
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (prefix, uri) in &self.namespaces {
            match prefix {
                Some(prefix) => {
                    out.push_str(" xmlns:");
                    out.push_str(prefix);
                }
                None => out.push_str(" xmlns"),
            }
            out.push_str("=\"");
            escape_into(out, uri, true);
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(out, value, true);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SvgNode::Element(el) => el.write(out),
                SvgNode::Text(text) => escape_into(out, text, false),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// A whole SVG document as an editable tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgTree {
    root: SvgElement,
}

impl SvgTree {
    /// Create an empty document of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        let root = SvgElement::new("svg")
            .with_attr("width", width)
            .with_attr("height", height)
            .with_attr("viewBox", format!("0 0 {} {}", width, height));
        Self::from_root(root)
    }

    /// Wrap an `<svg>` element built by hand.
    ///
    /// The SVG namespace is declared on the root unless it already declares
    /// a default namespace.
    pub fn from_root(mut root: SvgElement) -> Self {
        if !root.namespaces.iter().any(|(prefix, _)| prefix.is_none()) {
            root.namespaces.insert(0, (None, SVG_NS.to_string()));
        }
        Self { root }
    }

    /// Parse SVG text into an editable tree.
    pub fn parse(text: &str) -> SvgResult<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| SvgError::Parse(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(SvgError::Parse(format!(
                "Root element is <{}>, expected <svg>",
                root.tag_name().name()
            )));
        }

        Ok(Self::from_root(convert_element(root)))
    }

    /// The `<svg>` root element.
    pub fn root(&self) -> &SvgElement {
        &self.root
    }

    /// Mutable `<svg>` root element.
    pub fn root_mut(&mut self) -> &mut SvgElement {
        &mut self.root
    }

    /// Find an element by `id` anywhere in the document.
    pub fn find_by_id(&self, id: &str) -> Option<&SvgElement> {
        self.root.find_by_id(id)
    }

    /// Mutable variant of [`find_by_id`](Self::find_by_id).
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut SvgElement> {
        self.root.find_by_id_mut(id)
    }

    /// Width from the root `width` attribute, else the `viewBox` width.
    pub fn declared_width(&self) -> Option<f64> {
        positive(self.root.attr("width").and_then(parse_length))
            .or_else(|| positive(self.view_box().map(|(_, _, w, _)| w)))
    }

    /// Height from the root `height` attribute, else the `viewBox` height.
    pub fn declared_height(&self) -> Option<f64> {
        positive(self.root.attr("height").and_then(parse_length))
            .or_else(|| positive(self.view_box().map(|(_, _, _, h)| h)))
    }

    /// Parsed root `viewBox` as (min-x, min-y, width, height).
    pub fn view_box(&self) -> Option<(f64, f64, f64, f64)> {
        self.root.attr("viewBox").and_then(parse_view_box)
    }

    /// Serialize to SVG text.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.root.write(&mut out);
        out
    }
}

impl fmt::Display for SvgTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg_string())
    }
}

impl FromStr for SvgTree {
    type Err = SvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Qualify a namespaced name with the prefix in scope at `node`.
fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace {
        None | Some(SVG_NS) => local.to_string(),
        Some(XML_NS) => format!("xml:{}", local),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
            _ => local.to_string(),
        },
    }
}

/// Declarations that come into scope at `node`, i.e. those its parent
/// element does not already have.
fn own_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<(Option<String>, String)> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|ns| ns.uri() != XML_NS)
        .filter(|ns| {
            !parent.is_some_and(|p| {
                p.namespaces()
                    .any(|outer| outer.name() == ns.name() && outer.uri() == ns.uri())
            })
        })
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect()
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> SvgElement {
    let tag = node.tag_name();
    let mut element = SvgElement::new(qualified_name(node, tag.namespace(), tag.name()));
    element.namespaces = own_namespaces(node);
    element.attributes = node
        .attributes()
        .map(|attr| {
            (
                qualified_name(node, attr.namespace(), attr.name()),
                attr.value().to_string(),
            )
        })
        .collect();
    for child in node.children() {
        if child.is_element() {
            element.children.push(SvgNode::Element(convert_element(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(SvgNode::Text(text.to_string()));
            }
        }
    }
    element
}
