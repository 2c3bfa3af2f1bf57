//! In-memory markup documents.
//!
//! Renderers materialize nodes into a [`Document`]: an arena of named
//! elements with ordered attributes, inline styles and children. Detached
//! elements stay alive in the arena so a node keeps its element for its whole
//! lifetime and can be re-attached later.
//!
//! Serialization goes through the `svg` crate's generic element model, so
//! the same writer serves both SVG and VML output.
//!
//! # Examples
//!
//! ```
//! # use quill::markup::Document;
//! let mut doc = Document::new("svg");
//! let rect = doc.create("rect");
//! doc.set_attr(rect, "width", "10");
//! doc.set_style(rect, "cursor", "pointer");
//! doc.append(doc.root(), rect);
//!
//! let markup = doc.to_string();
//! assert!(markup.contains("width=\"10\""));
//! assert!(markup.contains("cursor:pointer"));
//! ```

use std::fmt;

use indexmap::IndexMap;
use svg::{
    Node as _,
    node::{Text as TextNode, element::Element as SvgElement},
};

/// Handle of an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Position of the element in the document arena.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Child {
    Element(ElementId),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    children: Vec<Child>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: IndexMap::new(),
            styles: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// A tree of markup elements with a fixed root.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Creates a document whose root element is named `root_name`.
    pub fn new(root_name: &str) -> Self {
        Self {
            elements: vec![Element::new(root_name)],
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Creates a detached element.
    pub fn create(&mut self, name: &str) -> ElementId {
        self.elements.push(Element::new(name));
        ElementId(self.elements.len() - 1)
    }

    pub fn name(&self, id: ElementId) -> &str {
        &self.elements[id.0].name
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl fmt::Display) {
        self.elements[id.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) {
        self.elements[id.0].attributes.shift_remove(name);
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0].attributes.get(name).map(String::as_str)
    }

    pub fn set_style(&mut self, id: ElementId, name: &str, value: impl fmt::Display) {
        self.elements[id.0]
            .styles
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_style(&mut self, id: ElementId, name: &str) {
        self.elements[id.0].styles.shift_remove(name);
    }

    pub fn style(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements[id.0].styles.get(name).map(String::as_str)
    }

    /// Appends a text run after the existing children.
    pub fn append_text(&mut self, id: ElementId, text: &str) {
        self.elements[id.0]
            .children
            .push(Child::Text(text.to_string()));
    }

    /// The concatenated text runs of `id` and its descendants.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut content = String::new();
        self.collect_text(id, &mut content);
        content
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        for child in &self.elements[id.0].children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(element) => self.collect_text(*element, out),
            }
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.elements[parent.0].children.push(Child::Element(child));
        self.elements[child.0].parent = Some(parent);
    }

    /// Inserts `child` as the first child of `parent`, detaching it first.
    pub fn insert_first(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.elements[parent.0]
            .children
            .insert(0, Child::Element(child));
        self.elements[child.0].parent = Some(parent);
    }

    /// Removes `id` from its parent. The element stays in the arena.
    pub fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.elements[id.0].parent.take() {
            self.elements[parent.0]
                .children
                .retain(|child| *child != Child::Element(id));
        }
    }

    /// Detaches every child of `id` and drops its text runs.
    pub fn clear_children(&mut self, id: ElementId) {
        let children = std::mem::take(&mut self.elements[id.0].children);
        for child in children {
            if let Child::Element(element) = child {
                self.elements[element.0].parent = None;
            }
        }
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    /// Element children of `id`, in order.
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.elements[id.0].children.iter().filter_map(|child| match child {
            Child::Element(element) => Some(*element),
            Child::Text(_) => None,
        })
    }

    /// First child of `id` with the given element name.
    pub fn child_named(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.children(id).find(|child| self.name(*child) == name)
    }

    /// `true` when `id` is the root or hangs below it.
    pub fn is_connected(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(element) = current {
            if element == self.root() {
                return true;
            }
            current = self.parent(element);
        }
        false
    }

    /// Finds a connected element by its `id` attribute.
    pub fn find(&self, id_attr: &str) -> Option<ElementId> {
        let mut stack = vec![self.root()];
        while let Some(element) = stack.pop() {
            if self.attr(element, "id") == Some(id_attr) {
                return Some(element);
            }
            stack.extend(self.children(element));
        }
        None
    }

    /// Converts `id` and its subtree into an `svg` crate element.
    pub fn to_svg_element(&self, id: ElementId) -> SvgElement {
        let element = &self.elements[id.0];
        let mut node = SvgElement::new(element.name.as_str());
        for (name, value) in &element.attributes {
            node.assign(name.as_str(), value.as_str());
        }
        if !element.styles.is_empty() {
            let style = element
                .styles
                .iter()
                .map(|(name, value)| format!("{name}:{value}"))
                .collect::<Vec<_>>()
                .join(";");
            node.assign("style", style);
        }
        for child in &element.children {
            match child {
                Child::Element(child) => node.append(self.to_svg_element(*child)),
                Child::Text(text) => node.append(TextNode::new(text.as_str())),
            }
        }
        node
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_element(self.root()))
    }
}
