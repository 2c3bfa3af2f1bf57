//! Scene graph nodes.
//!
//! A [`Scene`] is an arena of [`Node`]s keyed by [`NodeId`]. Every node has
//! at most one [`Parent`], either the scene root or a group node, and holds
//! its own transform, paint, visibility and indication state. Nodes are never
//! destroyed: ejecting a node only detaches it, so it can be injected again.
//!
//! The scene is backend independent. Renderers read it to materialize markup;
//! [`RendererHandle`](crate::RendererHandle) is the only writer.
//!
//! # Capabilities
//!
//! - [`Renderable`] - attach, detach, hide, show and indicate a node.
//! - [`Container`] - adopt other nodes.
//! - [`Transformable`](quill_core::transform::Transformable) - the affine
//!   transform operations, re-exported from `quill-core`.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;

use quill_core::{
    font::FontQuery,
    geometry::Rect,
    paint::{Fill, Stroke},
    path::Path,
    transform::Transform,
};

use crate::config::TextConfig;

/// Handle of a node inside a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the scene arena. Also its unique id in markup.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Where a node is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The top level of the scene.
    Root,
    /// A group node.
    Node(NodeId),
}

impl From<NodeId> for Parent {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAlign {
    /// The SVG `text-anchor` value.
    pub fn to_svg_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }

    /// The VML `v-text-align` value.
    pub fn to_vml_value(self) -> &'static str {
        match self {
            Self::Start => "left",
            Self::Middle => "center",
            Self::End => "right",
        }
    }
}

/// Accepts both the SVG (`start`, `middle`, `end`) and the box
/// (`left`, `center`, `right`) spellings.
impl FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "left" => Ok(Self::Start),
            "middle" | "center" => Ok(Self::Middle),
            "end" | "right" => Ok(Self::End),
            other => Err(format!("unknown text alignment `{other}`")),
        }
    }
}

/// The font of a text node.
#[derive(Debug, Clone, PartialEq)]
pub enum TextFont {
    /// A CSS `font` shorthand such as `bold 16px Moderna`.
    Shorthand(String),
    /// Individual CSS font properties, e.g. `font-family` and `font-size`.
    Properties(IndexMap<String, String>),
}

impl TextFont {
    /// Builds a property list. `fontSize` style keys are converted to
    /// `font-size`.
    pub fn properties<'a>(properties: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Properties(
            properties
                .into_iter()
                .map(|(name, value)| (css_property_name(name), value.to_string()))
                .collect(),
        )
    }

    /// The font as a query, with missing parts taken from `defaults`.
    ///
    /// A shorthand that fails to parse resolves to the defaults.
    pub fn query(&self, defaults: &TextConfig) -> FontQuery {
        let mut query = match self {
            Self::Shorthand(shorthand) => quill_parser::parse_font_shorthand(shorthand)
                .unwrap_or_else(|_| FontQuery::new(defaults.font_family())),
            Self::Properties(properties) => {
                let family = properties
                    .get("font-family")
                    .map(|family| family.trim_matches(|c| c == '"' || c == '\'').to_string())
                    .unwrap_or_default();
                let size = properties
                    .get("font-size")
                    .and_then(|size| parse_leading_number(size));
                let bold = properties
                    .get("font-weight")
                    .is_some_and(|weight| is_bold_weight(weight));
                let italic = properties
                    .get("font-style")
                    .is_some_and(|style| style.contains("italic") || style.contains("oblique"));
                FontQuery {
                    family,
                    size,
                    bold,
                    italic,
                }
            }
        };
        if query.family.trim().is_empty() {
            query.family = defaults.font_family().to_string();
        }
        if query.size.is_none() {
            query.size = Some(defaults.font_size());
        }
        query
    }
}

impl From<&str> for TextFont {
    fn from(shorthand: &str) -> Self {
        Self::Shorthand(shorthand.to_string())
    }
}

fn is_bold_weight(weight: &str) -> bool {
    let weight = weight.trim();
    weight.eq_ignore_ascii_case("bold")
        || weight.eq_ignore_ascii_case("bolder")
        || weight.parse::<f64>().is_ok_and(|w| w > 400.0)
}

fn parse_leading_number(value: &str) -> Option<f64> {
    let end = value
        .trim()
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.trim().len());
    value.trim()[..end].parse().ok()
}

/// `fontSize` becomes `font-size`; kebab case passes through.
fn css_property_name(name: &str) -> String {
    let mut css = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            css.push('-');
            css.push(c.to_ascii_lowercase());
        } else {
            css.push(c);
        }
    }
    css
}

/// The content of a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    text: String,
    font: Option<TextFont>,
    align: Option<TextAlign>,
    path: Option<Path>,
}

impl TextContent {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font: None,
            align: None,
            path: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines split on `\n` and `\r\n`.
    pub fn lines(&self) -> Vec<&str> {
        self.text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }

    pub fn font(&self) -> Option<&TextFont> {
        self.font.as_ref()
    }

    pub fn align(&self) -> Option<TextAlign> {
        self.align
    }

    /// The path the text follows, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub(crate) fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub(crate) fn set_font(&mut self, font: TextFont) {
        self.font = Some(font);
    }

    pub(crate) fn set_align(&mut self, align: TextAlign) {
        self.align = Some(align);
    }

    pub(crate) fn set_path(&mut self, path: Option<Path>) {
        self.path = path;
    }
}

/// How a redraw treats the path a text node follows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextPathChange {
    /// Keep the current path, if any.
    #[default]
    Keep,
    /// Lay the text out along a new path.
    Follow(Path),
    /// Stop following a path.
    Remove,
}

/// The variant of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Shape { path: Path },
    Text(TextContent),
    Image { src: String },
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Group)
    }

    /// A short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Shape { .. } => "shape",
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
        }
    }
}

/// One node of the scene.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<Parent>,
    children: Vec<NodeId>,
    transform: Transform,
    bounds: Rect,
    fill: Fill,
    stroke: Stroke,
    hidden: bool,
    cursor: Option<String>,
    tooltip: Option<String>,
}

impl Node {
    fn new(kind: NodeKind, bounds: Rect) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            transform: Transform::identity(),
            bounds,
            fill: Fill::None,
            stroke: Stroke::default(),
            hidden: false,
            cursor: None,
            tooltip: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// `None` while detached.
    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    /// Attached children in paint order. Always empty for non-groups.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// The node's box in its own user space. Parts that were never given
    /// are zero.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn fill(&self) -> &Fill {
        &self.fill
    }

    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub(crate) fn set_fill(&mut self, fill: Fill) {
        self.fill = fill;
    }

    pub(crate) fn set_stroke(&mut self, stroke: Stroke) {
        self.stroke = stroke;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn set_cursor(&mut self, cursor: &str) {
        self.cursor = Some(cursor.to_string());
    }

    pub(crate) fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = Some(tooltip.to_string());
    }
}

/// The node arena and the attachment tree.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    size: Option<(f64, f64)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canvas size, once set.
    pub fn size(&self) -> Option<(f64, f64)> {
        self.size
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Children attached under `parent`, in paint order.
    pub fn children_of(&self, parent: Parent) -> &[NodeId] {
        match parent {
            Parent::Root => &self.roots,
            Parent::Node(id) => self.node(id).map_or(&[], Node::children),
        }
    }

    /// `true` when `id` is `ancestor` or hangs below it.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = match self.node(node).and_then(Node::parent) {
                Some(Parent::Node(parent)) => Some(parent),
                _ => None,
            };
        }
        false
    }

    /// The composed transform of `id` and its attached ancestors, outermost
    /// first.
    pub fn active_transform(&self, id: NodeId) -> Transform {
        let Some(node) = self.node(id) else {
            return Transform::identity();
        };
        match node.parent {
            Some(Parent::Node(parent)) => self.active_transform(parent).multiply(&node.transform),
            _ => node.transform,
        }
    }

    pub(crate) fn set_size(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }

    pub(crate) fn add(&mut self, kind: NodeKind, bounds: Rect) -> NodeId {
        self.nodes.push(Node::new(kind, bounds));
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Appends `id` to the children of `parent`. The node must be detached.
    pub(crate) fn attach(&mut self, id: NodeId, parent: Parent) {
        match parent {
            Parent::Root => self.roots.push(id),
            Parent::Node(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id.0) {
                    parent_node.children.push(id);
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = Some(parent);
        }
    }

    /// Removes `id` from its parent and returns the parent it had.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<Parent> {
        let parent = self.nodes.get_mut(id.0)?.parent.take()?;
        match parent {
            Parent::Root => self.roots.retain(|child| *child != id),
            Parent::Node(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id.0) {
                    parent_node.children.retain(|child| *child != id);
                }
            }
        }
        Some(parent)
    }
}

/// A node that can be placed in the tree, hidden and indicated.
pub trait Renderable {
    /// Attaches the node as the last child of `parent`, ejecting it from its
    /// current parent first.
    fn inject(&mut self, parent: Parent) -> &mut Self;

    /// Detaches the node. A no-op while detached.
    fn eject(&mut self) -> &mut Self;

    fn hide(&mut self) -> &mut Self;

    fn show(&mut self) -> &mut Self;

    /// Sets the hover cursor and the tooltip. `None` keeps the current value.
    fn indicate(&mut self, cursor: Option<&str>, tooltip: Option<&str>) -> &mut Self;
}

/// A node that adopts other nodes.
pub trait Container {
    /// Injects every node of `children` into this container, in order.
    fn grab(&mut self, children: &[NodeId]) -> &mut Self;
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn group(scene: &mut Scene) -> NodeId {
        scene.add(NodeKind::Group, Rect::default())
    }

    #[test]
    fn test_attach_and_detach() {
        let mut scene = Scene::new();
        let g = group(&mut scene);
        let child = group(&mut scene);

        scene.attach(g, Parent::Root);
        scene.attach(child, g.into());
        assert_eq!(scene.children_of(Parent::Root), &[g]);
        assert_eq!(scene.children_of(g.into()), &[child]);

        assert_eq!(scene.detach(child), Some(Parent::Node(g)));
        assert!(scene.children_of(g.into()).is_empty());
        assert_eq!(scene.detach(child), None);
    }

    #[test]
    fn test_is_within() {
        let mut scene = Scene::new();
        let outer = group(&mut scene);
        let inner = group(&mut scene);
        let leaf = group(&mut scene);
        scene.attach(inner, outer.into());
        scene.attach(leaf, inner.into());

        assert!(scene.is_within(leaf, outer));
        assert!(scene.is_within(outer, outer));
        assert!(!scene.is_within(outer, leaf));
    }

    #[test]
    fn test_active_transform_composes_ancestors() {
        let mut scene = Scene::new();
        let outer = group(&mut scene);
        let leaf = group(&mut scene);
        scene.attach(outer, Parent::Root);
        scene.attach(leaf, outer.into());
        scene
            .node_mut(outer)
            .unwrap()
            .set_transform(Transform::translation(10.0, 0.0));
        scene
            .node_mut(leaf)
            .unwrap()
            .set_transform(Transform::scaling(2.0, 2.0));

        let p = scene.active_transform(leaf).point(1.0, 1.0);
        assert_approx_eq!(f64, p.x(), 12.0);
        assert_approx_eq!(f64, p.y(), 2.0);
    }

    #[test]
    fn test_text_align_spellings() {
        assert_eq!("center".parse::<TextAlign>(), Ok(TextAlign::Middle));
        assert_eq!("end".parse::<TextAlign>(), Ok(TextAlign::End));
        assert_eq!(TextAlign::End.to_vml_value(), "right");
        assert!("justify".parse::<TextAlign>().is_err());
    }

    #[test]
    fn test_text_lines_strip_carriage_returns() {
        let content = TextContent::new("one\r\ntwo\nthree");
        assert_eq!(content.lines(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_font_query_from_properties() {
        let font = TextFont::properties([
            ("fontFamily", "'Moderna'"),
            ("font-size", "18px"),
            ("fontWeight", "700"),
        ]);
        let query = font.query(&TextConfig::default());
        assert_eq!(query.family, "Moderna");
        assert_eq!(query.size, Some(18.0));
        assert!(query.bold);
        assert!(!query.italic);
    }

    #[test]
    fn test_font_query_defaults() {
        let query = TextFont::from("italic Moderna").query(&TextConfig::new("Serif", 9.0));
        assert_eq!(query.family, "Moderna");
        assert_eq!(query.size, Some(9.0));
        assert!(query.italic);

        let query = TextFont::properties([]).query(&TextConfig::new("Serif", 9.0));
        assert_eq!(query.family, "Serif");
    }
}
