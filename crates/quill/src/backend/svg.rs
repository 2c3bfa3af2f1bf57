//! The SVG renderer.
//!
//! Every node becomes one element with `id="e{n}"`: `<g>` for groups (with
//! their own `<defs>`), `<path>` for shapes, `<text>` for text and `<image>`
//! for images. Gradient and pattern fills ("brushes") and the paths that text
//! follows are definitions: they live in the `<defs>` of the container the
//! node is attached to, and move with the node on inject and eject.

use std::collections::HashMap;

use log::{debug, trace};
use quill_core::{
    geometry::{Point, format_number},
    paint::{Fill, GradientStops, ImageFill, LinearGeometry, LinearGradient, RadialGradient},
    path::{Path, PathVisitor},
};

use super::{BackendKind, Renderer};
use crate::{
    markup::{Document, ElementId},
    node::{Node, NodeId, NodeKind, Parent, Scene, TextAlign, TextContent, TextFont},
};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Definitions for the paths a text node follows.
#[derive(Debug)]
struct TextPaths {
    source: Path,
    elements: Vec<ElementId>,
}

/// Elements owned by one node.
#[derive(Debug)]
struct SvgNode {
    element: ElementId,
    /// Definition pool of a group.
    defs: Option<ElementId>,
    fill_brush: Option<ElementId>,
    title: Option<ElementId>,
    text_paths: Option<TextPaths>,
}

/// Renders a scene as SVG 1.1 markup.
#[derive(Debug)]
pub struct SvgRenderer {
    document: Document,
    defs: ElementId,
    nodes: HashMap<NodeId, SvgNode>,
    has_baseline: bool,
    next_path_uid: usize,
}

impl SvgRenderer {
    /// Creates an empty `<svg>` document.
    ///
    /// Without `has_baseline` text lines are positioned with a fixed offset
    /// instead of `dominant-baseline="central"`.
    pub fn new(has_baseline: bool) -> Self {
        let mut document = Document::new("svg");
        let root = document.root();
        document.set_attr(root, "xmlns", SVG_NAMESPACE);
        document.set_attr(root, "xmlns:xlink", XLINK_NAMESPACE);
        document.set_attr(root, "version", "1.1");
        let defs = document.create("defs");
        document.append(root, defs);
        Self {
            document,
            defs,
            nodes: HashMap::new(),
            has_baseline,
            next_path_uid: 0,
        }
    }

    fn container_element(&self, parent: Parent) -> Option<ElementId> {
        match parent {
            Parent::Root => Some(self.document.root()),
            Parent::Node(id) => self.nodes.get(&id).map(|state| state.element),
        }
    }

    fn container_defs(&self, parent: Parent) -> Option<ElementId> {
        match parent {
            Parent::Root => Some(self.defs),
            Parent::Node(id) => self.nodes.get(&id).and_then(|state| state.defs),
        }
    }

    /// Definitions that follow the node into its container's `<defs>`.
    fn definitions(&self, id: NodeId) -> Vec<ElementId> {
        let Some(state) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut definitions: Vec<ElementId> = state.fill_brush.into_iter().collect();
        if let Some(paths) = &state.text_paths {
            definitions.extend(paths.elements.iter().copied());
        }
        definitions
    }

    fn inject_definitions(&mut self, scene: &Scene, id: NodeId, definitions: &[ElementId]) {
        let defs = scene
            .node(id)
            .and_then(Node::parent)
            .and_then(|parent| self.container_defs(parent));
        if let Some(defs) = defs {
            for definition in definitions {
                self.document.append(defs, *definition);
            }
        }
    }

    fn eject_definitions(&mut self, definitions: &[ElementId]) {
        for definition in definitions {
            self.document.detach(*definition);
        }
    }

    fn eject_fill_brush(&mut self, id: NodeId) {
        let brush = self
            .nodes
            .get_mut(&id)
            .and_then(|state| state.fill_brush.take());
        if let Some(brush) = brush {
            self.document.detach(brush);
        }
    }

    /// Creates a brush definition, injects it and points the fill at it.
    fn create_brush(&mut self, scene: &Scene, id: NodeId, name: &str) -> Option<ElementId> {
        let element = self.nodes.get(&id)?.element;
        let brush = self.document.create(name);
        let brush_id = format!("fill-brush-{id}");
        self.document.set_attr(brush, "id", &brush_id);
        if let Some(state) = self.nodes.get_mut(&id) {
            state.fill_brush = Some(brush);
        }
        self.inject_definitions(scene, id, &[brush]);
        self.document
            .set_attr(element, "fill", format!("url(#{brush_id})"));
        self.document.remove_attr(element, "fill-opacity");
        Some(brush)
    }

    fn add_stops(&mut self, gradient: ElementId, stops: &GradientStops) {
        for stop in stops.iter() {
            let (color, opacity) = stop.color().detach();
            let element = self.document.create("stop");
            self.document
                .set_attr(element, "offset", format_number(stop.offset()));
            self.document.set_attr(element, "stop-color", color);
            self.document
                .set_attr(element, "stop-opacity", format_number(opacity));
            self.document.append(gradient, element);
        }
        self.document.set_attr(gradient, "spreadMethod", "reflect");
    }

    fn fill_linear(&mut self, scene: &Scene, id: NodeId, gradient: &LinearGradient) {
        let Some(brush) = self.create_brush(scene, id, "linearGradient") else {
            return;
        };
        self.add_stops(brush, gradient.stops());
        let (from, to) = match gradient.geometry() {
            LinearGeometry::Points { from, to } => {
                self.document
                    .set_attr(brush, "gradientUnits", "userSpaceOnUse");
                (from, to)
            }
            LinearGeometry::Angle(degrees) => {
                let angle = degrees.to_radians();
                let (x, y) = (angle.cos(), -angle.sin());
                let l = (x.abs() + y.abs()) / 2.0;
                let (x, y) = (x * l, y * l);
                (Point::new(0.5 - x, 0.5 - y), Point::new(0.5 + x, 0.5 + y))
            }
        };
        let doc = &mut self.document;
        doc.set_attr(brush, "x1", format_number(from.x()));
        doc.set_attr(brush, "y1", format_number(from.y()));
        doc.set_attr(brush, "x2", format_number(to.x()));
        doc.set_attr(brush, "y2", format_number(to.y()));
    }

    fn fill_radial(&mut self, scene: &Scene, id: NodeId, gradient: &RadialGradient) {
        let Some(bounds) = scene.node(id).map(Node::bounds) else {
            return;
        };
        let Some(brush) = self.create_brush(scene, id, "radialGradient") else {
            return;
        };
        self.add_stops(brush, gradient.stops());

        let geometry = gradient.resolve(bounds);
        let ys = geometry.radius_y / geometry.radius_x;
        let doc = &mut self.document;
        doc.set_attr(brush, "gradientUnits", "userSpaceOnUse");
        doc.set_attr(brush, "fx", format_number(geometry.focus.x()));
        doc.set_attr(brush, "fy", format_number(geometry.focus.y() / ys));
        doc.set_attr(brush, "r", format_number(geometry.radius_x));
        if ys != 1.0 {
            doc.set_attr(
                brush,
                "gradientTransform",
                format!("scale(1,{})", format_number(ys)),
            );
        }
        doc.set_attr(brush, "cx", format_number(geometry.center.x()));
        doc.set_attr(brush, "cy", format_number(geometry.center.y() / ys));
    }

    fn fill_image(&mut self, scene: &Scene, id: NodeId, fill: &ImageFill) {
        let Some(pattern) = self.create_brush(scene, id, "pattern") else {
            return;
        };
        let image = self.document.create("image");
        let doc = &mut self.document;
        doc.set_attr(image, "xlink:href", fill.src());
        doc.set_attr(image, "width", format_number(fill.width()));
        doc.set_attr(image, "height", format_number(fill.height()));
        doc.set_attr(image, "preserveAspectRatio", "none");

        if let Some((dark, light)) = fill.tint() {
            let channel = |a: u8, b: u8| (f64::from(a) - f64::from(b)) / (255.0 * 3.0);
            let r = channel(dark.red(), light.red());
            let g = channel(dark.green(), light.green());
            let b = channel(dark.blue(), light.blue());
            let a = (dark.alpha() - light.alpha()) / 3.0;
            #[rustfmt::skip]
            let matrix = [
                r, r, r, 0.0, f64::from(light.red()) / 255.0,
                g, g, g, 0.0, f64::from(light.green()) / 255.0,
                b, b, b, 0.0, f64::from(light.blue()) / 255.0,
                a, a, a, 0.0, light.alpha(),
            ];
            let values = matrix
                .iter()
                .map(|v| format_number(*v))
                .collect::<Vec<_>>()
                .join(" ");

            let filter_id = format!("tint-filter-{id}");
            let filter = doc.create("filter");
            doc.set_attr(filter, "id", &filter_id);
            let color_matrix = doc.create("feColorMatrix");
            doc.set_attr(color_matrix, "type", "matrix");
            doc.set_attr(color_matrix, "values", values);
            doc.set_attr(image, "fill", "#000");
            doc.set_attr(image, "filter", format!("url(#{filter_id})"));
            doc.append(filter, color_matrix);
            doc.append(pattern, filter);
        }

        doc.append(pattern, image);
        doc.set_attr(pattern, "patternUnits", "userSpaceOnUse");
        doc.set_attr(pattern, "patternContentsUnits", "userSpaceOnUse");
        doc.set_attr(pattern, "x", format_number(fill.left()));
        doc.set_attr(pattern, "y", format_number(fill.top()));
        doc.set_attr(pattern, "width", format_number(fill.width()));
        doc.set_attr(pattern, "height", format_number(fill.height()));
    }

    fn draw_text(&mut self, scene: &Scene, id: NodeId, element: ElementId, content: &TextContent) {
        let doc = &mut self.document;
        match content.font() {
            Some(TextFont::Shorthand(shorthand)) => doc.set_style(element, "font", shorthand),
            Some(TextFont::Properties(properties)) => {
                for (name, value) in properties {
                    doc.set_style(element, name, value);
                }
                doc.set_style(element, "line-height", "0.5em");
            }
            None => {}
        }
        let align = content.align();
        if let Some(align) = align {
            doc.set_attr(element, "text-anchor", align.to_svg_value());
        }

        self.sync_text_paths(scene, id, content.path());

        self.document.clear_children(element);
        if let Some(state) = self.nodes.get_mut(&id) {
            state.title = None;
        }

        let path_ids: Option<Vec<String>> = self.nodes.get(&id).and_then(|state| {
            state.text_paths.as_ref().map(|paths| {
                paths
                    .elements
                    .iter()
                    .filter_map(|p| self.document.attr(*p, "id").map(str::to_string))
                    .collect()
            })
        });

        let mut lines = content.lines();
        if let Some(ids) = &path_ids {
            lines.truncate(ids.len());
        }

        let has_baseline = self.has_baseline;
        let doc = &mut self.document;
        if has_baseline {
            doc.set_attr(element, "dominant-baseline", "central");
        }
        doc.set_attr(element, "xml:space", "preserve");

        let start_offset = match align {
            Some(TextAlign::Middle) => "50%",
            Some(TextAlign::End) => "100%",
            _ => "0",
        };
        for (i, line) in lines.iter().enumerate() {
            let row = if let Some(ids) = &path_ids {
                let row = doc.create("textPath");
                doc.set_attr(row, "xlink:href", format!("#{}", ids[i]));
                doc.set_attr(row, "startOffset", start_offset);
                row
            } else {
                let row = doc.create("tspan");
                doc.set_attr(row, "x", "0");
                doc.set_attr(row, "y", format!("{}em", format_number(i as f64 * 1.1 + 0.5)));
                row
            };
            let content = if has_baseline {
                doc.set_attr(row, "dominant-baseline", "central");
                row
            } else if path_ids.is_some() {
                let span = doc.create("tspan");
                doc.set_attr(span, "dy", "0.35em");
                doc.append(row, span);
                span
            } else {
                doc.set_attr(row, "y", format!("{}em", format_number(i as f64 * 1.1 + 0.85)));
                row
            };
            doc.set_attr(content, "xml:space", "preserve");
            doc.append_text(content, line);
            doc.append(element, row);
        }
        trace!(node:% = id, lines = lines.len(); "Drew text");
    }

    /// Replaces, keeps or removes the definitions of a text path so they
    /// match `path`.
    fn sync_text_paths(&mut self, scene: &Scene, id: NodeId, path: Option<&Path>) {
        let current = self.nodes.get(&id).and_then(|state| state.text_paths.as_ref());
        if current.map(|paths| &paths.source) == path {
            return;
        }

        let old = self
            .nodes
            .get_mut(&id)
            .and_then(|state| state.text_paths.take());
        if let Some(old) = old {
            self.eject_definitions(&old.elements);
        }
        let Some(path) = path else {
            return;
        };

        let uid = self.next_path_uid;
        self.next_path_uid += 1;
        let elements: Vec<ElementId> = split_subpaths(path)
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                let element = self.document.create("path");
                self.document.set_attr(element, "d", data);
                self.document.set_attr(element, "id", format!("p{uid}-{i}"));
                element
            })
            .collect();
        self.inject_definitions(scene, id, &elements);
        if let Some(state) = self.nodes.get_mut(&id) {
            state.text_paths = Some(TextPaths {
                source: path.clone(),
                elements,
            });
        }
    }
}

impl Renderer for SvgRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Svg
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn resize(&mut self, scene: &Scene) {
        if let Some((width, height)) = scene.size() {
            let root = self.document.root();
            self.document.set_attr(root, "width", format_number(width));
            self.document.set_attr(root, "height", format_number(height));
        }
    }

    fn create(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else {
            return;
        };
        let name = match node.kind() {
            NodeKind::Group => "g",
            NodeKind::Shape { .. } => "path",
            NodeKind::Text(_) => "text",
            NodeKind::Image { .. } => "image",
        };
        let element = self.document.create(name);
        self.document.set_attr(element, "id", id);

        let defs = if node.kind().is_container() {
            let defs = self.document.create("defs");
            self.document.append(element, defs);
            Some(defs)
        } else {
            None
        };
        if let NodeKind::Shape { .. } = node.kind() {
            self.document.set_attr(element, "fill-rule", "evenodd");
        }

        self.nodes.insert(
            id,
            SvgNode {
                element,
                defs,
                fill_brush: None,
                title: None,
                text_paths: None,
            },
        );
        debug!(node:% = id, kind = node.kind().name(); "Created SVG element");

        self.update_geometry(scene, id);
        self.update_fill(scene, id);
        self.update_stroke(scene, id);
        if !node.transform().is_identity() {
            self.update_transform(scene, id);
        }
        self.update_visibility(scene, id);
        self.update_indication(scene, id);
    }

    fn attach(&mut self, scene: &Scene, id: NodeId) {
        let Some(parent) = scene.node(id).and_then(Node::parent) else {
            return;
        };
        let (Some(state), Some(container)) =
            (self.nodes.get(&id), self.container_element(parent))
        else {
            return;
        };
        let element = state.element;
        let definitions = self.definitions(id);
        self.inject_definitions(scene, id, &definitions);
        self.document.append(container, element);
    }

    fn detach(&mut self, _scene: &Scene, id: NodeId, _from: Parent) {
        let Some(element) = self.element_of(id) else {
            return;
        };
        let definitions = self.definitions(id);
        self.eject_definitions(&definitions);
        self.document.detach(element);
    }

    fn update_transform(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        self.document
            .set_attr(element, "transform", node.transform());
    }

    fn update_fill(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if node.kind().is_container() {
            return;
        }
        self.eject_fill_brush(id);
        match node.fill() {
            Fill::None => {
                self.document.set_attr(element, "fill", "none");
                self.document.remove_attr(element, "fill-opacity");
            }
            Fill::Solid(color) => {
                let (color, opacity) = color.detach();
                self.document.set_attr(element, "fill", color);
                self.document
                    .set_attr(element, "fill-opacity", format_number(opacity));
            }
            Fill::Linear(gradient) => self.fill_linear(scene, id, gradient),
            Fill::Radial(gradient) => self.fill_radial(scene, id, gradient),
            Fill::Image(image) => self.fill_image(scene, id, image),
        }
    }

    fn update_stroke(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if node.kind().is_container() {
            return;
        }
        let stroke = node.stroke();
        let doc = &mut self.document;
        doc.set_attr(element, "stroke-width", format_number(stroke.width()));
        doc.set_attr(element, "stroke-linecap", stroke.cap().to_svg_value());
        doc.set_attr(element, "stroke-linejoin", stroke.join().to_svg_value());
        match stroke.color() {
            None => {
                doc.set_attr(element, "stroke", "none");
                doc.remove_attr(element, "stroke-opacity");
            }
            Some(color) => {
                let (color, opacity) = color.detach();
                doc.set_attr(element, "stroke", color);
                doc.set_attr(element, "stroke-opacity", format_number(opacity));
            }
        }
    }

    fn update_geometry(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        match node.kind() {
            NodeKind::Group => {}
            NodeKind::Shape { path } => {
                self.document.set_attr(element, "d", path.to_svg());
            }
            NodeKind::Image { src } => {
                let bounds = node.bounds();
                let doc = &mut self.document;
                doc.set_attr(element, "xlink:href", src);
                doc.set_attr(element, "width", format_number(bounds.width()));
                doc.set_attr(element, "height", format_number(bounds.height()));
            }
            NodeKind::Text(content) => {
                self.draw_text(scene, id, element, content);
                // Redrawing text drops the tooltip along with the old rows.
                self.update_indication(scene, id);
            }
        }
    }

    fn update_visibility(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if node.is_hidden() {
            self.document.set_attr(element, "display", "none");
        } else {
            self.document.remove_attr(element, "display");
        }
    }

    fn update_indication(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if let Some(cursor) = node.cursor() {
            self.document.set_style(element, "cursor", cursor);
        }
        let Some(tooltip) = node.tooltip() else {
            return;
        };
        let existing = self.nodes.get(&id).and_then(|state| state.title);
        let title = match existing {
            Some(title) => {
                self.document.clear_children(title);
                title
            }
            None => {
                let title = self.document.create("title");
                self.document.insert_first(element, title);
                if let Some(state) = self.nodes.get_mut(&id) {
                    state.title = Some(title);
                }
                title
            }
        };
        self.document.append_text(title, tooltip);
    }

    fn element_of(&self, id: NodeId) -> Option<ElementId> {
        self.nodes.get(&id).map(|state| state.element)
    }
}

/// Collects each subpath of a path as separate SVG path data.
///
/// Every subpath starts with an absolute `M`; curves stay curves and arcs
/// arrive as cubic segments.
struct SubpathSplitter {
    finished: Vec<Vec<String>>,
    current: Vec<String>,
}

impl SubpathSplitter {
    fn push(&mut self, command: &str, points: &[Point]) {
        self.current.push(command.to_string());
        for p in points {
            self.current.push(format_number(p.x()));
            self.current.push(format_number(p.y()));
        }
    }
}

impl PathVisitor for SubpathSplitter {
    fn line_to(&mut self, _from: Point, to: Point) {
        self.push("L", &[to]);
    }

    fn curve_to(&mut self, _from: Point, c1: Point, c2: Point, to: Point) {
        self.push("C", &[c1, c2, to]);
    }

    fn move_to(&mut self, _from: Point, to: Point) {
        let previous = std::mem::take(&mut self.current);
        if previous.len() > 3 {
            self.finished.push(previous);
        }
        self.push("M", &[to]);
    }
}

fn split_subpaths(path: &Path) -> Vec<String> {
    let mut splitter = SubpathSplitter {
        finished: Vec::new(),
        current: Vec::new(),
    };
    splitter.push("M", &[Point::default()]);
    path.visit(&mut splitter);
    let SubpathSplitter {
        mut finished,
        current,
    } = splitter;
    finished.push(current);
    finished.into_iter().map(|tokens| tokens.join(" ")).collect()
}
