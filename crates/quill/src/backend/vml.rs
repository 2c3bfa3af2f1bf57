//! The VML renderer.
//!
//! VML cannot express an arbitrary affine matrix. Every shape is placed by a
//! box (`coordorigin`, `coordsize` and a positioned style), a rotation, an
//! optional horizontal flip and an `av:skew` for what remains; [`decompose`]
//! computes that placement. Groups carry no geometry of their own: they
//! re-place their children with the composed transform whenever their own
//! transform changes.

use std::collections::HashMap;

use log::{debug, trace};
use quill_core::{
    color::Color,
    geometry::{Point, Rect, Size, format_number},
    paint::{Fill, GradientStops, ImageFill, LinearGeometry, LinearGradient, RadialGradient},
    transform::Transform,
};

use super::{BackendKind, Renderer};
use crate::{
    markup::{Document, ElementId},
    node::{Node, NodeId, NodeKind, Parent, Scene, TextFont},
    shapes::{Corners, rectangle},
};

/// Coordinates are written multiplied by this factor.
pub const PRECISION: f64 = 100.0;

const VML_NAMESPACE: &str = "urn:schemas-microsoft-com:vml";
const OFFICE_NAMESPACE: &str = "urn:schemas-microsoft-com:office:office";

const STYLED_TAGS: [&str; 7] = ["skew", "fill", "stroke", "path", "textpath", "group", "shape"];
const TAG_STYLE: &str =
    "behavior:url(#default#VML);display:inline-block;position:absolute;left:0px;top:0px;";

fn default_box() -> Rect {
    Rect::sized(500.0, 500.0)
}

/// The VML placement of a shape.
///
/// Lengths are already multiplied by [`PRECISION`] except the stroke weight,
/// which is in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VmlPlacement {
    /// `coordorigin` of the shape element.
    pub origin: Point,
    /// `coordsize` of the shape element, also its style width and height.
    pub size: Size,
    pub left: f64,
    pub top: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Whether the shape is mirrored horizontally (`flip:x`).
    pub flipped: bool,
    /// The residual `av:skew` matrix as `xx, xy, yx, yy`.
    pub skew: [f64; 4],
    /// The skew origin as fractions of the box.
    pub skew_origin: Point,
    pub stroke_weight: f64,
}

/// Decomposes `m` into a VML placement of `bounds`.
///
/// A zero width or height in `bounds` counts as one. A horizontal flip is
/// detected from the signs and slopes of the matrix columns and factored out
/// first; the rotation is then read from the second column and the rest
/// becomes the skew.
pub fn decompose(m: &Transform, bounds: Rect, stroke_width: f64) -> VmlPlacement {
    let or_one = |v: f64| if v == 0.0 || v.is_nan() { 1.0 } else { v };
    let (mut origin_x, mut origin_y) = (bounds.left(), bounds.top());
    let mut width = or_one(bounds.width());
    let mut height = or_one(bounds.height());

    let mut flipped = m.yx() / m.xx() > m.yy() / m.xy();
    if if m.xx() < 0.0 { m.xy() >= 0.0 } else { m.xy() < 0.0 } {
        flipped = !flipped;
    }
    let flip = if flipped { -1.0 } else { 1.0 };
    let m = Transform::scaling(flip, 1.0).multiply(m);

    let rotation = (-m.xy()).atan2(m.yy()).to_degrees();
    let (sin, cos) = rotation.to_radians().sin_cos();
    let skew = [
        m.xx() * cos - m.xy() * sin,
        (m.xy() * cos + m.xx() * sin) * flip,
        (m.yx() * cos - m.yy() * sin) * flip,
        m.yy() * cos + m.yx() * sin,
    ];

    let rotation_only = Transform::rotation(rotation);
    let shape_to_box = Transform::rotation(-rotation)
        .multiply(&m)
        .with_translation(0.0, 0.0);

    width *= shape_to_box.xx().abs();
    height *= shape_to_box.yy().abs();

    let (mut left, mut top) = (m.x(), m.y());

    // Rotation happens around the box center; undo its offset.
    let (vx, vy) = (-width / 2.0, -height / 2.0);
    let p = rotation_only.point(vx, vy);
    left -= p.x() - vx;
    top -= p.y() - vy;

    let linear = m.with_translation(0.0, 0.0);
    let p = linear.point(origin_x, origin_y);
    left += p.x();
    top += p.y();

    if flipped {
        left = -left - width;
    }

    let p0 = linear.point(-origin_x, -origin_y);
    let p1 = rotation_only.point(width, height);
    let p2 = rotation_only.point(width, 0.0);
    let p3 = rotation_only.point(0.0, height);
    let xs = [0.0, p1.x(), p2.x(), p3.x()];
    let ys = [0.0, p1.y(), p2.y(), p3.y()];
    let span = |values: [f64; 4]| {
        values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().copied().fold(f64::INFINITY, f64::min)
    };
    let skew_origin = Point::new(
        (p0.x() - p1.x() / 2.0) / span(xs) * flip,
        (p0.y() - p1.y() / 2.0) / span(ys),
    );

    let p = shape_to_box.point(origin_x, origin_y);
    origin_x = p.x();
    origin_y = p.y();

    let mut stroke_weight = stroke_width;
    if stroke_weight != 0.0 {
        let (vx, vy) = (m.xx() + m.xy(), m.yy() + m.yx());
        stroke_weight *= (vx * vx + vy * vy).sqrt() / std::f64::consts::SQRT_2;
    }

    VmlPlacement {
        origin: Point::new(origin_x * PRECISION, origin_y * PRECISION),
        size: Size::new(width * PRECISION, height * PRECISION),
        left: left * PRECISION,
        top: top * PRECISION,
        rotation,
        flipped,
        skew,
        skew_origin,
        stroke_weight,
    }
}

/// Formats with a fixed number of decimals, printing `-0` as `0`.
fn fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value + 0.0)
}

/// Elements owned by one node.
#[derive(Debug)]
struct VmlNode {
    element: ElementId,
    skew: Option<ElementId>,
    fill: Option<ElementId>,
    stroke: Option<ElementId>,
    textpath: Option<ElementId>,
    /// Placement box forced by the current fill.
    box_coords: Option<Rect>,
    /// Measured box of the drawn geometry.
    size: Option<Rect>,
    /// Prefix and suffix of the radial gradient workaround.
    radial: Option<(String, String)>,
    vml: String,
}

/// Renders a scene as VML markup.
#[derive(Debug)]
pub struct VmlRenderer {
    document: Document,
    group: ElementId,
    nodes: HashMap<NodeId, VmlNode>,
}

impl Default for VmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VmlRenderer {
    /// Creates a `<vml>` wrapper with its stylesheet and an empty root
    /// `av:group`.
    pub fn new() -> Self {
        let mut document = Document::new("vml");
        let root = document.root();
        document.set_attr(root, "xmlns:av", VML_NAMESPACE);
        document.set_attr(root, "xmlns:ao", OFFICE_NAMESPACE);

        let mut css = String::from("vml{display:inline-block;position:relative;overflow:hidden;}");
        for tag in STYLED_TAGS {
            css.push_str(&format!("av\\:{tag}{{{TAG_STYLE}}}"));
        }
        let stylesheet = document.create("style");
        document.append_text(stylesheet, &css);
        document.append(root, stylesheet);

        let group = document.create("av:group");
        document.append(root, group);
        Self {
            document,
            group,
            nodes: HashMap::new(),
        }
    }

    fn container_element(&self, parent: Parent) -> Option<ElementId> {
        match parent {
            Parent::Root => Some(self.group),
            Parent::Node(id) => self.nodes.get(&id).map(|state| state.element),
        }
    }

    fn child(&mut self, parent: ElementId, name: &str, attrs: &[(&str, &str)]) -> ElementId {
        let element = self.document.create(name);
        for (attr, value) in attrs {
            self.document.set_attr(element, attr, value);
        }
        self.document.append(parent, element);
        element
    }

    /// Re-places a node, recursing into groups.
    fn place(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else {
            return;
        };
        if node.kind().is_container() {
            self.place_group(scene, id);
        } else {
            self.place_shape(scene, id, node);
        }
    }

    fn place_group(&mut self, scene: &Scene, id: NodeId) {
        let Some(element) = self.nodes.get(&id).map(|state| state.element) else {
            return;
        };
        let doc = &mut self.document;
        doc.set_attr(element, "coordorigin", "0,0");
        doc.set_attr(element, "coordsize", "1000,1000");
        doc.set_style(element, "left", 0);
        doc.set_style(element, "top", 0);
        doc.set_style(element, "width", 1000);
        doc.set_style(element, "height", 1000);
        doc.set_style(element, "rotation", 0);

        for child in scene.children_of(Parent::Node(id)).to_vec() {
            self.place(scene, child);
        }
    }

    fn place_shape(&mut self, scene: &Scene, id: NodeId, node: &Node) {
        let Some(state) = self.nodes.get(&id) else {
            return;
        };
        let bounds = state.box_coords.or(state.size).unwrap_or_else(default_box);
        let placement = decompose(&scene.active_transform(id), bounds, node.stroke().width());
        let (element, skew, stroke) = (state.element, state.skew, state.stroke);

        let doc = &mut self.document;
        doc.set_attr(
            element,
            "coordorigin",
            format!(
                "{},{}",
                format_number(placement.origin.x()),
                format_number(placement.origin.y())
            ),
        );
        doc.set_attr(
            element,
            "coordsize",
            format!(
                "{},{}",
                format_number(placement.size.width()),
                format_number(placement.size.height())
            ),
        );
        doc.set_style(element, "left", format!("{}px", format_number(placement.left)));
        doc.set_style(element, "top", format!("{}px", format_number(placement.top)));
        doc.set_style(element, "width", format_number(placement.size.width()));
        doc.set_style(element, "height", format_number(placement.size.height()));
        doc.set_style(element, "rotation", fixed(placement.rotation, 8));
        if placement.flipped {
            doc.set_style(element, "flip", "x");
        } else {
            doc.remove_style(element, "flip");
        }

        if let Some(skew) = skew {
            let [xx, xy, yx, yy] = placement.skew;
            doc.set_attr(
                skew,
                "matrix",
                format!(
                    "{},{},{},{},0,0",
                    fixed(xx, 4),
                    fixed(xy, 4),
                    fixed(yx, 4),
                    fixed(yy, 4)
                ),
            );
            doc.set_attr(
                skew,
                "origin",
                format!(
                    "{},{}",
                    format_number(placement.skew_origin.x()),
                    format_number(placement.skew_origin.y())
                ),
            );
        }
        if let Some(stroke) = stroke {
            doc.set_attr(
                stroke,
                "weight",
                format!("{}px", format_number(placement.stroke_weight)),
            );
        }
        trace!(node:% = id, rotation = placement.rotation, flipped = placement.flipped; "Placed VML shape");
    }

    /// Writes the shape path, wrapping it in the radial workaround when one
    /// is active.
    fn redraw(&mut self, id: NodeId, radial: Option<(String, String)>) {
        let Some(state) = self.nodes.get_mut(&id) else {
            return;
        };
        let path = match &radial {
            Some((prefix, suffix)) => {
                // The stroke skips the helper ellipse: the path is drawn a
                // second time unfilled.
                let vml = &state.vml;
                format!("{prefix} {vml} {suffix} ns e {vml} nf")
            }
            None => state.vml.clone(),
        };
        state.radial = radial;
        let element = state.element;
        self.document.set_attr(element, "path", format!("{path}e"));
    }

    fn set_color(&mut self, element: ElementId, color: Option<Color>) {
        let doc = &mut self.document;
        match color {
            None => doc.set_attr(element, "on", "false"),
            Some(color) => {
                let (color, opacity) = color.detach();
                doc.set_attr(element, "color", color);
                doc.set_attr(element, "opacity", format_number(opacity));
                doc.set_attr(element, "on", "true");
            }
        }
    }

    fn set_box(&mut self, id: NodeId, bounds: Option<Rect>) {
        if let Some(state) = self.nodes.get_mut(&id) {
            state.box_coords = bounds;
        }
    }

    fn fill_element(&self, id: NodeId) -> Option<(ElementId, ElementId)> {
        let state = self.nodes.get(&id)?;
        Some((state.element, state.fill?))
    }

    fn fill_solid(&mut self, id: NodeId, color: Option<Color>) {
        let Some((_, fill)) = self.fill_element(id) else {
            return;
        };
        self.set_box(id, Some(default_box()));
        let doc = &mut self.document;
        doc.set_attr(fill, "type", "solid");
        doc.remove_attr(fill, "color2");
        doc.remove_attr(fill, "ao:opacity2");
        doc.remove_attr(fill, "colors");
        self.set_color(fill, color);
    }

    /// Writes the gradient colors. VML blends only between the first and the
    /// last color; the full list goes to `colors`.
    fn create_gradient(&mut self, id: NodeId, style: &str, stops: &GradientStops) -> Option<ElementId> {
        let (element, fill) = self.fill_element(id)?;
        let doc = &mut self.document;
        doc.detach(fill);
        doc.set_attr(fill, "type", style);
        doc.set_attr(fill, "method", "none");
        doc.set_attr(fill, "rotate", "true");

        let colors = stops
            .iter()
            .map(|stop| format!("{} {}", format_number(stop.offset()), stop.color().detach().0))
            .collect::<Vec<_>>()
            .join(",");
        if let (Some(first), Some(last)) = (stops.first(), stops.last()) {
            let (first_color, first_alpha) = first.color().detach();
            let (last_color, last_alpha) = last.color().detach();
            doc.set_attr(fill, "color", first_color);
            doc.set_attr(fill, "color2", last_color);
            doc.set_attr(fill, "opacity", format_number(last_alpha));
            doc.set_attr(fill, "ao:opacity2", format_number(first_alpha));
        }
        doc.set_attr(fill, "colors", colors);
        doc.set_attr(fill, "on", "true");
        doc.append(element, fill);
        Some(fill)
    }

    fn fill_linear(&mut self, id: NodeId, gradient: &LinearGradient) {
        let Some(fill) = self.create_gradient(id, "gradient", gradient.stops()) else {
            return;
        };
        self.document.set_attr(fill, "focus", "100%");
        let angle = match gradient.geometry() {
            LinearGeometry::Points { from, to } => {
                let w = (to.x() - from.x()).abs();
                let h = (to.y() - from.y()).abs();
                self.set_box(
                    id,
                    Some(Rect::new(
                        from.x().min(to.x()),
                        from.y().min(to.y()),
                        if w < 1.0 { h } else { w },
                        if h < 1.0 { w } else { h },
                    )),
                );
                (360.0 + ((to.x() - from.x()) / h).atan2((to.y() - from.y()) / w).to_degrees()) % 360.0
            }
            LinearGeometry::Angle(degrees) => {
                self.set_box(id, None);
                (90.0 + degrees) % 360.0
            }
        };
        self.document.set_attr(fill, "angle", format_number(angle));
    }

    /// Radial gradient for text and images: the gradient box is placed
    /// around the mirrored center.
    fn fill_radial_box(&mut self, id: NodeId, gradient: &RadialGradient, bounds: Rect) {
        let Some(fill) = self.create_gradient(id, "gradientradial", gradient.stops()) else {
            return;
        };
        let geometry = gradient.resolve(bounds);
        let focus = geometry.focus;
        let center = geometry.center.add_point(geometry.center.sub_point(focus));
        let gradient_box = Rect::new(
            center.x() - geometry.radius_x * 2.0,
            center.y() - geometry.radius_y * 2.0,
            geometry.radius_x * 4.0,
            geometry.radius_y * 4.0,
        );
        self.set_box(id, Some(gradient_box));

        let fx = (focus.x() - gradient_box.left()) / gradient_box.width();
        let fy = (focus.y() - gradient_box.top()) / gradient_box.height();
        let doc = &mut self.document;
        doc.set_attr(fill, "focussize", "0 0");
        doc.set_attr(fill, "focusposition", format!("{},{}", format_number(fx), format_number(fy)));
        doc.set_attr(fill, "focus", "50%");
    }

    /// Radial gradient for shapes.
    ///
    /// VML stretches a radial gradient over the shape's bounding box, so the
    /// path is wrapped with an invisible ellipse that forces the gradient
    /// geometry.
    fn fill_radial_shape(&mut self, id: NodeId, gradient: &RadialGradient, bounds: Rect) {
        let Some(fill) = self.create_gradient(id, "gradientradial", gradient.stops()) else {
            return;
        };
        let geometry = gradient.resolve(bounds);
        let focus = geometry.focus;
        let center = geometry.center.add_point(geometry.center.sub_point(focus));

        let round = |v: f64| (v * PRECISION + 0.5).floor();
        let (cx, cy) = (round(center.x()), round(center.y()));
        let (rx, ry) = (round(geometry.radius_x * 2.0), round(geometry.radius_y * 2.0));
        let top = format_number(cy - ry);
        let bottom = format_number(cy + ry);
        let arc = format!(
            "wa {} {top} {} {bottom}",
            format_number(cx - rx),
            format_number(cx + rx)
        );
        let cx = format_number(cx);
        let prefix = format!("m {cx} {top} l {cx} {top}");
        let suffix = format!(
            "m {cx} {top} {arc} {cx} {top} {cx} {bottom} {arc} {cx} {bottom} {cx} {top} \
             {arc} {cx} {top} {cx} {bottom} {arc} {cx} {bottom} {cx} {top}"
        );
        self.redraw(id, Some((prefix, suffix)));

        self.set_box(id, Some(Rect::new(focus.x() - 2.0, focus.y() - 2.0, 4.0, 4.0)));
        let doc = &mut self.document;
        doc.set_attr(fill, "focusposition", "0.5,0.5");
        doc.set_attr(fill, "focussize", "0 0");
        doc.set_attr(fill, "focus", "50%");
    }

    fn fill_image(&mut self, id: NodeId, image: &ImageFill) {
        let Some((_, fill)) = self.fill_element(id) else {
            return;
        };
        let doc = &mut self.document;
        match image.raw_tint() {
            Some((dark, light)) => {
                let (dark_color, dark_alpha) = dark.detach();
                doc.set_attr(fill, "type", "pattern");
                doc.set_attr(fill, "color", &dark_color);
                match light.map(|light| light.detach()) {
                    Some((light_color, light_alpha)) => {
                        doc.set_attr(fill, "color2", light_color);
                        doc.set_attr(fill, "opacity", format_number(light_alpha));
                    }
                    None => {
                        doc.set_attr(fill, "color2", &dark_color);
                        doc.set_attr(fill, "opacity", 0);
                    }
                }
                doc.set_attr(fill, "ao:opacity2", format_number(dark_alpha));
            }
            None => {
                doc.set_attr(fill, "type", "tile");
                doc.remove_attr(fill, "color");
                doc.remove_attr(fill, "color2");
                doc.set_attr(fill, "opacity", 1);
                doc.set_attr(fill, "ao:opacity2", 1);
            }
        }
        doc.remove_attr(fill, "colors");
        doc.set_attr(fill, "rotate", "true");
        doc.set_attr(fill, "src", image.src());
        doc.set_attr(fill, "size", "1,1");
        doc.set_attr(fill, "position", "0,0");
        doc.set_attr(fill, "origin", "0,0");
        doc.set_attr(fill, "aspect", "ignore");
        doc.set_attr(fill, "on", "true");

        let tile = (image.width() != 0.0).then(|| {
            Rect::new(
                image.left() + 0.5,
                image.top() + 0.5,
                image.width(),
                image.height(),
            )
        });
        self.set_box(id, tile);
    }

    fn draw_text(&mut self, id: NodeId, node: &Node) {
        let NodeKind::Text(content) = node.kind() else {
            return;
        };
        let Some(state) = self.nodes.get_mut(&id) else {
            return;
        };
        state.size = Some(node.bounds());
        let (element, textpath) = (state.element, state.textpath);
        let Some(textpath) = textpath else {
            return;
        };

        let doc = &mut self.document;
        match content.font() {
            Some(TextFont::Shorthand(shorthand)) => doc.set_style(textpath, "font", shorthand),
            Some(TextFont::Properties(properties)) => {
                for (name, value) in properties {
                    if name == "font-family" {
                        doc.set_style(textpath, name, format!("'{value}'"));
                    } else {
                        doc.set_style(textpath, name, value);
                    }
                }
            }
            None => {}
        }
        if let Some(align) = content.align() {
            doc.set_style(textpath, "v-text-align", align.to_vml_value());
        }

        match content.path() {
            Some(path) => {
                doc.set_attr(textpath, "string", content.text());
                doc.set_attr(element, "path", format!("{}e", path.to_vml(PRECISION)));
            }
            None => {
                // Rows are laid out below a one unit baseline; leading
                // newlines lift the block back up.
                let rows = "\n".repeat(1 + content.text().matches('\n').count());
                doc.set_attr(textpath, "string", format!("{rows}{}", content.text()));
                doc.set_attr(element, "path", "m0,0l1,0e");
            }
        }
    }
}

impl Renderer for VmlRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Vml
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn resize(&mut self, scene: &Scene) {
        let Some((width, height)) = scene.size() else {
            return;
        };
        let root = self.document.root();
        let doc = &mut self.document;
        doc.set_style(root, "width", format!("{}px", format_number(width)));
        doc.set_style(root, "height", format!("{}px", format_number(height)));
        doc.set_style(self.group, "width", format_number(width));
        doc.set_style(self.group, "height", format_number(height));
        let half_pixel = format_number(0.5 * PRECISION);
        doc.set_attr(self.group, "coordorigin", format!("{half_pixel},{half_pixel}"));
        doc.set_attr(
            self.group,
            "coordsize",
            format!(
                "{},{}",
                format_number(width * PRECISION),
                format_number(height * PRECISION)
            ),
        );
    }

    fn create(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else {
            return;
        };
        let name = if node.kind().is_container() {
            "av:group"
        } else {
            "av:shape"
        };
        let element = self.document.create(name);
        self.document.set_attr(element, "id", id);

        let mut state = VmlNode {
            element,
            skew: None,
            fill: None,
            stroke: None,
            textpath: None,
            box_coords: None,
            size: None,
            radial: None,
            vml: String::new(),
        };
        if !node.kind().is_container() {
            state.skew = Some(self.child(element, "av:skew", &[("on", "true")]));
            state.fill = Some(self.child(element, "av:fill", &[("on", "false")]));
            state.stroke = Some(self.child(element, "av:stroke", &[("on", "false")]));
            match node.kind() {
                NodeKind::Text(_) => {
                    self.child(element, "av:path", &[("textpathok", "true")]);
                    let textpath = self.child(element, "av:textpath", &[("on", "true")]);
                    self.document.set_style(textpath, "v-text-align", "left");
                    state.textpath = Some(textpath);
                }
                _ => {
                    self.child(element, "av:path", &[("gradientshapeok", "true")]);
                }
            }
        }
        self.nodes.insert(id, state);
        debug!(node:% = id, kind = node.kind().name(); "Created VML element");

        self.update_geometry(scene, id);
        self.update_fill(scene, id);
        self.update_stroke(scene, id);
        self.update_visibility(scene, id);
        self.update_indication(scene, id);
        self.place(scene, id);
    }

    fn attach(&mut self, scene: &Scene, id: NodeId) {
        let Some(parent) = scene.node(id).and_then(Node::parent) else {
            return;
        };
        let (Some(element), Some(container)) =
            (self.element_of(id), self.container_element(parent))
        else {
            return;
        };
        self.document.append(container, element);
        self.place(scene, id);
    }

    fn detach(&mut self, _scene: &Scene, id: NodeId, _from: Parent) {
        if let Some(element) = self.element_of(id) {
            self.document.detach(element);
        }
    }

    fn update_transform(&mut self, scene: &Scene, id: NodeId) {
        self.place(scene, id);
    }

    fn update_fill(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else {
            return;
        };
        let is_shape = matches!(node.kind(), NodeKind::Shape { .. });
        match node.kind() {
            NodeKind::Group => return,
            // Images are rectangles tiled with their source.
            NodeKind::Image { src } => {
                let bounds = node.bounds();
                let image = ImageFill::new(src.clone(), bounds.width(), bounds.height());
                self.fill_image(id, &image);
            }
            NodeKind::Shape { .. } | NodeKind::Text(_) => {
                if is_shape && !matches!(node.fill(), Fill::Radial(_)) {
                    self.redraw(id, None);
                }
                match node.fill() {
                    Fill::None => self.fill_solid(id, None),
                    Fill::Solid(color) => self.fill_solid(id, Some(*color)),
                    Fill::Linear(gradient) => self.fill_linear(id, gradient),
                    Fill::Radial(gradient) if is_shape => {
                        self.fill_radial_shape(id, gradient, node.bounds())
                    }
                    Fill::Radial(gradient) => self.fill_radial_box(id, gradient, node.bounds()),
                    Fill::Image(image) => self.fill_image(id, image),
                }
            }
        }
        self.place(scene, id);
    }

    fn update_stroke(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(stroke)) = (
            scene.node(id),
            self.nodes.get(&id).and_then(|state| state.stroke),
        ) else {
            return;
        };
        let style = node.stroke();
        let doc = &mut self.document;
        doc.set_attr(stroke, "weight", format!("{}px", format_number(style.width())));
        doc.set_attr(stroke, "endcap", style.cap().to_vml_value());
        doc.set_attr(stroke, "joinstyle", style.join().to_svg_value());
        self.set_color(stroke, style.color());
        self.place(scene, id);
    }

    fn update_geometry(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else {
            return;
        };
        match node.kind() {
            NodeKind::Group => {}
            NodeKind::Shape { path } => {
                let Some(state) = self.nodes.get_mut(&id) else {
                    return;
                };
                state.vml = path.to_vml(PRECISION);
                state.size = Some(path.measure().to_rect());
                let radial = state.radial.clone();
                if state.box_coords.is_none() {
                    self.place(scene, id);
                }
                self.redraw(id, radial);
            }
            NodeKind::Image { .. } => {
                let bounds = node.bounds();
                let path = rectangle(bounds.width(), bounds.height(), Corners::default());
                if let Some(state) = self.nodes.get_mut(&id) {
                    state.vml = path.to_vml(PRECISION);
                    state.size = Some(Rect::sized(bounds.width(), bounds.height()));
                }
                self.redraw(id, None);
                self.update_fill(scene, id);
            }
            NodeKind::Text(_) => {
                self.draw_text(id, node);
                self.place(scene, id);
            }
        }
    }

    fn update_visibility(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if node.is_hidden() {
            self.document.set_style(element, "display", "none");
        } else {
            self.document.remove_style(element, "display");
        }
    }

    fn update_indication(&mut self, scene: &Scene, id: NodeId) {
        let (Some(node), Some(element)) = (scene.node(id), self.element_of(id)) else {
            return;
        };
        if let Some(cursor) = node.cursor() {
            self.document.set_style(element, "cursor", cursor);
        }
        if let Some(tooltip) = node.tooltip() {
            self.document.set_attr(element, "title", tooltip);
        }
    }

    fn element_of(&self, id: NodeId) -> Option<ElementId> {
        self.nodes.get(&id).map(|state| state.element)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_identity_placement() {
        let placement = decompose(&Transform::identity(), Rect::sized(10.0, 10.0), 1.0);
        assert!(!placement.flipped);
        assert_approx_eq!(f64, placement.rotation, 0.0);
        assert_approx_eq!(f64, placement.size.width(), 1000.0);
        assert_approx_eq!(f64, placement.size.height(), 1000.0);
        assert_approx_eq!(f64, placement.left, 0.0);
        assert_approx_eq!(f64, placement.skew_origin.x(), -0.5);
        assert_approx_eq!(f64, placement.skew_origin.y(), -0.5);
        assert_approx_eq!(f64, placement.stroke_weight, 1.0);
        assert_eq!(placement.skew, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_translation_moves_the_box() {
        let placement = decompose(&Transform::translation(10.0, 20.0), Rect::sized(50.0, 50.0), 0.0);
        assert_approx_eq!(f64, placement.left, 1000.0);
        assert_approx_eq!(f64, placement.top, 2000.0);
        assert_approx_eq!(f64, placement.stroke_weight, 0.0);
    }

    #[test]
    fn test_mirror_is_flipped() {
        let placement = decompose(&Transform::scaling(-1.0, 1.0), Rect::sized(10.0, 10.0), 1.0);
        assert!(placement.flipped);
        assert_approx_eq!(f64, placement.rotation, 0.0);
    }

    #[test]
    fn test_quarter_turn() {
        let placement = decompose(&Transform::rotation(90.0), Rect::sized(10.0, 20.0), 1.0);
        assert!(!placement.flipped);
        assert_approx_eq!(f64, placement.rotation, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_scale_scales_stroke() {
        let placement = decompose(&Transform::scaling(3.0, 3.0), Rect::sized(10.0, 10.0), 2.0);
        assert_approx_eq!(f64, placement.stroke_weight, 6.0, epsilon = 1e-9);
        assert_approx_eq!(f64, placement.size.width(), 3000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_box_counts_as_unit() {
        let placement = decompose(&Transform::identity(), Rect::default(), 1.0);
        assert_approx_eq!(f64, placement.size.width(), 100.0);
        assert_approx_eq!(f64, placement.size.height(), 100.0);
    }

    #[test]
    fn test_fixed_normalizes_negative_zero() {
        assert_eq!(fixed(-0.0, 8), "0.00000000");
        assert_eq!(fixed(12.5, 4), "12.5000");
    }

    #[test]
    fn test_new_document_has_stylesheet_and_group() {
        let renderer = VmlRenderer::new();
        let doc = renderer.document();
        let root = doc.root();
        assert_eq!(doc.attr(root, "xmlns:av"), Some(VML_NAMESPACE));
        let style = doc.child_named(root, "style").unwrap();
        assert!(doc.text_content(style).contains("av\\:shape{behavior:url(#default#VML)"));
        assert_eq!(doc.child_named(root, "av:group"), Some(renderer.group));
    }
}
