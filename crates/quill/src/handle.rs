//! The renderer handle.
//!
//! [`RendererHandle`] owns a [`Scene`] together with the [`Renderer`] chosen
//! for the host. Every mutation goes through it: the scene changes first, then
//! the one renderer hook for that change runs. [`NodeMut`] borrows the handle
//! for a single node and carries the [`Renderable`], [`Container`] and
//! [`Transformable`] operations.
//!
//! ```
//! # use quill::{RendererHandle, config::AppConfig};
//! # use quill::node::{Parent, Renderable};
//! # use quill_core::{color::Color, transform::Transformable};
//! let mut art = RendererHandle::svg(AppConfig::default());
//! art.resize(200.0, 100.0);
//! let box_id = art.make_rectangle(50.0, 20.0, 4.0);
//! if let Some(mut node) = art.node(box_id) {
//!     node.fill(Color::parse_or_none("red"))
//!         .move_to(10.0, 10.0)
//!         .inject(Parent::Root);
//! }
//! assert!(art.to_markup().contains("<path"));
//! ```

use std::fmt;

use log::{debug, warn};

use quill_core::{
    color::Color,
    font::{FontKey, FontQuery, FontTable},
    geometry::Rect,
    paint::{Fill, ImageFill, LinearGradient, RadialGradient, Stroke},
    path::Path,
    transform::{Transform, Transformable},
};

use crate::{
    backend::{BackendKind, Renderer, SvgRenderer, VmlRenderer},
    config::AppConfig,
    error::QuillError,
    events::{Event, EventBus, EventKind, SubscriptionId},
    font::{FontRegistry, GlyphText, glyph_text},
    markup::{Document, ElementId},
    node::{
        Container, Node, NodeId, NodeKind, Parent, Renderable, Scene, TextAlign, TextContent,
        TextFont, TextPathChange,
    },
    shapes::{self, Corners},
    text,
};

/// A scene bound to one rendering backend.
pub struct RendererHandle {
    scene: Scene,
    backend: Box<dyn Renderer>,
    config: AppConfig,
    fonts: FontRegistry,
    events: EventBus,
}

impl fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererHandle")
            .field("backend", &self.backend.kind())
            .field("nodes", &self.scene.len())
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

fn sized(width: Option<f64>, height: Option<f64>) -> Rect {
    Rect::sized(width.unwrap_or(0.0), height.unwrap_or(0.0))
}

impl RendererHandle {
    pub fn new(backend: Box<dyn Renderer>, config: AppConfig) -> Self {
        Self {
            scene: Scene::new(),
            backend,
            config,
            fonts: FontRegistry::new(),
            events: EventBus::new(),
        }
    }

    /// An SVG handle, bypassing host detection.
    pub fn svg(config: AppConfig) -> Self {
        Self::new(Box::new(SvgRenderer::new(true)), config)
    }

    /// A VML handle, bypassing host detection.
    pub fn vml(config: AppConfig) -> Self {
        Self::new(Box::new(VmlRenderer::new()), config)
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn document(&self) -> &Document {
        self.backend.document()
    }

    /// The outermost element of a node.
    pub fn element_of(&self, id: NodeId) -> Option<ElementId> {
        self.backend.element_of(id)
    }

    pub fn to_markup(&self) -> String {
        self.backend.to_markup()
    }

    /// Sets the canvas size.
    pub fn resize(&mut self, width: f64, height: f64) -> &mut Self {
        self.scene.set_size(width, height);
        self.backend.resize(&self.scene);
        self
    }

    /// Borrows a node for mutation. `None` for ids of another scene.
    pub fn node(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        if !self.scene.contains(id) {
            warn!(node:% = id; "Unknown node");
            return None;
        }
        Some(NodeMut { handle: self, id })
    }

    fn create(&mut self, kind: NodeKind, bounds: Rect) -> NodeId {
        let name = kind.name();
        let id = self.scene.add(kind, bounds);
        debug!(node:% = id, kind = name; "Creating node");
        self.backend.create(&self.scene, id);
        id
    }

    /// A group. The size only feeds rotation pivots and `resize_to`.
    pub fn make_group(&mut self, width: Option<f64>, height: Option<f64>) -> NodeId {
        self.create(NodeKind::Group, sized(width, height))
    }

    pub fn make_shape(
        &mut self,
        path: Option<Path>,
        width: Option<f64>,
        height: Option<f64>,
    ) -> NodeId {
        let path = path.unwrap_or_else(Path::new);
        self.create(NodeKind::Shape { path }, sized(width, height))
    }

    /// A text node, measured with the configured default font where `font`
    /// leaves gaps.
    pub fn make_text(
        &mut self,
        text: &str,
        font: Option<TextFont>,
        align: Option<TextAlign>,
        path: Option<Path>,
    ) -> NodeId {
        let mut content = TextContent::new(text);
        if let Some(font) = font {
            content.set_font(font);
        }
        if let Some(align) = align {
            content.set_align(align);
        }
        content.set_path(path);
        let bounds = text::text_box(&content, self.config.text());
        self.create(NodeKind::Text(content), bounds)
    }

    pub fn make_image(&mut self, src: &str, width: f64, height: f64) -> NodeId {
        let src = src.to_string();
        self.create(NodeKind::Image { src }, Rect::sized(width, height))
    }

    pub fn make_rectangle(&mut self, width: f64, height: f64, radius: impl Into<Corners>) -> NodeId {
        let path = shapes::rectangle(width, height, radius);
        self.make_shape(Some(path), Some(width), Some(height))
    }

    pub fn make_pill(&mut self, width: f64, height: f64) -> NodeId {
        self.make_shape(Some(shapes::pill(width, height)), Some(width), Some(height))
    }

    pub fn make_ellipse(&mut self, width: f64, height: f64) -> NodeId {
        self.make_shape(Some(shapes::ellipse(width, height)), Some(width), Some(height))
    }

    pub fn make_circle(&mut self, radius: f64) -> NodeId {
        let size = radius * 2.0;
        self.make_shape(Some(shapes::circle(radius)), Some(size), Some(size))
    }

    /// A ring segment. Angles are in degrees, clockwise from twelve o'clock.
    pub fn make_wedge(
        &mut self,
        inner_radius: f64,
        outer_radius: f64,
        start: f64,
        end: f64,
    ) -> NodeId {
        let size = inner_radius.max(outer_radius) * 2.0;
        let path = shapes::wedge(inner_radius, outer_radius, start, end);
        self.make_shape(Some(path), Some(size), Some(size))
    }

    pub fn make_triangle(&mut self, base: f64, height: f64) -> NodeId {
        self.make_shape(Some(shapes::triangle(base, height)), Some(base), Some(height))
    }

    /// A star centered on the origin. It has no box, so it rotates around
    /// its center.
    pub fn make_star(&mut self, outer_radius: f64, inner_radius: Option<f64>, points: usize) -> NodeId {
        self.make_shape(Some(shapes::star(outer_radius, inner_radius, points)), None, None)
    }

    /// Registers a Cufón font for glyph text.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Font`] when the source holds no valid table.
    pub fn register_font(&mut self, source: &str) -> Result<FontKey, QuillError> {
        self.fonts.register_source(source)
    }

    pub fn register_font_table(&mut self, table: FontTable) -> FontKey {
        self.fonts.register(table)
    }

    fn glyph_query(&self, font: &str) -> Result<FontQuery, QuillError> {
        let query = quill_parser::parse_font_shorthand(font)
            .map_err(|err| QuillError::new_parse_error(err, font))?;
        if query.size.is_some() {
            Ok(query)
        } else {
            Ok(query.with_size(self.config.text().font_size()))
        }
    }

    fn layout_glyphs(&self, text: &str, query: &FontQuery) -> Result<GlyphText, QuillError> {
        let table = self.fonts.lookup(query)?;
        let size = query.size.unwrap_or(self.config.text().font_size());
        Ok(glyph_text(table, text, size))
    }

    /// A shape tracing `text` in a registered glyph font.
    ///
    /// `font` is a CSS shorthand such as `bold 24px Moderna`.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Parse`] for a malformed shorthand and
    /// [`QuillError::FontNotFound`] when no table matches it.
    pub fn make_glyph_text(&mut self, text: &str, font: &str) -> Result<NodeId, QuillError> {
        let query = self.glyph_query(font)?;
        self.make_glyph_text_with(text, &query)
    }

    /// Like [`make_glyph_text`](Self::make_glyph_text) with an already
    /// resolved query.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::FontNotFound`] when no table matches `query`.
    pub fn make_glyph_text_with(&mut self, text: &str, query: &FontQuery) -> Result<NodeId, QuillError> {
        let GlyphText {
            path,
            width,
            height,
        } = self.layout_glyphs(text, query)?;
        Ok(self.make_shape(Some(path), Some(width), Some(height)))
    }

    pub fn subscribe<F>(&mut self, id: NodeId, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(NodeId, &Event) + 'static,
    {
        self.events.subscribe(id, kind, Box::new(handler))
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.events.unsubscribe(subscription)
    }

    /// Delivers `event` to the handlers of `id`. Returns how many ran.
    pub fn dispatch(&mut self, id: NodeId, event: &Event) -> usize {
        self.events.dispatch(id, event)
    }

    fn update<R>(&mut self, id: NodeId, change: impl FnOnce(&mut Node) -> R) -> Option<R> {
        self.scene.node_mut(id).map(change)
    }

    fn inject(&mut self, id: NodeId, parent: Parent) {
        if !self.scene.contains(id) {
            warn!(node:% = id; "Unknown node");
            return;
        }
        if let Parent::Node(target) = parent {
            let Some(target_node) = self.scene.node(target) else {
                warn!(node:% = id, parent:% = target; "Unknown parent");
                return;
            };
            if !target_node.kind().is_container() {
                warn!(
                    node:% = id,
                    parent:% = target,
                    kind = target_node.kind().name();
                    "Cannot inject into a non-container"
                );
                return;
            }
            if self.scene.is_within(target, id) {
                warn!(node:% = id, parent:% = target; "Cannot inject a node into itself or its descendants");
                return;
            }
        }

        self.eject(id);
        debug!(node:% = id, parent:? = parent; "Injecting node");
        self.scene.attach(id, parent);
        self.backend.attach(&self.scene, id);
    }

    fn eject(&mut self, id: NodeId) {
        if let Some(from) = self.scene.detach(id) {
            debug!(node:% = id, parent:? = from; "Ejecting node");
            self.backend.detach(&self.scene, id, from);
        }
    }
}

/// The scene root adopts nodes like any group.
impl Container for RendererHandle {
    fn grab(&mut self, children: &[NodeId]) -> &mut Self {
        for &child in children {
            self.inject(child, Parent::Root);
        }
        self
    }
}

/// One node of a [`RendererHandle`], borrowed for mutation.
///
/// Methods return `&mut Self` so calls chain. A drawing method called on the
/// wrong kind of node logs a warning and does nothing.
pub struct NodeMut<'a> {
    handle: &'a mut RendererHandle,
    id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's box in its own user space.
    pub fn bounds(&self) -> Rect {
        self.handle.scene.node(self.id).map_or_else(Rect::default, Node::bounds)
    }

    fn kind_name(&self) -> &'static str {
        self.handle
            .scene
            .node(self.id)
            .map_or("unknown", |node| node.kind().name())
    }

    /// Replaces the interior paint.
    pub fn paint(&mut self, fill: Fill) -> &mut Self {
        if self.handle.update(self.id, |node| node.set_fill(fill)).is_some() {
            self.handle.backend.update_fill(&self.handle.scene, self.id);
        }
        self
    }

    /// A solid color, or no fill for `None`.
    pub fn fill(&mut self, color: Option<Color>) -> &mut Self {
        self.paint(Fill::from_color(color))
    }

    pub fn fill_linear(&mut self, gradient: LinearGradient) -> &mut Self {
        self.paint(Fill::Linear(gradient))
    }

    pub fn fill_radial(&mut self, gradient: RadialGradient) -> &mut Self {
        self.paint(Fill::Radial(gradient))
    }

    pub fn fill_image(&mut self, image: ImageFill) -> &mut Self {
        self.paint(Fill::Image(image))
    }

    pub fn stroke(&mut self, stroke: Stroke) -> &mut Self {
        if self.handle.update(self.id, |node| node.set_stroke(stroke)).is_some() {
            self.handle.backend.update_stroke(&self.handle.scene, self.id);
        }
        self
    }

    fn redrawn(&mut self, drawn: Option<bool>, what: &str) -> &mut Self {
        match drawn {
            Some(true) => self.handle.backend.update_geometry(&self.handle.scene, self.id),
            Some(false) => {
                warn!(node:% = self.id, kind = self.kind_name(), draw = what; "Cannot draw into this node");
            }
            None => {}
        }
        self
    }

    /// Replaces the path of a shape. A missing size keeps the current one.
    pub fn draw_shape(&mut self, path: Path, width: Option<f64>, height: Option<f64>) -> &mut Self {
        let drawn = self.handle.update(self.id, |node| {
            let NodeKind::Shape { path: current } = node.kind_mut() else {
                return false;
            };
            *current = path;
            let bounds = node.bounds();
            node.set_bounds(Rect::sized(
                width.unwrap_or(bounds.width()),
                height.unwrap_or(bounds.height()),
            ));
            true
        });
        self.redrawn(drawn, "shape")
    }

    /// Replaces the content of a text node. `None` keeps the current font or
    /// alignment.
    pub fn draw_text(
        &mut self,
        text: &str,
        font: Option<TextFont>,
        align: Option<TextAlign>,
        path: TextPathChange,
    ) -> &mut Self {
        let handle = &mut *self.handle;
        let defaults = handle.config.text();
        let drawn = handle.scene.node_mut(self.id).map(|node| {
            let NodeKind::Text(content) = node.kind_mut() else {
                return false;
            };
            content.set_text(text);
            if let Some(font) = font {
                content.set_font(font);
            }
            if let Some(align) = align {
                content.set_align(align);
            }
            match path {
                TextPathChange::Keep => {}
                TextPathChange::Follow(path) => content.set_path(Some(path)),
                TextPathChange::Remove => content.set_path(None),
            }
            let bounds = text::text_box(content, defaults);
            node.set_bounds(bounds);
            true
        });
        self.redrawn(drawn, "text")
    }

    pub fn draw_image(&mut self, src: &str, width: f64, height: f64) -> &mut Self {
        let drawn = self.handle.update(self.id, |node| {
            let NodeKind::Image { src: current } = node.kind_mut() else {
                return false;
            };
            *current = src.to_string();
            node.set_bounds(Rect::sized(width, height));
            true
        });
        self.redrawn(drawn, "image")
    }

    /// Retraces a shape with glyph text.
    ///
    /// # Errors
    ///
    /// Fails like [`RendererHandle::make_glyph_text`]; the shape is left
    /// untouched.
    pub fn draw_glyph_text(&mut self, text: &str, font: &str) -> Result<&mut Self, QuillError> {
        let query = self.handle.glyph_query(font)?;
        let GlyphText {
            path,
            width,
            height,
        } = self.handle.layout_glyphs(text, &query)?;
        Ok(self.draw_shape(path, Some(width), Some(height)))
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(NodeId, &Event) + 'static,
    {
        self.handle.subscribe(self.id, kind, handler)
    }
}

impl Renderable for NodeMut<'_> {
    fn inject(&mut self, parent: Parent) -> &mut Self {
        self.handle.inject(self.id, parent);
        self
    }

    fn eject(&mut self) -> &mut Self {
        self.handle.eject(self.id);
        self
    }

    fn hide(&mut self) -> &mut Self {
        if self.handle.update(self.id, |node| node.set_hidden(true)).is_some() {
            self.handle.backend.update_visibility(&self.handle.scene, self.id);
        }
        self
    }

    fn show(&mut self) -> &mut Self {
        if self.handle.update(self.id, |node| node.set_hidden(false)).is_some() {
            self.handle.backend.update_visibility(&self.handle.scene, self.id);
        }
        self
    }

    fn indicate(&mut self, cursor: Option<&str>, tooltip: Option<&str>) -> &mut Self {
        let changed = self.handle.update(self.id, |node| {
            if let Some(cursor) = cursor {
                node.set_cursor(cursor);
            }
            if let Some(tooltip) = tooltip {
                node.set_tooltip(tooltip);
            }
        });
        if changed.is_some() {
            self.handle.backend.update_indication(&self.handle.scene, self.id);
        }
        self
    }
}

impl Container for NodeMut<'_> {
    fn grab(&mut self, children: &[NodeId]) -> &mut Self {
        for &child in children {
            self.handle.inject(child, Parent::Node(self.id));
        }
        self
    }
}

impl Transformable for NodeMut<'_> {
    fn matrix(&self) -> Transform {
        self.handle
            .scene
            .node(self.id)
            .map_or_else(Transform::identity, Node::transform)
    }

    fn transform_to(&mut self, matrix: Transform) -> &mut Self {
        if self.handle.update(self.id, |node| node.set_transform(matrix)).is_some() {
            self.handle.backend.update_transform(&self.handle.scene, self.id);
        }
        self
    }

    fn pivot(&self) -> Rect {
        self.bounds()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use quill_core::geometry::Point;

    use super::*;

    fn svg() -> RendererHandle {
        RendererHandle::svg(AppConfig::default())
    }

    #[test]
    fn test_inject_twice_keeps_one_child() {
        let mut art = svg();
        let group = art.make_group(None, None);
        let shape = art.make_rectangle(10.0, 10.0, 0.0);
        art.grab(&[group]);

        let mut node = art.node(shape).unwrap();
        node.inject(Parent::Node(group)).inject(Parent::Node(group));
        assert_eq!(art.scene().children_of(group.into()), &[shape]);
    }

    #[test]
    fn test_reinject_moves_node() {
        let mut art = svg();
        let first = art.make_group(None, None);
        let second = art.make_group(None, None);
        let shape = art.make_circle(5.0);

        art.node(shape).unwrap().inject(first.into());
        art.node(shape).unwrap().inject(second.into());
        assert!(art.scene().children_of(first.into()).is_empty());
        assert_eq!(art.scene().children_of(second.into()), &[shape]);
    }

    #[test]
    fn test_inject_into_descendant_is_ignored() {
        let mut art = svg();
        let outer = art.make_group(None, None);
        let inner = art.make_group(None, None);
        art.node(inner).unwrap().inject(outer.into());

        art.node(outer).unwrap().inject(inner.into());
        art.node(outer).unwrap().inject(outer.into());
        assert_eq!(art.scene().node(outer).unwrap().parent(), None);
    }

    #[test]
    fn test_inject_into_shape_is_ignored() {
        let mut art = svg();
        let shape = art.make_ellipse(10.0, 5.0);
        let other = art.make_ellipse(10.0, 5.0);

        art.node(other).unwrap().inject(shape.into());
        art.node(shape).unwrap().grab(&[other]);
        assert_eq!(art.scene().node(other).unwrap().parent(), None);
    }

    #[test]
    fn test_eject_detached_is_noop() {
        let mut art = svg();
        let shape = art.make_triangle(10.0, 10.0);
        art.node(shape).unwrap().eject().eject();
        assert!(art.scene().children_of(Parent::Root).is_empty());
    }

    #[test]
    fn test_draw_shape_keeps_size_when_omitted() {
        let mut art = svg();
        let shape = art.make_rectangle(40.0, 20.0, 0.0);
        let mut path = Path::new();
        path.move_to(0.0, 0.0).line_to(5.0, 5.0);

        art.node(shape).unwrap().draw_shape(path, Some(60.0), None);
        assert_eq!(art.scene().node(shape).unwrap().bounds(), Rect::sized(60.0, 20.0));
    }

    #[test]
    fn test_draw_on_wrong_kind_is_ignored() {
        let mut art = svg();
        let group = art.make_group(Some(10.0), Some(10.0));
        art.node(group).unwrap().draw_image("a.png", 1.0, 1.0);
        assert_eq!(art.scene().node(group).unwrap().kind(), &NodeKind::Group);
    }

    #[test]
    fn test_rotate_defaults_to_box_center() {
        let mut art = svg();
        let shape = art.make_rectangle(20.0, 10.0, 0.0);
        art.node(shape).unwrap().rotate(180.0, None);

        let m = art.scene().node(shape).unwrap().transform();
        let p = m.point(0.0, 0.0);
        assert_approx_eq!(f64, p.x(), 20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, p.y(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_resize_to_uses_box() {
        let mut art = svg();
        let shape = art.make_rectangle(20.0, 10.0, 0.0);
        art.node(shape).unwrap().resize_to(40.0, 30.0);

        let p = art.scene().node(shape).unwrap().transform().point(20.0, 10.0);
        assert_eq!(p, Point::new(40.0, 30.0));
    }

    #[test]
    fn test_star_rotates_about_origin() {
        let mut art = svg();
        let star = art.make_star(10.0, None, 5);
        art.node(star).unwrap().rotate(90.0, None);

        let p = art.scene().node(star).unwrap().transform().point(0.0, 0.0);
        assert_approx_eq!(f64, p.x(), 0.0, epsilon = 1e-9);
        assert_approx_eq!(f64, p.y(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_glyph_text_without_font() {
        let mut art = svg();
        let err = art.make_glyph_text("Hi", "bold 12px Moderna").unwrap_err();
        assert!(matches!(
            err,
            QuillError::FontNotFound { ref family, .. } if family == "Moderna"
        ));
    }

    #[test]
    fn test_node_subscription() {
        let mut art = svg();
        let shape = art.make_circle(4.0);
        let id = art.node(shape).unwrap().subscribe(EventKind::Click, |_, _| {});

        let click = Event::new(EventKind::Click, Point::default());
        assert_eq!(art.dispatch(shape, &click), 1);
        assert!(art.unsubscribe(id));
        assert_eq!(art.dispatch(shape, &click), 0);
    }
}
