//! Scene files.
//!
//! A scene file is TOML describing the canvas, the glyph fonts to register
//! and a flat list of nodes. Nodes are created in file order; a node's
//! `parent` must name a group defined earlier, and nodes without one are
//! attached to the root.
//!
//! ```toml
//! width = 200
//! height = 100
//! fonts = ["fonts/moderna.js"]
//!
//! [[node]]
//! id = "frame"
//! kind = "group"
//! position = [10, 10]
//!
//! [[node]]
//! parent = "frame"
//! kind = "rectangle"
//! width = 80
//! height = 40
//! radius = 6
//! fill = "#3366aa"
//! stroke = { color = "black", width = 2 }
//! tooltip = "A box"
//! ```
//!
//! Transforms apply in the order `position`, `rotate` (degrees, around the
//! node's box center), then `scale`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Deserialize;

use quill::{
    QuillError, RendererHandle,
    node::{NodeId, Parent, Renderable, TextAlign, TextFont},
};
use quill_core::{
    color::Color,
    paint::{Fill, GradientStops, LinearGradient, RadialGradient, Stroke, StrokeCap, StrokeJoin},
    path::Path as ArtPath,
    transform::Transformable,
};

/// A parsed scene file.
#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub width: f64,
    pub height: f64,

    /// Cufón font files, relative to the scene file.
    #[serde(default)]
    pub fonts: Vec<PathBuf>,

    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeSpec>,
}

/// One node of a scene file.
#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub parent: Option<String>,

    #[serde(flatten)]
    pub kind: KindSpec,

    /// A color, or `none`.
    pub fill: Option<String>,
    pub gradient: Option<GradientSpec>,
    pub stroke: Option<StrokeSpec>,

    pub position: Option<[f64; 2]>,
    pub rotate: Option<f64>,
    pub scale: Option<[f64; 2]>,

    #[serde(default)]
    pub hidden: bool,
    pub cursor: Option<String>,
    pub tooltip: Option<String>,
}

/// The node variant and its geometry.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum KindSpec {
    Group {
        width: Option<f64>,
        height: Option<f64>,
    },
    Shape {
        path: Option<String>,
        width: Option<f64>,
        height: Option<f64>,
    },
    Text {
        text: String,
        font: Option<String>,
        align: Option<String>,
        path: Option<String>,
    },
    GlyphText {
        text: String,
        font: String,
    },
    Image {
        src: String,
        width: f64,
        height: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        radius: f64,
    },
    Pill {
        width: f64,
        height: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
    },
    Circle {
        radius: f64,
    },
    Wedge {
        #[serde(default)]
        inner_radius: f64,
        outer_radius: f64,
        start: f64,
        end: f64,
    },
    Triangle {
        base: f64,
        height: f64,
    },
    Star {
        outer_radius: f64,
        inner_radius: Option<f64>,
        #[serde(default = "default_star_points")]
        points: usize,
    },
}

fn default_star_points() -> usize {
    5
}

/// A gradient fill. Colors are spread evenly.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GradientSpec {
    Linear {
        colors: Vec<String>,
        /// Degrees; the default runs top to bottom.
        angle: Option<f64>,
    },
    Radial {
        colors: Vec<String>,
        focus: Option<[f64; 2]>,
        radius: Option<f64>,
        center: Option<[f64; 2]>,
    },
}

#[derive(Debug, Deserialize)]
pub struct StrokeSpec {
    pub color: Option<String>,
    #[serde(default = "default_stroke_width")]
    pub width: f64,
    pub cap: Option<String>,
    pub join: Option<String>,
}

fn default_stroke_width() -> f64 {
    1.0
}

/// Parses a scene file.
///
/// # Errors
///
/// Returns [`QuillError::Scene`] when the TOML does not describe a scene.
pub fn parse_scene(source: &str) -> Result<SceneFile, QuillError> {
    toml::from_str(source).map_err(|err| QuillError::Scene(err.to_string()))
}

/// Reads a scene file together with the fonts it names.
///
/// # Errors
///
/// Returns [`QuillError::Io`] for unreadable files and
/// [`QuillError::Scene`] for malformed scenes.
pub fn load_scene(path: impl AsRef<Path>) -> Result<(SceneFile, Vec<String>), QuillError> {
    let path = path.as_ref();
    let scene = parse_scene(&fs::read_to_string(path)?)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let fonts = scene
        .fonts
        .iter()
        .map(|font| fs::read_to_string(base.join(font)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((scene, fonts))
}

fn parse_color(input: &str, node: &str) -> Result<Option<Color>, QuillError> {
    if input.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Color::parse(input)
        .map(Some)
        .map_err(|err| QuillError::Scene(format!("node `{node}`: {err}")))
}

fn parse_colors(inputs: &[String], node: &str) -> Result<GradientStops, QuillError> {
    let colors = inputs
        .iter()
        .map(|input| {
            parse_color(input, node)?.ok_or_else(|| {
                QuillError::Scene(format!("node `{node}`: gradient colors cannot be `none`"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GradientStops::evenly(colors))
}

fn parse_path(data: &str) -> Result<ArtPath, QuillError> {
    quill_parser::parse_path(data).map_err(|err| QuillError::new_parse_error(err, data))
}

impl GradientSpec {
    fn to_fill(&self, node: &str) -> Result<Fill, QuillError> {
        Ok(match self {
            Self::Linear { colors, angle } => {
                let stops = parse_colors(colors, node)?;
                Fill::Linear(match angle {
                    Some(angle) => LinearGradient::with_angle(stops, *angle),
                    None => LinearGradient::new(stops),
                })
            }
            Self::Radial {
                colors,
                focus,
                radius,
                center,
            } => {
                let mut gradient = RadialGradient::new(parse_colors(colors, node)?);
                if let Some([x, y]) = focus {
                    gradient = gradient.with_focus(*x, *y);
                }
                if let Some(radius) = radius {
                    gradient = gradient.with_radius(*radius, None);
                }
                if let Some([x, y]) = center {
                    gradient = gradient.with_center(*x, *y);
                }
                Fill::Radial(gradient)
            }
        })
    }
}

impl StrokeSpec {
    fn to_stroke(&self, node: &str) -> Result<Stroke, QuillError> {
        let scene_error = |err: String| QuillError::Scene(format!("node `{node}`: {err}"));
        let color = match &self.color {
            Some(color) => parse_color(color, node)?,
            None => None,
        };
        let mut stroke = Stroke::default().with_color(color);
        stroke.set_width(self.width);
        if let Some(cap) = &self.cap {
            stroke = stroke.with_cap(cap.parse::<StrokeCap>().map_err(scene_error)?);
        }
        if let Some(join) = &self.join {
            stroke = stroke.with_join(join.parse::<StrokeJoin>().map_err(scene_error)?);
        }
        Ok(stroke)
    }
}

impl NodeSpec {
    fn create(&self, art: &mut RendererHandle, name: &str) -> Result<NodeId, QuillError> {
        Ok(match &self.kind {
            KindSpec::Group { width, height } => art.make_group(*width, *height),
            KindSpec::Shape {
                path,
                width,
                height,
            } => {
                let path = path.as_deref().map(parse_path).transpose()?;
                art.make_shape(path, *width, *height)
            }
            KindSpec::Text {
                text,
                font,
                align,
                path,
            } => {
                let font = font.as_deref().map(TextFont::from);
                let align = align
                    .as_deref()
                    .map(str::parse::<TextAlign>)
                    .transpose()
                    .map_err(|err| QuillError::Scene(format!("node `{name}`: {err}")))?;
                let path = path.as_deref().map(parse_path).transpose()?;
                art.make_text(text, font, align, path)
            }
            KindSpec::GlyphText { text, font } => art.make_glyph_text(text, font)?,
            KindSpec::Image { src, width, height } => art.make_image(src, *width, *height),
            KindSpec::Rectangle {
                width,
                height,
                radius,
            } => art.make_rectangle(*width, *height, *radius),
            KindSpec::Pill { width, height } => art.make_pill(*width, *height),
            KindSpec::Ellipse { width, height } => art.make_ellipse(*width, *height),
            KindSpec::Circle { radius } => art.make_circle(*radius),
            KindSpec::Wedge {
                inner_radius,
                outer_radius,
                start,
                end,
            } => art.make_wedge(*inner_radius, *outer_radius, *start, *end),
            KindSpec::Triangle { base, height } => art.make_triangle(*base, *height),
            KindSpec::Star {
                outer_radius,
                inner_radius,
                points,
            } => art.make_star(*outer_radius, *inner_radius, *points),
        })
    }

    fn is_group(&self) -> bool {
        matches!(self.kind, KindSpec::Group { .. })
    }
}

/// Builds `scene` into `art`.
///
/// # Errors
///
/// Returns [`QuillError::Scene`] for duplicate ids, unknown or non-group
/// parents and invalid paint, [`QuillError::Parse`] for malformed path data,
/// and the font errors of glyph text.
pub fn build_scene(
    art: &mut RendererHandle,
    scene: &SceneFile,
    fonts: &[String],
) -> Result<(), QuillError> {
    art.resize(scene.width, scene.height);
    for font in fonts {
        art.register_font(font)?;
    }

    let mut ids: HashMap<&str, (NodeId, bool)> = HashMap::new();
    for (index, spec) in scene.nodes.iter().enumerate() {
        let fallback = format!("#{index}");
        let name = spec.id.as_deref().unwrap_or(&fallback);

        let parent = match spec.parent.as_deref() {
            None => Parent::Root,
            Some(parent) => match ids.get(parent) {
                Some((id, true)) => Parent::Node(*id),
                Some((_, false)) => {
                    return Err(QuillError::Scene(format!(
                        "node `{name}`: parent `{parent}` is not a group"
                    )));
                }
                None => {
                    return Err(QuillError::Scene(format!(
                        "node `{name}`: parent `{parent}` must be defined before its children"
                    )));
                }
            },
        };

        let id = spec.create(art, name)?;
        debug!(node = name, id:% = id; "Created scene node");
        if let Some(key) = spec.id.as_deref() {
            if ids.insert(key, (id, spec.is_group())).is_some() {
                return Err(QuillError::Scene(format!("duplicate node id `{key}`")));
            }
        }

        let fill = match (&spec.gradient, &spec.fill) {
            (Some(gradient), _) => Some(gradient.to_fill(name)?),
            (None, Some(color)) => Some(Fill::from_color(parse_color(color, name)?)),
            (None, None) => None,
        };
        let stroke = spec
            .stroke
            .as_ref()
            .map(|stroke| stroke.to_stroke(name))
            .transpose()?;

        let Some(mut node) = art.node(id) else {
            continue;
        };
        if let Some(fill) = fill {
            node.paint(fill);
        }
        if let Some(stroke) = stroke {
            node.stroke(stroke);
        }
        if let Some([x, y]) = spec.position {
            node.move_to(x, y);
        }
        if let Some(deg) = spec.rotate {
            node.rotate(deg, None);
        }
        if let Some([x, y]) = spec.scale {
            node.scale(x, y);
        }
        if spec.cursor.is_some() || spec.tooltip.is_some() {
            node.indicate(spec.cursor.as_deref(), spec.tooltip.as_deref());
        }
        if spec.hidden {
            node.hide();
        }
        node.inject(parent);
    }

    info!(nodes = scene.nodes.len(), backend:% = art.backend(); "Scene built");
    Ok(())
}

#[cfg(test)]
mod tests {
    use quill::config::AppConfig;

    use super::*;

    fn build(source: &str) -> Result<RendererHandle, QuillError> {
        let scene = parse_scene(source)?;
        let mut art = RendererHandle::svg(AppConfig::default());
        build_scene(&mut art, &scene, &[])?;
        Ok(art)
    }

    #[test]
    fn test_nested_scene() {
        let art = build(
            r##"
            width = 100
            height = 50

            [[node]]
            id = "frame"
            kind = "group"

            [[node]]
            id = "box"
            parent = "frame"
            kind = "rectangle"
            width = 20
            height = 10
            fill = "#ff0000"
            position = [5, 5]
            "##,
        )
        .unwrap();

        assert_eq!(art.scene().len(), 2);
        let roots = art.scene().children_of(Parent::Root).to_vec();
        assert_eq!(roots.len(), 1);
        assert_eq!(art.scene().children_of(roots[0].into()).len(), 1);
        let markup = art.to_markup();
        assert!(markup.contains("fill=\"rgb(255, 0, 0)\""));
        assert!(markup.contains("width=\"100\""));
    }

    #[test]
    fn test_parent_must_come_first() {
        let err = build(
            r#"
            width = 10
            height = 10

            [[node]]
            parent = "later"
            kind = "circle"
            radius = 2

            [[node]]
            id = "later"
            kind = "group"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be defined before"));
    }

    #[test]
    fn test_parent_must_be_group() {
        let err = build(
            r#"
            width = 10
            height = 10

            [[node]]
            id = "dot"
            kind = "circle"
            radius = 2

            [[node]]
            parent = "dot"
            kind = "circle"
            radius = 1
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("is not a group"));
    }

    #[test]
    fn test_malformed_path_is_a_parse_error() {
        let err = build(
            r#"
            width = 10
            height = 10

            [[node]]
            kind = "shape"
            path = "M 0 0 L 5"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::Parse { ref src, .. } if src == "M 0 0 L 5"));
    }

    #[test]
    fn test_invalid_color_is_a_scene_error() {
        let err = build(
            r#"
            width = 10
            height = 10

            [[node]]
            id = "dot"
            kind = "circle"
            radius = 2
            fill = "not-a-color"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::Scene(ref message) if message.contains("`dot`")));
    }

    #[test]
    fn test_gradient_and_stroke() {
        let art = build(
            r#"
            width = 10
            height = 10

            [[node]]
            kind = "ellipse"
            width = 8
            height = 4
            gradient = { type = "linear", colors = ["red", "blue"], angle = 45 }
            stroke = { color = "black", width = 2, cap = "square", join = "bevel" }
            "#,
        )
        .unwrap();

        let markup = art.to_markup();
        assert!(markup.contains("linearGradient"));
        assert!(markup.contains("stroke-linecap=\"square\""));
        assert!(markup.contains("stroke-linejoin=\"bevel\""));
    }

    #[test]
    fn test_glyph_text_without_fonts_fails() {
        let err = build(
            r#"
            width = 10
            height = 10

            [[node]]
            kind = "glyph-text"
            text = "Hi"
            font = "12px Moderna"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::FontNotFound { .. }));
    }
}
