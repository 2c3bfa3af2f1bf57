//! Quill - A retained-mode vector graphics scene graph.
//!
//! Scenes of groups, shapes, text and images are built through a
//! [`RendererHandle`] and rendered to SVG 1.1 or to VML markup. Geometry,
//! colors and paint live in `quill-core`; the path, font shorthand and glyph
//! outline parsers live in `quill-parser`.
//!
//! # Examples
//!
//! ```
//! use quill::{RendererHandle, config::AppConfig, node::{Container, Renderable}};
//! use quill_core::{color::Color, paint::{GradientStops, LinearGradient}};
//!
//! let mut art = RendererHandle::vml(AppConfig::default());
//! art.resize(100.0, 100.0);
//!
//! let group = art.make_group(None, None);
//! let disc = art.make_circle(20.0);
//! let stops = GradientStops::evenly([Color::from_rgb(255, 0, 0), Color::from_rgb(0, 0, 255)]);
//! if let Some(mut node) = art.node(disc) {
//!     node.fill_linear(LinearGradient::with_angle(stops, 90.0)).inject(group.into());
//! }
//! art.grab(&[group]);
//!
//! assert!(art.to_markup().contains("av:fill"));
//! ```

pub mod backend;
pub mod config;
pub mod events;
pub mod font;
pub mod host;
pub mod markup;
pub mod node;
pub mod path;
pub mod shapes;
pub mod text;

mod error;
mod handle;

pub use quill_core::{color, geometry, paint, transform};

pub use error::QuillError;
pub use handle::{NodeMut, RendererHandle};
