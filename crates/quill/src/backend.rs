//! Rendering backends.
//!
//! A [`Renderer`] turns the backend independent [`Scene`] into markup. The
//! [`RendererHandle`] mutates the scene and then calls exactly one hook per
//! change, so a renderer only ever touches the elements of the node that
//! changed (and, for VML groups, the children whose placement depends on it).
//!
//! Two renderers exist:
//!
//! - [`SvgRenderer`] writes SVG 1.1.
//! - [`VmlRenderer`] writes VML, where every transform must be decomposed
//!   into a box, a rotation, a flip and a skew.
//!
//! [`select`] inspects a [`Host`] to choose between them.

mod svg;
mod vml;

pub use self::svg::SvgRenderer;
pub use self::vml::{VmlPlacement, VmlRenderer, decompose};

use std::fmt;

use log::{debug, info};

use crate::{
    RendererHandle,
    config::{AppConfig, BackendChoice},
    host::{Host, SVG_FEATURE},
    markup::{Document, ElementId},
    node::{NodeId, Parent, Scene},
};

/// The markup dialect a renderer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Svg,
    Vml,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Vml => "vml",
        })
    }
}

/// Materializes scene nodes as markup.
///
/// Every hook receives the scene after the change was applied. Hooks for
/// unknown nodes do nothing.
pub trait Renderer {
    fn kind(&self) -> BackendKind;

    fn document(&self) -> &Document;

    /// Applies the scene's canvas size.
    fn resize(&mut self, scene: &Scene);

    /// Creates the element of a new, detached node.
    fn create(&mut self, scene: &Scene, id: NodeId);

    /// Places a node under the parent recorded in the scene.
    fn attach(&mut self, scene: &Scene, id: NodeId);

    /// Removes a node from `from`, its former parent.
    fn detach(&mut self, scene: &Scene, id: NodeId, from: Parent);

    fn update_transform(&mut self, scene: &Scene, id: NodeId);

    fn update_fill(&mut self, scene: &Scene, id: NodeId);

    fn update_stroke(&mut self, scene: &Scene, id: NodeId);

    /// Redraws a node's path, text or image.
    fn update_geometry(&mut self, scene: &Scene, id: NodeId);

    fn update_visibility(&mut self, scene: &Scene, id: NodeId);

    fn update_indication(&mut self, scene: &Scene, id: NodeId);

    /// The outermost element of a node.
    fn element_of(&self, id: NodeId) -> Option<ElementId>;

    /// The document serialized as text.
    fn to_markup(&self) -> String {
        self.document().to_string()
    }
}

/// Picks a renderer for `host`.
///
/// A backend forced in the configuration is used as is. Otherwise SVG wins
/// when the host reports SVG 1.1, then VML when the host accepts the VML
/// namespaces. Returns `None` when neither is available.
pub fn select(host: &dyn Host, config: &AppConfig) -> Option<RendererHandle> {
    let kind = match config.host().backend() {
        BackendChoice::Svg => BackendKind::Svg,
        BackendChoice::Vml => BackendKind::Vml,
        BackendChoice::Auto => {
            if host.has_feature(SVG_FEATURE) {
                BackendKind::Svg
            } else if host.supports_vml_namespaces() {
                BackendKind::Vml
            } else {
                debug!(user_agent = host.user_agent(); "No supported backend");
                return None;
            }
        }
    };

    info!(backend:% = kind, forced:% = config.host().backend(); "Selected backend");
    let renderer: Box<dyn Renderer> = match kind {
        BackendKind::Svg => Box::new(SvgRenderer::new(host.supports_dominant_baseline())),
        BackendKind::Vml => Box::new(VmlRenderer::new()),
    };
    Some(RendererHandle::new(renderer, config.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HostConfig, config::TextConfig, host::HostProfile};

    fn forced(choice: BackendChoice) -> AppConfig {
        AppConfig::new(HostConfig::new(choice, None), TextConfig::default())
    }

    #[test]
    fn test_select_prefers_svg() {
        let host = HostProfile::new("", vec![SVG_FEATURE.to_string()], true);
        let handle = select(&host, &AppConfig::default()).unwrap();
        assert_eq!(handle.backend(), BackendKind::Svg);
    }

    #[test]
    fn test_select_falls_back_to_vml() {
        let handle = select(&HostProfile::vml(""), &AppConfig::default()).unwrap();
        assert_eq!(handle.backend(), BackendKind::Vml);
    }

    #[test]
    fn test_select_without_support_is_none() {
        assert!(select(&HostProfile::bare(""), &AppConfig::default()).is_none());
    }

    #[test]
    fn test_forced_backend_skips_detection() {
        let host = HostProfile::bare("");
        let handle = select(&host, &forced(BackendChoice::Vml)).unwrap();
        assert_eq!(handle.backend(), BackendKind::Vml);

        let handle = select(&host, &forced(BackendChoice::Svg)).unwrap();
        assert_eq!(handle.backend(), BackendKind::Svg);
    }
}
