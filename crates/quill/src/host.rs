//! Host capability probing.
//!
//! A [`Host`] describes the document environment a scene renders into: which
//! features it reports, whether it accepts VML namespaces and its user agent.
//! [`select`](crate::backend::select) inspects a host to pick a backend.
//!
//! [`HostProfile`] is a plain data implementation, deserializable from
//! configuration files and convenient in tests.

use serde::Deserialize;

/// Feature string a host reports when it renders SVG 1.1.
pub const SVG_FEATURE: &str = "http://www.w3.org/TR/SVG11/feature#BasicStructure";

/// The capabilities of a rendering host.
pub trait Host {
    /// `true` when the host implements the feature named by `feature`.
    fn has_feature(&self, feature: &str) -> bool;

    /// `true` when the host can register the VML namespaces.
    fn supports_vml_namespaces(&self) -> bool;

    fn user_agent(&self) -> &str;

    /// Whether text can be centered with `dominant-baseline`.
    ///
    /// Opera, Safari and IE lack it, except for Chrome which reports Safari
    /// in its user agent.
    fn supports_dominant_baseline(&self) -> bool {
        let ua = self.user_agent().to_ascii_lowercase();
        let lacking = ["opera", "safari", "ie"]
            .iter()
            .any(|name| ua.contains(name));
        !lacking || ua.contains("chrome")
    }
}

/// A host described by data.
///
/// # Example
///
/// ```
/// # use quill::host::{Host, HostProfile, SVG_FEATURE};
/// let host = HostProfile::svg("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0");
/// assert!(host.has_feature(SVG_FEATURE));
/// assert!(!host.supports_vml_namespaces());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostProfile {
    #[serde(default)]
    user_agent: String,

    #[serde(default)]
    features: Vec<String>,

    #[serde(default)]
    vml_namespaces: bool,
}

impl HostProfile {
    pub fn new(user_agent: impl Into<String>, features: Vec<String>, vml_namespaces: bool) -> Self {
        Self {
            user_agent: user_agent.into(),
            features,
            vml_namespaces,
        }
    }

    /// A host that reports SVG 1.1 support.
    pub fn svg(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, vec![SVG_FEATURE.to_string()], false)
    }

    /// A host without SVG that accepts VML namespaces.
    pub fn vml(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, Vec::new(), true)
    }

    /// A host that supports neither backend.
    pub fn bare(user_agent: impl Into<String>) -> Self {
        Self::new(user_agent, Vec::new(), false)
    }

    /// Replaces the user agent, keeping the capabilities.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Host for HostProfile {
    fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    fn supports_vml_namespaces(&self) -> bool {
        self.vml_namespaces
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
