//! Configuration types for Quill renderers.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! TOML files or any other serde source.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining host and text settings.
//! - [`HostConfig`] - Controls which [`BackendChoice`] is used and how the host is described.
//! - [`TextConfig`] - Default font used when measuring text.
//!
//! # Example
//!
//! ```
//! # use quill::config::{AppConfig, BackendChoice};
//! let config = AppConfig::default();
//! assert_eq!(config.host().backend(), BackendChoice::Auto);
//! assert_eq!(config.text().font_size(), 12.0);
//! ```

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Top-level configuration combining host and text settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Host and backend selection section.
    #[serde(default)]
    host: HostConfig,

    /// Text measurement section.
    #[serde(default)]
    text: TextConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `host` - Backend selection and host description.
    /// * `text` - Default font for text measurement.
    pub fn new(host: HostConfig, text: TextConfig) -> Self {
        Self { host, text }
    }

    /// Returns the host configuration.
    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    /// Returns the text configuration.
    pub fn text(&self) -> &TextConfig {
        &self.text
    }

    /// Replaces the backend choice, keeping everything else.
    pub fn with_backend(mut self, backend: BackendChoice) -> Self {
        self.host.backend = backend;
        self
    }
}

/// Which renderer [`select`](crate::backend::select) should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Inspect the host and pick the first supported backend.
    #[default]
    Auto,
    Svg,
    Vml,
}

impl FromStr for BackendChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "svg" => Ok(Self::Svg),
            "vml" => Ok(Self::Vml),
            other => Err(format!(
                "unknown backend `{other}`, expected one of auto, svg, vml"
            )),
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Svg => "svg",
            Self::Vml => "vml",
        };
        f.write_str(name)
    }
}

/// Backend selection settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HostConfig {
    /// Forced backend, or `auto` to detect it from the host.
    #[serde(default)]
    backend: BackendChoice,

    /// User agent reported by hosts built from this configuration.
    #[serde(default)]
    user_agent: Option<String>,
}

impl HostConfig {
    /// Creates a new [`HostConfig`].
    ///
    /// # Arguments
    ///
    /// * `backend` - Forced backend or [`BackendChoice::Auto`].
    /// * `user_agent` - Optional user agent string.
    pub fn new(backend: BackendChoice, user_agent: Option<String>) -> Self {
        Self {
            backend,
            user_agent,
        }
    }

    pub fn backend(&self) -> BackendChoice {
        self.backend
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

/// Default font for text measurement.
///
/// Used whenever a text node's font does not name a family or a size.
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    #[serde(default = "default_font_family")]
    font_family: String,

    /// Size in pixels.
    #[serde(default = "default_font_size")]
    font_size: f64,
}

fn default_font_family() -> String {
    String::from("sans-serif")
}

fn default_font_size() -> f64 {
    12.0
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

impl TextConfig {
    /// Creates a new [`TextConfig`].
    ///
    /// # Arguments
    ///
    /// * `font_family` - Fallback family name.
    /// * `font_size` - Fallback size in pixels.
    pub fn new(font_family: impl Into<String>, font_size: f64) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_choice_from_str() {
        assert_eq!("SVG".parse::<BackendChoice>(), Ok(BackendChoice::Svg));
        assert_eq!(" vml ".parse::<BackendChoice>(), Ok(BackendChoice::Vml));
        assert_eq!("auto".parse::<BackendChoice>(), Ok(BackendChoice::Auto));
        assert!("canvas".parse::<BackendChoice>().is_err());
    }

    #[test]
    fn test_backend_choice_display_round_trips() {
        for choice in [BackendChoice::Auto, BackendChoice::Svg, BackendChoice::Vml] {
            assert_eq!(choice.to_string().parse::<BackendChoice>(), Ok(choice));
        }
    }

    #[test]
    fn test_with_backend_keeps_text() {
        let config = AppConfig::new(
            HostConfig::default(),
            TextConfig::new("Moderna", 18.0),
        )
        .with_backend(BackendChoice::Vml);
        assert_eq!(config.host().backend(), BackendChoice::Vml);
        assert_eq!(config.text().font_family(), "Moderna");
    }
}
