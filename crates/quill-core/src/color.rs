//! Color handling for Quill paint.
//!
//! This module provides the [`Color`] type: 8-bit RGB channels with a separate
//! floating point alpha. Both renderers keep color and opacity in separate
//! attributes, so [`Color::detach`] is the main consumer-facing operation.
//!
//! CSS notations (named colors, `#hex` in 3, 4, 6 or 8 digits, `rgb()`,
//! `rgba()`, `hsl()`) are parsed through the `color` crate. The HSB notation
//! (`hsb(h, s, b)` / `hsba(h, s, b, a)`, hue in degrees and saturation and
//! brightness in percent) and single digit gray shorthand (`#c`) are handled
//! here.
//!
//! # Examples
//!
//! ```
//! use quill_core::color::Color;
//!
//! let red = Color::parse("rgba(255, 0, 0, 0.5)").unwrap();
//! assert_eq!(red.detach(), ("rgb(255, 0, 0)".to_string(), 0.5));
//!
//! let yellow = Color::parse("hsb(60, 100, 100)").unwrap();
//! assert_eq!(yellow.to_hex(), "#ffff00");
//! ```

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use log::warn;
use thiserror::Error;

/// Errors produced while parsing a color string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid color `{input}`: {reason}")]
    Invalid { input: String, reason: String },
}

/// An sRGB color with 8-bit channels and a `0..=1` alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: f64,
}

impl Color {
    /// Creates a color from channels. Alpha is clamped to `0..=1`.
    pub fn from_rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Creates an opaque color from channels.
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 1.0)
    }

    /// Creates a color from HSB components.
    ///
    /// Hue wraps into `0..360`, saturation and brightness are percentages
    /// clamped to `0..=100`. Channel math rounds at the same points as the
    /// classic integer HSB conversion, so `hsb(0, 100, 50)` is `rgb(128, 0, 0)`.
    pub fn from_hsb(hue: f64, saturation: f64, brightness: f64, alpha: f64) -> Self {
        let hue = hue.rem_euclid(360.0).round();
        let saturation = saturation.round().clamp(0.0, 100.0);
        let brightness = brightness.round().clamp(0.0, 100.0);

        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        let br = channel(brightness / 100.0 * 255.0);
        if saturation == 0.0 {
            return Self::from_rgba(br, br, br, alpha);
        }

        let f = hue % 60.0;
        let p = channel(brightness * (100.0 - saturation) / 10000.0 * 255.0);
        let q = channel(brightness * (6000.0 - saturation * f) / 600000.0 * 255.0);
        let t = channel(brightness * (6000.0 - saturation * (60.0 - f)) / 600000.0 * 255.0);

        let (r, g, b) = match (hue / 60.0).floor() as u32 {
            0 => (br, t, p),
            1 => (q, br, p),
            2 => (p, br, t),
            3 => (p, q, br),
            4 => (t, p, br),
            _ => (br, p, q),
        };
        Self::from_rgba(r, g, b, alpha)
    }

    /// Parses a color string.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::Invalid`] when the string is not a recognized notation.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.starts_with("hsb") {
            return parse_hsb(trimmed).ok_or_else(|| ColorError::Invalid {
                input: input.to_string(),
                reason: "expected `hsb(h, s, b)` or `hsba(h, s, b, a)`".to_string(),
            });
        }

        // `#c` is shorthand for `#ccc`
        let expanded;
        let css = match lower.strip_prefix('#') {
            Some(digit) if digit.len() == 1 => {
                expanded = format!("#{digit}{digit}{digit}");
                expanded.as_str()
            }
            _ => lower.as_str(),
        };

        let dynamic = DynamicColor::from_str(css).map_err(|err| ColorError::Invalid {
            input: input.to_string(),
            reason: err.to_string(),
        })?;
        let [r, g, b, a] = dynamic.to_alpha_color::<Srgb>().components;
        let channel = |v: f32| (f64::from(v) * 255.0).round().clamp(0.0, 255.0) as u8;
        Ok(Self::from_rgba(
            channel(r),
            channel(g),
            channel(b),
            f64::from(a),
        ))
    }

    /// Parses a color string, logging and returning `None` on failure.
    pub fn parse_or_none(input: &str) -> Option<Self> {
        match Self::parse(input) {
            Ok(color) => Some(color),
            Err(err) => {
                warn!(input, err:%; "Ignoring malformed color");
                None
            }
        }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns a copy with a different alpha.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self::from_rgba(self.red, self.green, self.blue, alpha)
    }

    /// Splits the color into an opaque `rgb(r, g, b)` string and its alpha.
    pub fn detach(&self) -> (String, f64) {
        (self.to_rgb_string(), self.alpha)
    }

    /// The opaque `rgb(r, g, b)` form.
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    /// The `#rrggbb` form, with an alpha byte appended when not opaque.
    pub fn to_hex(&self) -> String {
        let mut hex = format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue);
        let alpha = (self.alpha * 255.0).round() as u8;
        if alpha != 255 {
            hex.push_str(&format!("{alpha:02x}"));
        }
        hex
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb(0, 0, 0)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha == 1.0 {
            write!(f, "{}", self.to_rgb_string())
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.red,
                self.green,
                self.blue,
                crate::geometry::format_number(self.alpha)
            )
        }
    }
}

fn parse_hsb(input: &str) -> Option<Color> {
    let open = input.find('(')?;
    let close = input.rfind(')')?;
    let args: Vec<&str> = input.get(open + 1..close)?.split(',').map(str::trim).collect();
    if !(3..=4).contains(&args.len()) {
        return None;
    }

    let mut values = [0.0f64; 3];
    for (value, arg) in values.iter_mut().zip(&args) {
        *value = arg.trim_end_matches('%').parse().ok()?;
    }
    let alpha = match args.get(3) {
        Some(arg) if !arg.is_empty() => arg.parse::<f64>().ok()?,
        _ => 1.0,
    };
    Some(Color::from_hsb(values[0], values[1], values[2], alpha))
}
