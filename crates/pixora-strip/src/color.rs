//! CSS-style color strings for strip backgrounds and text ink.
//!
//! The editor receives colors from palette buttons (`data-color`
//! attributes) and from a free-form color picker (`#rrggbb`), so the
//! accepted grammar is the small subset of CSS those produce: hex
//! forms, `rgb()`/`rgba()`, `transparent`, and named colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::StripError;

/// A parsed color that remembers the string it was parsed from.
///
/// Equality compares the source string (case-folded and trimmed), so a
/// state reset to `"white"` compares equal to a freshly parsed `"white"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CssColor {
    source: String,
    rgba: [u8; 4],
}

impl CssColor {
    /// Parse a CSS color string.
    ///
    /// # Errors
    ///
    /// Returns [`StripError::InvalidColor`] if the string is not one of
    /// the supported forms.
    pub fn parse(input: &str) -> Result<Self, StripError> {
        let source = input.trim().to_ascii_lowercase();
        let rgba = parse_rgba(&source).ok_or_else(|| StripError::InvalidColor(input.to_owned()))?;
        Ok(Self { source, rgba })
    }

    /// The default strip background.
    #[must_use]
    pub fn white() -> Self {
        Self::known("white", [255, 255, 255, 255])
    }

    /// Pair a literal with its components, skipping the parser.
    pub(crate) fn known(source: &str, rgba: [u8; 4]) -> Self {
        Self {
            source: source.to_owned(),
            rgba,
        }
    }

    /// The normalized source string (trimmed, lowercase).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Straight (non-premultiplied) RGBA components.
    #[must_use]
    pub const fn rgba(&self) -> [u8; 4] {
        self.rgba
    }

    /// Convert to a `tiny-skia` color for fills.
    #[must_use]
    pub fn to_skia(&self) -> tiny_skia::Color {
        let [r, g, b, a] = self.rgba;
        tiny_skia::Color::from_rgba8(r, g, b, a)
    }
}

impl Default for CssColor {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for CssColor {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CssColor {
    type Error = StripError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CssColor> for String {
    fn from(color: CssColor) -> Self {
        color.source
    }
}

fn parse_rgba(s: &str) -> Option<[u8; 4]> {
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(args);
    }
    named(s)
}

/// Parse `rgb`, `rgba`, `rrggbb` or `rrggbbaa` hex digits.
fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |c: char| c.to_digit(16).and_then(|n| u8::try_from(n * 17).ok());
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                *slot = nibble(ch)?;
            }
            Some(out)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

/// Parse the comma-separated arguments of `rgb(...)` / `rgba(...)`.
///
/// Channels are integers 0-255; the optional alpha is a float 0.0-1.0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_rgb_function(args: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<u8>().ok();
    let alpha = match parts.get(3) {
        Some(a) => {
            let a: f32 = a.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            (a * 255.0).round() as u8
        }
        None => 255,
    };
    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}

fn named(name: &str) -> Option<[u8; 4]> {
    let rgb: [u8; 3] = match name {
        "transparent" => return Some([0, 0, 0, 0]),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "silver" => [192, 192, 192],
        "gray" | "grey" => [128, 128, 128],
        "lightgray" | "lightgrey" => [211, 211, 211],
        "red" => [255, 0, 0],
        "maroon" => [128, 0, 0],
        "crimson" => [220, 20, 60],
        "tomato" => [255, 99, 71],
        "coral" => [255, 127, 80],
        "salmon" => [250, 128, 114],
        "orange" => [255, 165, 0],
        "gold" => [255, 215, 0],
        "yellow" => [255, 255, 0],
        "khaki" => [240, 230, 140],
        "beige" => [245, 245, 220],
        "peachpuff" => [255, 218, 185],
        "olive" => [128, 128, 0],
        "lime" => [0, 255, 0],
        "green" => [0, 128, 0],
        "lightgreen" => [144, 238, 144],
        "mintcream" => [245, 255, 250],
        "teal" => [0, 128, 128],
        "turquoise" => [64, 224, 208],
        "aqua" | "cyan" => [0, 255, 255],
        "lightblue" => [173, 216, 230],
        "skyblue" => [135, 206, 235],
        "blue" => [0, 0, 255],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "fuchsia" | "magenta" => [255, 0, 255],
        "violet" => [238, 130, 238],
        "orchid" => [218, 112, 214],
        "plum" => [221, 160, 221],
        "lavender" => [230, 230, 250],
        "pink" => [255, 192, 203],
        "lightpink" => [255, 182, 193],
        "hotpink" => [255, 105, 180],
        "brown" => [165, 42, 42],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}
