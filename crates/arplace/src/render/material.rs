//! Material description and colors

use std::fmt;

use serde::{Deserialize, Serialize};

/// 24-bit RGB color, written as `"#rrggbb"` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::from_hex(0xffffff);
    /// Sky tint of the scene light
    pub const SKY: Self = Self::from_hex(0xffffff);
    /// Ground tint of the scene light
    pub const GROUND: Self = Self::from_hex(0xbbbbff);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse `#rrggbb`, `0xrrggbb` or bare `rrggbb`
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x");
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid color '{}', expected #rrggbb", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// The single standardized material every mesh of a placed model receives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    /// Read from the UI toggle when a model loads
    pub wireframe: bool,
    pub environment_reflection: bool,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 1.0,
            roughness: 0.4,
            wireframe: false,
            environment_reflection: true,
        }
    }
}

impl MaterialConfig {
    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(Color::parse("#bbbbff"), Some(Color::GROUND));
        assert_eq!(Color::parse("0xffffff"), Some(Color::WHITE));
        assert_eq!(Color::parse("ff0000"), Some(Color::from_hex(0xff0000)));
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("#gggggg"), None);
    }

    #[test]
    fn test_display_round_trip() {
        let c = Color::from_hex(0x0a0b0c);
        assert_eq!(c.to_string(), "#0a0b0c");
        assert_eq!(Color::parse(&c.to_string()), Some(c));
    }

    #[test]
    fn test_material_defaults() {
        let m = MaterialConfig::default();
        assert_eq!(m.metalness, 1.0);
        assert_eq!(m.roughness, 0.4);
        assert!(m.environment_reflection);
        assert!(!m.wireframe);
    }
}
