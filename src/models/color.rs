// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! RGBA colours, serialized as CSS-style hex strings.

use crate::error::{EditorError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An sRGB colour with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Color {
    type Err = EditorError;

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| EditorError::invalid_input(format!("colour must start with '#': {s}")))?;

        let bad = || EditorError::invalid_input(format!("invalid colour: {s}"));
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2).ok_or_else(bad)?, 16).map_err(|_| bad());

        match hex.len() {
            3 => {
                let mut nibbles = [0u8; 3];
                for (n, ch) in nibbles.iter_mut().zip(hex.chars()) {
                    *n = ch.to_digit(16).ok_or_else(bad)? as u8;
                }
                Ok(Color::rgb(nibbles[0] * 17, nibbles[1] * 17, nibbles[2] * 17))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(bad()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#cc0000".parse::<Color>().unwrap(), Color::rgb(0xcc, 0, 0));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 0x80));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("cc0000".parse::<Color>().is_err());
        assert!("#cc00".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_and_serde() {
        let c = Color::rgb(0xcc, 0, 0);
        assert_eq!(c.to_string(), "#cc0000");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#cc0000\"");
        let back: Color = serde_json::from_str("\"#CC0000\"").unwrap();
        assert_eq!(back, c);
    }
}
