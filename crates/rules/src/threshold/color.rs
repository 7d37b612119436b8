//! Hex colour parsing and linear RGB interpolation.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 3 or 6 hex digits, got {0} in '{1}'")]
    Length(usize, String),
    #[error("invalid hex digit in '{0}'")]
    Digit(String),
}

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear blend; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            let v = (a as f64 + (b as f64 - a as f64) * t).round();
            v.clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rrggbb`, with or without the leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(s.to_string()));
        }
        let channel = |digits: &str| -> Result<u8, ColorParseError> {
            u8::from_str_radix(digits, 16).map_err(|_| ColorParseError::Digit(s.to_string()))
        };

        match hex.len() {
            3 => {
                let doubled: Vec<String> = hex.chars().map(|c| format!("{c}{c}")).collect();
                Ok(Rgb::new(channel(&doubled[0])?, channel(&doubled[1])?, channel(&doubled[2])?))
            }
            6 => Ok(Rgb::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            n => Err(ColorParseError::Length(n, s.to_string())),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Blend two hex colours at `t`.
///
/// If either colour fails to parse the result is a hard cutover: `from`
/// below `t = 0.5`, `to` from there on, returned verbatim.
pub fn interpolate_color(from: &str, to: &str, t: f64) -> String {
    match (from.parse::<Rgb>(), to.parse::<Rgb>()) {
        (Ok(a), Ok(b)) => a.lerp(b, t).to_hex(),
        _ if t < 0.5 => from.to_string(),
        _ => to.to_string(),
    }
}
