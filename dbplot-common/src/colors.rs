//! Qualitative palettes for series colours and sequential colormaps for heatmaps

use crate::types::RgbaColor;
use palette::{rgb::FromHexError, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

const DEEP: [[u8; 3]; 10] = [
    [0x4C, 0x72, 0xB0],
    [0xDD, 0x84, 0x52],
    [0x55, 0xA8, 0x68],
    [0xC4, 0x4E, 0x52],
    [0x81, 0x72, 0xB3],
    [0x93, 0x78, 0x60],
    [0xDA, 0x8B, 0xC3],
    [0x8C, 0x8C, 0x8C],
    [0xCC, 0xB9, 0x74],
    [0x64, 0xB5, 0xCD],
];

const COLORBLIND: [[u8; 3]; 10] = [
    [0x01, 0x73, 0xB2],
    [0xDE, 0x8F, 0x05],
    [0x02, 0x9E, 0x73],
    [0xD5, 0x5E, 0x00],
    [0xCC, 0x78, 0xBC],
    [0xCA, 0x91, 0x61],
    [0xFB, 0xAF, 0xE4],
    [0x94, 0x94, 0x94],
    [0xEC, 0xE1, 0x33],
    [0x56, 0xB4, 0xE9],
];

const BLUES: [[u8; 3]; 9] = [
    [0xF7, 0xFB, 0xFF],
    [0xDE, 0xEB, 0xF7],
    [0xC6, 0xDB, 0xEF],
    [0x9E, 0xCA, 0xE1],
    [0x6B, 0xAE, 0xD6],
    [0x42, 0x92, 0xC6],
    [0x21, 0x71, 0xB5],
    [0x08, 0x51, 0x9C],
    [0x08, 0x30, 0x6B],
];

const GREENS: [[u8; 3]; 9] = [
    [0xF7, 0xFC, 0xF5],
    [0xE5, 0xF5, 0xE0],
    [0xC7, 0xE9, 0xC0],
    [0xA1, 0xD9, 0x9B],
    [0x74, 0xC4, 0x76],
    [0x41, 0xAB, 0x5D],
    [0x23, 0x8B, 0x45],
    [0x00, 0x6D, 0x2C],
    [0x00, 0x44, 0x1B],
];

const GREYS: [[u8; 3]; 9] = [
    [0xFF, 0xFF, 0xFF],
    [0xF0, 0xF0, 0xF0],
    [0xD9, 0xD9, 0xD9],
    [0xBD, 0xBD, 0xBD],
    [0x96, 0x96, 0x96],
    [0x73, 0x73, 0x73],
    [0x52, 0x52, 0x52],
    [0x25, 0x25, 0x25],
    [0x00, 0x00, 0x00],
];

const REDS: [[u8; 3]; 9] = [
    [0xFF, 0xF5, 0xF0],
    [0xFE, 0xE0, 0xD2],
    [0xFC, 0xBB, 0xA1],
    [0xFC, 0x92, 0x72],
    [0xFB, 0x6A, 0x4A],
    [0xEF, 0x3B, 0x2C],
    [0xCB, 0x18, 0x1D],
    [0xA5, 0x0F, 0x15],
    [0x67, 0x00, 0x0D],
];

fn rgb_u8(rgb: [u8; 3]) -> RgbaColor {
    let c: Srgb<f32> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    RgbaColor::new(c.red, c.green, c.blue, 1.0)
}

/// Parse `#rrggbb` (or `rrggbb`) into an opaque colour
pub fn parse_hex_color(hex: &str) -> Result<RgbaColor, FromHexError> {
    let c: Srgb<u8> = hex.parse()?;
    Ok(rgb_u8([c.red, c.green, c.blue]))
}

/// Qualitative palette that assigns one colour per series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPalette {
    Deep,
    Colorblind,
    Custom(Vec<RgbaColor>),
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::Deep
    }
}

impl ColorPalette {
    pub fn colors(&self) -> Vec<RgbaColor> {
        match self {
            ColorPalette::Deep => DEEP.iter().copied().map(rgb_u8).collect(),
            ColorPalette::Colorblind => COLORBLIND.iter().copied().map(rgb_u8).collect(),
            ColorPalette::Custom(colors) => colors.clone(),
        }
    }

    /// Colour of the series at `index`, cycling when there are more series than colours
    pub fn color(&self, index: usize) -> RgbaColor {
        let colors = self.colors();
        if colors.is_empty() {
            return rgb_u8(DEEP[index % DEEP.len()]);
        }
        colors[index % colors.len()]
    }
}

/// Sequential colormap, interpolated in linear RGB between evenly spaced stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorMap {
    #[default]
    Blues,
    Greens,
    Greys,
    Reds,
}

impl ColorMap {
    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            ColorMap::Blues => &BLUES,
            ColorMap::Greens => &GREENS,
            ColorMap::Greys => &GREYS,
            ColorMap::Reds => &REDS,
        }
    }

    /// Colour at normalised position `t`; values outside `[0, 1]` are clamped and NaN maps to 0
    pub fn color_at(&self, t: f32) -> RgbaColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let factor = scaled - lower as f32;

        let to_linear = |rgb: [u8; 3]| -> LinSrgb<f32> {
            Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>().into_linear()
        };
        let mixed = to_linear(stops[lower]).mix(to_linear(stops[lower + 1]), factor);
        let c: Srgb<f32> = Srgb::from_linear(mixed);
        RgbaColor::new(c.red, c.green, c.blue, 1.0)
    }
}
