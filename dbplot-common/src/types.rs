use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use strum::VariantNames;

/// sRGB components plus alpha, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor(pub [f32; 4]);

impl RgbaColor {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn transparent() -> Self {
        Self([0.0, 0.0, 0.0, 0.0])
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha.clamp(0.0, 1.0)])
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }
}

impl Hash for RgbaColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.iter().for_each(|c| OrderedFloat::from(*c).hash(state));
    }
}

#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SymbolShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Cross,
    TriangleUp,
}

impl SymbolShape {
    /// Accepts the single character marker codes used by most plotting libraries
    /// (`o`, `s`, `D`, `+`, `^`) as well as the snake case variant names.
    pub fn from_marker_str(marker: &str) -> Option<SymbolShape> {
        Some(match marker {
            "o" | "circle" => SymbolShape::Circle,
            "s" | "square" => SymbolShape::Square,
            "D" | "d" | "diamond" => SymbolShape::Diamond,
            "+" | "cross" => SymbolShape::Cross,
            "^" | "triangle_up" => SymbolShape::TriangleUp,
            _ => return None,
        })
    }
}

/// Fill pattern drawn over a rect, used to set null buckets apart from regular bins
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Hatch {
    #[default]
    Cross,
    Diagonal,
    Horizontal,
}
