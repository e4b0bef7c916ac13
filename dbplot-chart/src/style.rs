use dbplot_common::colors::{ColorMap, ColorPalette};
use dbplot_common::types::{Hatch, RgbaColor, SymbolShape};
use serde::{Deserialize, Serialize};

/// Visual settings passed explicitly to every chart builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlotStyle {
    pub palette: ColorPalette,
    pub colormap: ColorMap,
    /// Pattern drawn over null bucket bars
    pub null_hatch: Hatch,
    pub marker: SymbolShape,
    /// Base marker area; scatter markers scale it by frequency
    pub marker_size: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            palette: ColorPalette::Deep,
            colormap: ColorMap::Blues,
            null_hatch: Hatch::Cross,
            marker: SymbolShape::Circle,
            marker_size: 20.0,
            width: 640.0,
            height: 480.0,
        }
    }
}

impl PlotStyle {
    /// Defaults for date and timestamp histograms
    pub fn temporal() -> Self {
        Self {
            palette: ColorPalette::Colorblind,
            ..Default::default()
        }
    }

    pub fn palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn colormap(mut self, colormap: ColorMap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn marker(mut self, marker: SymbolShape) -> Self {
        self.marker = marker;
        self
    }

    pub fn marker_size(mut self, size: f32) -> Self {
        self.marker_size = size;
        self
    }

    pub fn series_color(&self, index: usize) -> RgbaColor {
        self.palette.color(index)
    }
}
