use dbplot_common::types::{RgbaColor, SymbolShape};
use dbplot_common::value::ScalarOrArray;
use serde::{Deserialize, Serialize};

use super::mark::check_channel_len;
use crate::error::DbPlotSceneGraphError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SceneSymbolMark {
    pub name: String,
    pub clip: bool,
    pub len: u32,
    pub shape: SymbolShape,
    /// Data units
    pub x: ScalarOrArray<f64>,
    pub y: ScalarOrArray<f64>,
    /// Marker area in square pixels
    pub size: ScalarOrArray<f32>,
    pub fill: ScalarOrArray<RgbaColor>,
    pub stroke: ScalarOrArray<RgbaColor>,
    pub stroke_width: Option<f32>,
}

impl SceneSymbolMark {
    pub fn points(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            len: x.len() as u32,
            name: name.into(),
            x: x.into(),
            y: y.into(),
            ..Default::default()
        }
    }

    pub fn with_shape(mut self, shape: SymbolShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_size(mut self, size: impl Into<ScalarOrArray<f32>>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_fill(mut self, fill: impl Into<ScalarOrArray<RgbaColor>>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_stroke(mut self, stroke: RgbaColor, stroke_width: f32) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = Some(stroke_width);
        self
    }

    pub fn x_vec(&self) -> Vec<f64> {
        self.x.as_vec(self.len as usize)
    }

    pub fn y_vec(&self) -> Vec<f64> {
        self.y.as_vec(self.len as usize)
    }

    pub fn size_vec(&self) -> Vec<f32> {
        self.size.as_vec(self.len as usize)
    }

    pub fn fill_vec(&self) -> Vec<RgbaColor> {
        self.fill.as_vec(self.len as usize)
    }

    pub fn validate(&self) -> Result<(), DbPlotSceneGraphError> {
        let len = self.len as usize;
        check_channel_len(&self.name, "x", len, self.x.array_len())?;
        check_channel_len(&self.name, "y", len, self.y.array_len())?;
        check_channel_len(&self.name, "size", len, self.size.array_len())?;
        check_channel_len(&self.name, "fill", len, self.fill.array_len())?;
        check_channel_len(&self.name, "stroke", len, self.stroke.array_len())?;
        Ok(())
    }
}

impl Default for SceneSymbolMark {
    fn default() -> Self {
        Self {
            name: "symbol_mark".to_string(),
            clip: true,
            len: 1,
            shape: SymbolShape::default(),
            x: ScalarOrArray::Scalar(0.0),
            y: ScalarOrArray::Scalar(0.0),
            size: ScalarOrArray::Scalar(20.0),
            fill: RgbaColor::transparent().into(),
            stroke: RgbaColor::transparent().into(),
            stroke_width: None,
        }
    }
}
