use dbplot_common::types::{Hatch, RgbaColor};
use dbplot_common::value::ScalarOrArray;
use itertools::izip;
use serde::{Deserialize, Serialize};

use super::mark::check_channel_len;
use crate::error::DbPlotSceneGraphError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SceneRectMark {
    pub name: String,
    pub clip: bool,
    pub len: u32,
    /// Position and size channels are in data units; the renderer scales them
    pub x: ScalarOrArray<f64>,
    pub y: ScalarOrArray<f64>,
    pub width: Option<ScalarOrArray<f64>>,
    pub height: Option<ScalarOrArray<f64>>,
    pub x2: Option<ScalarOrArray<f64>>,
    pub y2: Option<ScalarOrArray<f64>>,
    pub fill: ScalarOrArray<RgbaColor>,
    pub stroke: ScalarOrArray<RgbaColor>,
    /// Pixels
    pub stroke_width: ScalarOrArray<f32>,
    pub hatch: Option<Hatch>,
}

impl SceneRectMark {
    /// Bars anchored at `y = 0` with the given left edges, heights and a shared width
    pub fn bars(name: impl Into<String>, x: Vec<f64>, height: Vec<f64>, width: f64) -> Self {
        Self {
            len: x.len() as u32,
            name: name.into(),
            x: x.into(),
            y: ScalarOrArray::Scalar(0.0),
            width: Some(width.into()),
            height: Some(height.into()),
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, fill: impl Into<ScalarOrArray<RgbaColor>>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_hatch(mut self, hatch: Option<Hatch>) -> Self {
        self.hatch = hatch;
        self
    }

    pub fn x_vec(&self) -> Vec<f64> {
        self.x.as_vec(self.len as usize)
    }

    pub fn y_vec(&self) -> Vec<f64> {
        self.y.as_vec(self.len as usize)
    }

    pub fn width_iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        if let Some(width) = self.width.as_ref() {
            width.as_iter_owned(self.len as usize)
        } else if let Some(x2) = self.x2.as_ref() {
            Box::new(
                self.x
                    .as_iter(self.len as usize)
                    .zip(x2.as_iter(self.len as usize))
                    .map(|(x, x2)| x2 - x),
            )
        } else {
            Box::new(std::iter::repeat_n(1.0, self.len as usize))
        }
    }

    pub fn width_vec(&self) -> Vec<f64> {
        self.width_iter().collect()
    }

    pub fn height_iter(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        if let Some(height) = self.height.as_ref() {
            height.as_iter_owned(self.len as usize)
        } else if let Some(y2) = self.y2.as_ref() {
            Box::new(
                self.y
                    .as_iter(self.len as usize)
                    .zip(y2.as_iter(self.len as usize))
                    .map(|(y, y2)| y2 - y),
            )
        } else {
            Box::new(std::iter::repeat_n(1.0, self.len as usize))
        }
    }

    pub fn height_vec(&self) -> Vec<f64> {
        self.height_iter().collect()
    }

    pub fn x2_vec(&self) -> Vec<f64> {
        izip!(self.x.as_iter(self.len as usize), self.width_iter())
            .map(|(x, w)| x + w)
            .collect()
    }

    pub fn fill_vec(&self) -> Vec<RgbaColor> {
        self.fill.as_vec(self.len as usize)
    }

    pub fn validate(&self) -> Result<(), DbPlotSceneGraphError> {
        let len = self.len as usize;
        check_channel_len(&self.name, "x", len, self.x.array_len())?;
        check_channel_len(&self.name, "y", len, self.y.array_len())?;
        check_channel_len(&self.name, "fill", len, self.fill.array_len())?;
        for (channel, value) in [
            ("width", &self.width),
            ("height", &self.height),
            ("x2", &self.x2),
            ("y2", &self.y2),
        ] {
            if let Some(value) = value {
                check_channel_len(&self.name, channel, len, value.array_len())?;
            }
        }
        Ok(())
    }
}

impl Default for SceneRectMark {
    fn default() -> Self {
        Self {
            name: "rect_mark".to_string(),
            clip: true,
            len: 1,
            x: ScalarOrArray::Scalar(0.0),
            y: ScalarOrArray::Scalar(0.0),
            width: None,
            height: None,
            x2: None,
            y2: None,
            fill: RgbaColor::transparent().into(),
            stroke: RgbaColor::transparent().into(),
            stroke_width: ScalarOrArray::Scalar(0.0),
            hatch: None,
        }
    }
}
