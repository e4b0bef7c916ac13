use crate::axis::SceneAxis;
use crate::error::DbPlotSceneGraphError;
use crate::marks::mark::SceneMark;
use dbplot_common::types::RgbaColor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: RgbaColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SceneGraph {
    pub marks: Vec<SceneMark>,
    pub x_axis: SceneAxis,
    pub y_axis: SceneAxis,
    pub legend: Vec<LegendEntry>,
    pub width: f32,
    pub height: f32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            marks: Vec::new(),
            x_axis: SceneAxis::default(),
            y_axis: SceneAxis::default(),
            legend: Vec::new(),
            width: 640.0,
            height: 480.0,
        }
    }
}

impl SceneGraph {
    pub fn add_mark(&mut self, mark: impl Into<SceneMark>) {
        self.marks.push(mark.into());
    }

    pub fn get_mark(&self, name: &str) -> Option<&SceneMark> {
        self.marks.iter().find(|m| m.name() == name)
    }

    pub fn validate(&self) -> Result<(), DbPlotSceneGraphError> {
        for mark in &self.marks {
            mark.validate()?;
        }
        if let Some([lo, hi]) = self.x_axis.limits {
            if !(lo <= hi) {
                return Err(DbPlotSceneGraphError::InternalError(format!(
                    "x axis limits out of order: [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DbPlotSceneGraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DbPlotSceneGraphError> {
        Ok(serde_json::from_str(json)?)
    }
}
