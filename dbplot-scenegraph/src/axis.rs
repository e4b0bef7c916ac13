use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    #[default]
    Linear,
    /// Positions are already `log10` of the data value
    Log10,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTick {
    /// Data units
    pub value: f64,
    pub label: String,
}

impl SceneTick {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SceneAxis {
    pub scale: AxisScale,
    pub limits: Option<[f64; 2]>,
    /// Explicit ticks; empty means the renderer picks its own
    pub ticks: Vec<SceneTick>,
    /// Tick label rotation in degrees
    pub label_angle: f32,
    pub title: Option<String>,
}

impl SceneAxis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(mut self, scale: AxisScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn limits(mut self, lo: f64, hi: f64) -> Self {
        self.limits = Some([lo, hi]);
        self
    }

    pub fn ticks(mut self, ticks: Vec<SceneTick>) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn label_angle(mut self, angle: f32) -> Self {
        self.label_angle = angle;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn tick_labels(&self) -> Vec<&str> {
        self.ticks.iter().map(|t| t.label.as_str()).collect()
    }
}
