use crate::error::DbPlotSceneGraphError;
use crate::marks::rect::SceneRectMark;
use crate::marks::symbol::SceneSymbolMark;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneMark {
    Rect(SceneRectMark),
    Symbol(SceneSymbolMark),
}

impl SceneMark {
    pub fn name(&self) -> &str {
        match self {
            Self::Rect(mark) => &mark.name,
            Self::Symbol(mark) => &mark.name,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rect(mark) => mark.len as usize,
            Self::Symbol(mark) => mark.len as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), DbPlotSceneGraphError> {
        match self {
            Self::Rect(mark) => mark.validate(),
            Self::Symbol(mark) => mark.validate(),
        }
    }
}

impl From<SceneRectMark> for SceneMark {
    fn from(mark: SceneRectMark) -> Self {
        Self::Rect(mark)
    }
}

impl From<SceneSymbolMark> for SceneMark {
    fn from(mark: SceneSymbolMark) -> Self {
        Self::Symbol(mark)
    }
}

pub(crate) fn check_channel_len(
    mark: &str,
    channel: &'static str,
    len: usize,
    found: Option<usize>,
) -> Result<(), DbPlotSceneGraphError> {
    match found {
        Some(found) if found != len => Err(DbPlotSceneGraphError::ChannelLengthMismatch {
            mark: mark.to_string(),
            channel,
            len,
            found,
        }),
        _ => Ok(()),
    }
}
