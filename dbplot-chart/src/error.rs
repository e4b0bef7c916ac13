use dbplot_query::error::DbPlotQueryError;
use dbplot_scenegraph::error::DbPlotSceneGraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbPlotChartError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Query error: `{0}`")]
    QueryError(#[from] DbPlotQueryError),

    #[error("SceneGraph error: `{0}`")]
    SceneGraphError(#[from] DbPlotSceneGraphError),
}

impl DbPlotChartError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
