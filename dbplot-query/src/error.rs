use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use sqlparser::parser::ParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbPlotQueryError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Column `{column}` has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: DataType },

    #[error("Column not found: `{0}`")]
    ColumnNotFound(String),

    #[error("Unexpected query result: {0}")]
    UnexpectedResult(String),

    #[error("DataFusion error: `{0}`")]
    DataFusionError(#[from] DataFusionError),

    #[error("Arrow error: `{0}`")]
    ArrowError(#[from] ArrowError),

    #[error("SQL parser error: `{0}`")]
    SqlParserError(#[from] ParserError),
}

impl DbPlotQueryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DbPlotQueryError>;
