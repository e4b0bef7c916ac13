//! Column classification and explicit casts

use crate::error::{DbPlotQueryError, Result};
use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a column is aggregated: grouped by value, or binned over its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Numeric,
    Temporal,
}

impl ColumnKind {
    pub fn from_data_type(column: &str, data_type: &DataType) -> Result<Self> {
        use DataType::*;
        Ok(match data_type {
            Null | Boolean | Utf8 | LargeUtf8 | Utf8View => ColumnKind::Categorical,
            Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 | Float16
            | Float32 | Float64 | Decimal128(_, _) | Decimal256(_, _) => ColumnKind::Numeric,
            Date32 | Date64 | Timestamp(_, _) => ColumnKind::Temporal,
            Dictionary(_, value_type) => Self::from_data_type(column, value_type)?,
            _ => {
                return Err(DbPlotQueryError::UnsupportedColumnType {
                    column: column.to_string(),
                    data_type: data_type.clone(),
                })
            }
        })
    }

    pub fn is_binned(&self) -> bool {
        !matches!(self, ColumnKind::Categorical)
    }
}

/// SQL type a column is cast to before it is classified and aggregated
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SqlCast {
    Double,
    BigInt,
    Varchar,
    Date,
    Timestamp,
}

impl SqlCast {
    /// Arrow type DataFusion produces for `CAST(.. AS <self>)`
    pub fn data_type(&self) -> DataType {
        match self {
            SqlCast::Double => DataType::Float64,
            SqlCast::BigInt => DataType::Int64,
            SqlCast::Varchar => DataType::Utf8,
            SqlCast::Date => DataType::Date32,
            SqlCast::Timestamp => DataType::Timestamp(TimeUnit::Nanosecond, None),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            SqlCast::Double | SqlCast::BigInt => ColumnKind::Numeric,
            SqlCast::Varchar => ColumnKind::Categorical,
            SqlCast::Date | SqlCast::Timestamp => ColumnKind::Temporal,
        }
    }
}
