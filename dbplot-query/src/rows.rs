//! Typed rows returned by the aggregation queries, and their extraction from Arrow batches

use crate::error::{DbPlotQueryError, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampNanosecondType};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Frequency of one category; `None` is the null bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub freq: u64,
}

/// Frequency of one bin, keyed by its left edge; `None` is the null bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinCount<T> {
    pub bin_loc: Option<T>,
    pub freq: u64,
}

/// Left edge of a bin along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinLocation {
    Numeric(f64),
    Temporal(NaiveDateTime),
}

impl BinLocation {
    /// Plotting position: the number itself, or seconds since the epoch
    pub fn as_f64(&self) -> f64 {
        match self {
            BinLocation::Numeric(v) => *v,
            BinLocation::Temporal(t) => epoch_seconds(t),
        }
    }
}

pub fn epoch_seconds(t: &NaiveDateTime) -> f64 {
    let utc = t.and_utc();
    utc.timestamp() as f64 + utc.timestamp_subsec_nanos() as f64 * 1e-9
}

/// One cell of the dense 2-D grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub bin_nbr_x: i64,
    pub bin_nbr_y: i64,
    pub bin_loc_x: BinLocation,
    pub bin_loc_y: BinLocation,
    pub freq: u64,
}

/// Frequency of one pair of categories
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryPairCount {
    pub category_x: Option<String>,
    pub category_y: Option<String>,
    pub freq: u64,
}

/// Point on an ROC curve. The anchoring origin has no threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub threshold: Option<f64>,
    pub tpr: f64,
    pub fpr: f64,
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(name).ok_or_else(|| {
        DbPlotQueryError::UnexpectedResult(format!("column `{name}` missing from query result"))
    })
}

pub(crate) fn f64_values(batches: &[RecordBatch], name: &str) -> Result<Vec<Option<f64>>> {
    let mut values = Vec::new();
    for batch in batches {
        let array = cast(column(batch, name)?, &DataType::Float64)?;
        values.extend(array.as_primitive::<Float64Type>().iter());
    }
    Ok(values)
}

pub(crate) fn i64_values(batches: &[RecordBatch], name: &str) -> Result<Vec<Option<i64>>> {
    let mut values = Vec::new();
    for batch in batches {
        let array = cast(column(batch, name)?, &DataType::Int64)?;
        values.extend(array.as_primitive::<Int64Type>().iter());
    }
    Ok(values)
}

/// Frequencies are counts and never NULL
pub(crate) fn freq_values(batches: &[RecordBatch], name: &str) -> Result<Vec<u64>> {
    i64_values(batches, name)?
        .into_iter()
        .map(|v| match v {
            Some(v) if v >= 0 => Ok(v as u64),
            other => Err(DbPlotQueryError::UnexpectedResult(format!(
                "invalid frequency {other:?} in column `{name}`"
            ))),
        })
        .collect()
}

pub(crate) fn string_values(batches: &[RecordBatch], name: &str) -> Result<Vec<Option<String>>> {
    let mut values = Vec::new();
    for batch in batches {
        let array = column(batch, name)?;
        for i in 0..array.len() {
            if array.is_null(i) {
                values.push(None);
            } else {
                values.push(Some(array_value_to_string(array, i)?));
            }
        }
    }
    Ok(values)
}

pub(crate) fn datetime_values(
    batches: &[RecordBatch],
    name: &str,
) -> Result<Vec<Option<NaiveDateTime>>> {
    let mut values = Vec::new();
    for batch in batches {
        let array = cast(
            column(batch, name)?,
            &DataType::Timestamp(TimeUnit::Nanosecond, None),
        )?;
        let array = array.as_primitive::<TimestampNanosecondType>();
        for i in 0..array.len() {
            if array.is_null(i) {
                values.push(None);
            } else {
                let value = array.value_as_datetime(i).ok_or_else(|| {
                    DbPlotQueryError::UnexpectedResult(format!(
                        "timestamp out of range in column `{name}`"
                    ))
                })?;
                values.push(Some(value));
            }
        }
    }
    Ok(values)
}
