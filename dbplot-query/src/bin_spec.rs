use crate::column::ColumnKind;
use crate::error::{DbPlotQueryError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NBINS: u32 = 25;
pub const DEFAULT_GRID_NBINS: u32 = 50;

/// Width of one bin: a number for numeric columns, a duration for temporal ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinWidth {
    Number(f64),
    #[serde(rename = "duration_ns", with = "duration_nanos")]
    Duration(TimeDelta),
}

impl From<f64> for BinWidth {
    fn from(width: f64) -> Self {
        BinWidth::Number(width)
    }
}

impl From<TimeDelta> for BinWidth {
    fn from(width: TimeDelta) -> Self {
        BinWidth::Duration(width)
    }
}

/// Either a bin count or a bin width, never both
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinSpec {
    Count(u32),
    Width(BinWidth),
}

impl Default for BinSpec {
    fn default() -> Self {
        BinSpec::Count(DEFAULT_NBINS)
    }
}

impl BinSpec {
    /// Build from the two optional parameters; exactly one of them must be given
    pub fn from_parts(nbins: Option<u32>, bin_width: Option<BinWidth>) -> Result<Self> {
        match (nbins, bin_width) {
            (Some(n), None) => Ok(BinSpec::Count(n)),
            (None, Some(w)) => Ok(BinSpec::Width(w)),
            (Some(_), Some(_)) => Err(DbPlotQueryError::invalid(
                "specify either a number of bins or a bin width, not both",
            )),
            (None, None) => Err(DbPlotQueryError::invalid(
                "one of number of bins or bin width is required",
            )),
        }
    }

    /// Check the spec can bin a column of the given kind. Categorical columns
    /// ignore the spec beyond the basic positivity checks.
    pub fn validate(&self, kind: ColumnKind) -> Result<()> {
        match self {
            BinSpec::Count(0) => Err(DbPlotQueryError::invalid("number of bins must be positive")),
            BinSpec::Count(_) => Ok(()),
            BinSpec::Width(BinWidth::Number(w)) => {
                if !w.is_finite() || *w <= 0.0 {
                    return Err(DbPlotQueryError::invalid(format!(
                        "bin width must be a finite positive number, got {w}"
                    )));
                }
                if kind == ColumnKind::Temporal {
                    return Err(DbPlotQueryError::invalid(
                        "bin width for a temporal column must be a duration",
                    ));
                }
                Ok(())
            }
            BinSpec::Width(BinWidth::Duration(d)) => {
                if *d <= TimeDelta::zero() || d.num_nanoseconds().is_none() {
                    return Err(DbPlotQueryError::invalid(format!(
                        "bin width must be a positive duration, got {d}"
                    )));
                }
                if kind == ColumnKind::Numeric {
                    return Err(DbPlotQueryError::invalid(
                        "bin width for a numeric column must be a number",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Width in the unit the engine bins in: the number itself, or seconds
    pub(crate) fn width_value(&self) -> Option<f64> {
        match self {
            BinSpec::Count(_) => None,
            BinSpec::Width(BinWidth::Number(w)) => Some(*w),
            BinSpec::Width(BinWidth::Duration(d)) => d.num_nanoseconds().map(|n| n as f64 / 1e9),
        }
    }
}

mod duration_nanos {
    use chrono::TimeDelta;
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
        match d.num_nanoseconds() {
            Some(n) => s.serialize_i64(n),
            None => Err(S::Error::custom("duration does not fit in i64 nanoseconds")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TimeDelta, D::Error> {
        let n = i64::deserialize(d)?;
        if n == i64::MIN {
            return Err(D::Error::custom("duration out of range"));
        }
        Ok(TimeDelta::nanoseconds(n))
    }
}
