//! One-dimensional histograms: group-by for categorical columns, equal-width
//! bins for numeric and temporal ones.

use crate::bin_spec::{BinSpec, BinWidth};
use crate::binning::Binning;
use crate::column::{ColumnKind, SqlCast};
use crate::error::Result;
use crate::rows::{
    datetime_values, f64_values, freq_values, string_values, BinCount, CategoryCount,
};
use crate::source::DataSource;
use crate::sql::{
    as_double, collect_sql, epoch_seconds, normalize_query, timestamp_from_seconds, value_expr,
    BinExprs,
};
use chrono::NaiveDateTime;
use datafusion::prelude::SessionContext;
use itertools::izip;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Rows of a single-column histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "rows")]
pub enum HistogramRows {
    Categorical(Vec<CategoryCount>),
    Numeric(Vec<BinCount<f64>>),
    Temporal(Vec<BinCount<NaiveDateTime>>),
}

impl HistogramRows {
    pub fn kind(&self) -> ColumnKind {
        match self {
            HistogramRows::Categorical(_) => ColumnKind::Categorical,
            HistogramRows::Numeric(_) => ColumnKind::Numeric,
            HistogramRows::Temporal(_) => ColumnKind::Temporal,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HistogramRows::Categorical(rows) => rows.len(),
            HistogramRows::Numeric(rows) => rows.len(),
            HistogramRows::Temporal(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_freq(&self) -> u64 {
        match self {
            HistogramRows::Categorical(rows) => rows.iter().map(|r| r.freq).sum(),
            HistogramRows::Numeric(rows) => rows.iter().map(|r| r.freq).sum(),
            HistogramRows::Temporal(rows) => rows.iter().map(|r| r.freq).sum(),
        }
    }
}

/// Histogram of one column of a [`DataSource`]
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramQuery {
    source: DataSource,
    column: String,
    bins: BinSpec,
    cast: Option<SqlCast>,
}

impl HistogramQuery {
    pub fn new(source: impl Into<DataSource>, column: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            column: column.into(),
            bins: BinSpec::default(),
            cast: None,
        }
    }

    pub fn nbins(mut self, nbins: u32) -> Self {
        self.bins = BinSpec::Count(nbins);
        self
    }

    pub fn bin_width(mut self, width: impl Into<BinWidth>) -> Self {
        self.bins = BinSpec::Width(width.into());
        self
    }

    pub fn bins(mut self, bins: BinSpec) -> Self {
        self.bins = bins;
        self
    }

    pub fn cast_as(mut self, cast: Option<SqlCast>) -> Self {
        self.cast = cast;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// SQL for a column of the given kind, without touching the engine
    pub fn sql_for_kind(&self, kind: ColumnKind) -> Result<String> {
        self.bins.validate(kind)?;
        let from = self.source.from_sql()?;
        let value = value_expr(&self.column, self.cast);
        let sql = match kind {
            ColumnKind::Categorical => format!(
                "SELECT category, count(*) AS freq \
                 FROM (SELECT {value} AS category FROM {from}) AS cats \
                 GROUP BY category ORDER BY category"
            ),
            ColumnKind::Numeric | ColumnKind::Temporal => {
                // Timestamps are binned as DOUBLE epoch seconds
                let value = match kind {
                    ColumnKind::Temporal => epoch_seconds(&value),
                    _ => as_double(&value),
                };
                let exprs =
                    BinExprs::new("min_max_table.min_val", "min_max_table.max_val", &self.bins)?;
                let edge = exprs.left_edge(&exprs.index(&value));
                let bin_loc = match kind {
                    ColumnKind::Temporal => timestamp_from_seconds(&edge),
                    _ => edge,
                };
                binned_sql(&from, &value, &bin_loc)
            }
        };
        normalize_query(&sql)
    }

    /// The SQL [`Self::execute`] would run
    pub async fn to_sql(&self, ctx: &SessionContext) -> Result<String> {
        let kind = self
            .source
            .column_kind(ctx, &self.column, self.cast)
            .await?;
        self.sql_for_kind(kind)
    }

    #[tracing::instrument(skip_all, fields(column = %self.column))]
    pub async fn execute(&self, ctx: &SessionContext) -> Result<HistogramRows> {
        let kind = self
            .source
            .column_kind(ctx, &self.column, self.cast)
            .await?;
        let sql = self.sql_for_kind(kind)?;
        let batches = collect_sql(ctx, &sql).await?;

        let rows = match kind {
            ColumnKind::Categorical => HistogramRows::Categorical(
                izip!(
                    string_values(&batches, "category")?,
                    freq_values(&batches, "freq")?
                )
                .map(|(category, freq)| CategoryCount { category, freq })
                .collect(),
            ),
            ColumnKind::Numeric => HistogramRows::Numeric(
                izip!(
                    f64_values(&batches, "bin_loc")?,
                    freq_values(&batches, "freq")?
                )
                .map(|(bin_loc, freq)| BinCount { bin_loc, freq })
                .collect(),
            ),
            ColumnKind::Temporal => HistogramRows::Temporal(
                izip!(
                    datetime_values(&batches, "bin_loc")?,
                    freq_values(&batches, "freq")?
                )
                .map(|(bin_loc, freq)| BinCount { bin_loc, freq })
                .collect(),
            ),
        };
        trace!(bins = rows.len(), "histogram rows");
        Ok(rows)
    }
}

/// Groups `bin_loc` computed against the column's min and max
fn binned_sql(from: &str, value: &str, bin_loc: &str) -> String {
    format!(
        "SELECT bin_loc, count(*) AS freq FROM (\
            SELECT {bin_loc} AS bin_loc FROM {from} \
            CROSS JOIN (SELECT min({value}) AS min_val, max({value}) AS max_val \
            FROM {from}) AS min_max_table\
         ) AS binned \
         GROUP BY bin_loc ORDER BY bin_loc"
    )
}

/// Re-bin numeric histogram rows into `binning`'s bins, summing frequencies.
/// The null bucket is returned separately.
pub fn rebin(rows: &[BinCount<f64>], binning: &Binning) -> (Vec<u64>, u64) {
    let mut counts = vec![0u64; binning.nbins()];
    let mut null_freq = 0;
    for row in rows {
        match row.bin_loc {
            Some(loc) => {
                let index = binning.bin_index(loc).clamp(0, counts.len() as i64 - 1);
                counts[index as usize] += row.freq;
            }
            None => null_freq += row.freq,
        }
    }
    (counts, null_freq)
}
