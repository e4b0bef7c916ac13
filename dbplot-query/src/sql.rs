//! SQL text generation, normalisation and execution.
//!
//! Queries are assembled as text with every identifier quoted, parsed with
//! `sqlparser` to reject anything malformed before it reaches the engine, and the
//! normalised statement is what gets logged, echoed and executed.

use crate::bin_spec::BinSpec;
use crate::column::SqlCast;
use crate::error::{DbPlotQueryError, Result};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use sqlparser::ast::{Ident, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::{debug, trace};

/// Alias every source relation is bound to
pub(crate) const SRC: &str = "src";

pub(crate) fn quote_ident(name: &str) -> String {
    Ident::with_quote('"', name).to_string()
}

/// Float literal that always carries a decimal point or exponent, so the
/// engine types it as DOUBLE
pub(crate) fn float_lit(v: f64) -> String {
    format!("{v:?}")
}

/// `src."column"`, optionally wrapped in the requested cast
pub(crate) fn value_expr(column: &str, cast: Option<SqlCast>) -> String {
    let col = format!("{SRC}.{}", quote_ident(column));
    match cast {
        Some(cast) => format!("CAST({col} AS {cast})"),
        None => col,
    }
}

pub(crate) fn as_double(expr: &str) -> String {
    format!("CAST({expr} AS DOUBLE)")
}

const NANOS_PER_SECOND: f64 = 1e9;

/// Seconds since the epoch of a date or timestamp expression, as a DOUBLE.
/// Differences of these stay finite across the whole timestamp range.
pub(crate) fn epoch_seconds(expr: &str) -> String {
    let nanos = format!("CAST(CAST({expr} AS TIMESTAMP) AS BIGINT)");
    format!("{} / {}", as_double(&nanos), float_lit(NANOS_PER_SECOND))
}

/// Timestamp at DOUBLE epoch seconds `seconds`, rounded to the nanosecond
pub(crate) fn timestamp_from_seconds(seconds: &str) -> String {
    format!(
        "to_timestamp_nanos(CAST(round(({seconds}) * {}) AS BIGINT))",
        float_lit(NANOS_PER_SECOND)
    )
}

/// SQL fragments that assign a value to a bin given the min and max of its column.
///
/// The operation order matches [`crate::binning::Binning`].
#[derive(Debug, Clone)]
pub(crate) struct BinExprs {
    min: String,
    max: String,
    count: Option<String>,
    width: Option<String>,
}

impl BinExprs {
    pub fn new(min: impl Into<String>, max: impl Into<String>, spec: &BinSpec) -> Result<Self> {
        let (count, width) = match (spec, spec.width_value()) {
            (BinSpec::Count(n), _) => (Some(float_lit(*n as f64)), None),
            (_, Some(w)) => (None, Some(float_lit(w))),
            (_, None) => return Err(DbPlotQueryError::invalid("bin width out of range")),
        };
        Ok(Self {
            min: min.into(),
            max: max.into(),
            count,
            width,
        })
    }

    fn span(&self) -> String {
        let (min, max) = (&self.min, &self.max);
        format!("CASE WHEN {max} > {min} THEN {max} - {min} ELSE 1.0 END")
    }

    /// Number of bins as a DOUBLE expression
    pub fn nbins(&self) -> String {
        match (&self.count, &self.width) {
            (Some(n), _) => n.clone(),
            (None, Some(w)) => {
                let (min, max) = (&self.min, &self.max);
                format!("CASE WHEN {max} > {min} THEN ceil(({max} - {min}) / {w}) ELSE 1.0 END")
            }
            (None, None) => "1.0".to_string(),
        }
    }

    /// Bin index of `value` as a DOUBLE; the maximum folds into the last bin and
    /// NULL stays NULL
    pub fn index(&self, value: &str) -> String {
        let min = &self.min;
        let raw = match (&self.count, &self.width) {
            (Some(n), _) => format!("floor(({value} - {min}) / {} * {n})", self.span()),
            (None, Some(w)) => format!("floor(({value} - {min}) / {w})"),
            (None, None) => "0.0".to_string(),
        };
        let nbins = self.nbins();
        format!("CASE WHEN {raw} >= {nbins} THEN {nbins} - 1.0 ELSE {raw} END")
    }

    /// Left edge of the bin with DOUBLE index `index`
    pub fn left_edge(&self, index: &str) -> String {
        let min = &self.min;
        match (&self.count, &self.width) {
            (Some(n), _) => format!("{index} / {n} * {} + {min}", self.span()),
            (None, Some(w)) => format!("{index} * {w} + {min}"),
            (None, None) => min.clone(),
        }
    }
}

/// Parse a single SELECT statement and return its normalised text
pub fn normalize_query(sql: &str) -> Result<String> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)?;
    match statements.as_slice() {
        [statement @ Statement::Query(_)] => Ok(statement.to_string()),
        _ => Err(DbPlotQueryError::invalid(format!(
            "expected a single SELECT statement, got `{sql}`"
        ))),
    }
}

#[tracing::instrument(skip_all)]
pub(crate) async fn collect_sql(ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
    debug!(%sql, "executing aggregation query");
    let batches = ctx.sql(sql).await?.collect().await?;
    trace!(
        rows = batches.iter().map(|b| b.num_rows()).sum::<usize>(),
        "aggregation query finished"
    );
    Ok(batches)
}
