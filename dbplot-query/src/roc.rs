//! ROC curves computed in the engine, and the area under them

use crate::error::{DbPlotQueryError, Result};
use crate::rows::{f64_values, RocPoint};
use crate::source::DataSource;
use crate::sql::{collect_sql, normalize_query, value_expr};
use datafusion::prelude::SessionContext;
use itertools::izip;
use tracing::trace;

/// ROC curve of a 0/1 label column against a score column
#[derive(Debug, Clone, PartialEq)]
pub struct RocQuery {
    source: DataSource,
    label_column: String,
    score_column: String,
}

impl RocQuery {
    pub fn new(
        source: impl Into<DataSource>,
        label_column: impl Into<String>,
        score_column: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            label_column: label_column.into(),
            score_column: score_column.into(),
        }
    }

    /// One row per distinct score threshold, with the rates of everything
    /// scored at or above it
    pub fn sql(&self) -> Result<String> {
        let from = self.source.from_sql()?;
        let label = value_expr(&self.label_column, None);
        let score = value_expr(&self.score_column, None);
        normalize_query(&format!(
            "WITH labeled AS (\
                SELECT CAST({score} AS DOUBLE) AS score, CAST({label} AS DOUBLE) AS label \
                FROM {from} WHERE {score} IS NOT NULL AND {label} IS NOT NULL\
             ), \
             pre_roc AS (\
                SELECT score AS threshold, \
                    sum(label) OVER (ORDER BY score DESC) AS num_pos, \
                    sum(1.0 - label) OVER (ORDER BY score DESC) AS num_neg \
                FROM labeled\
             ), \
             class_sizes AS (\
                SELECT sum(label) AS tot_pos, sum(1.0 - label) AS tot_neg FROM labeled\
             ) \
             SELECT DISTINCT pre_roc.threshold, \
                pre_roc.num_pos / nullif(class_sizes.tot_pos, 0.0) AS tpr, \
                pre_roc.num_neg / nullif(class_sizes.tot_neg, 0.0) AS fpr \
             FROM pre_roc CROSS JOIN class_sizes \
             ORDER BY fpr, tpr"
        ))
    }

    /// Curve points sorted by FPR then TPR, starting at the origin
    #[tracing::instrument(skip_all, fields(label = %self.label_column, score = %self.score_column))]
    pub async fn execute(&self, ctx: &SessionContext) -> Result<Vec<RocPoint>> {
        for column in [&self.label_column, &self.score_column] {
            self.source.column_kind(ctx, column, None).await?;
        }
        let batches = collect_sql(ctx, &self.sql()?).await?;

        let mut points = vec![RocPoint {
            threshold: None,
            tpr: 0.0,
            fpr: 0.0,
        }];
        for (threshold, tpr, fpr) in izip!(
            f64_values(&batches, "threshold")?,
            f64_values(&batches, "tpr")?,
            f64_values(&batches, "fpr")?
        ) {
            let (Some(tpr), Some(fpr)) = (tpr, fpr) else {
                return Err(DbPlotQueryError::invalid(format!(
                    "`{}` needs both positive and negative labels for an ROC curve",
                    self.label_column
                )));
            };
            points.push(RocPoint {
                threshold,
                tpr,
                fpr,
            });
        }
        trace!(points = points.len(), "roc curve");
        Ok(points)
    }
}

/// Trapezoidal area under a curve given as `(x, y)` points in drawing order.
///
/// Fewer than two points have no area. Steps back along `x` subtract area.
pub fn trapezoid_area(points: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut area = 0.0;
    let mut prev: Option<(f64, f64)> = None;
    for (x, y) in points {
        if let Some((px, py)) = prev {
            area += (py + y) / 2.0 * (x - px);
        }
        prev = Some((x, y));
    }
    area
}

/// Area under an ROC curve, with FPR on the x axis
pub fn roc_auc(points: &[RocPoint]) -> f64 {
    trapezoid_area(points.iter().map(|p| (p.fpr, p.tpr)))
}
