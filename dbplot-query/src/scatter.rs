//! Two-dimensional aggregation for scatter plots and heatmaps.
//!
//! Numeric and temporal axis pairs are binned onto a dense grid: every index pair
//! `[0, N_x) x [0, N_y)` is generated by the engine and the observed counts are
//! left-joined onto it, so empty cells come back with a frequency of zero.
//! Categorical pairs are a plain group-by.

use crate::bin_spec::{BinSpec, BinWidth, DEFAULT_GRID_NBINS};
use crate::column::{ColumnKind, SqlCast};
use crate::error::{DbPlotQueryError, Result};
use crate::rows::{
    datetime_values, f64_values, freq_values, i64_values, string_values, BinLocation,
    CategoryPairCount, GridCell,
};
use crate::source::DataSource;
use crate::sql::{
    as_double, collect_sql, epoch_seconds, normalize_query, timestamp_from_seconds, value_expr,
    BinExprs,
};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use itertools::izip;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterRows {
    Grid {
        x_kind: ColumnKind,
        y_kind: ColumnKind,
        cells: Vec<GridCell>,
    },
    Categories(Vec<CategoryPairCount>),
}

impl ScatterRows {
    pub fn len(&self) -> usize {
        match self {
            ScatterRows::Grid { cells, .. } => cells.len(),
            ScatterRows::Categories(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Axis {
    column: String,
    bins: BinSpec,
    cast: Option<SqlCast>,
}

/// SQL fragments for one binned axis of the grid
struct AxisSql {
    name: &'static str,
    kind: ColumnKind,
    point: String,
    exprs: BinExprs,
}

impl AxisSql {
    fn new(name: &'static str, axis: &Axis, kind: ColumnKind) -> Result<Self> {
        axis.bins.validate(kind)?;
        let value = value_expr(&axis.column, axis.cast);
        let min_max = format!("min_max_{name}");
        let point = match kind {
            ColumnKind::Numeric => as_double(&value),
            ColumnKind::Temporal => epoch_seconds(&value),
            ColumnKind::Categorical => {
                return Err(DbPlotQueryError::invalid(format!(
                    "column `{}` is categorical and cannot be binned on a grid",
                    axis.column
                )))
            }
        };
        let exprs = BinExprs::new(
            format!("{min_max}.min_val"),
            format!("{min_max}.max_val"),
            &axis.bins,
        )?;
        Ok(Self {
            name,
            kind,
            point,
            exprs,
        })
    }

    fn min_max_cte(&self) -> String {
        let name = self.name;
        format!(
            "min_max_{name} AS (SELECT coalesce(min(val_{name}), 0.0) AS min_val, \
             coalesce(max(val_{name}), 0.0) AS max_val FROM points)"
        )
    }

    fn index(&self) -> String {
        let value = format!("points.val_{}", self.name);
        format!("CAST({} AS BIGINT)", self.exprs.index(&value))
    }

    fn grid_cte(&self) -> String {
        let name = self.name;
        format!(
            "grid_{name} AS (SELECT unnest(range(0, CAST({} AS BIGINT))) AS grid_nbr_{name} \
             FROM min_max_{name})",
            self.exprs.nbins()
        )
    }

    fn edge(&self) -> String {
        let name = self.name;
        let edge = self
            .exprs
            .left_edge(&as_double(&format!("grid_{name}.grid_nbr_{name}")));
        match self.kind {
            ColumnKind::Temporal => timestamp_from_seconds(&edge),
            _ => edge,
        }
    }

    fn locations(&self, batches: &[RecordBatch]) -> Result<Vec<BinLocation>> {
        let column = format!("bin_loc_{}", self.name);
        let missing = || DbPlotQueryError::UnexpectedResult(format!("NULL in `{column}`"));
        match self.kind {
            ColumnKind::Temporal => datetime_values(batches, &column)?
                .into_iter()
                .map(|v| v.map(BinLocation::Temporal).ok_or_else(missing))
                .collect(),
            _ => f64_values(batches, &column)?
                .into_iter()
                .map(|v| v.map(BinLocation::Numeric).ok_or_else(missing))
                .collect(),
        }
    }
}

/// Joint distribution of two columns of a [`DataSource`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterQuery {
    source: DataSource,
    x: Axis,
    y: Axis,
}

impl ScatterQuery {
    pub fn new(
        source: impl Into<DataSource>,
        column_x: impl Into<String>,
        column_y: impl Into<String>,
    ) -> Self {
        let axis = |column: String| Axis {
            column,
            bins: BinSpec::Count(DEFAULT_GRID_NBINS),
            cast: None,
        };
        Self {
            source: source.into(),
            x: axis(column_x.into()),
            y: axis(column_y.into()),
        }
    }

    pub fn nbins(mut self, nbins_x: u32, nbins_y: u32) -> Self {
        self.x.bins = BinSpec::Count(nbins_x);
        self.y.bins = BinSpec::Count(nbins_y);
        self
    }

    pub fn bin_size(mut self, size_x: impl Into<BinWidth>, size_y: impl Into<BinWidth>) -> Self {
        self.x.bins = BinSpec::Width(size_x.into());
        self.y.bins = BinSpec::Width(size_y.into());
        self
    }

    pub fn bins(mut self, bins_x: BinSpec, bins_y: BinSpec) -> Self {
        self.x.bins = bins_x;
        self.y.bins = bins_y;
        self
    }

    pub fn cast_x_as(mut self, cast: Option<SqlCast>) -> Self {
        self.x.cast = cast;
        self
    }

    pub fn cast_y_as(mut self, cast: Option<SqlCast>) -> Self {
        self.y.cast = cast;
        self
    }

    /// Dense grid SQL for two binned axes
    pub fn grid_sql(&self, x_kind: ColumnKind, y_kind: ColumnKind) -> Result<String> {
        let x = AxisSql::new("x", &self.x, x_kind)?;
        let y = AxisSql::new("y", &self.y, y_kind)?;
        let from = self.source.from_sql()?;
        let sql = format!(
            "WITH points AS (SELECT {px} AS val_x, {py} AS val_y FROM {from}), \
             {mm_x}, {mm_y}, \
             binned AS (\
                SELECT bin_nbr_x, bin_nbr_y, count(*) AS freq FROM (\
                    SELECT {ix} AS bin_nbr_x, {iy} AS bin_nbr_y \
                    FROM points CROSS JOIN min_max_x CROSS JOIN min_max_y \
                    WHERE points.val_x IS NOT NULL AND points.val_y IS NOT NULL\
                ) AS indexed GROUP BY bin_nbr_x, bin_nbr_y\
             ), \
             {grid_x}, {grid_y} \
             SELECT grid_x.grid_nbr_x, grid_y.grid_nbr_y, \
                {ex} AS bin_loc_x, {ey} AS bin_loc_y, \
                coalesce(binned.freq, 0) AS freq \
             FROM grid_x CROSS JOIN grid_y CROSS JOIN min_max_x CROSS JOIN min_max_y \
             LEFT JOIN binned ON grid_x.grid_nbr_x = binned.bin_nbr_x \
                AND grid_y.grid_nbr_y = binned.bin_nbr_y \
             ORDER BY grid_x.grid_nbr_x, grid_y.grid_nbr_y",
            px = x.point,
            py = y.point,
            mm_x = x.min_max_cte(),
            mm_y = y.min_max_cte(),
            ix = x.index(),
            iy = y.index(),
            grid_x = x.grid_cte(),
            grid_y = y.grid_cte(),
            ex = x.edge(),
            ey = y.edge(),
        );
        normalize_query(&sql)
    }

    /// Group-by SQL for two categorical columns
    pub fn categories_sql(&self) -> Result<String> {
        let from = self.source.from_sql()?;
        let vx = value_expr(&self.x.column, self.x.cast);
        let vy = value_expr(&self.y.column, self.y.cast);
        normalize_query(&format!(
            "SELECT category_x, category_y, count(*) AS freq \
             FROM (SELECT {vx} AS category_x, {vy} AS category_y FROM {from}) AS cats \
             GROUP BY category_x, category_y ORDER BY category_x, category_y"
        ))
    }

    async fn kinds(&self, ctx: &SessionContext) -> Result<(ColumnKind, ColumnKind)> {
        let x_kind = self.source.column_kind(ctx, &self.x.column, self.x.cast).await?;
        let y_kind = self.source.column_kind(ctx, &self.y.column, self.y.cast).await?;
        Ok((x_kind, y_kind))
    }

    fn sql_for_kinds(&self, x_kind: ColumnKind, y_kind: ColumnKind) -> Result<String> {
        match (x_kind, y_kind) {
            (ColumnKind::Categorical, ColumnKind::Categorical) => self.categories_sql(),
            (ColumnKind::Categorical, _) | (_, ColumnKind::Categorical) => {
                Err(DbPlotQueryError::invalid(format!(
                    "cannot pair categorical and binned columns \
                     (`{}` is {x_kind:?}, `{}` is {y_kind:?})",
                    self.x.column, self.y.column
                )))
            }
            _ => self.grid_sql(x_kind, y_kind),
        }
    }

    /// The SQL [`Self::execute`] would run
    pub async fn to_sql(&self, ctx: &SessionContext) -> Result<String> {
        let (x_kind, y_kind) = self.kinds(ctx).await?;
        self.sql_for_kinds(x_kind, y_kind)
    }

    /// Dense grid of bin pairs; fails when either column is categorical
    #[tracing::instrument(skip_all, fields(x = %self.x.column, y = %self.y.column))]
    pub async fn execute_grid(&self, ctx: &SessionContext) -> Result<ScatterRows> {
        let (x_kind, y_kind) = self.kinds(ctx).await?;
        let x = AxisSql::new("x", &self.x, x_kind)?;
        let y = AxisSql::new("y", &self.y, y_kind)?;
        let batches = collect_sql(ctx, &self.grid_sql(x_kind, y_kind)?).await?;

        let cells: Vec<GridCell> = izip!(
            i64_values(&batches, "grid_nbr_x")?,
            i64_values(&batches, "grid_nbr_y")?,
            x.locations(&batches)?,
            y.locations(&batches)?,
            freq_values(&batches, "freq")?
        )
        .map(|(nx, ny, bin_loc_x, bin_loc_y, freq)| GridCell {
            bin_nbr_x: nx.unwrap_or_default(),
            bin_nbr_y: ny.unwrap_or_default(),
            bin_loc_x,
            bin_loc_y,
            freq,
        })
        .collect();
        trace!(cells = cells.len(), "scatter grid");
        Ok(ScatterRows::Grid {
            x_kind,
            y_kind,
            cells,
        })
    }

    /// Counts of each observed pair of values
    #[tracing::instrument(skip_all, fields(x = %self.x.column, y = %self.y.column))]
    pub async fn execute_categories(&self, ctx: &SessionContext) -> Result<ScatterRows> {
        self.kinds(ctx).await?;
        let batches = collect_sql(ctx, &self.categories_sql()?).await?;
        let rows: Vec<CategoryPairCount> = izip!(
            string_values(&batches, "category_x")?,
            string_values(&batches, "category_y")?,
            freq_values(&batches, "freq")?
        )
        .map(|(category_x, category_y, freq)| CategoryPairCount {
            category_x,
            category_y,
            freq,
        })
        .collect();
        trace!(pairs = rows.len(), "scatter categories");
        Ok(ScatterRows::Categories(rows))
    }

    /// Grid for binned pairs, group-by for categorical pairs
    pub async fn execute(&self, ctx: &SessionContext) -> Result<ScatterRows> {
        let (x_kind, y_kind) = self.kinds(ctx).await?;
        self.sql_for_kinds(x_kind, y_kind)?;
        if x_kind == ColumnKind::Categorical {
            self.execute_categories(ctx).await
        } else {
            self.execute_grid(ctx).await
        }
    }
}
