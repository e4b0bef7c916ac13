//! Scene graph assembly for histogram, scatter and heatmap charts

use crate::categorical::{categorical_layout, CategoricalOptions};
use crate::error::DbPlotChartError;
use crate::numeric::{numeric_layout, temporal_layout, HistogramOptions, NumericLayout};
use crate::scatter::{heatmap_cells, scatter_points, CategoryAxis, ScatterOptions, ScatterPlotType};
use crate::style::PlotStyle;
use crate::weights::log_ticks;
use dbplot_common::value::ScalarOrArray;
use dbplot_query::column::ColumnKind;
use dbplot_query::histogram::HistogramRows;
use dbplot_query::scatter::ScatterRows;
use dbplot_scenegraph::axis::{AxisScale, SceneAxis, SceneTick};
use dbplot_scenegraph::marks::rect::SceneRectMark;
use dbplot_scenegraph::marks::symbol::SceneSymbolMark;
use dbplot_scenegraph::scene_graph::{LegendEntry, SceneGraph};
use itertools::{izip, Itertools};
use serde::{Deserialize, Serialize};

/// One histogram row-set with the label shown in the legend
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub label: String,
    pub rows: HistogramRows,
}

impl HistogramSeries {
    pub fn new(label: impl Into<String>, rows: HistogramRows) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HistogramChartOptions {
    /// Used when the rows are categorical
    pub categorical: CategoricalOptions,
    /// Used when the rows are numeric or temporal
    pub binned: HistogramOptions,
}

fn ticks(ticks: &[(f64, String)]) -> Vec<SceneTick> {
    ticks
        .iter()
        .map(|(value, label)| SceneTick::new(*value, label.clone()))
        .collect()
}

fn y_axis(heights: impl IntoIterator<Item = f64>, normed: bool, log: bool) -> SceneAxis {
    let axis = SceneAxis::new().title(if normed { "fraction" } else { "frequency" });
    if log {
        axis.scale(AxisScale::Log10).ticks(log_ticks(heights))
    } else {
        axis
    }
}

fn new_graph(style: &PlotStyle) -> SceneGraph {
    SceneGraph {
        width: style.width,
        height: style.height,
        ..Default::default()
    }
}

/// Histogram of a single row-set
pub fn histogram_chart(
    series: &HistogramSeries,
    options: &HistogramChartOptions,
    style: &PlotStyle,
) -> Result<SceneGraph, DbPlotChartError> {
    histograms_chart(std::slice::from_ref(series), options, style)
}

/// Overlaid histogram of several row-sets of the same kind
#[tracing::instrument(skip_all, fields(series = series.len()))]
pub fn histograms_chart(
    series: &[HistogramSeries],
    options: &HistogramChartOptions,
    style: &PlotStyle,
) -> Result<SceneGraph, DbPlotChartError> {
    let Some(first) = series.first() else {
        return Err(DbPlotChartError::invalid("at least one series is required"));
    };
    let kind = first.rows.kind();
    if let Some(other) = series.iter().find(|s| s.rows.kind() != kind) {
        return Err(DbPlotChartError::invalid(format!(
            "cannot overlay {:?} series `{}` on {:?} series `{}`",
            other.rows.kind(),
            other.label,
            kind,
            first.label
        )));
    }
    tracing::debug!(?kind, "laying out histogram");

    let mut graph = match kind {
        ColumnKind::Categorical => categorical_chart(series, &options.categorical, style)?,
        ColumnKind::Numeric => {
            let rows = series
                .iter()
                .map(|s| match &s.rows {
                    HistogramRows::Numeric(rows) => rows.clone(),
                    _ => Vec::new(),
                })
                .collect_vec();
            let layout = numeric_layout(&rows, &options.binned)?;
            binned_chart(&layout, &options.binned, style)
        }
        ColumnKind::Temporal => {
            let rows = series
                .iter()
                .map(|s| match &s.rows {
                    HistogramRows::Temporal(rows) => rows.clone(),
                    _ => Vec::new(),
                })
                .collect_vec();
            let layout = temporal_layout(&rows, &options.binned)?;
            let mut graph = binned_chart(&layout, &options.binned, style);
            graph.x_axis.label_angle = 90.0;
            graph
        }
    };
    if series.len() == 1 {
        graph.x_axis.title = Some(first.label.clone());
    } else {
        graph.legend = series
            .iter()
            .enumerate()
            .map(|(i, s)| LegendEntry {
                label: s.label.clone(),
                color: style.series_color(i),
            })
            .collect();
    }
    graph.validate()?;
    Ok(graph)
}

fn categorical_chart(
    series: &[HistogramSeries],
    options: &CategoricalOptions,
    style: &PlotStyle,
) -> Result<SceneGraph, DbPlotChartError> {
    let rows = series
        .iter()
        .map(|s| match &s.rows {
            HistogramRows::Categorical(rows) => rows.clone(),
            _ => Vec::new(),
        })
        .collect_vec();
    let layout = categorical_layout(&rows, options)?;

    let mut graph = new_graph(style);
    for (i, bars) in layout.series.iter().enumerate() {
        let color = style.series_color(i);
        let (nulls, regular): (Vec<_>, Vec<_>) =
            izip!(&bars.x, &bars.height, &bars.is_null).partition(|(_, _, is_null)| **is_null);
        let (x, height): (Vec<f64>, Vec<f64>) =
            regular.iter().map(|(x, h, _)| (**x, **h)).unzip();
        graph.add_mark(
            SceneRectMark::bars(format!("bars_{i}"), x, height, bars.width).with_fill(color),
        );
        if !nulls.is_empty() {
            let (x, height): (Vec<f64>, Vec<f64>) =
                nulls.iter().map(|(x, h, _)| (**x, **h)).unzip();
            graph.add_mark(
                SceneRectMark::bars(format!("null_bars_{i}"), x, height, bars.width)
                    .with_fill(color)
                    .with_hatch(Some(style.null_hatch)),
            );
        }
    }

    let heights = layout.series.iter().flat_map(|s| s.height.iter().copied());
    graph.y_axis = y_axis(heights, options.normed, options.log);
    graph.x_axis = SceneAxis::new()
        .limits(layout.xlim[0], layout.xlim[1])
        .ticks(ticks(&layout.ticks))
        .label_angle(90.0);
    Ok(graph)
}

fn binned_chart(
    layout: &NumericLayout,
    options: &HistogramOptions,
    style: &PlotStyle,
) -> SceneGraph {
    let mut graph = new_graph(style);
    for (i, bars) in layout.series.iter().enumerate() {
        let color = style.series_color(i);
        let (x, height) = (bars.x.clone(), bars.height.clone());
        graph.add_mark(
            SceneRectMark::bars(format!("bars_{i}"), x, height, bars.width).with_fill(color),
        );
        if let Some(null_bar) = bars.null_bar {
            graph.add_mark(
                SceneRectMark::bars(
                    format!("null_bars_{i}"),
                    vec![null_bar.x],
                    vec![null_bar.height],
                    null_bar.width,
                )
                .with_fill(color)
                .with_hatch(Some(style.null_hatch)),
            );
        }
    }

    let heights = layout.series.iter().flat_map(|s| {
        s.height
            .iter()
            .copied()
            .chain(s.null_bar.map(|b| b.height))
    });
    graph.y_axis = y_axis(heights, options.normed, options.log);
    graph.x_axis = SceneAxis::new()
        .limits(layout.xlim[0], layout.xlim[1])
        .ticks(ticks(&layout.ticks));
    graph
}

fn category_axis(axis: &CategoryAxis) -> SceneAxis {
    let ticks = axis
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            SceneTick::new(
                i as f64 + 0.5,
                label.as_deref().unwrap_or(crate::categorical::NULL_LABEL),
            )
        })
        .collect();
    SceneAxis::new()
        .limits(0.0, axis.labels.len() as f64)
        .ticks(ticks)
}

/// Scatter or heatmap chart of 2-D aggregates, per `options.plot_type`
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn scatter_chart(
    rows: &ScatterRows,
    options: &ScatterOptions,
    style: &PlotStyle,
) -> Result<SceneGraph, DbPlotChartError> {
    if options.plot_type == ScatterPlotType::Heatmap {
        return heatmap_chart(rows, style);
    }
    let points = scatter_points(rows, options, style)?;
    let mut graph = new_graph(style);
    graph.add_mark(
        SceneSymbolMark::points("points", points.x, points.y)
            .with_shape(style.marker)
            .with_size(points.size)
            .with_fill(points.fill)
            .with_stroke(style.series_color(0), points.stroke_width),
    );
    if let Some((x_axis, y_axis)) = &points.category_axes {
        graph.x_axis = category_axis(x_axis).label_angle(90.0);
        graph.y_axis = category_axis(y_axis);
    }
    graph.validate()?;
    Ok(graph)
}

pub fn heatmap_chart(
    rows: &ScatterRows,
    style: &PlotStyle,
) -> Result<SceneGraph, DbPlotChartError> {
    let cells = heatmap_cells(rows, style)?;
    tracing::debug!(nx = cells.nx, ny = cells.ny, "laying out heatmap");
    let mut graph = new_graph(style);
    graph.add_mark(SceneRectMark {
        name: "heatmap".to_string(),
        len: cells.freq.len() as u32,
        x: cells.x.into(),
        y: cells.y.into(),
        width: Some(ScalarOrArray::Scalar(cells.width)),
        height: Some(ScalarOrArray::Scalar(cells.height)),
        fill: cells.fill.into(),
        ..Default::default()
    });
    graph.x_axis = SceneAxis::new().limits(cells.xlim[0], cells.xlim[1]);
    graph.y_axis = SceneAxis::new().limits(cells.ylim[0], cells.ylim[1]);
    graph.validate()?;
    Ok(graph)
}
