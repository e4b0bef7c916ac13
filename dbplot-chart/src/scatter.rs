//! Scatter markers and heatmap cells from 2-D aggregates

use crate::error::DbPlotChartError;
use crate::style::PlotStyle;
use dbplot_common::types::RgbaColor;
use dbplot_query::rows::{CategoryPairCount, GridCell};
use dbplot_query::scatter::ScatterRows;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterPlotType {
    #[default]
    Scatter,
    Heatmap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScatterOptions {
    pub plot_type: ScatterPlotType,
    /// Marker area proportional to frequency
    pub by_size: bool,
    /// Marker opacity proportional to frequency
    pub by_opacity: bool,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            plot_type: ScatterPlotType::Scatter,
            by_size: true,
            by_opacity: true,
        }
    }
}

/// Categories of one axis placed on unit slots in order of first appearance
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxis {
    pub labels: Vec<Option<String>>,
}

impl CategoryAxis {
    fn from_values<'a>(values: impl Iterator<Item = &'a Option<String>>) -> Self {
        let labels: IndexSet<Option<String>> = values.cloned().collect();
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Slot centre of a label
    pub fn position(&self, label: &Option<String>) -> f64 {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| i as f64 + 0.5)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub size: Vec<f32>,
    pub fill: Vec<RgbaColor>,
    pub stroke_width: f32,
    /// Present when the axes are categorical
    pub category_axes: Option<(CategoryAxis, CategoryAxis)>,
}

fn freq_styling(
    freqs: &[u64],
    options: &ScatterOptions,
    style: &PlotStyle,
) -> Result<(Vec<f32>, Vec<RgbaColor>, f32), DbPlotChartError> {
    if !options.by_size && !options.by_opacity {
        return Err(DbPlotChartError::invalid(
            "scatter markers must be scaled by size, opacity or both",
        ));
    }
    let base = style.series_color(0);
    let max_freq = freqs.iter().copied().max().unwrap_or(0);
    let size = freqs
        .iter()
        .map(|f| {
            if options.by_size {
                style.marker_size * *f as f32
            } else {
                style.marker_size
            }
        })
        .collect();
    let (fill, stroke_width) = if options.by_opacity {
        let fill = freqs
            .iter()
            .map(|f| {
                let alpha = if max_freq > 0 {
                    *f as f32 / max_freq as f32
                } else {
                    0.0
                };
                base.with_alpha(alpha)
            })
            .collect();
        (fill, 0.0)
    } else {
        (vec![base; freqs.len()], 0.5)
    };
    Ok((size, fill, stroke_width))
}

pub fn scatter_points(
    rows: &ScatterRows,
    options: &ScatterOptions,
    style: &PlotStyle,
) -> Result<ScatterPoints, DbPlotChartError> {
    match rows {
        ScatterRows::Grid { cells, .. } => {
            let freqs: Vec<u64> = cells.iter().map(|c| c.freq).collect();
            let (size, fill, stroke_width) = freq_styling(&freqs, options, style)?;
            Ok(ScatterPoints {
                x: cells.iter().map(|c| c.bin_loc_x.as_f64()).collect(),
                y: cells.iter().map(|c| c.bin_loc_y.as_f64()).collect(),
                size,
                fill,
                stroke_width,
                category_axes: None,
            })
        }
        ScatterRows::Categories(pairs) => category_points(pairs, options, style),
    }
}

fn category_points(
    pairs: &[CategoryPairCount],
    options: &ScatterOptions,
    style: &PlotStyle,
) -> Result<ScatterPoints, DbPlotChartError> {
    let x_axis = CategoryAxis::from_values(pairs.iter().map(|p| &p.category_x));
    let y_axis = CategoryAxis::from_values(pairs.iter().map(|p| &p.category_y));
    let freqs: Vec<u64> = pairs.iter().map(|p| p.freq).collect();
    let (size, fill, stroke_width) = freq_styling(&freqs, options, style)?;
    Ok(ScatterPoints {
        x: pairs.iter().map(|p| x_axis.position(&p.category_x)).collect(),
        y: pairs.iter().map(|p| y_axis.position(&p.category_y)).collect(),
        size,
        fill,
        stroke_width,
        category_axes: Some((x_axis, y_axis)),
    })
}

/// Dense grid reshaped into `nx * ny` cells
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCells {
    pub nx: usize,
    pub ny: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub width: f64,
    pub height: f64,
    pub freq: Vec<u64>,
    pub fill: Vec<RgbaColor>,
    pub xlim: [f64; 2],
    pub ylim: [f64; 2],
}

/// Spacing of a regular sequence of edges, 1 when there is a single edge
fn spacing(edges: &[f64]) -> f64 {
    match edges {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

/// Distinct bin numbers of one axis, which must run `0..n` without gaps
fn axis_bins(nbrs: impl Iterator<Item = i64>) -> Option<usize> {
    let distinct: BTreeSet<i64> = nbrs.collect();
    let n = distinct.len();
    let contiguous = distinct.first() == Some(&0) && distinct.last() == Some(&(n as i64 - 1));
    contiguous.then_some(n)
}

pub fn heatmap_cells(
    rows: &ScatterRows,
    style: &PlotStyle,
) -> Result<HeatmapCells, DbPlotChartError> {
    let ScatterRows::Grid { cells, .. } = rows else {
        return Err(DbPlotChartError::invalid(
            "a heatmap needs a binned grid, not categorical pairs",
        ));
    };
    let nx = axis_bins(cells.iter().map(|c| c.bin_nbr_x));
    let ny = axis_bins(cells.iter().map(|c| c.bin_nbr_y));
    let (Some(nx), Some(ny)) = (nx, ny) else {
        return Err(DbPlotChartError::invalid(
            "heatmap input has bin numbers outside a 0-based range",
        ));
    };
    if nx * ny != cells.len() {
        return Err(DbPlotChartError::invalid(format!(
            "heatmap input is not a rectangular grid: {} cells for {nx} x {ny} bins",
            cells.len()
        )));
    }

    // Bin numbers order the cells; float edges may collide at large magnitudes
    let mut ordered: Vec<&GridCell> = cells.iter().collect();
    ordered.sort_by_key(|c| (c.bin_nbr_x, c.bin_nbr_y));
    for (i, cell) in ordered.iter().enumerate() {
        if (cell.bin_nbr_x, cell.bin_nbr_y) != ((i / ny) as i64, (i % ny) as i64) {
            return Err(DbPlotChartError::invalid(
                "heatmap input has duplicate or missing cells",
            ));
        }
    }

    let xs: Vec<f64> = (0..nx).map(|i| ordered[i * ny].bin_loc_x.as_f64()).collect();
    let ys: Vec<f64> = (0..ny).map(|j| ordered[j].bin_loc_y.as_f64()).collect();
    let (width, height) = (spacing(&xs), spacing(&ys));
    let freq: Vec<u64> = ordered.iter().map(|c| c.freq).collect();
    let max_freq = freq.iter().copied().max().unwrap_or(0);
    let fill = freq
        .iter()
        .map(|f| {
            let t = if max_freq > 0 {
                *f as f32 / max_freq as f32
            } else {
                0.0
            };
            style.colormap.color_at(t)
        })
        .collect();

    Ok(HeatmapCells {
        nx,
        ny,
        x: ordered.iter().map(|c| c.bin_loc_x.as_f64()).collect(),
        y: ordered.iter().map(|c| c.bin_loc_y.as_f64()).collect(),
        width,
        height,
        freq,
        fill,
        xlim: [xs[0], xs[nx - 1] + width],
        ylim: [ys[0], ys[ny - 1] + height],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbplot_query::column::ColumnKind;
    use dbplot_query::rows::BinLocation;

    fn grid(nx: i64, ny: i64, occupied: &[(i64, i64, u64)]) -> ScatterRows {
        let mut cells = Vec::new();
        for x in 0..nx {
            for y in 0..ny {
                let freq = occupied
                    .iter()
                    .find(|(ox, oy, _)| *ox == x && *oy == y)
                    .map(|o| o.2)
                    .unwrap_or(0);
                cells.push(GridCell {
                    bin_nbr_x: x,
                    bin_nbr_y: y,
                    bin_loc_x: BinLocation::Numeric(x as f64 * 2.0),
                    bin_loc_y: BinLocation::Numeric(y as f64),
                    freq,
                });
            }
        }
        ScatterRows::Grid {
            x_kind: ColumnKind::Numeric,
            y_kind: ColumnKind::Numeric,
            cells,
        }
    }

    #[test]
    fn test_size_and_opacity() {
        let rows = grid(2, 2, &[(0, 0, 1), (1, 1, 4)]);
        let options = ScatterOptions::default();
        let points = scatter_points(&rows, &options, &PlotStyle::default()).unwrap();
        assert_eq!(points.size, vec![20.0, 0.0, 0.0, 80.0]);
        assert_eq!(points.fill[0].alpha(), 0.25);
        assert_eq!(points.fill[3].alpha(), 1.0);
        assert_eq!(points.stroke_width, 0.0);
        assert_eq!(points.x, vec![0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn test_size_only_keeps_stroke() {
        let rows = grid(1, 2, &[(0, 1, 3)]);
        let options = ScatterOptions {
            by_opacity: false,
            ..Default::default()
        };
        let points = scatter_points(&rows, &options, &PlotStyle::default()).unwrap();
        assert_eq!(points.stroke_width, 0.5);
        assert_eq!(points.fill[0].alpha(), 1.0);
    }

    #[test]
    fn test_neither_size_nor_opacity() {
        let options = ScatterOptions {
            by_size: false,
            by_opacity: false,
            ..Default::default()
        };
        assert!(matches!(
            scatter_points(&grid(1, 1, &[]), &options, &PlotStyle::default()),
            Err(DbPlotChartError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_categorical_pairs_on_slots() {
        let rows = ScatterRows::Categories(vec![
            CategoryPairCount {
                category_x: Some("a".into()),
                category_y: Some("u".into()),
                freq: 2,
            },
            CategoryPairCount {
                category_x: Some("b".into()),
                category_y: None,
                freq: 1,
            },
        ]);
        let options = ScatterOptions::default();
        let points = scatter_points(&rows, &options, &PlotStyle::default()).unwrap();
        assert_eq!(points.x, vec![0.5, 1.5]);
        assert_eq!(points.y, vec![0.5, 1.5]);
        let (_, y_axis) = points.category_axes.unwrap();
        assert_eq!(y_axis.labels, vec![Some("u".to_string()), None]);
    }

    #[test]
    fn test_heatmap_reshape() {
        let rows = grid(3, 2, &[(2, 1, 5)]);
        let cells = heatmap_cells(&rows, &PlotStyle::default()).unwrap();
        assert_eq!((cells.nx, cells.ny), (3, 2));
        assert_eq!((cells.width, cells.height), (2.0, 1.0));
        assert_eq!(cells.xlim, [0.0, 6.0]);
        assert_eq!(cells.ylim, [0.0, 2.0]);
        assert_eq!(cells.freq, vec![0, 0, 0, 0, 0, 5]);
        assert_eq!(cells.fill[5], PlotStyle::default().colormap.color_at(1.0));
    }

    #[test]
    fn test_heatmap_rejects_ragged_grid() {
        let ScatterRows::Grid { mut cells, x_kind, y_kind } = grid(2, 2, &[]) else {
            unreachable!()
        };
        cells.pop();
        let rows = ScatterRows::Grid { x_kind, y_kind, cells };
        assert!(matches!(
            heatmap_cells(&rows, &PlotStyle::default()),
            Err(DbPlotChartError::InvalidParameter(_))
        ));
        let pairs = ScatterRows::Categories(vec![]);
        assert!(heatmap_cells(&pairs, &PlotStyle::default()).is_err());
    }

    #[test]
    fn test_heatmap_edges_closer_than_float_resolution() {
        let cells = (0..50)
            .flat_map(|x| {
                (0..2).map(move |y| GridCell {
                    bin_nbr_x: x,
                    bin_nbr_y: y,
                    bin_loc_x: BinLocation::Numeric(1e15 + x as f64 * 0.02),
                    bin_loc_y: BinLocation::Numeric(y as f64),
                    freq: 1,
                })
            })
            .collect();
        let rows = ScatterRows::Grid {
            x_kind: ColumnKind::Numeric,
            y_kind: ColumnKind::Numeric,
            cells,
        };
        let cells = heatmap_cells(&rows, &PlotStyle::default()).unwrap();
        assert_eq!((cells.nx, cells.ny), (50, 2));
        assert_eq!(cells.x.len(), 100);
        assert_eq!(cells.height, 1.0);
        assert!(cells.xlim[0] <= cells.xlim[1]);
    }

    #[test]
    fn test_heatmap_rejects_duplicate_cells() {
        let ScatterRows::Grid { mut cells, x_kind, y_kind } = grid(2, 2, &[]) else {
            unreachable!()
        };
        cells[3].bin_nbr_y = 0;
        let rows = ScatterRows::Grid { x_kind, y_kind, cells };
        assert!(matches!(
            heatmap_cells(&rows, &PlotStyle::default()),
            Err(DbPlotChartError::InvalidParameter(_))
        ));
    }
}
