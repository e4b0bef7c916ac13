//! Numeric and temporal histograms: re-binning pre-aggregated rows onto equal
//! plotting bins, side-by-side series and the hatched null bar.

use crate::categorical::{sub_bar, NullPlacement, NULL_LABEL};
use crate::error::DbPlotChartError;
use crate::weights::{bar_height, weights};
use chrono::{DateTime, NaiveDateTime};
use dbplot_query::bin_spec::{BinSpec, DEFAULT_NBINS};
use dbplot_query::binning::Binning;
use dbplot_query::histogram::rebin;
use dbplot_query::rows::{epoch_seconds, BinCount};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MAX_TICKS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HistogramOptions {
    /// Plotting bins; rows are re-binned onto these
    pub nbins: u32,
    pub normed: bool,
    pub log: bool,
    pub null_at: NullPlacement,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            nbins: DEFAULT_NBINS,
            normed: false,
            log: false,
            null_at: NullPlacement::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullBar {
    pub x: f64,
    pub height: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeriesBars {
    pub x: Vec<f64>,
    pub height: Vec<f64>,
    pub width: f64,
    pub null_bar: Option<NullBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericLayout {
    /// `nbins + 1` bin boundaries
    pub edges: Vec<f64>,
    pub bin_width: f64,
    pub series: Vec<NumericSeriesBars>,
    pub ticks: Vec<(f64, String)>,
    pub xlim: [f64; 2],
}

pub fn numeric_layout(
    series: &[Vec<BinCount<f64>>],
    options: &HistogramOptions,
) -> Result<NumericLayout, DbPlotChartError> {
    layout(series, options, |v, _| format_number(v))
}

/// Temporal rows are laid out in seconds since the epoch and labelled as dates
pub fn temporal_layout(
    series: &[Vec<BinCount<NaiveDateTime>>],
    options: &HistogramOptions,
) -> Result<NumericLayout, DbPlotChartError> {
    let series: Vec<Vec<BinCount<f64>>> = series
        .iter()
        .map(|rows| {
            rows.iter()
                .map(|r| BinCount {
                    bin_loc: r.bin_loc.as_ref().map(epoch_seconds),
                    freq: r.freq,
                })
                .collect()
        })
        .collect();
    layout(&series, options, format_date)
}

fn layout(
    series: &[Vec<BinCount<f64>>],
    options: &HistogramOptions,
    label: impl Fn(f64, f64) -> String,
) -> Result<NumericLayout, DbPlotChartError> {
    if series.is_empty() {
        return Err(DbPlotChartError::invalid("at least one series is required"));
    }
    if options.null_at == NullPlacement::Order {
        return Err(DbPlotChartError::invalid(
            "null placement `order` is not supported for numeric histograms",
        ));
    }
    if options.nbins == 0 {
        return Err(DbPlotChartError::invalid("number of bins must be positive"));
    }
    let (min, max) = series
        .iter()
        .flatten()
        .filter_map(|r| r.bin_loc)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| DbPlotChartError::invalid("no non-null bins to plot"))?;

    let binning = Binning::new(min, max, &BinSpec::Count(options.nbins))?;
    let nbins = binning.nbins();
    let bw = binning.bin_width();
    let edges: Vec<f64> = (0..=nbins as i64).map(|i| binning.left_edge(i)).collect();
    let (first, last) = (edges[0], edges[nbins]);
    let k = series.len();

    let rebinned: Vec<(Vec<f64>, f64)> = series
        .iter()
        .map(|rows| {
            let (mut counts, null_freq) = rebin(rows, &binning);
            counts.push(null_freq);
            let mut w = weights(&counts, options.normed);
            let null_weight = w.pop().unwrap_or_default();
            (w, null_weight)
        })
        .collect();
    let has_null = series.iter().flatten().any(|r| r.bin_loc.is_none());
    let show_null = has_null && options.null_at != NullPlacement::Omit;

    let null_width = if k == 1 { bw } else { 0.8 * bw / k as f64 };
    let null_left = |i: usize| -> f64 {
        let base = match options.null_at {
            NullPlacement::Right => last,
            _ => first - bw,
        };
        if k == 1 {
            base
        } else {
            base + 0.1 * bw + i as f64 * null_width
        }
    };

    let series = rebinned
        .iter()
        .enumerate()
        .map(|(i, (w, null_weight))| {
            let (offset, width) = sub_bar(i, k);
            NumericSeriesBars {
                x: edges[..nbins].iter().map(|e| e + offset * bw).collect(),
                height: w.iter().map(|w| bar_height(*w, options.log)).collect(),
                width: width * bw,
                null_bar: show_null.then(|| NullBar {
                    x: null_left(i),
                    height: bar_height(*null_weight, options.log),
                    width: null_width,
                }),
            }
        })
        .collect();

    let stride = nbins.div_ceil(MAX_TICKS).max(1);
    let mut ticks: Vec<(f64, String)> = edges
        .iter()
        .step_by(stride)
        .map(|e| (*e, label(*e, bw)))
        .collect();
    let xlim = match (show_null, options.null_at) {
        (true, NullPlacement::Left) => {
            ticks.insert(0, (first - bw / 2.0, NULL_LABEL.to_string()));
            [first - bw, last]
        }
        (true, NullPlacement::Right) => {
            ticks.push((last + bw / 2.0, NULL_LABEL.to_string()));
            [first, last + bw]
        }
        _ => [first, last],
    };

    Ok(NumericLayout {
        edges,
        bin_width: bw,
        series,
        ticks,
        xlim,
    })
}

fn format_number(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn format_date(seconds: f64, bin_width: f64) -> String {
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    let Some(t) = DateTime::from_timestamp(secs as i64, nanos) else {
        return format_number(seconds);
    };
    if bin_width >= SECONDS_PER_DAY {
        t.format("%Y-%m-%d").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
