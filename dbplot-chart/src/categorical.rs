//! Multi-series categorical histograms: alignment on category, ranking and
//! slot layout with null placement.

use crate::error::DbPlotChartError;
use crate::weights::{bar_height, weights};
use dbplot_query::rows::CategoryCount;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const NULL_LABEL: &str = "NULL";

/// Where the null bucket goes among the bars
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPlacement {
    #[default]
    Left,
    Right,
    /// Interleaved at its rank
    Order,
    Omit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// By category label; the null bucket goes last
    Label,
    /// By the weights of one series
    Series(usize),
}

impl Default for CategoryOrder {
    fn default() -> Self {
        CategoryOrder::Series(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CategoricalOptions {
    pub normed: bool,
    pub log: bool,
    pub null_at: NullPlacement,
    pub order_by: CategoryOrder,
    pub ascending: bool,
}

impl Default for CategoricalOptions {
    fn default() -> Self {
        Self {
            normed: false,
            log: false,
            null_at: NullPlacement::Left,
            order_by: CategoryOrder::default(),
            ascending: true,
        }
    }
}

/// K categorical row-sets outer-joined on category
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedCategories {
    /// In order of first appearance, series 0 first
    pub categories: Vec<Option<String>>,
    /// `freqs[series][category]`
    pub freqs: Vec<Vec<u64>>,
    /// `weights[series][category]`
    pub weights: Vec<Vec<f64>>,
}

impl AlignedCategories {
    pub fn num_series(&self) -> usize {
        self.freqs.len()
    }

    pub fn null_index(&self) -> Option<usize> {
        self.categories.iter().position(Option::is_none)
    }
}

pub fn align_categories(
    series: &[Vec<CategoryCount>],
    normed: bool,
) -> Result<AlignedCategories, DbPlotChartError> {
    if series.is_empty() {
        return Err(DbPlotChartError::invalid("at least one series is required"));
    }
    let num_series = series.len();
    let mut joined: IndexMap<Option<String>, Vec<u64>> = IndexMap::new();
    for (i, rows) in series.iter().enumerate() {
        for row in rows {
            joined
                .entry(row.category.clone())
                .or_insert_with(|| vec![0; num_series])[i] += row.freq;
        }
    }

    let categories: Vec<Option<String>> = joined.keys().cloned().collect();
    let freqs: Vec<Vec<u64>> = (0..num_series)
        .map(|i| joined.values().map(|f| f[i]).collect())
        .collect();
    let weights = freqs.iter().map(|f| weights(f, normed)).collect();
    Ok(AlignedCategories {
        categories,
        freqs,
        weights,
    })
}

/// Category indices in rank order; ties keep the order of first appearance.
/// Under label order the null bucket comes after every label in both directions.
pub fn rank_categories(
    aligned: &AlignedCategories,
    order_by: CategoryOrder,
    ascending: bool,
) -> Result<Vec<usize>, DbPlotChartError> {
    let directed = move |ordering: Ordering| {
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    };
    let compare: Box<dyn Fn(&usize, &usize) -> Ordering + '_> = match order_by {
        CategoryOrder::Label => Box::new(move |a: &usize, b: &usize| {
            match (&aligned.categories[*a], &aligned.categories[*b]) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => directed(a.cmp(b)),
            }
        }),
        CategoryOrder::Series(s) => {
            let weights = aligned.weights.get(s).ok_or_else(|| {
                DbPlotChartError::invalid(format!(
                    "cannot order by series {s}, there are only {}",
                    aligned.num_series()
                ))
            })?;
            Box::new(move |a: &usize, b: &usize| directed(weights[*a].total_cmp(&weights[*b])))
        }
    };
    let mut order: Vec<usize> = (0..aligned.categories.len()).collect();
    order.sort_by(|a, b| compare(a, b));
    Ok(order)
}

/// Category indices per slot after applying the null placement
pub fn slot_order(
    aligned: &AlignedCategories,
    ranked: &[usize],
    null_at: NullPlacement,
) -> Vec<usize> {
    let null = aligned.null_index();
    let non_null = ranked.iter().copied().filter(|i| Some(*i) != null);
    match (null_at, null) {
        (NullPlacement::Left, Some(n)) => std::iter::once(n).chain(non_null).collect(),
        (NullPlacement::Right, Some(n)) => non_null.chain(std::iter::once(n)).collect(),
        (NullPlacement::Order, _) => ranked.to_vec(),
        _ => non_null.collect(),
    }
}

/// Left offset within a unit slot and width of series `i`'s bar out of `k`
pub fn sub_bar(i: usize, k: usize) -> (f64, f64) {
    if k <= 1 {
        (0.0, 1.0)
    } else {
        let width = 0.8 / k as f64;
        (0.1 + i as f64 * width, width)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBars {
    pub x: Vec<f64>,
    pub height: Vec<f64>,
    pub width: f64,
    /// Which bars belong to the null bucket
    pub is_null: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalLayout {
    /// Label of each unit slot, left to right
    pub slots: Vec<Option<String>>,
    pub series: Vec<SeriesBars>,
    /// Tick position and label at every slot centre
    pub ticks: Vec<(f64, String)>,
    pub xlim: [f64; 2],
}

pub fn categorical_layout(
    series: &[Vec<CategoryCount>],
    options: &CategoricalOptions,
) -> Result<CategoricalLayout, DbPlotChartError> {
    let aligned = align_categories(series, options.normed)?;
    let ranked = rank_categories(&aligned, options.order_by, options.ascending)?;
    let slots = slot_order(&aligned, &ranked, options.null_at);
    let k = aligned.num_series();

    let series = aligned
        .weights
        .iter()
        .enumerate()
        .map(|(i, weights)| {
            let (offset, width) = sub_bar(i, k);
            SeriesBars {
                x: (0..slots.len()).map(|slot| slot as f64 + offset).collect(),
                height: slots
                    .iter()
                    .map(|c| bar_height(weights[*c], options.log))
                    .collect(),
                width,
                is_null: slots.iter().map(|c| aligned.categories[*c].is_none()).collect(),
            }
        })
        .collect();

    let labels: Vec<Option<String>> = slots
        .iter()
        .map(|c| aligned.categories[*c].clone())
        .collect();
    let ticks = labels
        .iter()
        .enumerate()
        .map(|(slot, label)| {
            (
                slot as f64 + 0.5,
                label.clone().unwrap_or_else(|| NULL_LABEL.to_string()),
            )
        })
        .collect();

    Ok(CategoricalLayout {
        xlim: [0.0, labels.len() as f64],
        slots: labels,
        series,
        ticks,
    })
}
