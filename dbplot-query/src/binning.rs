//! Client-side evaluation of the bin assignment rule.
//!
//! The arithmetic mirrors the SQL emitted by [`crate::sql::BinExprs`] operation for
//! operation, so bin edges computed here compare equal to the ones returned by the
//! engine. The chart layer also uses it to re-bin pre-aggregated rows, with
//! timestamps as epoch seconds.

use crate::bin_spec::BinSpec;
use crate::column::ColumnKind;
use crate::error::{DbPlotQueryError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinRule {
    Count(f64),
    Width(f64),
}

/// Equal-width bins over `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    min: f64,
    max: f64,
    rule: BinRule,
}

impl Binning {
    /// Numeric binning. `min`/`max` are the observed extremes of the column.
    pub fn new(min: f64, max: f64, spec: &BinSpec) -> Result<Self> {
        spec.validate(ColumnKind::Numeric)?;
        Self::from_validated(min, max, spec)
    }

    fn from_validated(min: f64, max: f64, spec: &BinSpec) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(DbPlotQueryError::invalid(format!(
                "invalid bin range [{min}, {max}]"
            )));
        }
        let rule = match (spec, spec.width_value()) {
            (BinSpec::Count(n), _) => BinRule::Count(*n as f64),
            (_, Some(w)) => BinRule::Width(w),
            (_, None) => return Err(DbPlotQueryError::invalid("bin width out of range")),
        };
        Ok(Self { min, max, rule })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`, or 1 for a degenerate range so nothing divides by zero
    fn span(&self) -> f64 {
        if self.max > self.min {
            self.max - self.min
        } else {
            1.0
        }
    }

    pub fn nbins(&self) -> usize {
        self.nbins_f64() as usize
    }

    fn nbins_f64(&self) -> f64 {
        match self.rule {
            BinRule::Count(n) => n,
            BinRule::Width(w) => {
                if self.max > self.min {
                    ((self.max - self.min) / w).ceil()
                } else {
                    1.0
                }
            }
        }
    }

    pub fn bin_width(&self) -> f64 {
        match self.rule {
            BinRule::Count(n) => self.span() / n,
            BinRule::Width(w) => w,
        }
    }

    /// Bin index of `v`; the maximum folds into the last bin
    pub fn bin_index(&self, v: f64) -> i64 {
        let raw = match self.rule {
            BinRule::Count(n) => ((v - self.min) / self.span() * n).floor(),
            BinRule::Width(w) => ((v - self.min) / w).floor(),
        };
        let nbins = self.nbins_f64();
        let index = if raw >= nbins { nbins - 1.0 } else { raw };
        index as i64
    }

    pub fn left_edge(&self, index: i64) -> f64 {
        let index = index as f64;
        match self.rule {
            BinRule::Count(n) => index / n * self.span() + self.min,
            BinRule::Width(w) => index * w + self.min,
        }
    }

    pub fn bin(&self, v: f64) -> f64 {
        self.left_edge(self.bin_index(v))
    }

    /// Left edge of every bin, in order
    pub fn edges(&self) -> Vec<f64> {
        (0..self.nbins() as i64).map(|i| self.left_edge(i)).collect()
    }
}
