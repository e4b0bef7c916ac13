//! Bar heights from frequencies

use dbplot_scenegraph::axis::SceneTick;

/// Frequencies as weights, optionally divided by their sum. The sum includes
/// every entry, the null bucket too.
pub fn weights(freqs: &[u64], normed: bool) -> Vec<f64> {
    let total: u64 = freqs.iter().sum();
    if normed && total > 0 {
        freqs.iter().map(|f| *f as f64 / total as f64).collect()
    } else {
        freqs.iter().map(|f| *f as f64).collect()
    }
}

/// Bar height for a weight; on a log axis zero weights get no bar
pub fn bar_height(weight: f64, log: bool) -> f64 {
    if !log {
        weight
    } else if weight > 0.0 {
        weight.log10()
    } else {
        0.0
    }
}

/// Ticks at every power of ten spanned by `heights` (already in log10 units)
pub fn log_ticks(heights: impl IntoIterator<Item = f64>) -> Vec<SceneTick> {
    let (lo, hi) = heights
        .into_iter()
        .fold((0.0f64, 0.0f64), |(lo, hi), h| (lo.min(h), hi.max(h)));
    let (lo, hi) = (lo.floor() as i32, hi.ceil() as i32);
    (lo..=hi)
        .map(|k| SceneTick::new(k as f64, format!("1e{k}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_normed_weights_sum_to_one() {
        let w = weights(&[3, 1, 0, 6], true);
        assert_approx_eq!(f64, w.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert_eq!(w[2], 0.0);
        assert_eq!(weights(&[3, 1], false), vec![3.0, 1.0]);
        assert_eq!(weights(&[0, 0], true), vec![0.0, 0.0]);
    }

    #[test]
    fn test_log_heights_and_ticks() {
        assert_eq!(bar_height(100.0, true), 2.0);
        assert_eq!(bar_height(0.0, true), 0.0);
        assert_eq!(bar_height(0.0, false), 0.0);
        let labels: Vec<_> = log_ticks([2.0, 0.5]).into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["1e0", "1e1", "1e2"]);
        let labels: Vec<_> = log_ticks([-1.2]).into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["1e-2", "1e-1", "1e0"]);
    }
}
