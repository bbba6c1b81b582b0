// src/heatmap.rs

use ahash::AHashMap;
use rayon::prelude::*;

/// Legend scale shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    Linear,
    Log10,
}

/// Legend scale bounds for one metric's heatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Map a value into [0, 1] along the legend. Log scales clamp at
    /// the bottom of the positive range instead of producing -inf.
    pub fn position(&self, value: f64, scale: ScaleKind) -> f64 {
        let (lo, hi, v) = match scale {
            ScaleKind::Linear => (self.min, self.max, value),
            ScaleKind::Log10 => (
                self.min.max(1.0).log10(),
                self.max.max(1.0).log10(),
                value.max(1.0).log10(),
            ),
        };
        if hi <= lo {
            return 0.0;
        }
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Compute legend bounds over a jagged value matrix (taxon rows x
/// sample columns).
///
/// `min` is floored at `lower_bound` so negative artifacts in the data
/// cannot push the color scale below it; `max` is the true maximum,
/// unclamped. A matrix with no values at all yields `None` so callers
/// render nothing instead of a NaN scale.
pub fn compute_legend_bounds(matrix: &[Vec<f64>], lower_bound: f64) -> Option<Bounds> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in matrix {
        for &v in row {
            if v.is_nan() {
                continue;
            }
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    Some(Bounds {
        min: min.max(lower_bound),
        max,
    })
}

/// Batch form: bounds for several metric matrices at once, computed in
/// parallel. Metrics whose matrix carries no data are absent from the
/// result.
pub fn legend_bounds_by_metric(
    matrices: &AHashMap<String, Vec<Vec<f64>>>,
    lower_bound: f64,
) -> AHashMap<String, Bounds> {
    let entries: Vec<(&String, &Vec<Vec<f64>>)> = matrices.iter().collect();
    entries
        .par_iter()
        .filter_map(|(metric, matrix)| {
            compute_legend_bounds(matrix, lower_bound).map(|b| ((*metric).clone(), b))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}
