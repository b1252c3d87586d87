//! # Quantile binning
//!
//! A column is cut at its empirical quantiles `1/n, 2/n, ... (n-1)/n`. A value's
//! state is the number of cut points at or below it, so the bins are closed on
//! the left. Going back, a state decodes to the middle of its quantile interval,
//! where the outer intervals run out to the column's min and max.
//!
//! The free functions fit fresh edges on every call. Keep a `BinEdges` around if
//! the boundaries should stay put between batches.
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::errors::{StatsError, StatsResult};

/// Quantile of sorted data, interpolating linearly between order statistics.
/// This is numpy's default method.
pub fn quantile(sorted: &[f64], q: f64) -> StatsResult<f64> {
    if sorted.is_empty() {
        return Err(StatsError::EmptyColumn);
    }
    let q = q.clamp(0.0, 1.0);
    Ok(interpolate(sorted, q * (sorted.len() - 1) as f64))
}

// `position` is a fractional index into non-empty sorted data.
fn interpolate(sorted: &[f64], position: f64) -> f64 {
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let t = position - lower as f64;
    sorted[lower] + t * (sorted[upper] - sorted[lower])
}

/// The quantile edges of one column: `n_bins + 1` values from the min to the max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Fits edges to a column of finite values.
    pub fn fit(values: ArrayView1<f64>, n_bins: usize) -> StatsResult<BinEdges> {
        BinEdges::fit_column(values, n_bins, 0)
    }

    fn fit_column(values: ArrayView1<f64>, n_bins: usize, column: usize) -> StatsResult<BinEdges> {
        if n_bins == 0 {
            return Err(StatsError::NoBins);
        }
        let mut sorted = Vec::with_capacity(values.len());
        for (row, x) in values.iter().enumerate() {
            if !x.is_finite() {
                return Err(StatsError::NonFinite { row, column });
            }
            sorted.push(*x);
        }
        if sorted.is_empty() {
            return Err(StatsError::EmptyColumn);
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        // k * (len - 1) / n_bins keeps the positions exact when they are whole numbers
        let last = sorted.len() - 1;
        let edges = (0..=n_bins)
            .map(|k| interpolate(&sorted, (k * last) as f64 / n_bins as f64))
            .collect();
        Ok(BinEdges { edges })
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// All edges, min and max included
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// The interior cut points, `n_bins - 1` of them
    pub fn cut_points(&self) -> &[f64] {
        &self.edges[1..self.edges.len() - 1]
    }

    /// The state of a single value. Anything below the first cut is 0, anything at
    /// or above the last is `n_bins - 1`.
    pub fn digitize(&self, x: f64) -> usize {
        self.cut_points().partition_point(|c| *c <= x)
    }

    /// The representative value of a state, the midpoint of its interval.
    pub fn decode(&self, state: usize) -> StatsResult<f64> {
        let n_bins = self.n_bins();
        if state >= n_bins {
            return Err(StatsError::StateOutOfRange {
                state,
                n_states: n_bins,
            });
        }
        Ok(0.5 * (self.edges[state] + self.edges[state + 1]))
    }
}

/// Fits one set of edges per column.
pub fn fit_columns(batch: ArrayView2<f64>, n_bins: usize) -> StatsResult<Vec<BinEdges>> {
    batch
        .axis_iter(Axis(1))
        .enumerate()
        .map(|(column, values)| BinEdges::fit_column(values, n_bins, column))
        .collect()
}

impl BinEdges {
    /// Digitizes a whole batch against one codebook entry per column.
    pub fn digitize_batch(codebook: &[BinEdges], batch: ArrayView2<f64>) -> StatsResult<Array2<usize>> {
        if codebook.len() != batch.ncols() {
            return Err(StatsError::ShapeMismatch {
                expected: (batch.nrows(), codebook.len()),
                got: batch.dim(),
            });
        }
        let mut states = Array2::zeros(batch.raw_dim());
        for ((row, column), x) in batch.indexed_iter() {
            if !x.is_finite() {
                return Err(StatsError::NonFinite { row, column });
            }
            states[[row, column]] = codebook[column].digitize(*x);
        }
        Ok(states)
    }
}

/// Bins every column of `batch` by its own quantiles.
pub fn discretize(batch: ArrayView2<f64>, n_bins: usize) -> StatsResult<Array2<usize>> {
    let codebook = fit_columns(batch, n_bins)?;
    BinEdges::digitize_batch(&codebook, batch)
}

/// Turns a state back into a value, using the quantiles of `reference_values`.
pub fn decode(state: usize, reference_values: ArrayView1<f64>, n_bins: usize) -> StatsResult<f64> {
    BinEdges::fit(reference_values, n_bins)?.decode(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array1};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_approx_eq!(quantile(&sorted, 0.0).unwrap(), 1.0);
        assert_approx_eq!(quantile(&sorted, 1.0).unwrap(), 4.0);
        assert_approx_eq!(quantile(&sorted, 0.5).unwrap(), 2.5);
        assert_approx_eq!(quantile(&sorted, 1.0 / 3.0).unwrap(), 2.0);
        assert_eq!(quantile(&[], 0.5), Err(StatsError::EmptyColumn));
    }

    #[test]
    fn digitize_closes_bins_on_the_left() {
        let values: Array1<f64> = (0..7).map(|i| i as f64).collect();
        let edges = BinEdges::fit(values.view(), 3).unwrap();
        assert_eq!(edges.cut_points(), &[2.0, 4.0]);
        assert_eq!(edges.digitize(-10.0), 0);
        assert_eq!(edges.digitize(1.99), 0);
        assert_eq!(edges.digitize(2.0), 1);
        assert_eq!(edges.digitize(4.0), 2);
        assert_eq!(edges.digitize(100.0), 2);
    }

    #[test]
    fn discretize_keeps_shape_and_range() {
        let mut rng = SmallRng::seed_from_u64(0);
        let normal = Normal::new(0.0, 3.0).unwrap();
        let batch = Array2::from_shape_fn((50, 4), |_| normal.sample(&mut rng));
        for n_bins in 1..6 {
            let states = discretize(batch.view(), n_bins).unwrap();
            assert_eq!(states.dim(), batch.dim());
            assert!(states.iter().all(|s| *s < n_bins));
        }
    }

    #[test]
    fn discretize_splits_into_thirds() {
        let batch = arr2(&[[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]]);
        let states = discretize(batch.view(), 3).unwrap();
        assert_eq!(
            states.column(0).to_vec(),
            vec![0, 0, 0, 1, 1, 1, 2, 2, 2]
        );
    }

    #[test]
    fn constant_columns_collapse_without_failing() {
        let batch = arr2(&[[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]]);
        let states = discretize(batch.view(), 3).unwrap();
        assert!(states.column(0).iter().all(|s| *s == 2));
        assert_approx_eq!(decode(0, batch.column(0), 3).unwrap(), 5.0);
    }

    #[test]
    fn decode_uses_interval_midpoints() {
        let values = arr1(&[0.0, 3.0, 6.0, 9.0]);
        assert_approx_eq!(decode(0, values.view(), 3).unwrap(), 1.5);
        assert_approx_eq!(decode(1, values.view(), 3).unwrap(), 4.5);
        assert_approx_eq!(decode(2, values.view(), 3).unwrap(), 7.5);
        assert!(decode(3, values.view(), 3).is_err());
    }

    #[test]
    fn decoded_representatives_land_back_in_their_bin() {
        let mut rng = SmallRng::seed_from_u64(7);
        let normal = Normal::new(1.0, 2.0).unwrap();
        let values: Array1<f64> = (0..200).map(|_| normal.sample(&mut rng)).collect();
        for n_bins in [2, 3, 5] {
            let edges = BinEdges::fit(values.view(), n_bins).unwrap();
            for state in 0..n_bins {
                let representative = decode(state, values.view(), n_bins).unwrap();
                assert_eq!(edges.digitize(representative), state);
            }
        }
    }

    #[test]
    fn non_finite_values_are_reported() {
        let batch = arr2(&[[0.0, 1.0], [f64::NAN, 2.0]]);
        assert_eq!(
            discretize(batch.view(), 3),
            Err(StatsError::NonFinite { row: 1, column: 0 })
        );
        let batch = arr2(&[[0.0, f64::INFINITY]]);
        assert_eq!(
            discretize(batch.view(), 3),
            Err(StatsError::NonFinite { row: 0, column: 1 })
        );
    }

    #[test]
    fn codebook_must_cover_every_column() {
        let batch = arr2(&[[0.0, 1.0], [2.0, 3.0]]);
        let codebook = fit_columns(batch.view(), 3).unwrap();
        let wider = arr2(&[[0.0, 1.0, 2.0]]);
        assert!(BinEdges::digitize_batch(&codebook, wider.view()).is_err());
    }
}
