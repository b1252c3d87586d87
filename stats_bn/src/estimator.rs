//! # Table estimation by counting
//!
//! Counts how often each state of a variable shows up under each joint state of
//! its parents, then normalizes every parent assignment by `count / (sum + EPSILON)`.
//! An assignment that never shows up has a sum of zero. What it turns into is up
//! to `UnseenParents`.
use core_bn::VariableId;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::errors::{StatsError, StatsResult};
use crate::table::ConditionalTable;

/// Added to every normalizing sum so empty parent assignments divide cleanly.
pub const EPSILON: f64 = 1e-10;

/// What an estimated column looks like when its parent assignment never occurs in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnseenParents {
    /// All zeros. The column carries no mass at all.
    Epsilon,
    /// Every state gets `1/n_states`.
    Uniform,
}

impl Default for UnseenParents {
    fn default() -> UnseenParents {
        UnseenParents::Epsilon
    }
}

fn check_column(data: &ArrayView2<usize>, variable: VariableId) -> StatsResult<()> {
    if variable.index() >= data.ncols() {
        return Err(StatsError::ColumnOutOfRange {
            column: variable.index(),
            n_columns: data.ncols(),
        });
    }
    Ok(())
}

fn check_state(state: usize, n_states: usize) -> StatsResult<usize> {
    if state >= n_states {
        Err(StatsError::StateOutOfRange { state, n_states })
    } else {
        Ok(state)
    }
}

/// Histogram of a root variable over the batch, as a `(n_states, 1)` table.
pub fn estimate_marginal(
    data: ArrayView2<usize>,
    variable: VariableId,
    n_states: usize,
) -> StatsResult<ConditionalTable> {
    check_column(&data, variable)?;
    if data.nrows() == 0 {
        return Err(StatsError::EmptyColumn);
    }
    let mut counts = Array2::<f64>::zeros((n_states, 1));
    for s in data.column(variable.index()) {
        counts[[check_state(*s, n_states)?, 0]] += 1.0;
    }
    counts /= data.nrows() as f64;
    ConditionalTable::new(variable, Vec::new(), n_states, counts)
}

/// P(variable | parents) by counting joint occurrences in the batch.
pub fn estimate_conditional(
    data: ArrayView2<usize>,
    variable: VariableId,
    parents: &[VariableId],
    n_states: usize,
    unseen: UnseenParents,
) -> StatsResult<ConditionalTable> {
    check_column(&data, variable)?;
    for p in parents {
        check_column(&data, *p)?;
    }
    if n_states == 0 {
        return Err(StatsError::NoBins);
    }
    let n_columns = n_states.pow(parents.len() as u32);
    // counts[[parent assignment, state]], flipped at the end
    let mut counts = Array2::<f64>::zeros((n_columns, n_states));
    for row in data.rows() {
        let mut column = 0;
        for p in parents {
            column = column * n_states + check_state(row[p.index()], n_states)?;
        }
        counts[[column, check_state(row[variable.index()], n_states)?]] += 1.0;
    }
    for mut assignment in counts.rows_mut() {
        let total: f64 = assignment.sum();
        if total == 0.0 && unseen == UnseenParents::Uniform {
            assignment.fill(1.0 / n_states as f64);
        } else {
            assignment.mapv_inplace(|c| c / (total + EPSILON));
        }
    }
    let values = counts.reversed_axes().as_standard_layout().into_owned();
    ConditionalTable::new(variable, parents.to_vec(), n_states, values)
}

/// Marginal for roots, conditional otherwise.
pub fn estimate(
    data: ArrayView2<usize>,
    variable: VariableId,
    parents: &[VariableId],
    n_states: usize,
    unseen: UnseenParents,
) -> StatsResult<ConditionalTable> {
    if parents.is_empty() {
        estimate_marginal(data, variable, n_states)
    } else {
        estimate_conditional(data, variable, parents, n_states, unseen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn v(i: usize) -> VariableId {
        VariableId::from(i)
    }

    #[test]
    fn marginal_is_a_histogram() {
        let data = arr2(&[[0], [1], [1], [2]]);
        let table = estimate_marginal(data.view(), v(0), 3).unwrap();
        assert_eq!(table.shape(), (3, 1));
        assert_approx_eq!(table.values()[[0, 0]], 0.25);
        assert_approx_eq!(table.values()[[1, 0]], 0.5);
        assert_approx_eq!(table.values()[[2, 0]], 0.25);
    }

    #[test]
    fn conditional_counts_per_parent_state() {
        // V1 copies V0 except one row
        let data = arr2(&[[0, 0], [0, 0], [0, 1], [1, 1], [2, 2], [2, 2]]);
        let table =
            estimate_conditional(data.view(), v(1), &[v(0)], 3, UnseenParents::Epsilon).unwrap();
        assert_eq!(table.shape(), (3, 3));
        assert_approx_eq!(table.prob(0, &[0]).unwrap(), 2.0 / 3.0);
        assert_approx_eq!(table.prob(1, &[0]).unwrap(), 1.0 / 3.0);
        assert_approx_eq!(table.prob(1, &[1]).unwrap(), 1.0);
        assert_approx_eq!(table.prob(2, &[2]).unwrap(), 1.0);
        for s in table.column_sums().iter() {
            assert_approx_eq!(*s, 1.0, 1e-6);
        }
    }

    #[test]
    fn shapes_grow_with_parents() {
        let data = arr2(&[[0, 1, 2, 0], [1, 2, 0, 1], [2, 0, 1, 2]]);
        for k in 0..3usize {
            let parents: Vec<VariableId> = (0..k).map(v).collect();
            let table = estimate(data.view(), v(3), &parents, 3, UnseenParents::Epsilon).unwrap();
            assert_eq!(table.shape(), (3, 3usize.pow(k as u32)));
        }
    }

    #[test]
    fn unseen_parent_states_give_zero_columns() {
        let data = arr2(&[[0, 0, 1], [0, 1, 2], [1, 1, 0]]);
        let table = estimate_conditional(
            data.view(),
            v(2),
            &[v(0), v(1)],
            3,
            UnseenParents::Epsilon,
        )
        .unwrap();
        assert!(table.values().iter().all(|p| p.is_finite()));
        // (V0 = 2, V1 = 2) never shows up
        let unseen = table.column(&[2, 2]).unwrap();
        assert!(unseen.iter().all(|p| *p == 0.0));
        let seen = table.column(&[0, 1]).unwrap();
        assert_approx_eq!(seen.sum(), 1.0, 1e-6);
        assert_approx_eq!(seen[2], 1.0, 1e-6);
    }

    #[test]
    fn unseen_parent_states_can_be_uniform() {
        let data = arr2(&[[0, 0, 1], [0, 1, 2], [1, 1, 0]]);
        let table = estimate_conditional(
            data.view(),
            v(2),
            &[v(0), v(1)],
            3,
            UnseenParents::Uniform,
        )
        .unwrap();
        for s in table.column_sums().iter() {
            assert_approx_eq!(*s, 1.0, 1e-6);
        }
        let unseen = table.column(&[2, 2]).unwrap();
        assert!(unseen.iter().all(|p| (*p - 1.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn bad_states_and_columns_are_errors() {
        let data = arr2(&[[0, 3]]);
        assert_eq!(
            estimate_marginal(data.view(), v(1), 3),
            Err(StatsError::StateOutOfRange {
                state: 3,
                n_states: 3
            })
        );
        assert_eq!(
            estimate_marginal(data.view(), v(2), 3),
            Err(StatsError::ColumnOutOfRange {
                column: 2,
                n_columns: 2
            })
        );
        let empty = Array2::<usize>::zeros((0, 2));
        assert_eq!(
            estimate_marginal(empty.view(), v(0), 3),
            Err(StatsError::EmptyColumn)
        );
    }
}
