//! # Conditional probability tables
//!
//! Rows are the variable's own states, columns are joint parent assignments.
//! The first parent is the most significant digit of the column index, the last
//! parent varies fastest. Roots have a single column.
use core_bn::VariableId;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::errors::{StatsError, StatsResult};

/// Index of the first largest value. NaNs never win.
pub fn argmax<I: IntoIterator<Item = f64>>(values: I) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// P(variable | parents) as a `(n_states, n_states^#parents)` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalTable {
    variable: VariableId,
    parents: Vec<VariableId>,
    n_states: usize,
    values: Array2<f64>,
}

impl ConditionalTable {
    /// Wraps a table after checking it has the shape its parents call for.
    pub fn new(
        variable: VariableId,
        parents: Vec<VariableId>,
        n_states: usize,
        values: Array2<f64>,
    ) -> StatsResult<ConditionalTable> {
        if n_states == 0 {
            return Err(StatsError::NoBins);
        }
        let expected = (n_states, n_states.pow(parents.len() as u32));
        if values.dim() != expected {
            return Err(StatsError::ShapeMismatch {
                expected,
                got: values.dim(),
            });
        }
        Ok(ConditionalTable {
            variable,
            parents,
            n_states,
            values,
        })
    }

    /// Every column `1/n_states`
    pub fn uniform(
        variable: VariableId,
        parents: Vec<VariableId>,
        n_states: usize,
    ) -> StatsResult<ConditionalTable> {
        if n_states == 0 {
            return Err(StatsError::NoBins);
        }
        let n_columns = n_states.pow(parents.len() as u32);
        let values = Array2::from_elem((n_states, n_columns), 1.0 / n_states as f64);
        ConditionalTable::new(variable, parents, n_states, values)
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }

    pub fn parents(&self) -> &[VariableId] {
        &self.parents
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> ArrayView2<f64> {
        self.values.view()
    }

    /// Column index of a joint parent assignment.
    pub fn column_index(&self, parent_states: &[usize]) -> StatsResult<usize> {
        if parent_states.len() != self.parents.len() {
            return Err(StatsError::ShapeMismatch {
                expected: (self.parents.len(), 1),
                got: (parent_states.len(), 1),
            });
        }
        let mut index = 0;
        for s in parent_states {
            if *s >= self.n_states {
                return Err(StatsError::StateOutOfRange {
                    state: *s,
                    n_states: self.n_states,
                });
            }
            index = index * self.n_states + s;
        }
        Ok(index)
    }

    /// The distribution of the variable under one parent assignment.
    pub fn column(&self, parent_states: &[usize]) -> StatsResult<ArrayView1<f64>> {
        let index = self.column_index(parent_states)?;
        Ok(self.values.column(index))
    }

    pub fn prob(&self, state: usize, parent_states: &[usize]) -> StatsResult<f64> {
        if state >= self.n_states {
            return Err(StatsError::StateOutOfRange {
                state,
                n_states: self.n_states,
            });
        }
        Ok(self.column(parent_states)?[state])
    }

    /// One sum per parent assignment
    pub fn column_sums(&self) -> Array1<f64> {
        self.values.sum_axis(Axis(0))
    }

    /// The state holding the single largest entry of the table. For a root this
    /// is the arg-max of its marginal.
    pub fn mode(&self) -> usize {
        let n_columns = self.n_columns();
        argmax(self.values.iter().copied()) / n_columns
    }

    /// Exponential moving average step: `(1 - lr) * self + lr * fresh`.
    pub fn blend(&mut self, fresh: &ConditionalTable, learning_rate: f64) -> StatsResult<()> {
        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(StatsError::LearningRate(learning_rate));
        }
        if fresh.variable != self.variable
            || fresh.parents != self.parents
            || fresh.n_states != self.n_states
        {
            return Err(StatsError::TableMismatch);
        }
        self.values *= 1.0 - learning_rate;
        self.values.scaled_add(learning_rate, &fresh.values);
        Ok(())
    }
}
