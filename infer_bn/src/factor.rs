//! # Discrete factors
//!
//! A factor is a non-negative function over the joint states of its scope,
//! stored flat in row-major order (the last variable of the scope varies
//! fastest). Multiplication, summing out and conditioning are all that
//! variable elimination needs.
use core_bn::VariableId;
use ndarray::ArrayView2;
use smallvec::SmallVec;

use crate::errors::{InferenceError, InferenceResult};

type Scope = SmallVec<[VariableId; 8]>;
type Cards = SmallVec<[usize; 8]>;

fn strides(cardinality: &[usize]) -> Cards {
    let mut strides: Cards = SmallVec::from_elem(1, cardinality.len());
    for i in (0..cardinality.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * cardinality[i + 1];
    }
    strides
}

/// Calls `f` on every joint assignment, in row-major order.
fn for_each_assignment<F: FnMut(&[usize])>(cardinality: &[usize], mut f: F) {
    let total: usize = cardinality.iter().product();
    let mut assignment: Cards = SmallVec::from_elem(0, cardinality.len());
    for _ in 0..total {
        f(&assignment);
        for i in (0..assignment.len()).rev() {
            assignment[i] += 1;
            if assignment[i] < cardinality[i] {
                break;
            }
            assignment[i] = 0;
        }
    }
}

/// A table of non-negative values over the joint states of some variables.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteFactor {
    scope: Scope,
    cardinality: Cards,
    values: Vec<f64>,
}

impl DiscreteFactor {
    /// The factor that is 1 everywhere on an empty scope.
    pub fn unit() -> DiscreteFactor {
        DiscreteFactor {
            scope: SmallVec::new(),
            cardinality: SmallVec::new(),
            values: vec![1.0],
        }
    }

    /// Turns a `(card(variable), prod card(parents))` conditional table into a
    /// factor over `[parents..., variable]`. Table columns use the first parent
    /// as the most significant digit.
    pub fn from_table(
        variable: VariableId,
        variable_cardinality: usize,
        parents: &[VariableId],
        parent_cardinality: &[usize],
        table: ArrayView2<f64>,
    ) -> InferenceResult<DiscreteFactor> {
        let n_columns: usize = parent_cardinality.iter().product();
        let expected = (variable_cardinality, n_columns);
        if table.dim() != expected || parents.len() != parent_cardinality.len() {
            return Err(InferenceError::ShapeMismatch {
                variable,
                expected,
                got: table.dim(),
            });
        }
        let mut scope: Scope = parents.iter().copied().collect();
        scope.push(variable);
        let mut cardinality: Cards = parent_cardinality.iter().copied().collect();
        cardinality.push(variable_cardinality);

        let parent_strides = strides(parent_cardinality);
        let mut values = Vec::with_capacity(n_columns * variable_cardinality);
        for_each_assignment(&cardinality, |assignment| {
            let (parent_states, state) = assignment.split_at(parents.len());
            let column: usize = parent_states
                .iter()
                .zip(parent_strides.iter())
                .map(|(s, stride)| s * stride)
                .sum();
            values.push(table[[state[0], column]]);
        });
        Ok(DiscreteFactor {
            scope,
            cardinality,
            values,
        })
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    pub fn cardinality(&self) -> &[usize] {
        &self.cardinality
    }

    /// Flat values, row-major over the scope
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn contains(&self, v: VariableId) -> bool {
        self.scope.contains(&v)
    }

    fn position(&self, v: VariableId) -> Option<usize> {
        self.scope.iter().position(|s| *s == v)
    }

    /// Pointwise product over the union of the two scopes.
    pub fn product(&self, other: &DiscreteFactor) -> DiscreteFactor {
        let mut scope = self.scope.clone();
        let mut cardinality = self.cardinality.clone();
        for (v, c) in other.scope.iter().zip(other.cardinality.iter()) {
            if !scope.contains(v) {
                scope.push(*v);
                cardinality.push(*c);
            }
        }
        let locate = |factor: &DiscreteFactor| -> Cards {
            factor
                .scope
                .iter()
                .map(|v| scope.iter().position(|s| s == v).unwrap_or_default())
                .collect()
        };
        let self_positions = locate(self);
        let other_positions = locate(other);
        let self_strides = strides(&self.cardinality);
        let other_strides = strides(&other.cardinality);

        let mut values = Vec::with_capacity(cardinality.iter().product());
        for_each_assignment(&cardinality, |assignment| {
            let i: usize = self_positions
                .iter()
                .zip(self_strides.iter())
                .map(|(p, stride)| assignment[*p] * stride)
                .sum();
            let j: usize = other_positions
                .iter()
                .zip(other_strides.iter())
                .map(|(p, stride)| assignment[*p] * stride)
                .sum();
            values.push(self.values[i] * other.values[j]);
        });
        DiscreteFactor {
            scope,
            cardinality,
            values,
        }
    }

    // Keeps the assignments `keep` accepts and drops `position` from the scope,
    // combining entries that collapse together with `+`.
    fn collapse<F: Fn(&[usize]) -> bool>(&self, position: usize, keep: F) -> DiscreteFactor {
        let mut scope = self.scope.clone();
        let mut cardinality = self.cardinality.clone();
        scope.remove(position);
        cardinality.remove(position);
        let new_strides = strides(&cardinality);
        let mut values = vec![0.0; cardinality.iter().product()];
        let mut flat = 0;
        for_each_assignment(&self.cardinality, |assignment| {
            if keep(assignment) {
                let index: usize = assignment
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != position)
                    .zip(new_strides.iter())
                    .map(|((_, s), stride)| s * stride)
                    .sum();
                values[index] += self.values[flat];
            }
            flat += 1;
        });
        DiscreteFactor {
            scope,
            cardinality,
            values,
        }
    }

    /// Sums `v` out of the factor. A factor without `v` comes back unchanged.
    pub fn sum_out(&self, v: VariableId) -> DiscreteFactor {
        match self.position(v) {
            Some(position) => self.collapse(position, |_| true),
            None => self.clone(),
        }
    }

    /// Conditions on `v = state`, removing `v` from the scope.
    pub fn reduce(&self, v: VariableId, state: usize) -> InferenceResult<DiscreteFactor> {
        match self.position(v) {
            Some(position) => {
                if state >= self.cardinality[position] {
                    return Err(InferenceError::EvidenceOutOfRange {
                        variable: v,
                        state,
                        cardinality: self.cardinality[position],
                    });
                }
                Ok(self.collapse(position, |assignment| assignment[position] == state))
            }
            None => Ok(self.clone()),
        }
    }

    /// Sum of every entry
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
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
    fn strides_are_row_major() {
        assert_eq!(&strides(&[2, 3, 4])[..], &[12, 4, 1]);
        assert_eq!(&strides(&[5])[..], &[1]);
        assert!(strides(&[]).is_empty());
    }

    #[test]
    fn table_columns_follow_parent_order() {
        // P(V2 | V0, V1), binary; column index is 2 * V0 + V1
        let table = arr2(&[[0.9, 0.8, 0.3, 0.1], [0.1, 0.2, 0.7, 0.9]]);
        let factor = DiscreteFactor::from_table(v(2), 2, &[v(0), v(1)], &[2, 2], table.view())
            .unwrap();
        assert_eq!(factor.scope(), &[v(0), v(1), v(2)]);
        // flat index is 4 * V0 + 2 * V1 + V2
        assert_approx_eq!(factor.values()[0b010], 0.8);
        assert_approx_eq!(factor.values()[0b101], 0.7);
        assert_approx_eq!(factor.values()[0b111], 0.9);
    }

    #[test]
    fn bad_tables_are_refused() {
        let table = arr2(&[[0.5, 0.5], [0.5, 0.5]]);
        let err = DiscreteFactor::from_table(v(1), 2, &[v(0)], &[3], table.view());
        assert!(matches!(err, Err(InferenceError::ShapeMismatch { .. })));
    }

    #[test]
    fn product_then_sum_out() {
        let prior = DiscreteFactor::from_table(v(0), 2, &[], &[], arr2(&[[0.4], [0.6]]).view())
            .unwrap();
        let conditional = DiscreteFactor::from_table(
            v(1),
            2,
            &[v(0)],
            &[2],
            arr2(&[[0.9, 0.2], [0.1, 0.8]]).view(),
        )
        .unwrap();
        let joint = prior.product(&conditional);
        assert_eq!(joint.scope(), &[v(0), v(1)]);
        assert_approx_eq!(joint.total(), 1.0);
        let marginal = joint.sum_out(v(0));
        assert_eq!(marginal.scope(), &[v(1)]);
        assert_approx_eq!(marginal.values()[0], 0.4 * 0.9 + 0.6 * 0.2);
        assert_approx_eq!(marginal.values()[1], 0.4 * 0.1 + 0.6 * 0.8);
    }

    #[test]
    fn reduce_keeps_the_observed_slice() {
        let conditional = DiscreteFactor::from_table(
            v(1),
            2,
            &[v(0)],
            &[2],
            arr2(&[[0.9, 0.2], [0.1, 0.8]]).view(),
        )
        .unwrap();
        let reduced = conditional.reduce(v(1), 1).unwrap();
        assert_eq!(reduced.scope(), &[v(0)]);
        assert_approx_eq!(reduced.values()[0], 0.1);
        assert_approx_eq!(reduced.values()[1], 0.8);
        assert!(conditional.reduce(v(1), 2).is_err());
        assert_eq!(conditional.reduce(v(5), 0).unwrap(), conditional);
    }

    #[test]
    fn unit_is_neutral() {
        let prior = DiscreteFactor::from_table(v(0), 2, &[], &[], arr2(&[[0.4], [0.6]]).view())
            .unwrap();
        assert_eq!(DiscreteFactor::unit().product(&prior), prior);
    }
}
