//! # Variable elimination
//!
//! Holds one factor per variable, made from that variable's conditional table.
//! A query conditions every factor on the evidence, then sums the remaining
//! variables out one at a time, always picking the variable whose combined
//! factor would be smallest. What is left is normalized into the posterior.
use core_bn::{Evidence, VariableId};
use log::trace;
use ndarray::{Array1, ArrayView2};

use crate::errors::{InferenceError, InferenceResult};
use crate::factor::DiscreteFactor;

/// Exact inference over a discrete Bayesian network.
#[derive(Debug, Clone)]
pub struct VariableElimination {
    cardinality: Vec<usize>,
    factors: Vec<Option<DiscreteFactor>>,
}

impl VariableElimination {
    /// An engine for variables `0..cardinality.len()` with no tables yet.
    pub fn new(cardinality: Vec<usize>) -> VariableElimination {
        let factors = vec![None; cardinality.len()];
        VariableElimination {
            cardinality,
            factors,
        }
    }

    pub fn n_variables(&self) -> usize {
        self.cardinality.len()
    }

    fn check(&self, v: VariableId) -> InferenceResult<()> {
        if v.index() < self.cardinality.len() {
            Ok(())
        } else {
            Err(InferenceError::UnknownVariable(v))
        }
    }

    /// Sets the table for `variable`, handing back the factor it replaces.
    pub fn add_table(
        &mut self,
        variable: VariableId,
        parents: &[VariableId],
        table: ArrayView2<f64>,
    ) -> InferenceResult<Option<DiscreteFactor>> {
        self.check(variable)?;
        for p in parents {
            self.check(*p)?;
        }
        let parent_cardinality: Vec<usize> =
            parents.iter().map(|p| self.cardinality[p.index()]).collect();
        let factor = DiscreteFactor::from_table(
            variable,
            self.cardinality[variable.index()],
            parents,
            &parent_cardinality,
            table,
        )?;
        Ok(self.factors[variable.index()].replace(factor))
    }

    /// Drops the table for `variable`.
    pub fn remove_table(&mut self, variable: VariableId) -> Option<DiscreteFactor> {
        self.factors.get_mut(variable.index()).and_then(|f| f.take())
    }

    /// Whether every variable has a table
    pub fn is_complete(&self) -> bool {
        self.factors.iter().all(|f| f.is_some())
    }

    /// Unconditional distribution of `variable`.
    pub fn marginal(&self, variable: VariableId) -> InferenceResult<Array1<f64>> {
        self.query(variable, &Evidence::default())
    }

    /// Posterior distribution of `variable` given `evidence`, summing to 1.
    pub fn query(&self, variable: VariableId, evidence: &Evidence) -> InferenceResult<Array1<f64>> {
        self.check(variable)?;
        if evidence.contains_key(&variable) {
            return Err(InferenceError::QueryInEvidence(variable));
        }
        let mut observed: Vec<(VariableId, usize)> =
            evidence.iter().map(|(v, s)| (*v, *s)).collect();
        observed.sort_unstable();
        for (v, s) in &observed {
            self.check(*v)?;
            if *s >= self.cardinality[v.index()] {
                return Err(InferenceError::EvidenceOutOfRange {
                    variable: *v,
                    state: *s,
                    cardinality: self.cardinality[v.index()],
                });
            }
        }

        let mut factors = Vec::with_capacity(self.factors.len());
        for (i, f) in self.factors.iter().enumerate() {
            let mut factor = f
                .clone()
                .ok_or_else(|| InferenceError::MissingFactor(VariableId::from(i)))?;
            for (v, s) in &observed {
                factor = factor.reduce(*v, *s)?;
            }
            factors.push(factor);
        }

        let mut hidden: Vec<VariableId> = (0..self.cardinality.len())
            .map(VariableId::from)
            .filter(|v| *v != variable && !evidence.contains_key(v))
            .collect();
        while !hidden.is_empty() {
            let (position, next) = self.cheapest(&hidden, &factors);
            hidden.swap_remove(position);
            let (touching, rest): (Vec<DiscreteFactor>, Vec<DiscreteFactor>) =
                factors.into_iter().partition(|f| f.contains(next));
            factors = rest;
            if let Some(combined) = touching.into_iter().reduce(|a, b| a.product(&b)) {
                factors.push(combined.sum_out(next));
            }
            trace!("eliminated {}, {} factors left", next, factors.len());
        }

        let joint = factors
            .iter()
            .fold(DiscreteFactor::unit(), |acc, f| acc.product(f));
        let total = joint.total();
        if !(total > 0.0) || !total.is_finite() {
            return Err(InferenceError::ZeroProbabilityEvidence(variable));
        }
        // Only the query variable is left in scope
        Ok(joint.values().iter().map(|p| p / total).collect())
    }

    // Size of the factor that eliminating each variable would create, smallest wins.
    fn cheapest(&self, hidden: &[VariableId], factors: &[DiscreteFactor]) -> (usize, VariableId) {
        let mut best = (0, hidden[0]);
        let mut best_cost = usize::MAX;
        for (i, v) in hidden.iter().enumerate() {
            let mut scope: Vec<VariableId> = Vec::new();
            for f in factors.iter().filter(|f| f.contains(*v)) {
                for s in f.scope() {
                    if !scope.contains(s) {
                        scope.push(*s);
                    }
                }
            }
            let cost = scope
                .iter()
                .map(|s| self.cardinality[s.index()])
                .product::<usize>();
            if cost < best_cost {
                best = (i, *v);
                best_cost = cost;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn v(i: usize) -> VariableId {
        VariableId::from(i)
    }

    // Cloudy -> Sprinkler, Cloudy -> Rain, (Sprinkler, Rain) -> WetGrass
    fn sprinkler() -> VariableElimination {
        let mut ve = VariableElimination::new(vec![2, 2, 2, 2]);
        ve.add_table(v(0), &[], arr2(&[[0.5], [0.5]]).view()).unwrap();
        ve.add_table(v(1), &[v(0)], arr2(&[[0.5, 0.9], [0.5, 0.1]]).view())
            .unwrap();
        ve.add_table(v(2), &[v(0)], arr2(&[[0.8, 0.2], [0.2, 0.8]]).view())
            .unwrap();
        ve.add_table(
            v(3),
            &[v(1), v(2)],
            arr2(&[[1.0, 0.2, 0.1, 0.01], [0.0, 0.8, 0.9, 0.99]]).view(),
        )
        .unwrap();
        ve
    }

    #[test]
    fn marginal_of_a_root_is_its_table() {
        let ve = sprinkler();
        let p = ve.marginal(v(0)).unwrap();
        assert_approx_eq!(p[0], 0.5);
        assert_approx_eq!(p[1], 0.5);
    }

    #[test]
    fn conditioning_on_a_parent_reads_the_table() {
        let ve = sprinkler();
        let mut evidence = Evidence::default();
        evidence.insert(v(0), 1);
        let p = ve.query(v(2), &evidence).unwrap();
        assert_approx_eq!(p[0], 0.2);
        assert_approx_eq!(p[1], 0.8);
    }

    #[test]
    fn explaining_away() {
        let ve = sprinkler();
        let mut wet = Evidence::default();
        wet.insert(v(3), 1);
        let rain_given_wet = ve.query(v(2), &wet).unwrap()[1];
        wet.insert(v(1), 1);
        let rain_given_wet_and_sprinkler = ve.query(v(2), &wet).unwrap()[1];
        assert!(rain_given_wet_and_sprinkler < rain_given_wet);
        assert_approx_eq!(rain_given_wet, 0.6882, 1e-3);
    }

    // Sum the full joint by brute force and compare.
    fn enumerate(ve: &VariableElimination, query: VariableId, evidence: &Evidence) -> Vec<f64> {
        let n = ve.n_variables();
        let card = ve.cardinality[query.index()];
        let mut out = vec![0.0; card];
        let total: usize = ve.cardinality.iter().product();
        for mut flat in 0..total {
            let mut assignment = vec![0; n];
            for i in (0..n).rev() {
                assignment[i] = flat % ve.cardinality[i];
                flat /= ve.cardinality[i];
            }
            if evidence.iter().any(|(k, s)| assignment[k.index()] != *s) {
                continue;
            }
            let mut p = 1.0;
            for f in ve.factors.iter().flatten() {
                let mut index = 0;
                for (s, c) in f.scope().iter().zip(f.cardinality()) {
                    index = index * c + assignment[s.index()];
                }
                p *= f.values()[index];
            }
            out[assignment[query.index()]] += p;
        }
        let z: f64 = out.iter().sum();
        out.iter().map(|p| p / z).collect()
    }

    fn random_table(rng: &mut SmallRng, rows: usize, columns: usize) -> Array2<f64> {
        let mut t = Array2::from_shape_fn((rows, columns), |_| rng.gen_range(0.05..1.0));
        for mut column in t.columns_mut() {
            let z = column.sum();
            column.mapv_inplace(|x| x / z);
        }
        t
    }

    #[test]
    fn agrees_with_enumeration() {
        let mut rng = SmallRng::seed_from_u64(3);
        // V0 -> V2 <- V1, V2 -> V3, V1 -> V4, three states each
        let parents: Vec<Vec<VariableId>> =
            vec![vec![], vec![], vec![v(0), v(1)], vec![v(2)], vec![v(1)]];
        let mut ve = VariableElimination::new(vec![3; 5]);
        for (i, p) in parents.iter().enumerate() {
            let table = random_table(&mut rng, 3, 3usize.pow(p.len() as u32));
            ve.add_table(v(i), p, table.view()).unwrap();
        }
        let mut evidence = Evidence::default();
        evidence.insert(v(3), 2);
        evidence.insert(v(4), 0);
        for q in 0..3 {
            let fast = ve.query(v(q), &evidence).unwrap();
            let slow = enumerate(&ve, v(q), &evidence);
            assert_approx_eq!(fast.sum(), 1.0);
            for (a, b) in fast.iter().zip(slow.iter()) {
                assert_approx_eq!(*a, *b, 1e-9);
            }
        }
    }

    #[test]
    fn bad_queries_are_errors() {
        let ve = sprinkler();
        let mut evidence = Evidence::default();
        evidence.insert(v(1), 0);
        assert_eq!(ve.query(v(1), &evidence), Err(InferenceError::QueryInEvidence(v(1))));
        assert_eq!(ve.query(v(9), &evidence), Err(InferenceError::UnknownVariable(v(9))));
        evidence.insert(v(2), 4);
        assert!(matches!(
            ve.query(v(0), &evidence),
            Err(InferenceError::EvidenceOutOfRange { .. })
        ));
    }

    #[test]
    fn missing_tables_are_reported() {
        let mut ve = sprinkler();
        assert!(ve.is_complete());
        assert!(ve.remove_table(v(2)).is_some());
        assert!(!ve.is_complete());
        assert_eq!(ve.marginal(v(0)), Err(InferenceError::MissingFactor(v(2))));
    }

    #[test]
    fn impossible_evidence_is_an_error() {
        let ve = sprinkler();
        // WetGrass is never wet when neither the sprinkler nor the rain are on
        let mut evidence = Evidence::default();
        evidence.insert(v(1), 0);
        evidence.insert(v(2), 0);
        evidence.insert(v(3), 1);
        assert_eq!(
            ve.query(v(0), &evidence),
            Err(InferenceError::ZeroProbabilityEvidence(v(0)))
        );
    }

    #[test]
    fn replacing_a_table_changes_the_answer() {
        let mut ve = sprinkler();
        let old = ve
            .add_table(v(0), &[], arr2(&[[0.1], [0.9]]).view())
            .unwrap();
        assert!(old.is_some());
        assert_approx_eq!(ve.marginal(v(0)).unwrap()[1], 0.9);
    }
}
