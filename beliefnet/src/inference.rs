/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/


//! # Inference oracle
//!
//! The component never does inference itself. It hands its structure and tables
//! to an oracle, asks it for posteriors, and tells it when a table changes.
//! Anything that can do exact inference over discrete tables can sit behind
//! `InferenceOracle`; variable elimination from `infer_bn` is the default.

use crate::errors::{BayesError, BayesResult};
use crate::tables::TableStore;
use core_bn::{Evidence, Structure, VariableId};
use infer_bn::VariableElimination;
use ndarray::Array1;
use stats_bn::ConditionalTable;

/// Answers marginal and conditional queries over a fitted network.
pub trait InferenceOracle: Sized + Send {
    /// Builds the oracle over a structure with one table per variable.
    fn build(structure: &Structure, tables: &TableStore) -> BayesResult<Self>;
    /// The normalized distribution of `variable` given `evidence`.
    fn query(&self, variable: VariableId, evidence: &Evidence) -> BayesResult<Array1<f64>>;
    /// Swaps in a new table for the table's variable.
    fn replace_table(&mut self, table: &ConditionalTable) -> BayesResult<()>;
}

impl InferenceOracle for VariableElimination {
    fn build(structure: &Structure, tables: &TableStore) -> BayesResult<Self> {
        let cardinality = structure
            .variables()
            .map(|v| {
                tables
                    .get(v)
                    .map(|t| t.n_states())
                    .ok_or(BayesError::MissingTable(v))
            })
            .collect::<BayesResult<Vec<usize>>>()?;
        let mut engine = VariableElimination::new(cardinality);
        for (_, table) in tables.iter() {
            engine.add_table(table.variable(), table.parents(), table.values())?;
        }
        Ok(engine)
    }

    fn query(&self, variable: VariableId, evidence: &Evidence) -> BayesResult<Array1<f64>> {
        Ok(VariableElimination::query(self, variable, evidence)?)
    }

    fn replace_table(&mut self, table: &ConditionalTable) -> BayesResult<()> {
        self.add_table(table.variable(), table.parents(), table.values())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use stats_bn::UnseenParents;

    #[test]
    fn elimination_sees_the_stored_tables() {
        let structure = Structure::chain(2);
        let states = arr2(&[[0, 0], [0, 0], [1, 1], [2, 2], [2, 1]]);
        let tables = TableStore::fit(&structure, states.view(), 3, UnseenParents::Epsilon).unwrap();
        let oracle = <VariableElimination as InferenceOracle>::build(&structure, &tables).unwrap();

        let marginal = InferenceOracle::query(&oracle, VariableId::from(0), &Evidence::default())
            .unwrap();
        assert_approx_eq!(marginal[0], 0.4);
        assert_approx_eq!(marginal[2], 0.4);

        let mut evidence = Evidence::default();
        evidence.insert(VariableId::from(1), 1);
        // V1 = 1 comes from V0 = 1 once and V0 = 2 once
        let posterior = InferenceOracle::query(&oracle, VariableId::from(0), &evidence).unwrap();
        assert_approx_eq!(posterior[0], 0.0);
        assert_approx_eq!(posterior[1], 0.5, 1e-6);
        assert_approx_eq!(posterior[2], 0.5, 1e-6);
    }

    #[test]
    fn replacing_a_table_reaches_the_engine() {
        let structure = Structure::chain(1);
        let states = arr2(&[[0], [1], [2]]);
        let tables = TableStore::fit(&structure, states.view(), 3, UnseenParents::Epsilon).unwrap();
        let mut oracle = <VariableElimination as InferenceOracle>::build(&structure, &tables).unwrap();
        let skewed = ConditionalTable::new(
            VariableId::from(0),
            vec![],
            3,
            arr2(&[[0.7], [0.2], [0.1]]),
        )
        .unwrap();
        oracle.replace_table(&skewed).unwrap();
        let marginal = InferenceOracle::query(&oracle, VariableId::from(0), &Evidence::default())
            .unwrap();
        assert_approx_eq!(marginal[0], 0.7);
    }
}
