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


//! # Table store
//!
//! The current conditional table of every variable, keyed by variable and kept
//! in index order. Tables are fit together from one discretized batch and then
//! only ever blended in place.

use crate::errors::{BayesError, BayesResult};
use core_bn::{Structure, VariableId};
use indexmap::IndexMap;
use ndarray::ArrayView2;
use stats_bn::{estimate, ConditionalTable, UnseenParents};

/// One table per variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStore {
    tables: IndexMap<VariableId, ConditionalTable>,
}

impl TableStore {
    /// Estimates every variable's table from a discretized batch. Roots get a
    /// marginal, everything else a conditional on its parents.
    pub fn fit(
        structure: &Structure,
        states: ArrayView2<usize>,
        n_states: usize,
        unseen: UnseenParents,
    ) -> BayesResult<TableStore> {
        let mut tables = IndexMap::with_capacity(structure.n_variables());
        for v in structure.variables() {
            let table = estimate(states, v, structure.parents(v), n_states, unseen)?;
            tables.insert(v, table);
        }
        Ok(TableStore { tables })
    }

    /// Blends `fresh` into this store one table at a time:
    /// `(1 - lr) * old + lr * fresh`.
    pub fn blend(&mut self, fresh: &TableStore, learning_rate: f64) -> BayesResult<()> {
        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(BayesError::InvalidLearningRate(learning_rate));
        }
        for (v, table) in self.tables.iter_mut() {
            let new_table = fresh.get(*v).ok_or(BayesError::MissingTable(*v))?;
            table.blend(new_table, learning_rate)?;
        }
        Ok(())
    }

    pub fn get(&self, v: VariableId) -> Option<&ConditionalTable> {
        self.tables.get(&v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariableId, &ConditionalTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
