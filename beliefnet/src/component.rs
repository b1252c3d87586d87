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


//! # The belief network component
//!
//! Holds a fixed structure and, once it has seen data, one table per variable
//! plus an inference oracle built over them. The first batch handed to
//! `initialize`, `update`, `update_beliefs` or `predict` fits the tables. Every
//! batch after that is only blended in.

use crate::builders::{BinningMode, ComponentBuilder, ComponentConfig};
use crate::errors::{BayesError, BayesResult};
use crate::inference::InferenceOracle;
use crate::tables::TableStore;
use core_bn::{Evidence, Structure, VariableId};
use indexmap::IndexMap;
use infer_bn::{InferenceError, VariableElimination};
use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayView2};
use stats_bn::{argmax, fit_columns, BinEdges, ConditionalTable};
use std::borrow::Cow;

struct Fitted<O> {
    tables: TableStore,
    oracle: O,
}

/// A discrete Bayesian network that learns its tables from continuous batches.
///
/// Every column of a batch is one variable, `V0` first. Values are binned into
/// `n_states` states by quantile, counted into conditional tables, and
/// predictions are decoded back from states to values.
pub struct BayesianNetworkComponent<O: InferenceOracle = VariableElimination> {
    structure: Structure,
    config: ComponentConfig,
    codebook: Option<Vec<BinEdges>>,
    fitted: Option<Fitted<O>>,
}

impl<O: InferenceOracle> BayesianNetworkComponent<O> {
    /// A chain over `n_variables` variables with the default settings.
    pub fn new(n_variables: usize) -> BayesResult<Self> {
        ComponentBuilder::new(n_variables).build_with_oracle()
    }

    /// A network over `n_variables` variables with `(parent, child)` edges such as `("V0", "V2")`.
    pub fn with_structure<S: AsRef<str>>(n_variables: usize, edges: &[(S, S)]) -> BayesResult<Self> {
        ComponentBuilder::new(n_variables)
            .set_structure(edges)
            .build_with_oracle()
    }

    pub(crate) fn from_parts(structure: Structure, config: ComponentConfig) -> Self {
        BayesianNetworkComponent {
            structure,
            config,
            codebook: None,
            fitted: None,
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    pub fn n_variables(&self) -> usize {
        self.structure.n_variables()
    }

    /// Whether the tables and the oracle exist yet
    pub fn is_initialized(&self) -> bool {
        self.fitted.is_some()
    }

    /// The current tables, once fitted
    pub fn tables(&self) -> Option<&TableStore> {
        self.fitted.as_ref().map(|f| &f.tables)
    }

    /// The current table of one variable, once fitted
    pub fn table(&self, variable: VariableId) -> Option<&ConditionalTable> {
        self.tables().and_then(|t| t.get(variable))
    }

    /// The oracle answering queries, once fitted
    pub fn oracle(&self) -> Option<&O> {
        self.fitted.as_ref().map(|f| &f.oracle)
    }

    /// The bin edges kept from initialization. Only present with [`BinningMode::Persisted`].
    pub fn codebook(&self) -> Option<&[BinEdges]> {
        self.codebook.as_deref()
    }

    fn validate_batch(&self, batch: ArrayView2<f64>) -> BayesResult<()> {
        if batch.ncols() != self.n_variables() {
            return Err(BayesError::DimensionMismatch {
                expected: self.n_variables(),
                got: batch.ncols(),
            });
        }
        if batch.nrows() == 0 {
            return Err(BayesError::EmptyBatch);
        }
        if let Some(((row, column), _)) = batch.indexed_iter().find(|(_, x)| !x.is_finite()) {
            return Err(BayesError::NonFiniteValue { row, column });
        }
        Ok(())
    }

    // The edges a batch is binned and decoded with.
    fn edges_for(&self, batch: ArrayView2<f64>) -> BayesResult<Cow<'_, [BinEdges]>> {
        match (&self.codebook, self.config.binning) {
            (Some(codebook), BinningMode::Persisted) => Ok(Cow::Borrowed(&codebook[..])),
            _ => Ok(Cow::Owned(fit_columns(batch, self.config.n_states)?)),
        }
    }

    fn fit_tables(&self, edges: &[BinEdges], batch: ArrayView2<f64>) -> BayesResult<TableStore> {
        let states = BinEdges::digitize_batch(edges, batch)?;
        TableStore::fit(
            &self.structure,
            states.view(),
            self.config.n_states,
            self.config.unseen_parents,
        )
    }

    // The state of `v` given the rest of its row. Evidence the tables give no
    // mass to falls back to the mode of `v`'s own table.
    fn map_state(&self, fitted: &Fitted<O>, v: VariableId, evidence: &Evidence) -> BayesResult<usize> {
        let own_mode = || -> BayesResult<usize> {
            Ok(fitted
                .tables
                .get(v)
                .ok_or(BayesError::MissingTable(v))?
                .mode())
        };
        if evidence.is_empty() {
            return own_mode();
        }
        match fitted.oracle.query(v, evidence) {
            Ok(posterior) => {
                trace!("{} given {:?}: {:?}", v, evidence, posterior);
                Ok(argmax(posterior.iter().copied()))
            }
            Err(BayesError::InferenceError(InferenceError::ZeroProbabilityEvidence(_))) => {
                trace!("{} given {:?} has no mass, using its table mode", v, evidence);
                own_mode()
            }
            Err(e) => Err(e),
        }
    }

    /// Fits every table from `batch` and builds the oracle over them, replacing
    /// whatever was there. With persisted binning this is also where the bin edges are fit.
    pub fn initialize(&mut self, batch: ArrayView2<f64>) -> BayesResult<()> {
        self.validate_batch(batch)?;
        let codebook = fit_columns(batch, self.config.n_states)?;
        let tables = self.fit_tables(&codebook, batch)?;
        let oracle = O::build(&self.structure, &tables)?;
        self.codebook = match self.config.binning {
            BinningMode::Persisted => Some(codebook),
            BinningMode::PerBatch => None,
        };
        debug!(
            "Initialized {} tables from {} rows",
            tables.len(),
            batch.nrows()
        );
        self.fitted = Some(Fitted { tables, oracle });
        Ok(())
    }

    /// Blends tables fit on `batch` into the current ones,
    /// `(1 - learning_rate) * old + learning_rate * fresh`, and hands every new
    /// table to the oracle. Before the first fit this initializes from `batch` instead.
    pub fn update(&mut self, batch: ArrayView2<f64>, learning_rate: f64) -> BayesResult<()> {
        if !(0.0..=1.0).contains(&learning_rate) {
            return Err(BayesError::InvalidLearningRate(learning_rate));
        }
        if self.fitted.is_none() {
            return self.initialize(batch);
        }
        self.validate_batch(batch)?;
        let fresh = {
            let edges = self.edges_for(batch)?;
            self.fit_tables(&edges, batch)?
        };
        let fitted = self.fitted.as_mut().ok_or(BayesError::Uninitialized)?;
        fitted.tables.blend(&fresh, learning_rate)?;
        for (_, table) in fitted.tables.iter() {
            fitted.oracle.replace_table(table)?;
        }
        debug!(
            "Blended tables from {} rows at learning rate {}",
            batch.nrows(),
            learning_rate
        );
        Ok(())
    }

    /// The marginal distribution of every variable, keyed by name in index order.
    ///
    /// `latent` fits the tables if nothing has been fit yet, and is checked
    /// either way. `observed`, when
    /// given, is blended in once at the configured learning rate before the
    /// marginals are read.
    pub fn update_beliefs(
        &mut self,
        latent: ArrayView2<f64>,
        observed: Option<ArrayView2<f64>>,
    ) -> BayesResult<IndexMap<String, Array1<f64>>> {
        self.validate_batch(latent)?;
        if self.fitted.is_none() {
            self.initialize(latent)?;
        }
        if let Some(observed) = observed {
            self.update(observed, self.config.learning_rate)?;
        }
        let fitted = self.fitted.as_ref().ok_or(BayesError::Uninitialized)?;
        let no_evidence = Evidence::default();
        let mut beliefs = IndexMap::with_capacity(self.n_variables());
        for v in self.structure.variables() {
            beliefs.insert(v.name(), fitted.oracle.query(v, &no_evidence)?);
        }
        Ok(beliefs)
    }

    /// Predicts every value of `batch` from the rest of its row.
    ///
    /// Each variable's state is the most probable one given the states of every
    /// other variable in the row, decoded back to the middle of its bin. A lone
    /// variable has no evidence and takes the mode of its own table, and so does
    /// a variable whose evidence has zero probability under the current tables.
    /// The first call fits the tables on `batch` if nothing has been fit yet.
    pub fn predict(&mut self, batch: ArrayView2<f64>) -> BayesResult<Array2<f64>> {
        self.validate_batch(batch)?;
        if self.fitted.is_none() {
            self.initialize(batch)?;
        }
        let fitted = self.fitted.as_ref().ok_or(BayesError::Uninitialized)?;
        let edges = self.edges_for(batch)?;
        let states = BinEdges::digitize_batch(&edges, batch)?;

        let mut predictions = Array2::zeros(batch.raw_dim());
        for (row, sample) in states.rows().into_iter().enumerate() {
            for v in self.structure.variables() {
                let mut evidence = Evidence::default();
                for (i, s) in sample.iter().enumerate() {
                    if i != v.index() {
                        evidence.insert(VariableId::from(i), *s);
                    }
                }
                let state = self.map_state(fitted, v, &evidence)?;
                predictions[[row, v.index()]] = edges[v.index()].decode(state)?;
            }
        }
        Ok(predictions)
    }
}
