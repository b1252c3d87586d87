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


//! # Building a component
//!
//! `ComponentBuilder` holds every knob of the component with sensible defaults.
//! It can be filled in by hand or read from a yaml file:
//!
//! ```yaml
//! ---
//! n_variables: 3
//! n_states: 3
//! learning_rate: 0.1
//! binning: per_batch
//! unseen_parents: epsilon
//! structure:
//!   - [V0, V1]
//!   - [V1, V2]
//! ```
//!
//! Only `n_variables` is required. Without a `structure` the variables form a chain.

use crate::component::BayesianNetworkComponent;
use crate::errors::{BayesError, BayesResult, ParsingError};
use crate::inference::InferenceOracle;
use core_bn::Structure;
use infer_bn::VariableElimination;
use log::info;
use serde::{Deserialize, Serialize};
use stats_bn::UnseenParents;
use std::fs::read_to_string;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// Where bin edges come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinningMode {
    /// Every batch is binned and decoded by its own quantiles.
    PerBatch,
    /// The edges are fit once, on the batch that initializes the tables, and
    /// reused for everything after.
    Persisted,
}

impl Default for BinningMode {
    fn default() -> BinningMode {
        BinningMode::PerBatch
    }
}

/// The settings a component runs with once it's built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// States per variable, also the number of quantile bins
    pub n_states: usize,
    /// EMA weight given to fresh tables by `update_beliefs`
    pub learning_rate: f64,
    /// See [`BinningMode`]
    pub binning: BinningMode,
    /// See [`UnseenParents`]
    pub unseen_parents: UnseenParents,
}

/// A construction object for a belief network component.
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    /// Number of variables, `V0` through `V(n-1)`
    pub n_variables: usize,
    /// States per variable
    pub n_states: usize,
    /// EMA weight of fresh tables
    pub learning_rate: f64,
    /// Where bin edges come from
    pub binning: BinningMode,
    /// What counting does with parent states it never sees
    pub unseen_parents: UnseenParents,
    /// `(parent, child)` name pairs. `None` means a chain.
    pub structure: Option<Vec<(String, String)>>,
}

fn malformed(file_name: &str, field: &str) -> BayesError {
    BayesError::ParsingError(ParsingError::MalformedYamlError {
        file_name: file_name.to_string(),
        field: field.to_string(),
    })
}

impl ComponentBuilder {
    /// Creates a new builder with sensible defaults.
    pub fn new(n_variables: usize) -> ComponentBuilder {
        ComponentBuilder {
            n_variables,
            n_states: 3,
            learning_rate: 0.1,
            binning: BinningMode::PerBatch,
            unseen_parents: UnseenParents::Epsilon,
            structure: None,
        }
    }

    /// Creates a builder from a yaml file on disk
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> BayesResult<Self> {
        let file_name = path.as_ref().to_string_lossy().to_string();
        let config = read_to_string(&path)?;
        let builder = ComponentBuilder::from_yaml_str(&config, &file_name)?;
        info!(
            "Read {} with {} variables, {} states each, learning rate {}",
            file_name, builder.n_variables, builder.n_states, builder.learning_rate
        );
        Ok(builder)
    }

    /// Same as `from_yaml` for a config already in memory. `file_name` only shows up in errors.
    pub fn from_yaml_str(config: &str, file_name: &str) -> BayesResult<Self> {
        let params_files = YamlLoader::load_from_str(config)?;
        let params = params_files.get(0).ok_or_else(|| {
            BayesError::ParsingError(ParsingError::MissingYamlError {
                file_name: file_name.to_string(),
                field: "n_variables".to_string(),
            })
        })?;

        let n_variables = match &params["n_variables"] {
            Yaml::Integer(n) if *n > 0 => *n as usize,
            Yaml::BadValue => {
                return Err(BayesError::ParsingError(ParsingError::MissingYamlError {
                    file_name: file_name.to_string(),
                    field: "n_variables".to_string(),
                }))
            }
            _ => return Err(malformed(file_name, "n_variables")),
        };
        let mut builder = ComponentBuilder::new(n_variables);

        match &params["n_states"] {
            Yaml::BadValue => {}
            Yaml::Integer(n) if *n > 0 => builder.n_states = *n as usize,
            _ => return Err(malformed(file_name, "n_states")),
        }
        match &params["learning_rate"] {
            Yaml::BadValue => {}
            value => {
                builder.learning_rate = value
                    .as_f64()
                    .or_else(|| value.as_i64().map(|i| i as f64))
                    .ok_or_else(|| malformed(file_name, "learning_rate"))?
            }
        }
        match &params["binning"] {
            Yaml::BadValue => {}
            value => {
                builder.binning = match value.as_str() {
                    Some("per_batch") => BinningMode::PerBatch,
                    Some("persisted") => BinningMode::Persisted,
                    _ => return Err(malformed(file_name, "binning")),
                }
            }
        }
        match &params["unseen_parents"] {
            Yaml::BadValue => {}
            value => {
                builder.unseen_parents = match value.as_str() {
                    Some("epsilon") => UnseenParents::Epsilon,
                    Some("uniform") => UnseenParents::Uniform,
                    _ => return Err(malformed(file_name, "unseen_parents")),
                }
            }
        }
        match &params["structure"] {
            Yaml::BadValue => {}
            Yaml::Array(edges) => {
                let mut pairs = Vec::with_capacity(edges.len());
                for edge in edges {
                    match edge.as_vec().map(|e| &e[..]) {
                        Some([Yaml::String(parent), Yaml::String(child)]) => {
                            pairs.push((parent.clone(), child.clone()))
                        }
                        _ => return Err(malformed(file_name, "structure")),
                    }
                }
                builder.structure = Some(pairs);
            }
            _ => return Err(malformed(file_name, "structure")),
        }
        Ok(builder)
    }

    /// Sets the number of states, and bins, per variable
    pub fn set_n_states(&mut self, x: usize) -> &mut Self {
        self.n_states = x;
        self
    }
    /// Sets the learning rate `update_beliefs` blends observed data in with
    pub fn set_learning_rate(&mut self, x: f64) -> &mut Self {
        self.learning_rate = x;
        self
    }
    /// See [`BinningMode`]
    pub fn set_binning(&mut self, x: BinningMode) -> &mut Self {
        self.binning = x;
        self
    }
    /// See [`UnseenParents`]
    pub fn set_unseen_parents(&mut self, x: UnseenParents) -> &mut Self {
        self.unseen_parents = x;
        self
    }
    /// Sets the edges, as `("V0", "V1")` style pairs
    pub fn set_structure<S: AsRef<str>>(&mut self, edges: &[(S, S)]) -> &mut Self {
        self.structure = Some(
            edges
                .iter()
                .map(|(p, c)| (p.as_ref().to_string(), c.as_ref().to_string()))
                .collect(),
        );
        self
    }

    /// Checks the parameters and the structure.
    pub fn config(&self) -> BayesResult<(Structure, ComponentConfig)> {
        if self.n_variables == 0 {
            return Err(BayesError::InvalidParameter(
                "a network needs at least one variable",
            ));
        }
        if self.n_states < 2 {
            return Err(BayesError::InvalidParameter(
                "variables need at least two states",
            ));
        }
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(BayesError::InvalidLearningRate(self.learning_rate));
        }
        let structure = match &self.structure {
            Some(edges) => Structure::from_names(self.n_variables, edges)?,
            None => Structure::chain(self.n_variables),
        };
        let config = ComponentConfig {
            n_states: self.n_states,
            learning_rate: self.learning_rate,
            binning: self.binning,
            unseen_parents: self.unseen_parents,
        };
        Ok((structure, config))
    }

    /// Builds a component that uses variable elimination for inference.
    pub fn build(&self) -> BayesResult<BayesianNetworkComponent> {
        self.build_with_oracle::<VariableElimination>()
    }

    /// Builds a component on any oracle.
    pub fn build_with_oracle<O: InferenceOracle>(&self) -> BayesResult<BayesianNetworkComponent<O>> {
        let (structure, config) = self.config()?;
        Ok(BayesianNetworkComponent::from_parts(structure, config))
    }
}
