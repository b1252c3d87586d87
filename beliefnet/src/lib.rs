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


//! # Beliefnet
//!
//! A small discrete Bayesian network meant to sit on top of a learned
//! representation. Batches of continuous vectors, one column per variable, are
//! binned into a few states by quantile. The component counts those states into
//! conditional probability tables over a fixed structure, blends later batches
//! in with an exponential moving average, and predicts every value of a row from
//! the rest of it.
//!
//! ```rust,no_run
//! use beliefnet::{BayesianNetworkComponent, ComponentBuilder};
//! use ndarray::Array2;
//!
//! let batch = Array2::<f64>::zeros((100, 3));
//! let mut component: BayesianNetworkComponent = ComponentBuilder::new(3)
//!     .set_structure(&[("V0", "V1"), ("V1", "V2")])
//!     .build()
//!     .unwrap();
//! let beliefs = component.update_beliefs(batch.view(), None).unwrap();
//! let predictions = component.predict(batch.view()).unwrap();
//! ```
//!
//! Inference is done by whatever implements [`InferenceOracle`]. The default is
//! exact variable elimination from `infer_bn`.

#![doc(test(attr(allow(unused_variables), deny(warnings))))]

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

pub mod builders;
mod component;
pub mod errors;
pub mod inference;
pub mod tables;

pub use builders::{BinningMode, ComponentBuilder, ComponentConfig};
pub use component::BayesianNetworkComponent;
pub use errors::{BayesError, BayesResult};
pub use inference::InferenceOracle;
pub use tables::TableStore;

pub use core_bn::{Evidence, Structure, StructureError, VariableId};
pub use infer_bn::VariableElimination;
pub use stats_bn::{decode, discretize, BinEdges, ConditionalTable, UnseenParents, EPSILON};
