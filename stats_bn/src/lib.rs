//! # Statistics for the belief network
//!
//! Turns continuous batches into small integer states by quantile binning,
//! counts those states into conditional probability tables, and blends tables
//! together as new data comes in.
#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

mod discretize;
mod errors;
mod estimator;
mod table;

pub use discretize::{decode, discretize, fit_columns, quantile, BinEdges};
pub use errors::{StatsError, StatsResult};
pub use estimator::{estimate, estimate_conditional, estimate_marginal, UnseenParents, EPSILON};
pub use table::{argmax, ConditionalTable};
