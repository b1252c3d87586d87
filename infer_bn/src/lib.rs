//! # Exact inference
//!
//! Discrete factors and variable elimination over a network whose factors are
//! conditional probability tables. The engine knows nothing about where the
//! tables came from; it is handed one table per variable and answers marginal
//! and conditional queries about single variables.
#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;

mod elimination;
mod errors;
mod factor;

pub use elimination::VariableElimination;
pub use errors::{InferenceError, InferenceResult};
pub use factor::DiscreteFactor;
