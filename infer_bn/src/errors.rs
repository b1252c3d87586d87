//! Ways a query or a table can be refused by the engine.
use core_bn::VariableId;
use std::error::Error;
use std::fmt;

///
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Error type for the inference engine
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The variable isn't part of the network
    UnknownVariable(VariableId),
    /// No table has been given for this variable yet
    MissingFactor(VariableId),
    /// A table whose shape doesn't match the cardinalities of its variable and parents
    ShapeMismatch {
        /// The table's variable
        variable: VariableId,
        /// Shape implied by the cardinalities
        expected: (usize, usize),
        /// Shape of the table given
        got: (usize, usize),
    },
    /// An evidence state past the variable's cardinality
    EvidenceOutOfRange {
        /// Observed variable
        variable: VariableId,
        /// Observed state
        state: usize,
        /// Number of states of that variable
        cardinality: usize,
    },
    /// Asked about a variable that is also observed
    QueryInEvidence(VariableId),
    /// The evidence has zero probability, so the posterior over this variable is undefined
    ZeroProbabilityEvidence(VariableId),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InferenceError::UnknownVariable(v) => write!(f, "{} is not in the network", v),
            InferenceError::MissingFactor(v) => write!(f, "{} has no table", v),
            InferenceError::ShapeMismatch {
                variable,
                expected,
                got,
            } => write!(
                f,
                "the table for {} should have shape {:?}, got {:?}",
                variable, expected, got
            ),
            InferenceError::EvidenceOutOfRange {
                variable,
                state,
                cardinality,
            } => write!(
                f,
                "evidence {} = {} is outside of its {} states",
                variable, state, cardinality
            ),
            InferenceError::QueryInEvidence(v) => {
                write!(f, "{} is both queried and observed", v)
            }
            InferenceError::ZeroProbabilityEvidence(v) => write!(
                f,
                "the evidence has probability zero, no posterior for {}",
                v
            ),
        }
    }
}

impl Error for InferenceError {}
