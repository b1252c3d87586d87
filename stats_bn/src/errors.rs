//! The errors the binning and counting code can run into.
use std::error::Error;
use std::fmt;

///
pub type StatsResult<T> = Result<T, StatsError>;

/// Error type for the statistics layer
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Quantiles of nothing
    EmptyColumn,
    /// Asked for zero bins or zero states
    NoBins,
    /// A NaN or infinity in the data, at this row and column
    NonFinite {
        /// Row of the bad value
        row: usize,
        /// Column of the bad value
        column: usize,
    },
    /// A discrete state that doesn't fit the cardinality
    StateOutOfRange {
        /// The state
        state: usize,
        /// The number of states it should be under
        n_states: usize,
    },
    /// Asked for a column the batch doesn't have
    ColumnOutOfRange {
        /// Requested column
        column: usize,
        /// Columns present
        n_columns: usize,
    },
    /// Table or batch of the wrong shape
    ShapeMismatch {
        /// The shape that was needed
        expected: (usize, usize),
        /// The shape that was given
        got: (usize, usize),
    },
    /// Blending two tables over different variables or parents
    TableMismatch,
    /// Learning rates live in [0, 1]
    LearningRate(f64),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatsError::EmptyColumn => write!(f, "cannot take quantiles of an empty column"),
            StatsError::NoBins => write!(f, "need at least one bin"),
            StatsError::NonFinite { row, column } => {
                write!(f, "non-finite value at row {}, column {}", row, column)
            }
            StatsError::StateOutOfRange { state, n_states } => {
                write!(f, "state {} is not below {}", state, n_states)
            }
            StatsError::ColumnOutOfRange { column, n_columns } => write!(
                f,
                "column {} requested from a batch with {} columns",
                column, n_columns
            ),
            StatsError::ShapeMismatch { expected, got } => {
                write!(f, "expected shape {:?}, got {:?}", expected, got)
            }
            StatsError::TableMismatch => {
                write!(f, "tables are over different variables or parents")
            }
            StatsError::LearningRate(lr) => write!(f, "learning rate {} is outside [0, 1]", lr),
        }
    }
}

impl Error for StatsError {}
