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


//! The errors that can occur while fitting, updating or querying the network.
//! Most are floated up from the statistics and inference layers.

use core_bn::{StructureError, VariableId};
use infer_bn::InferenceError;
use stats_bn::StatsError;
use std::error::Error;
use std::fmt;
use std::io;
use yaml_rust::ScanError;

/// Helper type for a call that could go wrong.
pub type BayesResult<T> = Result<T, BayesError>;

/// Error type for the belief network component.
#[derive(Debug)]
pub enum BayesError {
    /// The edges don't form a DAG over the variables
    StructureError(StructureError),
    /// Binning or counting went wrong
    StatsError(StatsError),
    /// The inference engine refused a table or a query
    InferenceError(InferenceError),
    /// IO error when opening a config file
    IoError(io::Error),
    /// Parsing error when reading a config file
    ParsingError(ParsingError),
    /// The batch doesn't have one column per variable
    DimensionMismatch {
        /// Number of variables in the network
        expected: usize,
        /// Number of columns in the batch
        got: usize,
    },
    /// The batch has no rows
    EmptyBatch,
    /// A NaN or infinity in the batch
    NonFiniteValue {
        /// Row of the value
        row: usize,
        /// Column of the value
        column: usize,
    },
    /// Learning rates live in [0, 1]
    InvalidLearningRate(f64),
    /// A builder parameter that can't be used
    InvalidParameter(&'static str),
    /// The tables haven't been fit yet
    Uninitialized,
    /// No table is stored for this variable
    MissingTable(VariableId),
}

impl fmt::Display for BayesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BayesError::StructureError(ref e) => write!(f, "{}", e),
            BayesError::StatsError(ref e) => write!(f, "{}", e),
            BayesError::InferenceError(ref e) => write!(f, "{}", e),
            BayesError::IoError(ref e) => write!(f, "{}", e),
            BayesError::ParsingError(ref e) => write!(f, "{}", e),
            BayesError::DimensionMismatch { expected, got } => write!(
                f,
                "the network has {} variables but the batch has {} columns",
                expected, got
            ),
            BayesError::EmptyBatch => write!(f, "the batch has no rows"),
            BayesError::NonFiniteValue { row, column } => {
                write!(f, "non-finite value at row {}, column {}", row, column)
            }
            BayesError::InvalidLearningRate(lr) => {
                write!(f, "learning rate {} is outside [0, 1]", lr)
            }
            BayesError::InvalidParameter(msg) => write!(f, "{}", msg),
            BayesError::Uninitialized => write!(f, "the tables have not been fit yet"),
            BayesError::MissingTable(v) => write!(f, "there is no table for {}", v),
        }
    }
}

#[allow(deprecated)]
impl Error for BayesError {
    fn description(&self) -> &str {
        match *self {
            BayesError::StructureError(ref e) => e.description(),
            BayesError::StatsError(ref e) => e.description(),
            BayesError::InferenceError(ref e) => e.description(),
            BayesError::IoError(ref e) => e.description(),
            BayesError::ParsingError(ref e) => e.description(),
            BayesError::DimensionMismatch { .. } => "the batch has the wrong number of columns",
            BayesError::EmptyBatch => "the batch has no rows",
            BayesError::NonFiniteValue { .. } => "non-finite value in the batch",
            BayesError::InvalidLearningRate(..) => "learning rate is outside [0, 1]",
            BayesError::InvalidParameter(msg) => msg,
            BayesError::Uninitialized => "the tables have not been fit yet",
            BayesError::MissingTable(..) => "a variable has no table",
        }
    }

    fn cause(&self) -> Option<&dyn Error> {
        match *self {
            BayesError::StructureError(ref e) => Some(e),
            BayesError::StatsError(ref e) => Some(e),
            BayesError::InferenceError(ref e) => Some(e),
            BayesError::IoError(ref e) => Some(e),
            BayesError::ParsingError(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<StructureError> for BayesError {
    fn from(err: StructureError) -> Self {
        BayesError::StructureError(err)
    }
}

impl From<StatsError> for BayesError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::NonFinite { row, column } => BayesError::NonFiniteValue { row, column },
            StatsError::LearningRate(lr) => BayesError::InvalidLearningRate(lr),
            e => BayesError::StatsError(e),
        }
    }
}

impl From<InferenceError> for BayesError {
    fn from(err: InferenceError) -> Self {
        BayesError::InferenceError(err)
    }
}

impl From<io::Error> for BayesError {
    fn from(err: io::Error) -> Self {
        BayesError::IoError(err)
    }
}

impl From<ScanError> for BayesError {
    fn from(err: ScanError) -> Self {
        BayesError::ParsingError(ParsingError::YamlScanError(err))
    }
}

impl From<BayesError> for io::Error {
    fn from(err: BayesError) -> Self {
        match err {
            BayesError::IoError(e) => e,
            e => io::Error::new(io::ErrorKind::Other, Box::new(e)),
        }
    }
}

/// A parsing error occored while reading a config file
#[derive(Debug)]
pub enum ParsingError {
    /// Yaml was messed up
    MalformedYamlError {
        /// The file that was messed up
        file_name: String,
        /// The value that was messed up
        field: String,
    },
    /// A needed field was missing from the file.
    MissingYamlError {
        /// The file
        file_name: String,
        /// The missing field
        field: String,
    },
    /// The file isn't yaml at all
    YamlScanError(ScanError),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParsingError::YamlScanError(ref e) => write!(f, "{}", e),
            ParsingError::MalformedYamlError {
                ref file_name,
                ref field,
            } => write!(f, "the entry {} in {} is malformed", field, file_name),
            ParsingError::MissingYamlError {
                ref file_name,
                ref field,
            } => write!(f, "{} is missing the field {}", file_name, field),
        }
    }
}

#[allow(deprecated)]
impl Error for ParsingError {
    fn description(&self) -> &str {
        match *self {
            ParsingError::YamlScanError(ref e) => e.description(),
            ParsingError::MalformedYamlError { .. } => "there is a error reading a yaml entry",
            ParsingError::MissingYamlError { .. } => "not all message fields set",
        }
    }

    fn cause(&self) -> Option<&dyn Error> {
        match *self {
            ParsingError::YamlScanError(ref e) => Some(e),
            ParsingError::MalformedYamlError { .. } => None,
            ParsingError::MissingYamlError { .. } => None,
        }
    }
}
