//! Positional variable identifiers and the fixed graph the belief network lives on.
//! A variable is only its index. The name `V{index}` is derived, never stored, so
//! `V12` always means variable 12.
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod structure;
pub use structure::{Edge, Structure, StructureError, StructureResult};

/// Observed states for some of the variables, keyed by variable.
pub type Evidence = FxHashMap<VariableId, usize>;

/// Index of a variable in the network
#[derive(Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord)]
pub struct VariableId {
    index: usize,
}

impl From<usize> for VariableId {
    fn from(index: usize) -> VariableId {
        VariableId { index }
    }
}

impl From<VariableId> for usize {
    fn from(v: VariableId) -> usize {
        v.index
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "V{}", self.index)
    }
}

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "V{}", self.index)
    }
}

impl FromStr for VariableId {
    type Err = StructureError;
    /// Parses `V{index}`. Leading zeros are rejected so that a name and its
    /// variable stay one to one.
    fn from_str(s: &str) -> Result<VariableId, StructureError> {
        let digits = s
            .strip_prefix('V')
            .ok_or_else(|| StructureError::MalformedName(s.to_string()))?;
        if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
            return Err(StructureError::MalformedName(s.to_string()));
        }
        digits
            .parse::<usize>()
            .map(VariableId::from)
            .map_err(|_| StructureError::MalformedName(s.to_string()))
    }
}

impl VariableId {
    /// The position of this variable in a batch row
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The derived `V{index}` name
    pub fn name(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for i in [0usize, 1, 9, 10, 12, 307] {
            let v = VariableId::from(i);
            assert_eq!(v.name(), format!("V{}", i));
            assert_eq!(v.name().parse::<VariableId>().unwrap(), v);
        }
    }

    #[test]
    fn multi_digit_names_use_the_whole_suffix() {
        let v: VariableId = "V12".parse().unwrap();
        assert_eq!(v.index(), 12);
    }

    #[test]
    fn malformed_names_are_rejected() {
        for bad in ["", "V", "X1", "v1", "V01", "V-1", "V1a"] {
            assert!(bad.parse::<VariableId>().is_err(), "{:?} parsed", bad);
        }
    }
}
