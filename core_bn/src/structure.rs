//! The directed acyclic graph over `V0..V(n-1)`.
//!
//! Every variable is a node, edges or not. Parents keep the order their edges
//! were given in, which fixes the column layout of the variable's table.
use super::VariableId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::error::Error;
use std::fmt;

/// A `(parent, child)` pair
pub type Edge = (VariableId, VariableId);

///
pub type StructureResult<T> = Result<T, StructureError>;

/// Things that make a graph unusable as a belief network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A name that isn't `V{index}`
    MalformedName(String),
    /// The edge mentions a variable past the end of the network
    OutOfRange {
        /// Offending variable
        variable: VariableId,
        /// Size of the network
        n_variables: usize,
    },
    /// The edges loop back on themselves. Holds a variable on the cycle.
    Cycle(VariableId),
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StructureError::MalformedName(name) => {
                write!(f, "{:?} is not a variable name of the form V<index>", name)
            }
            StructureError::OutOfRange {
                variable,
                n_variables,
            } => write!(
                f,
                "{} is outside of a network with {} variables",
                variable, n_variables
            ),
            StructureError::Cycle(v) => write!(f, "the structure has a cycle through {}", v),
        }
    }
}

impl Error for StructureError {}

/// Fixed DAG with parent and child lists and a topological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StructureFields", into = "StructureFields")]
pub struct Structure {
    n_variables: usize,
    edges: Vec<Edge>,
    parents: Vec<SmallVec<[VariableId; 4]>>,
    children: Vec<SmallVec<[VariableId; 4]>>,
    order: Vec<VariableId>,
}

/// The serialized form of a structure. Everything else is rebuilt, and checked, by `Structure::new`.
#[derive(Serialize, Deserialize)]
struct StructureFields {
    n_variables: usize,
    edges: Vec<Edge>,
}

impl TryFrom<StructureFields> for Structure {
    type Error = StructureError;
    fn try_from(fields: StructureFields) -> StructureResult<Structure> {
        Structure::new(fields.n_variables, fields.edges)
    }
}

impl From<Structure> for StructureFields {
    fn from(structure: Structure) -> StructureFields {
        StructureFields {
            n_variables: structure.n_variables,
            edges: structure.edges,
        }
    }
}

impl Structure {
    /// The default edge list, `V0 -> V1 -> ... -> V(n-1)`.
    pub fn chain_edges(n_variables: usize) -> Vec<Edge> {
        (1..n_variables)
            .map(|i| (VariableId::from(i - 1), VariableId::from(i)))
            .collect()
    }

    /// The default structure. A chain can't be cyclic so this can't fail.
    pub fn chain(n_variables: usize) -> Structure {
        let edges = Structure::chain_edges(n_variables);
        let mut parents = vec![SmallVec::new(); n_variables];
        let mut children = vec![SmallVec::new(); n_variables];
        for (p, c) in &edges {
            parents[c.index()].push(*p);
            children[p.index()].push(*c);
        }
        Structure {
            n_variables,
            edges,
            parents,
            children,
            order: (0..n_variables).map(VariableId::from).collect(),
        }
    }

    /// Builds and checks a structure. Repeated edges are kept once.
    pub fn new<I: IntoIterator<Item = Edge>>(
        n_variables: usize,
        edges: I,
    ) -> StructureResult<Structure> {
        let mut kept: Vec<Edge> = Vec::new();
        let mut parents: Vec<SmallVec<[VariableId; 4]>> = vec![SmallVec::new(); n_variables];
        let mut children: Vec<SmallVec<[VariableId; 4]>> = vec![SmallVec::new(); n_variables];
        for (p, c) in edges {
            for v in [p, c] {
                if v.index() >= n_variables {
                    return Err(StructureError::OutOfRange {
                        variable: v,
                        n_variables,
                    });
                }
            }
            if p == c {
                return Err(StructureError::Cycle(p));
            }
            if kept.contains(&(p, c)) {
                continue;
            }
            kept.push((p, c));
            parents[c.index()].push(p);
            children[p.index()].push(c);
        }
        let order = topological_order(&parents, &children)?;
        Ok(Structure {
            n_variables,
            edges: kept,
            parents,
            children,
            order,
        })
    }

    /// Same as `new`, but from `("V0", "V1")` style name pairs.
    pub fn from_names<S: AsRef<str>>(
        n_variables: usize,
        pairs: &[(S, S)],
    ) -> StructureResult<Structure> {
        let edges = pairs
            .iter()
            .map(|(p, c)| -> StructureResult<Edge> {
                Ok((p.as_ref().parse()?, c.as_ref().parse()?))
            })
            .collect::<StructureResult<Vec<Edge>>>()?;
        Structure::new(n_variables, edges)
    }

    pub fn n_variables(&self) -> usize {
        self.n_variables
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All variables in index order
    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        (0..self.n_variables).map(VariableId::from)
    }

    pub fn contains(&self, v: VariableId) -> bool {
        v.index() < self.n_variables
    }

    /// Parents in edge order. Empty for roots and for unknown variables.
    pub fn parents(&self, v: VariableId) -> &[VariableId] {
        self.parents.get(v.index()).map(|p| &p[..]).unwrap_or(&[])
    }

    pub fn children(&self, v: VariableId) -> &[VariableId] {
        self.children.get(v.index()).map(|c| &c[..]).unwrap_or(&[])
    }

    pub fn is_root(&self, v: VariableId) -> bool {
        self.parents(v).is_empty()
    }

    /// Parents always come before their children. Ties go to the lower index.
    pub fn topological_order(&self) -> &[VariableId] {
        &self.order
    }
}

// Kahn's algorithm, always releasing the smallest ready index first.
fn topological_order(
    parents: &[SmallVec<[VariableId; 4]>],
    children: &[SmallVec<[VariableId; 4]>],
) -> StructureResult<Vec<VariableId>> {
    let mut in_degree: Vec<usize> = parents.iter().map(|p| p.len()).collect();
    let mut ready: Vec<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| i)
        .rev()
        .collect();
    let mut order = Vec::with_capacity(parents.len());
    while let Some(i) = ready.pop() {
        order.push(VariableId::from(i));
        for c in &children[i] {
            in_degree[c.index()] -= 1;
            if in_degree[c.index()] == 0 {
                ready.push(c.index());
                ready.sort_unstable_by(|a, b| b.cmp(a));
            }
        }
    }
    if order.len() < parents.len() {
        let stuck = in_degree
            .iter()
            .position(|d| *d > 0)
            .unwrap_or_default();
        return Err(StructureError::Cycle(VariableId::from(stuck)));
    }
    Ok(order)
}
