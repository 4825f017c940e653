//! Graph Nodes
//!
//! This module defines the identity of a node in the usage graph, the kinds
//! of edges that can connect two nodes, and the per-node information record
//! that the collection pass fills in.

use std::fmt;

use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identity of one element attached to a position in the scene graph.
///
/// Node ids are handed out by the scene; the engine never creates or
/// destroys nodes, it only annotates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a node id from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`. Use [`NodeId::try_new`]
    /// for indices that are not known to be in range.
    pub fn new(index: usize) -> Self {
        Self::try_new(index).unwrap_or_else(|| panic!("node index {index} out of range"))
    }

    /// Create a node id from a raw index, or `None` if it does not fit.
    pub fn try_new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Get the raw index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Why one node depends on another.
    ///
    /// Kinds compose: when several declarations connect the same pair of
    /// nodes, the stored kind is the union of all of them. The kind is
    /// informational; the mark phase follows every edge regardless of it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct EdgeKind: u8 {
        /// A generic reference.
        const NORMAL = 1 << 0;
        /// A structural dependency on a parent in the hierarchy.
        const PARENT = 1 << 1;
        /// A skeletal dependency on a bone.
        const BONE = 1 << 2;
    }
}

impl Default for EdgeKind {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Per-node information record.
///
/// Holds the node's outgoing edges and whether the node is an entrypoint
/// (a root of the reachability pass that is always retained).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Whether this node is always retained.
    entrypoint: bool,

    /// Nodes this node depends on, with the union of every declared kind.
    /// One entry per distinct target.
    dependencies: IndexMap<NodeId, EdgeKind>,
}

impl NodeInfo {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether this node is a reachability root.
    pub fn is_entrypoint(&self) -> bool {
        self.entrypoint
    }

    /// Flag this node as a reachability root.
    pub fn mark_entrypoint(&mut self) {
        self.entrypoint = true;
    }

    /// Record an edge to `dependency`, merging `kind` into any existing edge.
    pub fn add_dependency(&mut self, dependency: NodeId, kind: EdgeKind) {
        *self
            .dependencies
            .entry(dependency)
            .or_insert_with(EdgeKind::empty) |= kind;
    }

    /// Get all outgoing edges.
    pub fn dependencies(&self) -> &IndexMap<NodeId, EdgeKind> {
        &self.dependencies
    }

    /// Get the kind of the edge to `dependency`, if any.
    pub fn dependency_kind(&self, dependency: NodeId) -> Option<EdgeKind> {
        self.dependencies.get(&dependency).copied()
    }

    /// Check whether an edge to `dependency` exists.
    pub fn depends_on(&self, dependency: NodeId) -> bool {
        self.dependencies.contains_key(&dependency)
    }
}
