//! Usage Graph
//!
//! This module implements the dependency graph that records which nodes of
//! the scene each node needs in order to keep working.
//!
//! # Overview
//!
//! The usage graph is a directed graph where:
//!
//! - Nodes are elements attached to the scene hierarchy
//! - Edges point from a dependant to its dependency: if A needs B, A's
//!   record holds an edge to B
//! - Entrypoints are nodes that are always retained
//!
//! The collection pass fills one [`NodeInfo`] per node. The mark phase
//! ([`Reachability`]) then walks the records from the entrypoints; anything
//! never reached is unused.
//!
//! # Design Decisions
//!
//! 1. Records live in a [`NodeInfoHolder`] keyed by node id, so rules can
//!    declare edges on behalf of other nodes.
//!
//! 2. Edges to the same target are merged into a single entry whose kind
//!    is the union of every declared kind.
//!
//! 3. Only forward edges are stored. Nothing in the mark phase needs the
//!    reverse direction.

mod holder;
mod node;
mod reachability;

pub use holder::NodeInfoHolder;
pub use node::{EdgeKind, NodeId, NodeInfo};
pub use reachability::Reachability;
