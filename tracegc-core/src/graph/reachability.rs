//! Reachability
//!
//! The mark phase of the usage graph. Starting from every entrypoint, we
//! follow each recorded edge and mark everything transitively reached as
//! used. Nodes that are never marked can be removed.
//!
//! # Algorithm
//!
//! 1. Seed the queue with every node whose record is an entrypoint
//! 2. Pop a node; if it was not marked yet, mark it
//! 3. Push every dependency of that node, whatever its edge kind
//! 4. Repeat until the queue is empty
//!
//! Edge kinds are not consulted here. Activeness filtering already happened
//! when the edges were recorded, so the mark phase follows every recorded
//! edge unconditionally.
//!
//! The pass only reads the holder, so it can be re-run from scratch as often
//! as needed and always produces the same result for the same records.

use std::collections::VecDeque;

use indexmap::IndexSet;
use serde::Serialize;

use super::holder::NodeInfoHolder;
use super::node::NodeId;

/// Result of the mark phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reachability {
    /// Every marked node, in the order it was reached.
    used: IndexSet<NodeId>,

    /// Nodes with a record that were never marked, in holder order.
    removable: Vec<NodeId>,
}

impl Reachability {
    /// Run the mark phase over a completed set of records.
    pub fn mark(holder: &NodeInfoHolder) -> Self {
        let mut used = IndexSet::with_capacity(holder.len());
        let mut queue: VecDeque<NodeId> = holder
            .all_information()
            .filter(|(_, info)| info.is_entrypoint())
            .map(|(node, _)| node)
            .collect();

        while let Some(node) = queue.pop_front() {
            if !used.insert(node) {
                continue;
            }

            if let Some(info) = holder.info(node) {
                queue.extend(
                    info.dependencies()
                        .keys()
                        .filter(|dependency| !used.contains(*dependency)),
                );
            }
        }

        let removable = holder.nodes().filter(|node| !used.contains(node)).collect();

        Self { used, removable }
    }

    /// Mark every node of the holder as used without walking any edge.
    pub fn retain_all(holder: &NodeInfoHolder) -> Self {
        Self {
            used: holder.nodes().collect(),
            removable: Vec::new(),
        }
    }

    /// Check whether `node` was reached.
    pub fn is_used(&self, node: NodeId) -> bool {
        self.used.contains(&node)
    }

    /// Check whether `node` can be removed.
    ///
    /// Only nodes known to the holder are ever removable.
    pub fn is_removable(&self, node: NodeId) -> bool {
        self.removable.contains(&node)
    }

    /// Get all used nodes.
    pub fn used(&self) -> &IndexSet<NodeId> {
        &self.used
    }

    /// Get all removable nodes.
    pub fn removable(&self) -> &[NodeId] {
        &self.removable
    }
}
