//! Node-Info Holder
//!
//! Owns one [`NodeInfo`] record per node known to the current build.
//!
//! Records are created up front for every node the scene supplies and are
//! only ever added to during the collection pass. Once the pass completes the
//! holder is handed to the mark phase by shared reference, which freezes it.

use indexmap::IndexMap;

use super::node::{NodeId, NodeInfo};

/// The set of all per-node information records for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInfoHolder {
    infos: IndexMap<NodeId, NodeInfo>,
}

impl NodeInfoHolder {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder with one empty record per node.
    pub fn with_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        Self {
            infos: nodes.into_iter().map(|node| (node, NodeInfo::new())).collect(),
        }
    }

    /// Iterate every `(node, record)` pair.
    ///
    /// The order is stable for one holder (insertion order) and the sequence
    /// can be restarted by calling this again.
    pub fn all_information(&self) -> impl Iterator<Item = (NodeId, &NodeInfo)> + '_ {
        self.infos.iter().map(|(node, info)| (*node, info))
    }

    /// Iterate the known nodes in the same order as [`Self::all_information`].
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.infos.keys().copied()
    }

    /// Get the record for `node`, creating an empty one on first access.
    pub fn get_info(&mut self, node: NodeId) -> &mut NodeInfo {
        self.infos.entry(node).or_default()
    }

    /// Get the record for `node` without creating it.
    pub fn info(&self, node: NodeId) -> Option<&NodeInfo> {
        self.infos.get(&node)
    }

    /// Check whether a record exists for `node`.
    pub fn contains(&self, node: NodeId) -> bool {
        self.infos.contains_key(&node)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Number of records flagged as entrypoints.
    pub fn entrypoint_count(&self) -> usize {
        self.infos.values().filter(|info| info.is_entrypoint()).count()
    }
}
