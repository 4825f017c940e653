//! Activeness
//!
//! The collector asks one question about nodes: can this node ever become
//! active? A node that can never run cannot propagate a "used" mark through
//! its own dependencies, so edges it declares are dropped by default.
//!
//! The question is answered by an [`ActivenessOracle`]. The engine treats it
//! as a pure predicate over the scene state at build start and never mutates
//! it. [`ActivenessCache`] memoizes any oracle; [`HierarchyActiveness`] is
//! the oracle backed by a [`SceneGraph`].

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::graph::NodeId;
use crate::scene::SceneGraph;

/// Answers whether a node can ever become active or enabled.
pub trait ActivenessOracle {
    fn can_ever_be_active(&self, node: NodeId) -> bool;
}

impl<F> ActivenessOracle for F
where
    F: Fn(NodeId) -> bool,
{
    fn can_ever_be_active(&self, node: NodeId) -> bool {
        self(node)
    }
}

/// Memoizes the answers of an inner oracle.
///
/// The first query for a node computes the answer; later queries return the
/// cached value. The cache is never invalidated, which matches the oracle's
/// contract of being a function of the scene at build start.
pub struct ActivenessCache<O> {
    oracle: O,
    cache: RwLock<HashMap<NodeId, bool>>,
}

impl<O: ActivenessOracle> ActivenessCache<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of nodes answered so far.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

impl<O: ActivenessOracle> ActivenessOracle for ActivenessCache<O> {
    fn can_ever_be_active(&self, node: NodeId) -> bool {
        if let Some(&cached) = self.cache.read().get(&node) {
            return cached;
        }

        // Computed outside the lock; a concurrent duplicate computation
        // produces the same answer.
        let answer = self.oracle.can_ever_be_active(node);
        self.cache.write().insert(node, answer);
        answer
    }
}

/// Oracle backed by the activation states stored in a [`SceneGraph`].
///
/// An element can be active unless the element itself, its object, or any
/// ancestor object is permanently inactive. Transforms follow their object.
pub struct HierarchyActiveness<'a> {
    scene: &'a SceneGraph,
}

impl<'a> HierarchyActiveness<'a> {
    pub fn new(scene: &'a SceneGraph) -> Self {
        Self { scene }
    }

    /// Wrap this oracle in an [`ActivenessCache`].
    pub fn cached(scene: &'a SceneGraph) -> ActivenessCache<Self> {
        ActivenessCache::new(Self::new(scene))
    }
}

impl ActivenessOracle for HierarchyActiveness<'_> {
    fn can_ever_be_active(&self, node: NodeId) -> bool {
        let Some(entry) = self.scene.element(node) else {
            return false;
        };

        if !entry.is_transform() && !entry.activation().can_be_active() {
            return false;
        }

        let mut current = Some(entry.object());
        while let Some(id) = current {
            let Some(object) = self.scene.object(id) else {
                return false;
            };
            if !object.activation().can_be_active() {
                return false;
            }
            current = object.parent();
        }
        true
    }
}
