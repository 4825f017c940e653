//! Mesh queries for rules that need geometry facts.
//!
//! The collection pass does not own the mesh pipeline. Rules that care about
//! bone weights ask a [`MeshInfoProvider`] through
//! [`Collector::mesh_info_for`](super::Collector::mesh_info_for).

use std::collections::HashMap;

use crate::graph::NodeId;

/// Derived facts about one bone slot of a skinned mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneInfo {
    /// Whether any vertex carries a non-zero weight for this bone.
    pub weighted: bool,
}

/// Derived facts about the mesh of a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshInfo {
    /// One entry per bone slot, in the renderer's bone order.
    pub bones: Vec<BoneInfo>,
}

impl MeshInfo {
    /// Whether the bone at `index` is weighted. Slots the mesh does not know
    /// about are treated as weighted.
    pub fn is_bone_weighted(&self, index: usize) -> bool {
        self.bones.get(index).map_or(true, |bone| bone.weighted)
    }
}

/// Read-only access to derived mesh data.
pub trait MeshInfoProvider {
    fn mesh_info_for(&self, renderer: NodeId) -> Option<&MeshInfo>;
}

impl MeshInfoProvider for HashMap<NodeId, MeshInfo> {
    fn mesh_info_for(&self, renderer: NodeId) -> Option<&MeshInfo> {
        self.get(&renderer)
    }
}

/// Provider for builds without any mesh data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMeshInfo;

impl MeshInfoProvider for NoMeshInfo {
    fn mesh_info_for(&self, _renderer: NodeId) -> Option<&MeshInfo> {
        None
    }
}
