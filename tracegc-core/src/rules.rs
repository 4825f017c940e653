//! Standard dependency rules for the built-in element types.

use crate::collect::{Collector, DependencyRule, RuleRegistry};
use crate::error::{ProtocolViolation, RuleError, TraceError};
use crate::graph::NodeId;
use crate::scene::{SceneGraph, SkinnedMeshRenderer, Transform};

/// Register every standard rule into `registry`.
pub fn register_standard_rules(registry: &mut RuleRegistry) -> Result<(), TraceError> {
    registry.register::<Transform, _>(TransformRule)?;
    registry.register::<SkinnedMeshRenderer, _>(SkinnedMeshRendererRule)?;
    Ok(())
}

fn current_node(collector: &Collector<'_>, operation: &'static str) -> Result<NodeId, ProtocolViolation> {
    collector
        .current()
        .ok_or(ProtocolViolation::NotCollecting { operation })
}

/// A transform needs its parent to exist.
pub struct TransformRule;

impl DependencyRule<Transform> for TransformRule {
    fn collect(&self, _element: &Transform, collector: &mut Collector<'_>) -> Result<(), RuleError> {
        let node = current_node(collector, "TransformRule::collect")?;
        collector.add_parent_dependency(node)?;
        Ok(())
    }
}

/// A skinned renderer is visible output and needs its skeleton.
///
/// Bones without any vertex weight are skipped, unless they are leaf bones
/// and end bones are being preserved.
pub struct SkinnedMeshRendererRule;

impl DependencyRule<SkinnedMeshRenderer> for SkinnedMeshRendererRule {
    fn collect(&self, renderer: &SkinnedMeshRenderer, collector: &mut Collector<'_>) -> Result<(), RuleError> {
        let node = current_node(collector, "SkinnedMeshRendererRule::collect")?;
        collector.mark_entrypoint()?;
        collector.add_dependency(renderer.root_bone)?;

        let mesh = collector.mesh_info_for(node);
        let scene = collector.scene();
        let preserve_end_bone = collector.preserve_end_bone();

        for (index, bone) in renderer.bones.iter().enumerate() {
            let Some(bone) = *bone else {
                continue;
            };

            let weighted = mesh.map_or(true, |mesh| mesh.is_bone_weighted(index));
            if weighted || (preserve_end_bone && is_end_bone(scene, bone)) {
                collector.add_bone_dependency(bone)?;
            }
        }
        Ok(())
    }
}

fn is_end_bone(scene: &SceneGraph, bone: NodeId) -> bool {
    scene
        .owner_of(bone)
        .and_then(|owner| scene.object(owner))
        .is_some_and(|object| object.children().is_empty())
}
