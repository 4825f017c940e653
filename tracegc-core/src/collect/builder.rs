//! Graph Builder
//!
//! Drives the registry and the collector over every node of a build.
//!
//! # How It Works
//!
//! For each node known to the holder:
//!
//! 1. `init` the collector with the node
//! 2. An element other than a transform depends on its object's transform
//! 3. Elements under an excluded object are marked entrypoints
//! 4. Run the rule registered for the element's exact type, or the fallback
//!    rule with a warning naming the type
//! 5. `finalize_for_component`
//!
//! A rule that fails is reported against its node and the node's partial
//! record is still finalized; collection goes on with the next node. A
//! protocol violation aborts the whole build, and so does a rule that
//! leaves the collector on another node.

use tracing::{debug, debug_span};

use super::activeness::ActivenessOracle;
use super::collector::Collector;
use super::mesh::MeshInfoProvider;
use super::registry::RuleRegistry;
use crate::config::TraceConfig;
use crate::error::{ProtocolViolation, RuleError, TraceError};
use crate::graph::{NodeId, NodeInfoHolder};
use crate::report::{BuildReport, RULE_FAILED, UNKNOWN_TYPE};
use crate::scene::{Element, ElementEntry, SceneGraph};

/// Collects every dependency of every element of a scene.
pub struct DependencyCollector<'a> {
    scene: &'a SceneGraph,
    registry: &'a RuleRegistry,
    activeness: &'a dyn ActivenessOracle,
    meshes: &'a dyn MeshInfoProvider,
    config: &'a TraceConfig,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(
        scene: &'a SceneGraph,
        registry: &'a RuleRegistry,
        activeness: &'a dyn ActivenessOracle,
        meshes: &'a dyn MeshInfoProvider,
        config: &'a TraceConfig,
    ) -> Self {
        Self {
            scene,
            registry,
            activeness,
            meshes,
            config,
        }
    }

    /// Run the collection pass over every element of the scene.
    pub fn collect_all_usages(&self, report: &mut BuildReport) -> Result<NodeInfoHolder, TraceError> {
        self.collect_into(NodeInfoHolder::with_nodes(self.scene.elements()), report)
    }

    /// Run the collection pass over the nodes already present in `infos`.
    pub fn collect_into(&self, infos: NodeInfoHolder, report: &mut BuildReport) -> Result<NodeInfoHolder, TraceError> {
        let nodes: Vec<NodeId> = infos.nodes().collect();
        let mut collector = Collector::new(infos, self.scene, self.activeness, self.meshes)
            .with_preserve_end_bone(self.config.preserve_end_bone);

        for node in nodes {
            let Some(entry) = self.scene.element(node) else {
                debug!(node = %node, "skipping node without a scene element");
                continue;
            };

            let _span = debug_span!("collect", node = %node, element = entry.type_name()).entered();

            collector.init(node)?;
            let result = self.collect_node(node, entry, &mut collector, report);
            if let Some(actual) = collector.current().filter(|&actual| actual != node) {
                return Err(ProtocolViolation::NodeSwitched { expected: node, actual }.into());
            }
            if let Err(err) = result {
                match err {
                    RuleError::Protocol(violation) => return Err(violation.into()),
                    other => report.error(RULE_FAILED, Some(node), [entry.type_name().to_string(), other.to_string()]),
                }
            }
            collector.finalize_for_component()?;
        }

        Ok(collector.into_infos()?)
    }

    fn collect_node(
        &self,
        node: NodeId,
        entry: &ElementEntry,
        collector: &mut Collector<'_>,
        report: &mut BuildReport,
    ) -> Result<(), RuleError> {
        if !entry.is_transform() {
            // an element requires its object
            collector
                .add_dependency(self.scene.transform_of(entry.object()))?
                .even_if_dependant_disabled();
        }

        if self.is_excluded(entry) {
            collector.mark_entrypoint()?;
        }

        match self.registry.try_get_rule(entry.type_id()) {
            Some(rule) => rule.collect_element(entry.element(), collector),
            None => {
                report.warn(UNKNOWN_TYPE, Some(node), [entry.type_name()]);
                fallback_dependencies(self.scene, entry.element(), collector)
            }
        }
    }

    fn is_excluded(&self, entry: &ElementEntry) -> bool {
        self.config
            .exclusions
            .iter()
            .any(|&root| self.scene.is_in_subtree(entry.object(), root))
    }
}

/// Rule for element types nobody registered a rule for.
///
/// Assumes the element is always needed and that every object it references
/// is needed too, whether or not the element can ever be active.
pub fn fallback_dependencies(
    scene: &SceneGraph,
    element: &dyn Element,
    collector: &mut Collector<'_>,
) -> Result<(), RuleError> {
    collector.mark_entrypoint()?;
    for reference in element.references() {
        collector
            .add_dependency(scene.resolve(reference))?
            .even_if_dependant_disabled();
    }
    Ok(())
}
