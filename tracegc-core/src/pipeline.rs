//! Unused-object trace.
//!
//! Collection followed by the mark phase, as one call. With removal
//! disabled neither runs and every element is reported used.

use tracing::info;

use crate::collect::{ActivenessOracle, DependencyCollector, MeshInfoProvider, RuleRegistry};
use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::graph::{NodeId, NodeInfoHolder, Reachability};
use crate::report::{BuildReport, REMOVAL_DISABLED};
use crate::scene::{ObjectId, SceneGraph};

/// Frozen result of a trace.
#[derive(Debug, Clone)]
pub struct TraceOutcome {
    infos: NodeInfoHolder,
    reachability: Reachability,
}

impl TraceOutcome {
    /// The completed usage graph.
    pub fn infos(&self) -> &NodeInfoHolder {
        &self.infos
    }

    pub fn reachability(&self) -> &Reachability {
        &self.reachability
    }

    pub fn is_used(&self, node: NodeId) -> bool {
        self.reachability.is_used(node)
    }

    pub fn removable(&self) -> &[NodeId] {
        self.reachability.removable()
    }

    /// Objects none of whose elements is used, in scene order.
    ///
    /// An object with a used descendant is never removable, because that
    /// descendant's transform depends on the object's transform.
    pub fn removable_objects(&self, scene: &SceneGraph) -> Vec<ObjectId> {
        scene
            .objects()
            .filter(|&id| {
                scene
                    .object(id)
                    .is_some_and(|object| object.elements().iter().all(|&node| !self.is_used(node)))
            })
            .collect()
    }
}

/// Build the usage graph of `scene` and find what is never used.
pub fn trace_unused(
    scene: &SceneGraph,
    registry: &RuleRegistry,
    activeness: &dyn ActivenessOracle,
    meshes: &dyn MeshInfoProvider,
    config: &TraceConfig,
    report: &mut BuildReport,
) -> Result<TraceOutcome, TraceError> {
    let (infos, reachability) = if config.remove_unused_objects {
        let infos = DependencyCollector::new(scene, registry, activeness, meshes, config).collect_all_usages(report)?;
        let reachability = Reachability::mark(&infos);
        (infos, reachability)
    } else {
        report.info(REMOVAL_DISABLED, None, std::iter::empty::<String>());
        let infos = NodeInfoHolder::with_nodes(scene.elements());
        let reachability = Reachability::retain_all(&infos);
        (infos, reachability)
    };

    info!(
        nodes = infos.len(),
        entrypoints = infos.entrypoint_count(),
        used = reachability.used().len(),
        removable = reachability.removable().len(),
        "trace complete"
    );

    Ok(TraceOutcome { infos, reachability })
}
