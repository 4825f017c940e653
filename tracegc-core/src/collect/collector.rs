//! Collector
//!
//! The collector is the cursor dependency rules call back into to declare
//! edges. It mediates between the rules and the [`NodeInfoHolder`].
//!
//! # Protocol
//!
//! For each node the driver calls `init`, runs the node's rule, then calls
//! `finalize_for_component`. Both belong to the driver; rules only see the
//! declaring surface.
//!
//! ```text
//! Idle --init(node)--> Active(node) --finalize_for_component--> Idle
//! ```
//!
//! Any other transition is a [`ProtocolViolation`].
//!
//! While a node is active, every `add_*` call opens a [`PendingDependency`].
//! Exactly one declaration is open at a time: opening a new one first
//! finishes the previous one, and `finalize_for_component` finishes the last.
//! Finishing a declaration either commits the edge to the dependant's record
//! or drops it, according to its activeness filters.
//!
//! # Filters
//!
//! - Dependant filter, on by default: if the dependant can never be active
//!   the edge is dropped. [`PendingDependency::even_if_dependant_disabled`]
//!   waives it.
//! - Target filter, off by default: if the dependency can never be active
//!   the edge is dropped. [`PendingDependency::only_if_target_can_be_enabled`]
//!   turns it on.

use tracing::trace;

use super::activeness::ActivenessOracle;
use super::mesh::{MeshInfo, MeshInfoProvider};
use crate::error::ProtocolViolation;
use crate::graph::{EdgeKind, NodeId, NodeInfoHolder};
use crate::scene::SceneGraph;

/// An edge that has been declared but not yet committed.
///
/// Returned by the collector's `add_*` methods so the filters can be
/// adjusted by chaining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDependency {
    dependant: NodeId,
    dependency: Option<NodeId>,
    kind: EdgeKind,
    even_if_dependant_disabled: bool,
    only_if_target_can_be_enabled: bool,
}

impl PendingDependency {
    fn new(dependant: NodeId, dependency: Option<NodeId>, kind: EdgeKind) -> Self {
        Self {
            dependant,
            dependency,
            kind,
            even_if_dependant_disabled: false,
            only_if_target_can_be_enabled: false,
        }
    }

    /// Keep the edge even if the dependant can never be active.
    pub fn even_if_dependant_disabled(&mut self) -> &mut Self {
        self.even_if_dependant_disabled = true;
        self
    }

    /// Drop the edge if the dependency can never be active.
    pub fn only_if_target_can_be_enabled(&mut self) -> &mut Self {
        self.only_if_target_can_be_enabled = true;
        self
    }

    pub fn dependant(&self) -> NodeId {
        self.dependant
    }

    pub fn dependency(&self) -> Option<NodeId> {
        self.dependency
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }
}

/// The edge-declaring surface handed to dependency rules.
pub struct Collector<'a> {
    infos: NodeInfoHolder,
    scene: &'a SceneGraph,
    activeness: &'a dyn ActivenessOracle,
    meshes: &'a dyn MeshInfoProvider,
    preserve_end_bone: bool,

    /// The node being collected, `None` while idle.
    active: Option<NodeId>,

    /// The single open declaration.
    pending: Option<PendingDependency>,
}

impl<'a> Collector<'a> {
    /// Create an idle collector that writes into `infos`.
    pub fn new(
        infos: NodeInfoHolder,
        scene: &'a SceneGraph,
        activeness: &'a dyn ActivenessOracle,
        meshes: &'a dyn MeshInfoProvider,
    ) -> Self {
        Self {
            infos,
            scene,
            activeness,
            meshes,
            preserve_end_bone: false,
            active: None,
            pending: None,
        }
    }

    /// Set whether rules should keep unweighted end bones.
    pub fn with_preserve_end_bone(mut self, preserve_end_bone: bool) -> Self {
        self.preserve_end_bone = preserve_end_bone;
        self
    }

    /// Start collecting `node`.
    pub(crate) fn init(&mut self, node: NodeId) -> Result<(), ProtocolViolation> {
        if let Some(active) = self.active {
            return Err(ProtocolViolation::InitWhileActive { active, next: node });
        }
        debug_assert!(self.pending.is_none(), "declaration left open while idle");

        self.infos.get_info(node);
        self.active = Some(node);
        Ok(())
    }

    /// Finish the last open declaration and return to idle.
    pub(crate) fn finalize_for_component(&mut self) -> Result<(), ProtocolViolation> {
        self.require_active("finalize_for_component")?;
        self.finish_pending();
        self.active = None;
        Ok(())
    }

    /// Whether a node is currently being collected.
    pub fn is_collecting(&self) -> bool {
        self.active.is_some()
    }

    /// The node currently being collected.
    pub fn current(&self) -> Option<NodeId> {
        self.active
    }

    /// Flag the current node as a build root.
    pub fn mark_entrypoint(&mut self) -> Result<(), ProtocolViolation> {
        let node = self.require_active("mark_entrypoint")?;
        self.infos.get_info(node).mark_entrypoint();
        Ok(())
    }

    /// Declare that the current node depends on `dependency`.
    ///
    /// A `None` dependency is accepted and ignored when the declaration is
    /// finished.
    pub fn add_dependency(
        &mut self,
        dependency: impl Into<Option<NodeId>>,
    ) -> Result<&mut PendingDependency, ProtocolViolation> {
        let dependant = self.require_active("add_dependency")?;
        Ok(self.open(dependant, dependency.into(), EdgeKind::NORMAL))
    }

    /// Declare that `dependant` depends on `dependency`, on behalf of a node
    /// other than the one being collected.
    pub fn add_dependency_of(
        &mut self,
        dependant: NodeId,
        dependency: impl Into<Option<NodeId>>,
    ) -> Result<&mut PendingDependency, ProtocolViolation> {
        self.require_active("add_dependency_of")?;
        Ok(self.open(dependant, dependency.into(), EdgeKind::NORMAL))
    }

    /// Declare that the current node depends on the parent of `transform`.
    ///
    /// Structural edges hold even if the current node can never be active.
    pub fn add_parent_dependency(&mut self, transform: NodeId) -> Result<(), ProtocolViolation> {
        let dependant = self.require_active("add_parent_dependency")?;
        let parent = self.scene.parent_transform(transform);
        self.open(dependant, parent, EdgeKind::PARENT)
            .even_if_dependant_disabled();
        Ok(())
    }

    /// Declare that the current node depends on `bone`.
    pub fn add_bone_dependency(&mut self, bone: impl Into<Option<NodeId>>) -> Result<(), ProtocolViolation> {
        let dependant = self.require_active("add_bone_dependency")?;
        self.open(dependant, bone.into(), EdgeKind::BONE);
        Ok(())
    }

    /// Derived mesh data for a renderer, if the build has any.
    pub fn mesh_info_for(&self, renderer: NodeId) -> Option<&'a MeshInfo> {
        self.meshes.mesh_info_for(renderer)
    }

    /// Whether unweighted end bones should be kept.
    pub fn preserve_end_bone(&self) -> bool {
        self.preserve_end_bone
    }

    /// The scene being collected.
    pub fn scene(&self) -> &'a SceneGraph {
        self.scene
    }

    /// Read the records collected so far.
    pub fn infos(&self) -> &NodeInfoHolder {
        &self.infos
    }

    /// Hand the completed records over. Fails if a node is still active.
    pub(crate) fn into_infos(self) -> Result<NodeInfoHolder, ProtocolViolation> {
        if let Some(active) = self.active {
            return Err(ProtocolViolation::StillCollecting { active });
        }
        Ok(self.infos)
    }

    fn require_active(&self, operation: &'static str) -> Result<NodeId, ProtocolViolation> {
        self.active
            .ok_or(ProtocolViolation::NotCollecting { operation })
    }

    fn open(&mut self, dependant: NodeId, dependency: Option<NodeId>, kind: EdgeKind) -> &mut PendingDependency {
        self.finish_pending();
        self.pending
            .insert(PendingDependency::new(dependant, dependency, kind))
    }

    /// Commit or drop the open declaration.
    fn finish_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let Some(dependency) = pending.dependency else {
            return;
        };

        if !pending.even_if_dependant_disabled && !self.activeness.can_ever_be_active(pending.dependant) {
            trace!(dependant = %pending.dependant, dependency = %dependency, "edge dropped: dependant can never be active");
            return;
        }

        if pending.only_if_target_can_be_enabled && !self.activeness.can_ever_be_active(dependency) {
            trace!(dependant = %pending.dependant, dependency = %dependency, "edge dropped: target can never be active");
            return;
        }

        trace!(dependant = %pending.dependant, dependency = %dependency, kind = ?pending.kind, "edge committed");
        self.infos
            .get_info(pending.dependant)
            .add_dependency(dependency, pending.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::mesh::NoMeshInfo;
    use crate::scene::ObjectId;

    struct Fixture {
        scene: SceneGraph,
        root: ObjectId,
        child: ObjectId,
    }

    fn fixture() -> Fixture {
        let mut scene = SceneGraph::new();
        let root = scene.add_object("Root", None).unwrap();
        let child = scene.add_object("Child", Some(root)).unwrap();
        Fixture { scene, root, child }
    }

    fn nodes<const N: usize>() -> [NodeId; N] {
        std::array::from_fn(|i| NodeId::new(100 + i))
    }

    fn collector<'a>(scene: &'a SceneGraph, activeness: &'a dyn ActivenessOracle) -> Collector<'a> {
        Collector::new(NodeInfoHolder::new(), scene, activeness, &NoMeshInfo)
    }

    #[test]
    fn init_while_active_is_a_violation() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a, b] = nodes();
        let mut collector = collector(&f.scene, &always);

        collector.init(a).unwrap();
        assert_eq!(
            collector.init(b),
            Err(ProtocolViolation::InitWhileActive { active: a, next: b })
        );
    }

    #[test]
    fn declarations_while_idle_are_violations() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a] = nodes();
        let mut collector = collector(&f.scene, &always);

        assert!(matches!(
            collector.add_dependency(a),
            Err(ProtocolViolation::NotCollecting { operation: "add_dependency" })
        ));
        assert!(collector.mark_entrypoint().is_err());
        assert!(collector.add_bone_dependency(a).is_err());
        assert!(collector.finalize_for_component().is_err());
    }

    #[test]
    fn state_returns_to_idle_after_finalize() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a, b] = nodes();
        let mut collector = collector(&f.scene, &always);

        collector.init(a).unwrap();
        assert_eq!(collector.current(), Some(a));
        collector.finalize_for_component().unwrap();
        assert!(!collector.is_collecting());

        collector.init(b).unwrap();
        assert_eq!(
            collector.into_infos().unwrap_err(),
            ProtocolViolation::StillCollecting { active: b }
        );
    }

    #[test]
    fn edge_kinds_are_merged() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a, b] = nodes();
        let mut collector = collector(&f.scene, &always);

        collector.init(a).unwrap();
        collector.add_bone_dependency(b).unwrap();
        collector.add_dependency(b).unwrap();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        let info = infos.info(a).unwrap();
        assert_eq!(info.dependencies().len(), 1);
        assert_eq!(info.dependency_kind(b), Some(EdgeKind::BONE | EdgeKind::NORMAL));
    }

    #[test]
    fn disabled_dependant_drops_edges_by_default() {
        let f = fixture();
        let [a, b, c] = nodes();
        let never_a = move |node: NodeId| node != a;
        let mut collector = collector(&f.scene, &never_a);

        collector.init(a).unwrap();
        collector.add_dependency(b).unwrap();
        collector.add_dependency(c).unwrap().even_if_dependant_disabled();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        let info = infos.info(a).unwrap();
        assert!(!info.depends_on(b));
        assert!(info.depends_on(c));
    }

    #[test]
    fn disabled_target_is_kept_unless_asked() {
        let f = fixture();
        let [a, b, c] = nodes();
        let targets_disabled = move |node: NodeId| node == a;
        let mut collector = collector(&f.scene, &targets_disabled);

        collector.init(a).unwrap();
        collector.add_dependency(b).unwrap();
        collector.add_dependency(c).unwrap().only_if_target_can_be_enabled();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        let info = infos.info(a).unwrap();
        assert!(info.depends_on(b));
        assert!(!info.depends_on(c));
    }

    #[test]
    fn opening_a_declaration_finishes_the_previous_one() {
        let f = fixture();
        let [a, b, c] = nodes();
        let never_a = move |node: NodeId| node != a;

        // A -> B alone, default filters
        let mut alone = collector(&f.scene, &never_a);
        alone.init(a).unwrap();
        alone.add_dependency(b).unwrap();
        alone.finalize_for_component().unwrap();
        let alone = alone.into_infos().unwrap();

        // A -> B immediately followed by A -> C
        let mut chained = collector(&f.scene, &never_a);
        chained.init(a).unwrap();
        chained.add_dependency(b).unwrap();
        chained.add_dependency(c).unwrap().even_if_dependant_disabled();
        chained.finalize_for_component().unwrap();
        let chained = chained.into_infos().unwrap();

        assert_eq!(
            alone.info(a).unwrap().depends_on(b),
            chained.info(a).unwrap().depends_on(b)
        );
        assert!(chained.info(a).unwrap().depends_on(c));
    }

    #[test]
    fn missing_dependency_is_a_no_op() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a] = nodes();
        let mut collector = collector(&f.scene, &always);

        collector.init(a).unwrap();
        collector.add_dependency(None).unwrap().even_if_dependant_disabled();
        collector.add_bone_dependency(None).unwrap();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        assert!(infos.info(a).unwrap().dependencies().is_empty());
    }

    #[test]
    fn dependency_of_other_node_writes_that_record() {
        let f = fixture();
        let always = |_: NodeId| true;
        let [a, b, c] = nodes();
        let mut collector = collector(&f.scene, &always);

        collector.init(a).unwrap();
        collector.add_dependency_of(b, c).unwrap();
        collector.mark_entrypoint().unwrap();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        assert!(infos.info(a).unwrap().is_entrypoint());
        assert!(infos.info(a).unwrap().dependencies().is_empty());
        assert_eq!(infos.info(b).unwrap().dependency_kind(c), Some(EdgeKind::NORMAL));
    }

    #[test]
    fn parent_dependency_targets_parent_transform() {
        let f = fixture();
        let child_transform = f.scene.transform_of(f.child).unwrap();
        let root_transform = f.scene.transform_of(f.root).unwrap();
        let never = |_: NodeId| false;
        let mut collector = collector(&f.scene, &never);

        collector.init(child_transform).unwrap();
        collector.add_parent_dependency(child_transform).unwrap();
        collector.finalize_for_component().unwrap();

        collector.init(root_transform).unwrap();
        collector.add_parent_dependency(root_transform).unwrap();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        assert_eq!(
            infos.info(child_transform).unwrap().dependency_kind(root_transform),
            Some(EdgeKind::PARENT)
        );
        assert!(infos.info(root_transform).unwrap().dependencies().is_empty());
    }

    #[test]
    fn bone_dependency_respects_dependant_filter() {
        let f = fixture();
        let never = |_: NodeId| false;
        let [a, b] = nodes();
        let mut collector = collector(&f.scene, &never);

        collector.init(a).unwrap();
        collector.add_bone_dependency(b).unwrap();
        collector.finalize_for_component().unwrap();

        let infos = collector.into_infos().unwrap();
        assert!(!infos.info(a).unwrap().depends_on(b));
    }
}
