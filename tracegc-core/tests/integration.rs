//! Integration Tests for the Unused-Object Trace
//!
//! These tests run whole builds over small scenes and check the properties
//! the trace must hold end to end.

use smallvec::{smallvec, SmallVec};

use tracegc_core::collect::{Collector, HierarchyActiveness, NoMeshInfo, RuleRegistry};
use tracegc_core::graph::{EdgeKind, NodeId};
use tracegc_core::report::UNKNOWN_TYPE;
use tracegc_core::scene::{Activation, Element, ObjectId, ObjectRef};
use tracegc_core::{trace_unused, BuildReport, RuleError, SceneGraph, TraceConfig, TraceOutcome};

/// Always needed, needs its target.
struct Emitter {
    target: Option<NodeId>,
}
impl Element for Emitter {}

/// Needs its target only while it can run.
struct Relay {
    target: Option<NodeId>,
}
impl Element for Relay {}

/// Needs its target even while it cannot run.
struct Anchor {
    target: Option<NodeId>,
}
impl Element for Anchor {}

/// Has no registered rule.
struct Opaque {
    target: ObjectId,
}
impl Element for Opaque {
    fn references(&self) -> SmallVec<[ObjectRef; 4]> {
        smallvec![ObjectRef::Object(self.target)]
    }
}

fn registry() -> RuleRegistry {
    let mut registry = RuleRegistry::with_standard_rules().unwrap();
    registry
        .register_fn(|emitter: &Emitter, collector: &mut Collector<'_>| {
            collector.mark_entrypoint()?;
            collector.add_dependency(emitter.target)?;
            Ok(())
        })
        .unwrap();
    registry
        .register_fn(|relay: &Relay, collector: &mut Collector<'_>| {
            collector.add_dependency(relay.target)?;
            Ok(())
        })
        .unwrap();
    registry
        .register_fn(|anchor: &Anchor, collector: &mut Collector<'_>| {
            collector.add_dependency(anchor.target)?.even_if_dependant_disabled();
            Ok(())
        })
        .unwrap();
    registry
}

fn run(scene: &SceneGraph, registry: &RuleRegistry, config: &TraceConfig) -> (TraceOutcome, BuildReport) {
    let activeness = HierarchyActiveness::cached(scene);
    let mut report = BuildReport::new();
    let outcome = trace_unused(scene, registry, &activeness, &NoMeshInfo, config, &mut report).unwrap();
    (outcome, report)
}

/// E -> X -> Y, with Z isolated on its own object.
#[test]
fn reachability_from_entrypoints() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let isolated = scene.add_object("Isolated", None).unwrap();

    let y = scene.add_element(root, Relay { target: None }).unwrap();
    let x = scene.add_element(root, Relay { target: Some(y) }).unwrap();
    let e = scene.add_element(root, Emitter { target: Some(x) }).unwrap();
    let z = scene.add_element(isolated, Relay { target: None }).unwrap();

    let (outcome, report) = run(&scene, &registry(), &TraceConfig::default());

    for node in [e, x, y] {
        assert!(outcome.is_used(node), "{node} should be used");
    }
    assert!(!outcome.is_used(z));
    assert!(outcome.reachability().is_removable(z));
    assert_eq!(outcome.removable_objects(&scene), vec![isolated]);
    assert!(report.is_empty());
}

#[test]
fn entrypoint_without_inbound_edges_is_retained() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let lonely = scene.add_element(root, Emitter { target: None }).unwrap();

    let (outcome, _) = run(&scene, &registry(), &TraceConfig::default());

    assert!(outcome.infos().info(lonely).unwrap().is_entrypoint());
    assert!(outcome.is_used(lonely));
}

#[test]
fn collection_is_idempotent() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let child = scene.add_object("Child", Some(root)).unwrap();
    let relay = scene.add_element(child, Relay { target: None }).unwrap();
    scene.add_element(root, Emitter { target: Some(relay) }).unwrap();
    scene.add_element(child, Opaque { target: root }).unwrap();

    let registry = registry();
    let (first, _) = run(&scene, &registry, &TraceConfig::default());
    let (second, _) = run(&scene, &registry, &TraceConfig::default());

    assert_eq!(first.infos(), second.infos());
    assert_eq!(first.reachability(), second.reachability());
}

#[test]
fn edges_to_the_same_target_are_merged() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let child = scene.add_object("Child", Some(root)).unwrap();
    let node = scene.add_element(child, Relay { target: None }).unwrap();

    let mut registry = RuleRegistry::with_standard_rules().unwrap();
    registry
        .register_fn(|_: &Relay, collector: &mut Collector<'_>| {
            let Some(node) = collector.current() else {
                return Err(RuleError::failed("not collecting"));
            };
            let parent = collector.scene().parent_transform(node);
            collector.add_bone_dependency(parent)?;
            collector.add_parent_dependency(node)?;
            Ok(())
        })
        .unwrap();

    let (outcome, _) = run(&scene, &registry, &TraceConfig::default());

    let parent = scene.transform_of(root).unwrap();
    let info = outcome.infos().info(node).unwrap();
    assert_eq!(info.dependency_kind(parent), Some(EdgeKind::BONE | EdgeKind::PARENT));
    assert_eq!(info.dependencies().keys().filter(|&&key| key == parent).count(), 1);
}

#[test]
fn disabled_dependant_drops_default_edges() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let target = scene.add_element(root, Relay { target: None }).unwrap();
    let relay = scene.add_element(root, Relay { target: Some(target) }).unwrap();
    let anchor = scene.add_element(root, Anchor { target: Some(target) }).unwrap();
    scene.set_element_activation(relay, Activation::Inactive).unwrap();
    scene.set_element_activation(anchor, Activation::Inactive).unwrap();

    let (outcome, _) = run(&scene, &registry(), &TraceConfig::default());

    assert!(!outcome.infos().info(relay).unwrap().depends_on(target));
    assert!(outcome.infos().info(anchor).unwrap().depends_on(target));
}

#[test]
fn unknown_types_are_kept_conservatively() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let hidden = scene.add_object("Hidden", None).unwrap();
    let opaque = scene.add_element(root, Opaque { target: hidden }).unwrap();
    scene.set_element_activation(opaque, Activation::Inactive).unwrap();
    scene.set_object_activation(hidden, Activation::Inactive).unwrap();

    let (outcome, report) = run(&scene, &registry(), &TraceConfig::default());

    let hidden_transform = scene.transform_of(hidden).unwrap();
    let info = outcome.infos().info(opaque).unwrap();
    assert!(info.is_entrypoint());
    assert!(info.depends_on(hidden_transform));
    assert!(outcome.is_used(hidden_transform));

    let warnings: Vec<_> = report.with_code(UNKNOWN_TYPE).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].context, Some(opaque));
    assert_eq!(warnings[0].args, vec!["Opaque".to_string()]);
}

#[test]
fn second_declaration_commits_the_first_on_its_own_terms() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let b = scene.add_element(root, Relay { target: None }).unwrap();
    let c = scene.add_element(root, Relay { target: None }).unwrap();
    let back_to_back = scene.add_element(root, Anchor { target: None }).unwrap();
    let alone = scene.add_element(root, Emitter { target: None }).unwrap();
    scene.set_element_activation(back_to_back, Activation::Inactive).unwrap();
    scene.set_element_activation(alone, Activation::Inactive).unwrap();

    let mut registry = RuleRegistry::with_standard_rules().unwrap();
    registry
        .register_fn(move |_: &Anchor, collector: &mut Collector<'_>| {
            collector.add_dependency(b)?;
            collector.add_dependency(c)?.even_if_dependant_disabled();
            Ok(())
        })
        .unwrap();
    registry
        .register_fn(move |_: &Emitter, collector: &mut Collector<'_>| {
            collector.add_dependency(b)?;
            Ok(())
        })
        .unwrap();

    let (outcome, _) = run(&scene, &registry, &TraceConfig::default());

    let back_to_back = outcome.infos().info(back_to_back).unwrap();
    let alone = outcome.infos().info(alone).unwrap();
    assert_eq!(back_to_back.depends_on(b), alone.depends_on(b));
    assert!(!back_to_back.depends_on(b));
    assert!(back_to_back.depends_on(c));
}

#[test]
fn excluded_objects_are_never_removed() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    let kept = scene.add_object("Kept", Some(root)).unwrap();
    let dropped = scene.add_object("Dropped", Some(root)).unwrap();

    let config = TraceConfig::from_json(&format!(r#"{{ "exclusions": [{}] }}"#, kept.index())).unwrap();
    let (outcome, _) = run(&scene, &registry(), &config);

    assert_eq!(outcome.removable_objects(&scene), vec![dropped]);
}

#[test]
fn report_serializes_to_json() {
    let mut scene = SceneGraph::new();
    let root = scene.add_object("Root", None).unwrap();
    scene.add_element(root, Opaque { target: root }).unwrap();

    let (_, report) = run(&scene, &registry(), &TraceConfig::default());

    let json = report.to_json().unwrap();
    assert!(json.contains(UNKNOWN_TYPE));
    assert!(json.contains("Opaque"));
}

#[test]
fn logging_installs_once() {
    assert!(tracegc_core::logging::init().is_ok());
    assert!(tracegc_core::logging::init().is_err());
}
