//! TraceGC Core
//!
//! This crate finds the parts of a scene hierarchy that can never have an
//! effect, so a build step can strip them. It implements:
//!
//! - A usage graph recording what each element needs to keep working
//! - Per-type dependency rules with a conservative fallback
//! - A collector protocol with activeness-based edge filtering
//! - Mark-and-sweep reachability from entrypoints
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `scene`: the object hierarchy and the elements attached to it
//! - `graph`: per-node records and the mark phase
//! - `collect`: the collector, the rule registry and the collection pass
//! - `rules`: rules for the built-in element types
//! - `pipeline`: collection and marking as a single call
//! - `report`: diagnostics emitted during a build
//!
//! # Example
//!
//! ```rust,ignore
//! use tracegc_core::collect::{HierarchyActiveness, NoMeshInfo, RuleRegistry};
//! use tracegc_core::{trace_unused, BuildReport, SceneGraph, TraceConfig};
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.add_object("Root", None)?;
//! let unused = scene.add_object("Unused", Some(root))?;
//!
//! let registry = RuleRegistry::with_standard_rules()?;
//! let activeness = HierarchyActiveness::cached(&scene);
//! let mut report = BuildReport::new();
//!
//! let outcome = trace_unused(&scene, &registry, &activeness, &NoMeshInfo, &TraceConfig::default(), &mut report)?;
//! assert!(outcome.removable_objects(&scene).contains(&unused));
//! ```

pub mod collect;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod scene;

pub use config::TraceConfig;
pub use error::{ProtocolViolation, RuleError, TraceError};
pub use pipeline::{trace_unused, TraceOutcome};
pub use report::BuildReport;
pub use scene::SceneGraph;
