//! Dependency Collection
//!
//! This module fills the usage graph. Every element type has a rule that,
//! given an element and a [`Collector`], declares what the element needs.
//!
//! # Protocol
//!
//! The collector is either idle or collecting exactly one node:
//!
//! ```text
//! Idle --init(n)--> Active(n) --finalize_for_component--> Idle
//! ```
//!
//! While a node is active, `add_dependency` opens a declaration that can be
//! refined with builder calls. The declaration is committed (or dropped by
//! its filters) when the next one opens or the node is finalized, so there
//! is never more than one open declaration.
//!
//! # Components
//!
//! - [`Collector`]: the per-node state machine and its edge filters
//! - [`RuleRegistry`]: exact-type lookup from element type to rule
//! - [`DependencyCollector`]: runs the whole collection pass
//! - [`ActivenessOracle`]: the "can this node ever run?" predicate
//! - [`MeshInfoProvider`]: derived mesh data consulted by renderer rules

mod activeness;
mod builder;
mod collector;
mod mesh;
mod registry;

pub use activeness::{ActivenessCache, ActivenessOracle, HierarchyActiveness};
pub use builder::{fallback_dependencies, DependencyCollector};
pub use collector::{Collector, PendingDependency};
pub use mesh::{BoneInfo, MeshInfo, MeshInfoProvider, NoMeshInfo};
pub use registry::{AnyRule, DependencyRule, RuleRegistry};
