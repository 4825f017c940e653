//! Error types.
//!
//! Three layers:
//!
//! - [`ProtocolViolation`]: a rule or driver misused the collector. These are
//!   bugs, and they abort the build instead of producing a half-built graph.
//! - [`RuleError`]: what a dependency rule returns. Anything other than a
//!   protocol violation is reported against the node and collection goes on.
//! - [`TraceError`]: failures of a whole build.

use thiserror::Error;

use crate::graph::NodeId;
use crate::scene::ObjectId;

/// Misuse of the collector's open/close protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// `init` was called while another node was still being collected.
    #[error("collector initialized for {next} while {active} is still being collected")]
    InitWhileActive { active: NodeId, next: NodeId },

    /// An operation that needs an active node was called while idle.
    #[error("`{operation}` called while no node is being collected")]
    NotCollecting { operation: &'static str },

    /// A rule left the collector on a different node than the one it was
    /// handed.
    #[error("rule for {expected} left the collector on {actual}")]
    NodeSwitched { expected: NodeId, actual: NodeId },

    /// The records were requested before the last node was finalized.
    #[error("{active} was never finalized")]
    StillCollecting { active: NodeId },
}

/// Error returned from a dependency rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    /// The rule was dispatched with an element of a different type.
    #[error("rule for `{expected}` received an element of another type")]
    ElementMismatch { expected: &'static str },

    /// The rule failed while computing its dependencies.
    #[error("{0}")]
    Failed(String),
}

impl RuleError {
    /// Create a rule failure from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Error that aborts a build.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("dependency collection protocol violated: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("a rule is already registered for `{type_name}`")]
    DuplicateRule { type_name: &'static str },

    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The scene ran out of 32-bit ids.
    #[error("scene cannot hold more {what}")]
    CapacityExceeded { what: &'static str },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
