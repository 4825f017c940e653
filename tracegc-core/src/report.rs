//! Build Report
//!
//! The diagnostics sink of a build. Every message carries a severity, a
//! stable code, the node it is about (if any), and its arguments. Messages
//! are kept for tooling and mirrored to `tracing` as they are pushed.
//!
//! The report is passed explicitly to whatever needs to write to it; there
//! is no process-wide sink.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::graph::NodeId;

/// An element type had no registered rule and the fallback rule was used.
pub const UNKNOWN_TYPE: &str = "trace:warn:unknown-type";

/// A rule failed while collecting the dependencies of a node.
pub const RULE_FAILED: &str = "trace:error:rule-failed";

/// Unused-object removal is disabled by configuration.
pub const REMOVAL_DISABLED: &str = "trace:info:removal-disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One reported message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub context: Option<NodeId>,
    pub args: Vec<String>,
}

/// Collected diagnostics of one build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic.
    pub fn log<I, S>(&mut self, severity: Severity, code: &'static str, context: Option<NodeId>, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let node = context.map(|node| node.to_string()).unwrap_or_default();

        match severity {
            Severity::Info => info!(code, node = %node, ?args, "diagnostic"),
            Severity::Warning => warn!(code, node = %node, ?args, "diagnostic"),
            Severity::Error => error!(code, node = %node, ?args, "diagnostic"),
        }

        self.diagnostics.push(Diagnostic {
            severity,
            code,
            context,
            args,
        });
    }

    pub fn info<I, S>(&mut self, code: &'static str, context: Option<NodeId>, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log(Severity::Info, code, context, args);
    }

    pub fn warn<I, S>(&mut self, code: &'static str, context: Option<NodeId>, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log(Severity::Warning, code, context, args);
    }

    pub fn error<I, S>(&mut self, code: &'static str, context: Option<NodeId>, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.log(Severity::Error, code, context, args);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate diagnostics with the given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |diagnostic| diagnostic.code == code)
    }

    /// Whether any error was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Serialize the report for external tooling.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
