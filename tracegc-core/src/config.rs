//! Build configuration.

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::scene::ObjectId;

/// Configuration of one unused-object trace.
///
/// - `remove_unused_objects`: run the trace at all; when off every node is
///   reported as used
/// - `preserve_end_bone`: keep unweighted leaf bones of skinned renderers
/// - `exclusions`: objects whose whole subtree is always retained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub remove_unused_objects: bool,
    pub preserve_end_bone: bool,
    pub exclusions: Vec<ObjectId>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            remove_unused_objects: true,
            preserve_end_bone: false,
            exclusions: Vec::new(),
        }
    }
}

impl TraceConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        Ok(serde_json::from_str(json)?)
    }
}
