use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UmbraConfig {
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Call the host's annotation hook for every returned element.
    #[serde(default = "default_annotate")]
    pub annotate: bool,
    /// Log the full rendered script at debug level instead of only the
    /// invocation line.
    #[serde(default)]
    pub log_scripts: bool,
    /// Use this file instead of the embedded traversal script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            annotate: default_annotate(),
            log_scripts: false,
            script_path: None,
        }
    }
}

fn default_annotate() -> bool {
    true
}
