//! Engine configuration
//!
//! The engine consumes this configuration; loading it (from a plugin config
//! file, CLI flags, or anywhere else) is the host's business.

use serde::{Deserialize, Serialize};

/// Tunables for template processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nested-expansion depth before an inner token renders
    /// literally.
    pub max_recursion_depth: usize,
    /// Whether `{{` / `}}` render as literal single braces.
    pub brace_escape: bool,
    /// Template used by color rules; `{color}` and `{value}` are
    /// substituted.
    pub color_template: String,
    /// Capacity of the processor's compiled-template LRU cache.
    pub template_cache_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 12,
            brace_escape: true,
            color_template: "{color}{value}".to_string(),
            template_cache_size: 256,
        }
    }
}
