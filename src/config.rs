use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregators::{GradeAggregator, ZeroWeightPolicy};
use crate::error::{GradingError, Result};
use crate::filetypes::{ExtensionPolicy, TokenCharset};

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "PEER_GRADING_CONFIG";

/// Policy choices for the grading core.
///
/// Stored as a plain JSON object on disk; every field is optional:
/// ```json
/// {
///   "zero_weight_policy": "disqualify",
///   "extension_charset": { "kind": "restricted", "extra": ["-", "_"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradingConfig {
    pub zero_weight_policy: ZeroWeightPolicy,
    pub extension_charset: TokenCharset,
}

impl GradingConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| GradingError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads from the file named by [`CONFIG_ENV`], or defaults if unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn aggregator(&self) -> GradeAggregator {
        GradeAggregator::new(self.zero_weight_policy)
    }

    pub fn extension_policy(&self) -> ExtensionPolicy {
        ExtensionPolicy::new(self.extension_charset.clone())
    }
}
