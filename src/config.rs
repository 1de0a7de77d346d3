//! Accessor configuration.
//!
//! Defaults match the classic dotted syntax. Mods that ship their own
//! settings file can load the same struct from YAML:
//!
//! ```yaml
//! separator: "/"
//! log_misses: false
//! ```

use serde::{Deserialize, Serialize};

use crate::err_msg;
use crate::path::DEFAULT_SEPARATOR;
use crate::ModkitError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessorConfig {
    /// Character that splits a path into segments.
    pub separator: char,
    /// Emit a `trace` event for every path that does not resolve.
    pub log_misses: bool,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            log_misses: true,
        }
    }
}

impl AccessorConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ModkitError> {
        serde_yaml::from_str(text).map_err(|e| ModkitError::Config {
            message: format!("invalid accessor config: {}", e),
            ctx: crate::ErrorContext::none(),
            source: Some(Box::new(e)),
        })
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ModkitError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| err_msg!(Config, "cannot read {}: {}", path.display(), e))?;
        Self::from_yaml_str(&text)
    }
}
