//! Container-wide settings.
//!
//! ```
//! use compono_container::settings::ContainerSettings;
//!
//! let settings = ContainerSettings::from_json(r#"{
//!     "namespace": "ioc",
//!     "defaults": { "singleton": true },
//!     "exclude": ["index.js"]
//! }"#).unwrap();
//!
//! assert_eq!(settings.namespace, "ioc");
//! assert_eq!(settings.defaults.singleton, Some(true));
//! ```

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::options::ComponentOptions;

/// Metadata key under which discovered sources declare their options.
pub const DEFAULT_NAMESPACE: &str = "inject";

/// Settings applied to every registration made through a container.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Metadata key holding a source's component options.
    pub namespace: String,
    /// Options merged into every registration; explicit options win.
    pub defaults: ComponentOptions,
    /// Source paths skipped during batch registration.
    pub exclude: Vec<String>,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            defaults: ComponentOptions::default(),
            exclude: Vec::new(),
        }
    }
}

impl ContainerSettings {
    /// Parses settings from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOptions {
            subject: "container settings".to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns `true` if sources at `path` are skipped.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|excluded| excluded == path)
    }
}
