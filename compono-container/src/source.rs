//! Discovered sources and the discovery seam.
//!
//! A [`Source`] is one module handed over by a discovery collaborator: its
//! path, its export, and its metadata. The container derives the component
//! name from the path and reads the component options from the metadata
//! entry named by the configured namespace.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::definition::Definition;
use crate::error::{BoxError, Error, Result};
use crate::options::ComponentOptions;
use crate::provider::Provider;

/// What a source exports.
#[derive(Clone)]
pub enum Export {
    /// A single component definition.
    Definition(Definition),
    /// A provider registering its own components.
    Provider(Arc<dyn Provider>),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Definition(definition) => f.debug_tuple("Definition").field(definition).finish(),
            Export::Provider(provider) => f.debug_tuple("Provider").field(&provider.name()).finish(),
        }
    }
}

/// A discovered module.
#[derive(Debug, Clone)]
pub struct Source {
    /// Path relative to the discovery root, e.g. `services/config.js`.
    pub path: String,
    pub export: Export,
    /// Metadata attached to the module, keyed by namespace.
    pub metadata: Map<String, Value>,
}

impl Source {
    /// A source exporting a single definition.
    pub fn definition(path: impl Into<String>, definition: Definition) -> Self {
        Self {
            path: path.into(),
            export: Export::Definition(definition),
            metadata: Map::new(),
        }
    }

    /// A source exporting a provider.
    pub fn provider(path: impl Into<String>, provider: impl Provider + 'static) -> Self {
        Self {
            path: path.into(),
            export: Export::Provider(Arc::new(provider)),
            metadata: Map::new(),
        }
    }

    /// Attaches a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Reads the component options declared under `namespace`.
    ///
    /// # Errors
    /// [`Error::InvalidOptions`] if the entry is missing, is not an options
    /// map, or does not deserialize into [`ComponentOptions`].
    pub fn options(&self, namespace: &str) -> Result<ComponentOptions> {
        let invalid = |reason: String| Error::InvalidOptions {
            subject: self.path.clone(),
            reason,
        };

        match self.metadata.get(namespace) {
            Some(declaration @ Value::Object(_)) => {
                ComponentOptions::deserialize(declaration).map_err(|e| invalid(e.to_string()))
            }
            Some(_) => Err(invalid(format!("invalid namespace declaration `{namespace}`, expected a map"))),
            None => Err(invalid(format!("missing namespace declaration `{namespace}`"))),
        }
    }
}

/// Produces the sources a container registers in one batch.
///
/// Implementations typically walk a directory tree; the container only
/// consumes the result.
#[async_trait]
pub trait Discover: Send + Sync {
    async fn discover(&self) -> std::result::Result<Vec<Source>, BoxError>;
}

/// A fixed list of sources.
#[async_trait]
impl Discover for Vec<Source> {
    async fn discover(&self) -> std::result::Result<Vec<Source>, BoxError> {
        Ok(self.clone())
    }
}
