//! Registered components and their lifecycle.
//!
//! A [`Component`] couples a [`Definition`] with its resolved options.
//! Loading it resolves the required dependencies, instantiates the
//! definition according to its [`Kind`], runs the init hook, and caches the
//! instance for singletons.

use std::fmt;

use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::container::{Container, ResolutionPath};
use crate::definition::Definition;
use crate::error::{Error, Result};
use crate::instance::{Dependencies, Instance};
use crate::options::{ComponentOptions, Kind, RequireSpec};
use crate::scope::Scope;

/// A named component in the registry.
pub struct Component {
    name: String,
    definition: Definition,
    require: RequireSpec,
    scope: Scope,
    kind: Kind,
    init: Option<String>,
    /// Singleton instance. Concurrent first loads share one initialization.
    instance: OnceCell<Instance>,
}

impl Component {
    pub(crate) fn new(name: String, definition: Definition, options: ComponentOptions) -> Self {
        let kind = options.kind.unwrap_or_else(|| definition.default_kind());
        Self {
            name,
            require: options.require.unwrap_or_default(),
            scope: Scope::from_singleton(options.singleton.unwrap_or(false)),
            kind,
            init: options.init,
            definition,
            instance: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn require(&self) -> &RequireSpec {
        &self.require
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Name of the init hook run after instantiation, if any.
    pub fn init(&self) -> Option<&str> {
        self.init.as_deref()
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Returns `true` once a singleton instance has been cached.
    pub fn is_loaded(&self) -> bool {
        self.instance.initialized()
    }

    /// Names this component requires, in declaration order.
    pub fn dependencies(&self) -> Vec<&str> {
        self.require.names()
    }

    /// Produces the component's instance.
    ///
    /// Singletons return the cached instance, or share the in-flight
    /// creation when another load got there first. A failed creation is not
    /// cached, so the next load tries again.
    pub(crate) async fn load(&self, container: &Container, path: &ResolutionPath) -> Result<Instance> {
        let result = if self.scope.is_cached() {
            if let Some(instance) = self.instance.get() {
                trace!(component = %self.name, "Returning cached instance");
                return Ok(instance.clone());
            }
            self.instance
                .get_or_try_init(|| self.create(container, path))
                .await
                .cloned()
        } else {
            self.create(container, path).await
        };

        result.map_err(|err| err.within(&self.name))
    }

    async fn create(&self, container: &Container, path: &ResolutionPath) -> Result<Instance> {
        debug!(component = %self.name, kind = %self.kind, scope = %self.scope, "Creating component");

        let dependencies = container.resolve_dependencies(&self.require, path).await?;
        path.clone().enter(self.run_definition(dependencies)).await
    }

    /// Instantiates the definition and runs its init hook.
    async fn run_definition(&self, dependencies: Dependencies) -> Result<Instance> {
        let instance = self.definition.instantiate(self.kind, dependencies).await?;

        if let Some(method) = &self.init {
            match self.definition.init_hook(method) {
                Some(hook) => {
                    debug!(component = %self.name, method = %method, "Initializing component");
                    hook(instance.clone()).await.map_err(Error::from_definition)?;
                }
                None => trace!(component = %self.name, method = %method, "No init hook by that name"),
            }
        }

        Ok(instance)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("require", &self.require)
            .field("scope", &self.scope)
            .field("kind", &self.kind)
            .field("init", &self.init)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::instance::Object;

    #[test]
    fn options_resolve_onto_component() {
        let component = Component::new(
            "services/foo".to_string(),
            Definition::object(Object::new()),
            ComponentOptions::new().require(["config"]).singleton(true).init("start"),
        );

        assert_eq!(component.name(), "services/foo");
        assert_eq!(component.scope(), Scope::Singleton);
        assert_eq!(component.kind(), Kind::Template);
        assert_eq!(component.init(), Some("start"));
        assert_eq!(component.dependencies(), vec!["config"]);
        assert!(!component.is_loaded());
    }

    #[test]
    fn defaults_when_options_are_empty() {
        let component = Component::new(
            "config".to_string(),
            Definition::factory(|_deps| async { Ok::<_, BoxError>(1u8) }),
            ComponentOptions::new(),
        );

        assert_eq!(component.scope(), Scope::Transient);
        assert_eq!(component.kind(), Kind::Factory);
        assert!(component.require().is_none());
        assert!(component.init().is_none());
    }

    #[test]
    fn explicit_kind_wins() {
        let component = Component::new(
            "foo".to_string(),
            Definition::constructor(|_deps| Ok::<_, BoxError>(1u8)),
            ComponentOptions::new().kind(Kind::Constructor),
        );
        assert_eq!(component.kind(), Kind::Constructor);
    }
}
