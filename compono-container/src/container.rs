//! # The Container
//!
//! The container registers components by name, validates their declared
//! dependencies, and loads them on request.
//!
//! # Architecture
//! ```text
//! Discover ──sources──> register_sources() ──┐
//! ContainerBuilder ──build()─────────────────┼──> Container ──load()──> Resolved
//! Provider ──add_provider()──────────────────┘
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use compono_container::prelude::*;
//!
//! struct Config {
//!     greeting: String,
//! }
//!
//! struct Greeter {
//!     config: Arc<Config>,
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> compono_container::error::Result<()> {
//! let container = Container::builder()
//!     .register(
//!         "config",
//!         Definition::factory(|_deps| async {
//!             Ok::<_, BoxError>(Config { greeting: "Hello World!".into() })
//!         }),
//!         ComponentOptions::new().singleton(true),
//!     )
//!     .register(
//!         "greeter",
//!         Definition::constructor(|deps: Dependencies| -> std::result::Result<Greeter, BoxError> {
//!             Ok(Greeter { config: deps.arg(0)? })
//!         }),
//!         ComponentOptions::new().require(["config"]),
//!     )
//!     .build()?;
//!
//! let greeter: Arc<Greeter> = container.get("greeter").await?;
//! assert_eq!(greeter.config.greeting, "Hello World!");
//! # Ok(())
//! # }
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use compono_support::naming::component_name;
use compono_support::rendering::{render_chain, suggest_similar};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::component::Component;
use crate::definition::Definition;
use crate::error::{CircularDependencyError, Error, Result, UnknownComponentError};
use crate::graph::GraphValidator;
use crate::instance::{Dependencies, Instance, Resolved, ResolvedMap};
use crate::key::{self, Key};
use crate::options::{ComponentOptions, LoadRequest, NameEntry, NameMap, RequireSpec};
use crate::provider::{Provider, Registrar};
use crate::registry::Registry;
use crate::settings::ContainerSettings;
use crate::source::{Discover, Export, Source};

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with registered components.
///
/// Registrations are applied in order on [`build()`](ContainerBuilder::build),
/// after the settings, so defaults apply no matter where they appear in the
/// chain.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .defaults(ComponentOptions::new().singleton(true))
///     .register("config", Definition::value(Config::load()), ComponentOptions::new())
///     .add_provider(&ModelsProvider)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    settings: ContainerSettings,
    registrations: Vec<(String, Definition, ComponentOptions)>,
    failure: Option<Error>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Metadata key holding the options of discovered sources.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.settings.namespace = namespace.into();
        self
    }

    /// Options merged into every registration.
    pub fn defaults(mut self, defaults: ComponentOptions) -> Self {
        self.settings.defaults = defaults;
        self
    }

    /// Skips sources at `path` during batch registration.
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.settings.exclude.push(path.into());
        self
    }

    /// Replaces all settings at once.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers a component.
    pub fn register(mut self, name: impl Into<String>, definition: Definition, options: ComponentOptions) -> Self {
        self.registrations.push((name.into(), definition, options));
        self
    }

    /// Add a [`Provider`] module.
    ///
    /// Every registration it makes must carry a name.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        if let Err(err) = provider.register(&mut self) {
            self.failure.get_or_insert(err);
        }
        self
    }

    /// Build the container, validating the dependency graph.
    ///
    /// Checks: every name is valid, every dependency is registered, no cycles.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        info!(registered = self.registrations.len(), "Building container");

        if let Some(err) = self.failure {
            return Err(err);
        }

        let container = Container::with_settings(self.settings);
        for (name, definition, options) in self.registrations {
            container.register(name, definition, options)?;
        }
        container.validate()?;

        info!(components = container.len(), "Container built successfully");
        Ok(container)
    }
}

impl Registrar for ContainerBuilder {
    fn register(&mut self, definition: Definition, options: ComponentOptions) -> Result<()> {
        let name = options.name.clone().unwrap_or_default();
        self.registrations.push((name, definition, options));
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Thread-safe component container.
///
/// Cloning is cheap: clones share the registry and the singleton cache.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

struct Inner {
    registry: RwLock<Registry>,
    settings: ContainerSettings,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// An empty container with default settings.
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::new()),
                settings,
            }),
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.inner.settings
    }

    // ── Registration ──

    /// Registers a component under `name`, merging the container defaults
    /// into `options`. A later registration under the same name wins.
    ///
    /// Does not validate; call [`validate()`](Container::validate) once the
    /// batch is complete.
    pub fn register(&self, name: impl Into<String>, definition: Definition, options: ComponentOptions) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidName { name });
        }

        let options = options.with_defaults(&self.inner.settings.defaults);
        let component = Component::new(name, definition, options);
        debug!(
            component = %component.name(),
            scope = %component.scope(),
            kind = %component.kind(),
            "Registered component"
        );

        self.inner.registry.write().register(component);
        Ok(())
    }

    /// Runs a provider against this container. Returns the number of
    /// components it registered.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<usize> {
        self.register_provider(provider, None)
    }

    /// Registers one discovered source. Returns the number of components it
    /// registered; excluded sources register none.
    pub fn register_source(&self, source: Source) -> Result<usize> {
        if self.inner.settings.is_excluded(&source.path) {
            debug!(path = %source.path, "Skipping excluded source");
            return Ok(0);
        }

        let fallback = component_name(&source.path);
        match &source.export {
            Export::Provider(provider) => self.register_provider(provider.as_ref(), Some(fallback)),
            Export::Definition(definition) => {
                let options = source.options(&self.inner.settings.namespace)?;
                let name = options.name.clone().unwrap_or_else(|| fallback.to_string());
                self.register(name, definition.clone(), options)?;
                Ok(1)
            }
        }
    }

    /// Registers a batch of sources, then validates the whole graph.
    ///
    /// A source that fails to register is logged and skipped. Graph errors
    /// fail the batch.
    #[instrument(skip_all, name = "register_sources")]
    pub fn register_sources(&self, sources: impl IntoIterator<Item = Source>) -> Result<usize> {
        let mut registered = 0;

        for source in sources {
            let path = source.path.clone();
            trace!(path = %path, "Registering source");
            match self.register_source(source) {
                Ok(count) => registered += count,
                Err(err) => warn!(path = %path, error = %err, "Error registering source, skipping"),
            }
        }

        info!(registered, "Registered sources");
        self.validate()?;
        Ok(registered)
    }

    /// Asks the discovery collaborator for sources and registers them.
    pub async fn discover(&self, discoverer: &dyn Discover) -> Result<usize> {
        let sources = discoverer.discover().await.map_err(Error::Discovery)?;
        debug!(sources = sources.len(), "Discovered sources");
        self.register_sources(sources)
    }

    /// Validates the dependency graph of every registered component.
    pub fn validate(&self) -> Result<()> {
        let registry = self.inner.registry.read();
        GraphValidator::new(&registry).validate()?;
        Ok(())
    }

    fn register_provider(&self, provider: &dyn Provider, fallback: Option<&str>) -> Result<usize> {
        debug!(provider = provider.name(), "Running provider");
        let mut registrar = ContainerRegistrar {
            container: self,
            fallback,
            registered: 0,
        };
        provider.register(&mut registrar)?;
        Ok(registrar.registered)
    }

    // ── Loading ──

    /// Loads a name, a list of names, or a nested map of names.
    ///
    /// The result mirrors the request: a list yields a list in the same
    /// order, a map yields a map with the same keys in the same order.
    /// `all!<regex>` yields a map of matching names and `any!<regex>` a list,
    /// both in registration order, and
    /// `container!` the container itself.
    ///
    /// A load made from inside a definition, through the `container!`
    /// handle, continues the resolution branch of the component being
    /// created. Requesting a component already on that branch fails with
    /// [`Error::CircularDependency`].
    ///
    /// ```rust,ignore
    /// let foo = container.load("services/foo").await?;
    /// let pair = container.load(["config", "services/foo"]).await?;
    /// let models = container.load("all!^models/").await?;
    /// ```
    pub async fn load(&self, request: impl Into<LoadRequest>) -> Result<Resolved> {
        let root = ResolutionPath::current();
        match request.into() {
            LoadRequest::Name(name) => self.resolve_name(&name, &root).await,
            LoadRequest::List(names) => self.resolve_list(&names, &root).await.map(Resolved::List),
            LoadRequest::Map(map) => self.resolve_map(&map, &root).await.map(Resolved::Map),
        }
    }

    /// Loads a request given as JSON: a string, an array of strings, or a
    /// nested object of strings.
    pub async fn load_value(&self, request: serde_json::Value) -> Result<Resolved> {
        let request = LoadRequest::try_from(request)?;
        self.load(request).await
    }

    /// Loads a single component and downcasts its instance.
    pub async fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let resolved = self.load(name).await?;
        resolved.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    // ── Introspection ──

    pub fn contains(&self, name: &str) -> bool {
        self.inner.registry.read().contains(name)
    }

    pub fn component(&self, name: &str) -> Option<Arc<Component>> {
        self.inner.registry.read().get(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner.registry.read().names().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.read().is_empty()
    }

    // ── Resolution ──

    pub(crate) async fn resolve_dependencies(&self, require: &RequireSpec, path: &ResolutionPath) -> Result<Dependencies> {
        match require {
            RequireSpec::None => Ok(Dependencies::None),
            RequireSpec::List(names) => self.resolve_list(names, path).await.map(Dependencies::List),
            RequireSpec::Map(map) => self.resolve_map(map, path).await.map(Dependencies::Map),
        }
    }

    fn resolve_name<'a>(&'a self, name: &'a str, path: &'a ResolutionPath) -> BoxFuture<'a, Result<Resolved>> {
        async move {
            trace!(name, "Resolving");
            match Key::parse(name) {
                Key::Component(name) => self.resolve_component(name, path).await.map(Resolved::Instance),
                Key::All(pattern) => self.load_all(name, pattern, path).await.map(Resolved::Map),
                Key::Any(pattern) => self.load_any(name, pattern, path).await.map(Resolved::List),
                Key::Container => Ok(Resolved::Instance(Instance::new(self.clone()))),
                Key::Unknown { prefix } => Err(Error::UnknownPattern {
                    prefix: prefix.to_string(),
                    expression: name.to_string(),
                }),
            }
        }
        .boxed()
    }

    async fn resolve_component(&self, name: &str, path: &ResolutionPath) -> Result<Instance> {
        let component = self.inner.registry.read().get(name);
        let Some(component) = component else {
            return Err(self.unknown(name));
        };

        if path.contains(name) {
            let chain = path.cycle(name);
            warn!(cycle = %render_chain(&chain), "Circular dependency detected while loading");
            return Err(Error::CircularDependency(CircularDependencyError { chain }));
        }

        component.load(self, &path.with(name)).await
    }

    async fn resolve_list(&self, names: &[String], path: &ResolutionPath) -> Result<Vec<Resolved>> {
        let mut loaded = Vec::with_capacity(names.len());
        for name in names {
            loaded.push(self.resolve_name(name, path).await?);
        }
        Ok(loaded)
    }

    fn resolve_map<'a>(
        &'a self,
        map: &'a NameMap,
        path: &'a ResolutionPath,
    ) -> BoxFuture<'a, Result<ResolvedMap>> {
        async move {
            let mut loaded = ResolvedMap::new();
            for (key, entry) in map.iter() {
                let value = match entry {
                    NameEntry::Name(name) => self.resolve_name(name, path).await?,
                    NameEntry::Nested(nested) => Resolved::Map(self.resolve_map(nested, path).await?),
                };
                loaded.insert(key, value);
            }
            Ok(loaded)
        }
        .boxed()
    }

    async fn load_all(&self, expression: &str, pattern: &str, path: &ResolutionPath) -> Result<ResolvedMap> {
        let mut loaded = ResolvedMap::new();
        for name in self.matching(expression, pattern)? {
            let instance = self.resolve_component(&name, path).await?;
            loaded.insert(name, Resolved::Instance(instance));
        }
        Ok(loaded)
    }

    async fn load_any(&self, expression: &str, pattern: &str, path: &ResolutionPath) -> Result<Vec<Resolved>> {
        let mut loaded = Vec::new();
        for name in self.matching(expression, pattern)? {
            loaded.push(Resolved::Instance(self.resolve_component(&name, path).await?));
        }
        Ok(loaded)
    }

    fn matching(&self, expression: &str, pattern: &str) -> Result<Vec<String>> {
        let pattern = key::compile(expression, pattern)?;
        let names = self.inner.registry.read().matching(&pattern);
        debug!(expression, matched = names.len(), "Expanded group expression");
        Ok(names)
    }

    fn unknown(&self, name: &str) -> Error {
        let registry = self.inner.registry.read();
        let available: Vec<&str> = registry.names().collect();
        Error::UnknownComponent(UnknownComponentError {
            name: name.to_string(),
            suggestions: suggest_similar(name, &available, 3),
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("namespace", &self.inner.settings.namespace)
            .field("registered", &self.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Internal bridges
// ═══════════════════════════════════════════

tokio::task_local! {
    /// Branch of the component whose definition is running on this task.
    static CREATING: ResolutionPath;
}

/// Names being loaded on the current resolution branch, outermost first.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionPath {
    names: Vec<String>,
}

impl ResolutionPath {
    /// The branch of the definition running on this task, or an empty one.
    pub(crate) fn current() -> Self {
        CREATING.try_with(|path| path.clone()).unwrap_or_default()
    }

    /// Runs `creation` with this branch visible to [`ResolutionPath::current`].
    pub(crate) async fn enter<F: Future>(self, creation: F) -> F::Output {
        CREATING.scope(self, creation).await
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub(crate) fn with(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        names.push(name.to_string());
        Self { names }
    }

    /// The chain from the first occurrence of `name` back to `name`.
    pub(crate) fn cycle(&self, name: &str) -> Vec<String> {
        let start = self.names.iter().position(|n| n == name).unwrap_or(0);
        let mut chain = self.names[start..].to_vec();
        chain.push(name.to_string());
        chain
    }
}

/// Registrar handed to providers run against a live container.
struct ContainerRegistrar<'a> {
    container: &'a Container,
    fallback: Option<&'a str>,
    registered: usize,
}

impl Registrar for ContainerRegistrar<'_> {
    fn register(&mut self, definition: Definition, options: ComponentOptions) -> Result<()> {
        let name = options
            .name
            .clone()
            .or_else(|| self.fallback.map(str::to_string))
            .unwrap_or_default();
        self.container.register(name, definition, options)?;
        self.registered += 1;
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::definition::Definition;
    pub use crate::error::{BoxError, Error, Result};
    pub use crate::instance::{Dependencies, Instance, Object, Resolved, ResolvedMap};
    pub use crate::options::{ComponentOptions, Kind, LoadRequest, NameMap, RequireSpec};
    pub use crate::provider::{Provider, Registrar};
    pub use crate::scope::Scope;
    pub use crate::settings::ContainerSettings;
    pub use crate::source::{Discover, Export, Source};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
