//! Raw component definitions.
//!
//! A [`Definition`] is what a discovery collaborator hands to the container:
//! a function that builds the instance, a template object, or a prebuilt
//! value, plus the init hooks the instance can be initialized with.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use compono_container::definition::Definition;
//! use compono_container::error::BoxError;
//! use compono_container::instance::{Dependencies, Object};
//!
//! struct Foo {
//!     config: Arc<Object>,
//!     initialized: AtomicBool,
//! }
//!
//! let foo = Definition::constructor(|deps: Dependencies| -> Result<Foo, BoxError> {
//!     Ok(Foo { config: deps.arg(0)?, initialized: AtomicBool::new(false) })
//! })
//! .with_init("initialize", |foo: Arc<Foo>| async move {
//!     foo.initialized.store(true, Ordering::SeqCst);
//!     Ok::<(), BoxError>(())
//! });
//!
//! assert!(foo.has_init("initialize"));
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::error::{BoxError, Error, Result};
use crate::instance::{Dependencies, Instance, Object};
use crate::options::Kind;

/// Async function producing an instance.
pub type FactoryFn = Arc<dyn Fn(Dependencies) -> BoxFuture<'static, std::result::Result<Instance, BoxError>> + Send + Sync>;

/// Synchronous function producing an instance.
pub type ConstructorFn = Arc<dyn Fn(Dependencies) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// Init hook run on a freshly produced instance.
pub type InitFn = Arc<dyn Fn(Instance) -> BoxFuture<'static, std::result::Result<(), BoxError>> + Send + Sync>;

#[derive(Clone)]
enum Body {
    Factory(FactoryFn),
    Constructor(ConstructorFn),
    Object(Arc<Object>),
    Value(Instance),
}

impl Body {
    fn describe(&self) -> &'static str {
        match self {
            Body::Factory(_) => "factory function",
            Body::Constructor(_) => "constructor function",
            Body::Object(_) => "template object",
            Body::Value(_) => "value",
        }
    }
}

/// A raw component definition.
///
/// Cloning a definition shares its functions and its template object.
#[derive(Clone)]
pub struct Definition {
    body: Body,
    hooks: HashMap<String, InitFn>,
}

impl Definition {
    fn from_body(body: Body) -> Self {
        Self {
            body,
            hooks: HashMap::new(),
        }
    }

    /// An async factory. Called (and awaited) by the `factory` kind.
    pub fn factory<T, F, Fut>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, BoxError>> + Send + 'static,
    {
        let factory: FactoryFn = Arc::new(move |deps: Dependencies| {
            let pending = factory(deps);
            async move { pending.await.map(Instance::new) }.boxed()
        });
        Self::from_body(Body::Factory(factory))
    }

    /// A synchronous constructor. Usable by the `constructor` and `factory` kinds.
    pub fn constructor<T, F>(constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Dependencies) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        let constructor: ConstructorFn = Arc::new(move |deps: Dependencies| constructor(deps).map(Instance::new));
        Self::from_body(Body::Constructor(constructor))
    }

    /// A template object, cloned for every instance.
    pub fn object(object: Object) -> Self {
        Self::from_body(Body::Object(Arc::new(object)))
    }

    /// A prebuilt value, handed out as-is.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_body(Body::Value(Instance::new(value)))
    }

    /// Adds an init hook under `method`.
    ///
    /// The hook runs when the component's `init` option names it. It receives
    /// the instance as `Arc<T>`; an instance of another type fails the load
    /// with [`Error::TypeMismatch`].
    pub fn with_init<T, F, Fut>(mut self, method: impl Into<String>, hook: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), BoxError>> + Send + 'static,
    {
        let method = method.into();
        let label = format!("init hook `{method}`");
        let hook: InitFn = Arc::new(move |instance: Instance| match instance.downcast::<T>() {
            Some(value) => hook(value).boxed(),
            None => {
                let err: BoxError = Box::new(Error::TypeMismatch {
                    name: label.clone(),
                    expected: type_name::<T>(),
                });
                future::err::<(), BoxError>(err).boxed()
            }
        });
        self.hooks.insert(method, hook);
        self
    }

    /// The kind used when the options name none: `template` for objects and
    /// values, `factory` for functions.
    pub fn default_kind(&self) -> Kind {
        match self.body {
            Body::Object(_) | Body::Value(_) => Kind::Template,
            Body::Factory(_) | Body::Constructor(_) => Kind::Factory,
        }
    }

    /// Returns `true` if an init hook is registered under `method`.
    pub fn has_init(&self, method: &str) -> bool {
        self.hooks.contains_key(method)
    }

    pub(crate) fn init_hook(&self, method: &str) -> Option<&InitFn> {
        self.hooks.get(method)
    }

    pub(crate) async fn instantiate(&self, kind: Kind, deps: Dependencies) -> Result<Instance> {
        match kind {
            Kind::Template => Ok(self.instantiate_template(deps)),
            Kind::Constructor => self.construct(deps),
            Kind::Factory => self.call(deps).await,
        }
    }

    /// Objects are cloned and named dependencies merged onto the copy.
    /// Anything else is a reference value and is used directly.
    fn instantiate_template(&self, deps: Dependencies) -> Instance {
        match &self.body {
            Body::Object(template) => {
                let mut object = Object::clone(template);
                if let Dependencies::Map(named) = deps {
                    object.merge(named);
                }
                Instance::new(object)
            }
            Body::Value(value) => value.clone(),
            Body::Factory(factory) => Instance::new(factory.clone()),
            Body::Constructor(constructor) => Instance::new(constructor.clone()),
        }
    }

    fn construct(&self, deps: Dependencies) -> Result<Instance> {
        match &self.body {
            Body::Constructor(constructor) => constructor(deps).map_err(Error::from_definition),
            other => Err(Error::DefinitionMismatch {
                kind: Kind::Constructor,
                definition: other.describe(),
            }),
        }
    }

    async fn call(&self, deps: Dependencies) -> Result<Instance> {
        match &self.body {
            Body::Factory(factory) => factory(deps).await.map_err(Error::from_definition),
            Body::Constructor(constructor) => constructor(deps).map_err(Error::from_definition),
            other => Err(Error::DefinitionMismatch {
                kind: Kind::Factory,
                definition: other.describe(),
            }),
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        hooks.sort_unstable();
        f.debug_struct("Definition")
            .field("body", &self.body.describe())
            .field("hooks", &hooks)
            .finish()
    }
}
