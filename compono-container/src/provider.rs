//! Provider trait: a source that registers its own components.
//!
//! A source can export a provider instead of a single definition. The
//! provider receives a [`Registrar`] and registers any number of
//! components through it.
//!
//! # Examples
//! ```rust
//! use compono_container::prelude::*;
//!
//! struct ModelsProvider;
//!
//! impl Provider for ModelsProvider {
//!     fn register(&self, registrar: &mut dyn Registrar) -> Result<()> {
//!         registrar.register(
//!             Definition::object(Object::new().with("table", "users")),
//!             ComponentOptions::new().named("models/user"),
//!         )?;
//!         registrar.register(
//!             Definition::object(Object::new().with("table", "groups")),
//!             ComponentOptions::new().named("models/group"),
//!         )
//!     }
//! }
//!
//! let container = Container::new();
//! assert_eq!(container.add_provider(&ModelsProvider).unwrap(), 2);
//! assert!(container.contains("models/group"));
//! ```

use crate::definition::Definition;
use crate::error::Result;
use crate::options::ComponentOptions;

/// A module that registers related components into a container.
///
/// Closures taking a `&mut dyn Registrar` are providers too.
pub trait Provider: Send + Sync {
    /// Register components through the registrar.
    fn register(&self, registrar: &mut dyn Registrar) -> Result<()>;

    /// Optional: human-readable name for log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Provider for F
where
    F: Fn(&mut dyn Registrar) -> Result<()> + Send + Sync,
{
    fn register(&self, registrar: &mut dyn Registrar) -> Result<()> {
        self(registrar)
    }
}

/// Interface that providers use to register components.
///
/// The component is named by `options.name`. When a provider is loaded from
/// a source, a registration without a name falls back to the name derived
/// from the source path.
pub trait Registrar {
    fn register(&mut self, definition: Definition, options: ComponentOptions) -> Result<()>;
}
