//! Core container implementation for Compono.
//!
//! Components are registered by name with a [`Definition`](definition::Definition)
//! and [`ComponentOptions`](options::ComponentOptions), validated as a
//! dependency graph, and loaded asynchronously on request.

pub mod component;
pub mod container;
pub mod definition;
pub mod error;
mod graph;
pub mod instance;
pub mod key;
pub mod options;
pub mod provider;
mod registry;
pub mod scope;
pub mod settings;
pub mod source;

pub use container::prelude;
pub use container::{Container, ContainerBuilder};
pub use error::{BoxError, Error, Result};
pub use scope::Scope;
