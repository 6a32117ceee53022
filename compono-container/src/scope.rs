//! Component lifecycle scopes.
//!
//! Scopes determine how long a loaded instance lives:
//! - [`Scope::Singleton`]: created once, then reused by every load
//! - [`Scope::Transient`]: created anew by every load
use std::fmt;

/// Defines the lifetime of a component's instance within the container.
///
/// # Examples
/// ```
/// use compono_container::scope::Scope;
///
/// assert_eq!(Scope::from_singleton(true), Scope::Singleton);
/// assert!(!Scope::Transient.is_cached());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance shared by every load.
    ///
    /// Created on first load, lives until the container is dropped.
    Singleton,

    /// New instance created on every load.
    ///
    /// Never cached.
    #[default]
    Transient,
}

impl Scope {
    /// Maps the `singleton` component option onto a scope.
    #[inline]
    pub fn from_singleton(singleton: bool) -> Self {
        if singleton { Scope::Singleton } else { Scope::Transient }
    }

    /// Returns `true` if this scope caches instances.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "Singleton"),
            Scope::Transient => write!(f, "Transient"),
        }
    }
}
