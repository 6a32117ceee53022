//! Error types for Compono container operations.
//!
//! Every failure carries the component names involved, and lookups that miss
//! come with "did you mean?" suggestions drawn from the registry.

use std::fmt;

use compono_support::rendering::{render_chain, render_list, shorten_type_name};

use crate::options::Kind;

/// Boxed error returned by user-supplied definition functions and init hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Compono operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requested name is not in the registry.
    #[error("{}", .0)]
    UnknownComponent(UnknownComponentError),

    /// A `<prefix>!` expression with a prefix other than `all`, `any` or `container`.
    #[error("Unknown pattern prefix `{prefix}` in `{expression}`\n  Hint: Supported expressions are all!<regex>, any!<regex> and container!")]
    UnknownPattern { prefix: String, expression: String },

    /// The regex of an `all!`/`any!` expression failed to compile.
    #[error("Invalid pattern expression `{expression}`: {source}")]
    InvalidPattern {
        expression: String,
        #[source]
        source: regex::Error,
    },

    /// A load request that matches none of the supported shapes.
    #[error("Invalid load signature: {reason}")]
    InvalidLoadSignature { reason: String },

    /// Registration under an empty name.
    #[error("Invalid component name {name:?}: names must be non-empty")]
    InvalidName { name: String },

    /// Malformed component options or namespace declaration.
    #[error("Invalid options for {subject}: {reason}")]
    InvalidOptions { subject: String, reason: String },

    /// The dependency graph contains a cycle.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A dependency that no registered component provides.
    #[error("{}", .0)]
    MissingDependency(MissingDependencyError),

    /// A component failed while resolving its dependencies, instantiating,
    /// or running its init hook.
    #[error(transparent)]
    ComponentLoad(ComponentLoadError),

    /// The instantiation kind cannot be applied to the definition.
    #[error("A {definition} definition cannot be instantiated as kind `{kind}`")]
    DefinitionMismatch { kind: Kind, definition: &'static str },

    /// A definition asked for a dependency that was not resolved for it.
    #[error("Missing dependency argument {argument}")]
    MissingArgument { argument: String },

    /// A resolved value has a different type than the one requested.
    #[error("Type mismatch for {name}: expected {}", shorten_type_name(.expected))]
    TypeMismatch { name: String, expected: &'static str },

    /// Failure raised by a definition function or init hook.
    #[error("{0}")]
    Definition(BoxError),

    /// The discovery collaborator failed to produce its sources.
    #[error("Discovery failed: {0}")]
    Discovery(BoxError),
}

impl Error {
    /// Returns `true` for errors already tagged with a failing component.
    pub fn is_component_load(&self) -> bool {
        matches!(self, Error::ComponentLoad(_))
    }

    /// Tags this error with the component it escaped from.
    ///
    /// Errors that already carry a component tag are returned unchanged, so
    /// a failure deep in the graph keeps naming the component that failed.
    pub(crate) fn within(self, component: &str) -> Error {
        if self.is_component_load() {
            return self;
        }
        Error::ComponentLoad(ComponentLoadError {
            component: component.to_string(),
            source: Box::new(self),
        })
    }

    /// Converts a failure returned by a definition function.
    ///
    /// Container errors passed back through user code keep their variant.
    pub(crate) fn from_definition(err: BoxError) -> Error {
        match err.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error::Definition(other),
        }
    }
}

/// Error when a name is not registered.
#[derive(Debug)]
pub struct UnknownComponentError {
    /// The name that was requested
    pub name: String,
    /// Registered names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnknownComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown component: {}", self.name)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:{}", render_list(&self.suggestions))?;
        }

        write!(f, "\n  Hint: Did you forget to register {:?}?", self.name)
    }
}

/// Error when the dependency graph contains a cycle.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Component names forming the cycle, first name repeated at the end.
    /// Example: ["a", "b", "c", "a"]
    pub chain: Vec<String>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: Request the container with `container!` and load lazily, or restructure the components"
        )
    }
}

/// Error when a required name has no registered component.
#[derive(Debug)]
pub struct MissingDependencyError {
    /// The dependency that nothing provides
    pub name: String,
    /// A component that requires it
    pub required_by: Option<String>,
    /// Registered names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for MissingDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No component found for dependency ({})", self.name)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:{}", render_list(&self.suggestions))?;
        }

        Ok(())
    }
}

/// Failure of a single component, tagged with its name.
#[derive(Debug)]
pub struct ComponentLoadError {
    /// The component whose load failed
    pub component: String,
    /// The original failure
    pub source: BoxError,
}

impl ComponentLoadError {
    /// The untagged failure at the bottom of the chain.
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut current: &(dyn std::error::Error + 'static) = &*self.source;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl fmt::Display for ComponentLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error loading component ({}): {}", self.component, self.source)
    }
}

impl std::error::Error for ComponentLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Convenient Result type for Compono operations.
pub type Result<T> = std::result::Result<T, Error>;
