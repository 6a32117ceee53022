//! Component registry, storing every registration of a container.
//!
//! The registry maps names to [`Component`]s and remembers the order in
//! which names were first registered. Group expressions (`any!`) rely on
//! that order.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace};

use crate::component::Component;

/// Stores all component registrations.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    components: HashMap<String, Arc<Component>>,
    order: Vec<String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component under its name.
    ///
    /// A later registration under the same name replaces the earlier one but
    /// keeps its position. Returns the replaced component.
    pub fn register(&mut self, component: Component) -> Option<Arc<Component>> {
        let name = component.name().to_string();
        let replaced = self.components.insert(name.clone(), Arc::new(component));

        if replaced.is_some() {
            debug!(component = %name, "Replaced existing registration");
        } else {
            self.order.push(name);
        }
        replaced
    }

    /// Looks up a component by name.
    pub fn get(&self, name: &str) -> Option<Arc<Component>> {
        self.components.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no components are registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.order.iter().filter_map(|name| self.components.get(name))
    }

    /// Names matched by `pattern`, in registration order.
    pub fn matching(&self, pattern: &Regex) -> Vec<String> {
        let matched: Vec<String> = self
            .names()
            .filter(|name| pattern.is_match(name))
            .map(str::to_string)
            .collect();
        trace!(pattern = %pattern, matched = matched.len(), "Matched component names");
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Definition;
    use crate::options::ComponentOptions;
    use crate::scope::Scope;

    fn component(name: &str, singleton: bool) -> Component {
        Component::new(
            name.to_string(),
            Definition::value(name.to_string()),
            ComponentOptions::new().singleton(singleton),
        )
    }

    #[test]
    fn register_and_get() {
        let mut reg = Registry::new();
        assert!(reg.register(component("config", false)).is_none());
        assert!(reg.get("config").is_some());
        assert!(reg.contains("config"));
        assert!(!reg.contains("missing"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn later_registration_wins_and_keeps_position() {
        let mut reg = Registry::new();
        reg.register(component("a", false));
        reg.register(component("b", false));
        let replaced = reg.register(component("a", true));

        assert!(replaced.is_some());
        assert_eq!(reg.get("a").unwrap().scope(), Scope::Singleton);
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn matching_keeps_registration_order() {
        let mut reg = Registry::new();
        for name in ["middleware/c", "models/user", "middleware/a", "middleware/b"] {
            reg.register(component(name, false));
        }

        let pattern = Regex::new("^middleware/").unwrap();
        assert_eq!(reg.matching(&pattern), vec!["middleware/c", "middleware/a", "middleware/b"]);

        let everything = Regex::new("").unwrap();
        assert_eq!(reg.matching(&everything).len(), 4);
    }

    #[test]
    fn components_iterate_in_order() {
        let mut reg = Registry::new();
        reg.register(component("z", false));
        reg.register(component("y", false));

        let names: Vec<&str> = reg.components().map(|c| c.name()).collect();
        assert_eq!(names, vec!["z", "y"]);
    }
}
