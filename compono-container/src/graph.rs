//! Dependency graph validation.
//!
//! Validates the declared dependencies of every registered component:
//! - Detects circular dependencies
//! - Checks that every plain dependency name is registered
//!
//! Validation runs after batch registration and on
//! [`ContainerBuilder::build()`](crate::container::ContainerBuilder::build).
//! Expression names (`all!`, `any!`, `container!`) are skipped; they are
//! resolved against the registry at load time.

use std::collections::HashMap;

use compono_support::rendering::{render_chain, suggest_similar};
use tracing::{debug, instrument, warn};

use crate::error::{CircularDependencyError, Error, MissingDependencyError, Result};
use crate::key::Key;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Directed graph of component names; edges point at dependencies.
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning its index. Adding a name twice is a no-op.
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&index) = self.index.get(name) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), index);
        self.edges.push(Vec::new());
        index
    }

    /// Records that `from` depends on `to`, adding either node if needed.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes depending directly on `name`, in insertion order.
    pub fn dependants_of(&self, name: &str) -> Vec<&str> {
        let Some(&target) = self.index.get(name) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, deps)| deps.contains(&target))
            .map(|(node, _)| self.nodes[node].as_str())
            .collect()
    }

    /// Orders every node after its dependencies.
    ///
    /// On a cycle, returns the chain of names forming it, with the first
    /// name repeated at the end.
    pub fn overall_order(&self) -> std::result::Result<Vec<&str>, Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for node in 0..self.nodes.len() {
            self.visit(node, &mut marks, &mut path, &mut order)?;
        }

        Ok(order.into_iter().map(|node| self.nodes[node].as_str()).collect())
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> std::result::Result<(), Vec<String>> {
        match marks[node] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let mut chain: Vec<String> = path[start..].iter().map(|&n| self.nodes[n].clone()).collect();
                chain.push(self.nodes[node].clone());
                return Err(chain);
            }
            Mark::Unvisited => {}
        }

        marks[node] = Mark::Visiting;
        path.push(node);

        for &dependency in &self.edges[node] {
            self.visit(dependency, marks, path, order)?;
        }

        path.pop();
        marks[node] = Mark::Done;
        order.push(node);
        Ok(())
    }
}

/// Validates the dependency graph of a registry.
pub(crate) struct GraphValidator<'a> {
    registry: &'a Registry,
    graph: DependencyGraph,
}

impl<'a> GraphValidator<'a> {
    /// Builds the graph from every registered component's plain dependencies.
    pub fn new(registry: &'a Registry) -> Self {
        let mut graph = DependencyGraph::new();

        for component in registry.components() {
            graph.add_node(component.name());
            for dependency in component.dependencies() {
                if Key::parse(dependency).is_expression() {
                    continue;
                }
                graph.add_dependency(component.name(), dependency);
            }
        }

        Self { registry, graph }
    }

    /// Validates the graph, returning names ordered dependencies first.
    ///
    /// # Errors
    /// - [`Error::CircularDependency`]: cycle detected
    /// - [`Error::MissingDependency`]: a required name is not registered
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&self) -> Result<Vec<String>> {
        debug!(node_count = self.graph.len(), "Starting dependency graph validation");

        let order = self.graph.overall_order().map_err(|chain| {
            warn!(cycle = %render_chain(&chain), "Circular dependency detected");
            Error::CircularDependency(CircularDependencyError { chain })
        })?;

        if let Some(missing) = order.iter().find(|name| !self.registry.contains(name)) {
            let available: Vec<&str> = self.registry.names().collect();
            let required_by = self.graph.dependants_of(missing).first().map(|name| name.to_string());
            warn!(dependency = %missing, required_by = ?required_by, "Missing dependency");

            return Err(Error::MissingDependency(MissingDependencyError {
                name: missing.to_string(),
                required_by,
                suggestions: suggest_similar(missing, &available, 3),
            }));
        }

        debug!("Dependency graph validation passed");
        Ok(order.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::definition::Definition;
    use crate::options::{ComponentOptions, NameMap, RequireSpec};

    fn registry(components: &[(&str, RequireSpec)]) -> Registry {
        let mut registry = Registry::new();
        for (name, require) in components {
            registry.register(Component::new(
                name.to_string(),
                Definition::value(()),
                ComponentOptions::new().require(require.clone()),
            ));
        }
        registry
    }

    #[test]
    fn valid_graph_orders_dependencies_first() {
        let reg = registry(&[
            ("services/foo", RequireSpec::from(["config", "services/bar"])),
            ("services/bar", RequireSpec::from(["config"])),
            ("config", RequireSpec::None),
        ]);

        let order = GraphValidator::new(&reg).validate().unwrap();
        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(position("config") < position("services/bar"));
        assert!(position("services/bar") < position("services/foo"));
    }

    #[test]
    fn detect_circular_dependency() {
        // a → b → c → a
        let reg = registry(&[
            ("a", RequireSpec::from(["b"])),
            ("b", RequireSpec::from(["c"])),
            ("c", RequireSpec::from(["a"])),
        ]);

        match GraphValidator::new(&reg).validate().unwrap_err() {
            Error::CircularDependency(err) => {
                assert_eq!(err.chain, vec!["a", "b", "c", "a"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn detect_self_dependency() {
        let reg = registry(&[("a", RequireSpec::from(["a"]))]);
        assert!(matches!(
            GraphValidator::new(&reg).validate(),
            Err(Error::CircularDependency(_))
        ));
    }

    #[test]
    fn detect_missing_dependency() {
        let reg = registry(&[
            ("services/foo", RequireSpec::from(["services/confg"])),
            ("services/config", RequireSpec::None),
        ]);

        match GraphValidator::new(&reg).validate().unwrap_err() {
            Error::MissingDependency(err) => {
                assert_eq!(err.name, "services/confg");
                assert_eq!(err.required_by.as_deref(), Some("services/foo"));
                assert_eq!(err.suggestions[0], "services/config");
            }
            other => panic!("Expected MissingDependency, got: {other:?}"),
        }
    }

    #[test]
    fn nested_map_dependencies_are_validated() {
        let reg = registry(&[(
            "app",
            RequireSpec::Map(NameMap::new().nested("models", NameMap::new().entry("user", "models/user"))),
        )]);

        match GraphValidator::new(&reg).validate().unwrap_err() {
            Error::MissingDependency(err) => assert_eq!(err.name, "models/user"),
            other => panic!("Expected MissingDependency, got: {other:?}"),
        }
    }

    #[test]
    fn expressions_are_skipped() {
        let reg = registry(&[(
            "app",
            RequireSpec::from(["all!^models/", "any!^middleware/", "container!", "lazy!x"]),
        )]);
        assert!(GraphValidator::new(&reg).validate().is_ok());
    }

    #[test]
    fn dependants_are_listed() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "c");
        graph.add_dependency("b", "c");
        graph.add_dependency("b", "c");

        assert_eq!(graph.dependants_of("c"), vec!["a", "b"]);
        assert!(graph.dependants_of("a").is_empty());
        assert_eq!(graph.len(), 3);
    }
}
