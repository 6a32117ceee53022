//! Component options and the name structures used to declare and request
//! dependencies.
//!
//! Options arrive either from code (builder methods) or verbatim from a
//! discovery collaborator as JSON, e.g.
//!
//! ```json
//! { "singleton": true, "type": "constructor", "init": "initialize",
//!   "require": ["services/config", "services/bar"] }
//! ```

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// How a definition is turned into an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Call the definition and await its result.
    Factory,
    /// Construct the definition synchronously.
    Constructor,
    /// Clone the definition object and merge named dependencies onto it.
    #[serde(rename = "object", alias = "template")]
    Template,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Factory => write!(f, "factory"),
            Kind::Constructor => write!(f, "constructor"),
            Kind::Template => write!(f, "template"),
        }
    }
}

// ============================================================
// NameMap
// ============================================================

/// A value in a [`NameMap`]: a name to load, or a nested map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEntry {
    Name(String),
    Nested(NameMap),
}

impl From<&str> for NameEntry {
    fn from(name: &str) -> Self {
        NameEntry::Name(name.to_string())
    }
}

impl From<String> for NameEntry {
    fn from(name: String) -> Self {
        NameEntry::Name(name)
    }
}

impl From<NameMap> for NameEntry {
    fn from(map: NameMap) -> Self {
        NameEntry::Nested(map)
    }
}

/// Ordered mapping from local key to name or nested map.
///
/// Entries keep declaration order, which is the order they are resolved in.
///
/// # Examples
/// ```
/// use compono_container::options::NameMap;
///
/// let map = NameMap::new()
///     .entry("foo", "services/foo")
///     .nested("models", NameMap::new().entry("user", "models/user"));
///
/// assert_eq!(map.names(), vec!["services/foo", "models/user"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: Vec<(String, NameEntry)>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `key → name` entry.
    pub fn entry(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert(key, NameEntry::Name(name.into()));
        self
    }

    /// Adds a `key → nested map` entry.
    pub fn nested(mut self, key: impl Into<String>, map: NameMap) -> Self {
        self.insert(key, NameEntry::Nested(map));
        self
    }

    /// Inserts an entry; an existing key is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, entry: NameEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&NameEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every leaf name, depth-first in declaration order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        for (_, entry) in &self.entries {
            match entry {
                NameEntry::Name(name) => out.push(name),
                NameEntry::Nested(map) => map.collect_names(out),
            }
        }
    }

    fn from_json(map: &Map<String, Value>) -> Result<Self, String> {
        let mut result = NameMap::new();
        for (key, value) in map {
            let entry = match value {
                Value::String(name) => NameEntry::Name(name.clone()),
                Value::Object(nested) => NameEntry::Nested(NameMap::from_json(nested)?),
                other => {
                    return Err(format!(
                        "entry `{key}` must be a name or a nested map, found {}",
                        json_type(other)
                    ));
                }
            };
            result.insert(key.clone(), entry);
        }
        Ok(result)
    }
}

impl<K, V> FromIterator<(K, V)> for NameMap
where
    K: Into<String>,
    V: Into<NameEntry>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = NameMap::new();
        for (key, value) in iter {
            map.insert(key, value.into());
        }
        map
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

fn string_list(items: &[Value]) -> Result<Vec<String>, String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(name) => Ok(name.clone()),
            other => Err(format!("list entries must be names, found {}", json_type(other))),
        })
        .collect()
}

// ============================================================
// RequireSpec
// ============================================================

/// The declared dependency shape of a component.
///
/// A single name is normalized to a one-element list:
/// ```
/// use compono_container::options::RequireSpec;
///
/// assert_eq!(RequireSpec::from("config"), RequireSpec::List(vec!["config".into()]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum RequireSpec {
    /// No dependencies.
    #[default]
    None,
    /// Positional dependencies.
    List(Vec<String>),
    /// Named dependencies, possibly nested.
    Map(NameMap),
}

impl RequireSpec {
    /// Every required name, in resolution order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            RequireSpec::None => Vec::new(),
            RequireSpec::List(names) => names.iter().map(String::as_str).collect(),
            RequireSpec::Map(map) => map.names(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RequireSpec::None)
    }
}

impl TryFrom<Value> for RequireSpec {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(RequireSpec::None),
            Value::String(name) => Ok(RequireSpec::List(vec![name])),
            Value::Array(items) => string_list(&items).map(RequireSpec::List),
            Value::Object(map) => NameMap::from_json(&map).map(RequireSpec::Map),
            other => Err(format!(
                "`require` must be a name, a list of names or a map, found {}",
                json_type(&other)
            )),
        }
    }
}

impl From<&str> for RequireSpec {
    fn from(name: &str) -> Self {
        RequireSpec::List(vec![name.to_string()])
    }
}

impl From<String> for RequireSpec {
    fn from(name: String) -> Self {
        RequireSpec::List(vec![name])
    }
}

impl From<Vec<&str>> for RequireSpec {
    fn from(names: Vec<&str>) -> Self {
        RequireSpec::List(names.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for RequireSpec {
    fn from(names: Vec<String>) -> Self {
        RequireSpec::List(names)
    }
}

impl<const N: usize> From<[&str; N]> for RequireSpec {
    fn from(names: [&str; N]) -> Self {
        RequireSpec::List(names.into_iter().map(String::from).collect())
    }
}

impl From<NameMap> for RequireSpec {
    fn from(map: NameMap) -> Self {
        RequireSpec::Map(map)
    }
}

// ============================================================
// LoadRequest
// ============================================================

/// The shapes accepted by [`Container::load`](crate::container::Container::load).
///
/// ```
/// use compono_container::options::{LoadRequest, NameMap};
///
/// assert_eq!(LoadRequest::from("config"), LoadRequest::Name("config".into()));
/// assert!(matches!(LoadRequest::from(["a", "b"]), LoadRequest::List(_)));
/// assert!(matches!(LoadRequest::from(NameMap::new().entry("a", "a")), LoadRequest::Map(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// One name or pattern expression.
    Name(String),
    /// Several names, loaded in order.
    List(Vec<String>),
    /// A nested map of names, loaded depth-first.
    Map(NameMap),
}

impl From<&str> for LoadRequest {
    fn from(name: &str) -> Self {
        LoadRequest::Name(name.to_string())
    }
}

impl From<String> for LoadRequest {
    fn from(name: String) -> Self {
        LoadRequest::Name(name)
    }
}

impl From<&String> for LoadRequest {
    fn from(name: &String) -> Self {
        LoadRequest::Name(name.clone())
    }
}

impl From<Vec<&str>> for LoadRequest {
    fn from(names: Vec<&str>) -> Self {
        LoadRequest::List(names.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for LoadRequest {
    fn from(names: Vec<String>) -> Self {
        LoadRequest::List(names)
    }
}

impl From<&[&str]> for LoadRequest {
    fn from(names: &[&str]) -> Self {
        LoadRequest::List(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LoadRequest {
    fn from(names: [&str; N]) -> Self {
        LoadRequest::List(names.into_iter().map(String::from).collect())
    }
}

impl From<NameMap> for LoadRequest {
    fn from(map: NameMap) -> Self {
        LoadRequest::Map(map)
    }
}

impl TryFrom<Value> for LoadRequest {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Error::InvalidLoadSignature { reason };
        match value {
            Value::String(name) => Ok(LoadRequest::Name(name)),
            Value::Array(items) => string_list(&items).map(LoadRequest::List).map_err(invalid),
            Value::Object(map) => NameMap::from_json(&map).map(LoadRequest::Map).map_err(invalid),
            other => Err(invalid(format!(
                "expected a name, a list of names or a map, found {}",
                json_type(&other)
            ))),
        }
    }
}

// ============================================================
// ComponentOptions
// ============================================================

/// Options declared alongside a definition.
///
/// Every field is optional so container-wide defaults can fill the gaps:
/// explicit values always win.
///
/// # Examples
/// ```
/// use compono_container::options::{ComponentOptions, Kind};
///
/// let options: ComponentOptions = serde_json::from_value(serde_json::json!({
///     "singleton": true,
///     "type": "constructor",
///     "require": "services/config",
/// })).unwrap();
///
/// assert_eq!(options.kind, Some(Kind::Constructor));
/// assert_eq!(options.require.unwrap().names(), vec!["services/config"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentOptions {
    /// Component name; falls back to the name derived from the source path.
    pub name: Option<String>,
    /// Declared dependencies.
    pub require: Option<RequireSpec>,
    /// Cache the first instance (default `false`).
    pub singleton: Option<bool>,
    /// Instantiation kind (default depends on the definition).
    #[serde(alias = "type")]
    pub kind: Option<Kind>,
    /// Name of the init hook to run after instantiation.
    pub init: Option<String>,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn require(mut self, require: impl Into<RequireSpec>) -> Self {
        self.require = Some(require.into());
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = Some(singleton);
        self
    }

    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn init(mut self, method: impl Into<String>) -> Self {
        self.init = Some(method.into());
        self
    }

    /// Fills every unset field from `defaults`.
    pub fn with_defaults(self, defaults: &ComponentOptions) -> Self {
        Self {
            name: self.name.or_else(|| defaults.name.clone()),
            require: self.require.or_else(|| defaults.require.clone()),
            singleton: self.singleton.or(defaults.singleton),
            kind: self.kind.or(defaults.kind),
            init: self.init.or_else(|| defaults.init.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_from_json_shapes() {
        let none: RequireSpec = serde_json::from_value(json!(null)).unwrap();
        assert!(none.is_none());

        let one: RequireSpec = serde_json::from_value(json!("b")).unwrap();
        assert_eq!(one, RequireSpec::List(vec!["b".into()]));

        let list: RequireSpec = serde_json::from_value(json!(["services/config", "services/bar"])).unwrap();
        assert_eq!(list.names(), vec!["services/config", "services/bar"]);

        let map: RequireSpec =
            serde_json::from_value(json!({ "userModel": "models/user", "nested": { "x": "y" } })).unwrap();
        assert_eq!(map.names(), vec!["models/user", "y"]);
    }

    #[test]
    fn require_rejects_numbers() {
        assert!(serde_json::from_value::<RequireSpec>(json!(3)).is_err());
        assert!(serde_json::from_value::<RequireSpec>(json!(["a", 1])).is_err());
        assert!(serde_json::from_value::<RequireSpec>(json!({ "a": true })).is_err());
    }

    #[test]
    fn map_keeps_declaration_order() {
        let map: RequireSpec = serde_json::from_value(json!({ "z": "z", "a": "a", "m": "m" })).unwrap();
        assert_eq!(map.names(), vec!["z", "a", "m"]);
    }

    #[test]
    fn name_map_insert_replaces_in_place() {
        let mut map = NameMap::new().entry("a", "one").entry("b", "two");
        map.insert("a", NameEntry::from("three"));
        assert_eq!(map.names(), vec!["three", "two"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn name_map_from_iter() {
        let map: NameMap = [("config", "services/config"), ("foo", "services/foo")]
            .into_iter()
            .collect();
        assert_eq!(map.get("foo"), Some(&NameEntry::Name("services/foo".into())));
    }

    #[test]
    fn options_accept_type_alias() {
        let options: ComponentOptions =
            serde_json::from_value(json!({ "type": "object", "init": "init" })).unwrap();
        assert_eq!(options.kind, Some(Kind::Template));
        assert_eq!(options.init.as_deref(), Some("init"));
        assert_eq!(options.singleton, None);
    }

    #[test]
    fn options_accept_kind_template() {
        let options: ComponentOptions = serde_json::from_value(json!({ "kind": "template" })).unwrap();
        assert_eq!(options.kind, Some(Kind::Template));
    }

    #[test]
    fn empty_options() {
        let options: ComponentOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, ComponentOptions::default());
    }

    #[test]
    fn defaults_fill_only_gaps() {
        let defaults = ComponentOptions::new().singleton(true).init("start");
        let options = ComponentOptions::new().singleton(false).with_defaults(&defaults);

        assert_eq!(options.singleton, Some(false));
        assert_eq!(options.init.as_deref(), Some("start"));
    }

    #[test]
    fn load_request_from_json() {
        let req = LoadRequest::try_from(json!(["a", "b"])).unwrap();
        assert_eq!(req, LoadRequest::List(vec!["a".into(), "b".into()]));

        let req = LoadRequest::try_from(json!({ "foo": "services/foo", "models": { "user": "models/user" } })).unwrap();
        match req {
            LoadRequest::Map(map) => assert_eq!(map.names(), vec!["services/foo", "models/user"]),
            other => panic!("Expected Map, got: {other:?}"),
        }
    }

    #[test]
    fn load_request_rejects_other_shapes() {
        for value in [json!(1), json!(null), json!(true), json!([1]), json!({ "a": 1 })] {
            let err = LoadRequest::try_from(value).unwrap_err();
            assert!(matches!(err, Error::InvalidLoadSignature { .. }));
        }
    }

    #[test]
    fn kind_display() {
        assert_eq!(Kind::Template.to_string(), "template");
        assert_eq!(Kind::Constructor.to_string(), "constructor");
    }
}
