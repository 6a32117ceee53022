//! Loaded values.
//!
//! - [`Instance`]: one component's instance, type-erased and shared
//! - [`Resolved`]: the shape a load produces: an instance, a list or a map
//! - [`ResolvedMap`]: keyed results, in request or registration order
//! - [`Object`]: the property bag a template definition is cloned from
//! - [`Dependencies`]: what a definition receives when it is instantiated

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use compono_support::rendering::shorten_type_name;

use crate::error::{Error, Result};

// ============================================================
// Instance
// ============================================================

/// A type-erased, reference-counted component instance.
///
/// Cloning an `Instance` clones the handle, never the value, so two clones
/// are [`ptr_eq`](Instance::ptr_eq).
///
/// # Examples
/// ```
/// use compono_container::instance::Instance;
///
/// let instance = Instance::new(String::from("hello"));
/// assert_eq!(instance.downcast::<String>().unwrap().as_str(), "hello");
/// assert!(instance.downcast::<i32>().is_none());
///
/// // wrapping an instance again is a no-op
/// let again = Instance::new(instance.clone());
/// assert!(again.ptr_eq(&instance));
/// ```
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<Instance>() {
            Ok(instance) => *instance,
            Err(boxed) => Self {
                value: Arc::from(boxed),
                type_name: type_name::<T>(),
            },
        }
    }

    /// Wraps an already shared value without adding another `Arc` layer.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    /// Returns the value as `Arc<T>` if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    /// Borrows the value as `&T` if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns `true` if both handles point to the same value.
    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// Type name of the wrapped value, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", shorten_type_name(self.type_name))
    }
}

// ============================================================
// Resolved
// ============================================================

/// The result of a load, shaped like the request.
///
/// A single name yields an [`Instance`] (or, for `all!`/`any!`, a map or a
/// list); a list of names yields a list; a map of names yields a map with the
/// same keys and nesting.
#[derive(Clone, Debug)]
pub enum Resolved {
    Instance(Instance),
    List(Vec<Resolved>),
    Map(ResolvedMap),
}

impl Resolved {
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Resolved::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Resolved::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Downcasts an instance result.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_instance().and_then(Instance::downcast)
    }

    pub fn as_list(&self) -> Option<&[Resolved]> {
        match self {
            Resolved::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Resolved>> {
        match self {
            Resolved::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ResolvedMap> {
        match self {
            Resolved::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<ResolvedMap> {
        match self {
            Resolved::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` in a map result.
    pub fn get(&self, key: &str) -> Option<&Resolved> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Looks up `index` in a list result.
    pub fn at(&self, index: usize) -> Option<&Resolved> {
        self.as_list().and_then(|items| items.get(index))
    }
}

impl From<Instance> for Resolved {
    fn from(instance: Instance) -> Self {
        Resolved::Instance(instance)
    }
}

// ============================================================
// ResolvedMap
// ============================================================

/// Keyed results, kept in insertion order.
///
/// A map request resolves into its keys in declaration order; an `all!`
/// group resolves into matching names in registration order.
///
/// ```
/// use compono_container::instance::{Instance, Resolved, ResolvedMap};
///
/// let mut map = ResolvedMap::new();
/// map.insert("users/model", Resolved::Instance(Instance::new(1u8)));
/// map.insert("comments/model", Resolved::Instance(Instance::new(2u8)));
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["users/model", "comments/model"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResolvedMap {
    entries: Vec<(String, Resolved)>,
}

impl ResolvedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`. An existing key keeps its position and
    /// its previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Resolved) -> Option<Resolved> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Resolved> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Resolved> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<(String, Resolved)> for ResolvedMap {
    fn extend<I: IntoIterator<Item = (String, Resolved)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(String, Resolved)> for ResolvedMap {
    fn from_iter<I: IntoIterator<Item = (String, Resolved)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl IntoIterator for ResolvedMap {
    type Item = (String, Resolved);
    type IntoIter = std::vec::IntoIter<(String, Resolved)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ============================================================
// Object
// ============================================================

/// A property bag used as a template definition.
///
/// Instantiating a template clones the bag (nested lists and maps are
/// copied, instances are shared) and merges named dependencies onto the
/// copy, so the original never changes.
///
/// ```
/// use compono_container::instance::Object;
///
/// let object = Object::new().with("message", String::from("Hello World!"));
/// assert_eq!(object.value::<String>("message").unwrap().as_str(), "Hello World!");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Object {
    properties: ResolvedMap,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property holding `value`.
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.properties.insert(key.into(), Resolved::Instance(Instance::new(value)));
        self
    }

    /// Adds an already resolved property.
    pub fn with_resolved(mut self, key: impl Into<String>, value: Resolved) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Resolved) -> Option<Resolved> {
        self.properties.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Resolved> {
        self.properties.get(key)
    }

    /// Downcasts the property `key`.
    pub fn value<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(Resolved::downcast)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Shallow merge: every entry of `other` overwrites the property of the same key.
    pub fn merge(&mut self, other: ResolvedMap) {
        self.properties.extend(other);
    }
}

// ============================================================
// Dependencies
// ============================================================

/// Resolved dependencies handed to a definition.
///
/// The variant follows the component's declared `require`: no requirement
/// gives `None`, a list gives positional `List` access, a map gives keyed
/// `Map` access.
#[derive(Clone, Debug, Default)]
pub enum Dependencies {
    #[default]
    None,
    List(Vec<Resolved>),
    Map(ResolvedMap),
}

impl Dependencies {
    /// The positional dependency at `index`.
    pub fn positional(&self, index: usize) -> Option<&Resolved> {
        match self {
            Dependencies::List(items) => items.get(index),
            _ => None,
        }
    }

    /// The named dependency `key`.
    pub fn named(&self, key: &str) -> Option<&Resolved> {
        match self {
            Dependencies::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Typed positional dependency.
    ///
    /// # Errors
    /// [`Error::MissingArgument`] if nothing sits at `index`,
    /// [`Error::TypeMismatch`] if it is not a `T` instance.
    pub fn arg<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let argument = format!("#{index}");
        let resolved = self
            .positional(index)
            .ok_or_else(|| Error::MissingArgument { argument: argument.clone() })?;
        downcast_dependency(resolved, argument)
    }

    /// Typed named dependency.
    ///
    /// # Errors
    /// [`Error::MissingArgument`] if `key` is absent,
    /// [`Error::TypeMismatch`] if it is not a `T` instance.
    pub fn field<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        let resolved = self.named(key).ok_or_else(|| Error::MissingArgument {
            argument: format!("`{key}`"),
        })?;
        downcast_dependency(resolved, format!("`{key}`"))
    }

    pub fn len(&self) -> usize {
        match self {
            Dependencies::None => 0,
            Dependencies::List(items) => items.len(),
            Dependencies::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn downcast_dependency<T: Any + Send + Sync>(resolved: &Resolved, argument: String) -> Result<Arc<T>> {
    resolved.downcast::<T>().ok_or(Error::TypeMismatch {
        name: format!("dependency {argument}"),
        expected: type_name::<T>(),
    })
}
