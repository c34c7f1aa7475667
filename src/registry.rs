//! Process-wide table from type identity to string conversion logic.
//!
//! A [`TypeRegistry`] is built once at startup, either directly through
//! [`TypeRegistry::with_builtins`] or by publishing a customised instance with
//! [`install`]. After that it is only ever read: binding copies the resolved
//! [`Codec`] into each option, so parsing never touches the table again.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::convert;
use crate::error::{ConversionError, HintError};

/// Per-field key/value hints handed to converters (`base`, `layout`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints(BTreeMap<String, String>);

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a hint, trimmed; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Stateless string conversion for one type.
pub trait Converter<T>: Send + Sync {
    /// Render `value`; must succeed for every representable value.
    fn to_str(&self, value: &T, hints: &Hints) -> String;

    fn from_str(&self, input: &str, hints: &Hints) -> Result<T, ConversionError>;

    /// Options of this type need no value token (`-verbose`).
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Validate the hints a field carries, at bind time.
    fn check_hints(&self, _hints: &Hints) -> Result<(), HintError> {
        Ok(())
    }
}

/// Shared handle to a registered converter.
pub type Codec<T> = Arc<dyn Converter<T>>;

struct Entry {
    type_name: &'static str,
    // Always an `Arc<dyn Converter<T>>` for the `T` keyed by the TypeId.
    codec: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl TypeRegistry {
    /// An empty registry. Most callers want [`TypeRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Integers of every width, floats, `bool`, `String`, durations and timestamps.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        convert::register_builtins(&mut registry);
        registry
    }

    /// Register `converter` for `T`. The last registration for a type wins.
    pub fn register<T: 'static>(&mut self, converter: impl Converter<T> + 'static) {
        self.register_codec::<T>(Arc::new(converter));
    }

    pub fn register_codec<T: 'static>(&mut self, codec: Codec<T>) {
        let type_name = std::any::type_name::<T>();
        let previous = self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name,
                codec: Box::new(codec),
            },
        );
        if previous.is_some() {
            tracing::debug!(type_name, "replaced registered converter");
        }
    }

    pub fn lookup<T: 'static>(&self) -> Option<Codec<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.codec.downcast_ref::<Codec<T>>())
            .cloned()
    }

    /// Same as [`TypeRegistry::lookup`], with `T` inferred from a value.
    pub fn lookup_by_value<T: 'static>(&self, _value: &T) -> Option<Codec<T>> {
        self.lookup::<T>()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Publish `registry` as the process-wide instance.
///
/// Call this during startup, before any filler is created. Fails, handing the
/// registry back, if an instance was already installed or [`global`] has
/// already been read.
pub fn install(registry: TypeRegistry) -> Result<(), Arc<TypeRegistry>> {
    GLOBAL.set(Arc::new(registry))
}

/// The process-wide registry; built-ins only unless [`install`] ran first.
pub fn global() -> Arc<TypeRegistry> {
    GLOBAL
        .get_or_init(|| Arc::new(TypeRegistry::with_builtins()))
        .clone()
}
