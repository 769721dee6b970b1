//! Custom filters and functions made available to templates.
//!
//! A [`FuncMap`] is handed to every compilation a registry performs, and can
//! be extended per handler with [`Handler::with_functions`]. Entries are
//! reference-counted, so cloning a map is cheap.
//!
//! ```rust
//! use templator::functions::FuncMap;
//!
//! let funcs = FuncMap::new()
//!     .string_filter("shout", |s| format!("{}!", s.to_uppercase()))
//!     .function("site_name", |_args| Ok("Example".into()));
//!
//! assert!(funcs.contains("shout"));
//! assert_eq!(funcs.len(), 2);
//! ```
//!
//! [`Handler::with_functions`]: crate::handler::Handler::with_functions

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tera::{Tera, Value};

/// A filter: `{{ value | name(arg=...) }}`.
pub type FilterFn = Arc<dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// A function: `{{ name(arg=...) }}`.
pub type FunctionFn = Arc<dyn Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// Named filters and functions.
#[derive(Clone, Default)]
pub struct FuncMap {
    filters: BTreeMap<String, FilterFn>,
    functions: BTreeMap<String, FunctionFn>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, replacing any filter with the same name.
    #[must_use]
    pub fn filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Add a filter that maps a string to a string.
    ///
    /// Applying it to anything but a string is a render error.
    #[must_use]
    pub fn string_filter<F>(self, name: impl Into<String>, map: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        self.filter(name, move |value: &Value, _: &HashMap<String, Value>| match value {
            Value::String(s) => Ok(Value::String(map(s))),
            other => Err(tera::Error::msg(format!(
                "filter `{label}` expected a string, got {other}"
            ))),
        })
    }

    /// Add a function, replacing any function with the same name.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// A new map holding the entries of `self` and `other`; `other` wins on
    /// name conflicts.
    #[must_use]
    pub fn merged(&self, other: &FuncMap) -> FuncMap {
        let mut merged = self.clone();
        merged.filters.extend(other.filters.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        merged.functions.extend(other.functions.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        merged
    }

    /// Whether a filter or function called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name) || self.functions.contains_key(name)
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.filters.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register every entry with `tera`.
    pub fn register(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            let filter = Arc::clone(filter);
            tera.register_filter(name, move |value: &Value, args: &HashMap<String, Value>| {
                filter(value, args)
            });
        }
        for (name, function) in &self.functions {
            let function = Arc::clone(function);
            tera.register_function(name, move |args: &HashMap<String, Value>| function(args));
        }
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncMap")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
