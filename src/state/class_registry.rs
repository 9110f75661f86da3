use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{ChartError, ChartResult};

pub type ClassFactory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Maps class names to factories producing default instances.
///
/// Registering a name twice replaces the earlier factory.
pub struct ClassRegistry<T> {
    factories: IndexMap<String, ClassFactory<T>>,
}

impl<T> Default for ClassRegistry<T> {
    fn default() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }
}

impl<T> fmt::Debug for ClassRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> ClassRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> ChartResult<()>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(ChartError::InvalidConfig(
                "class name must not be empty".to_owned(),
            ));
        }
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            trace!(class_name = %name, "class factory replaced");
        }
        Ok(())
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ClassFactory<T>> {
        self.factories.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create_instance(&self, name: &str) -> ChartResult<T> {
        if name.is_empty() {
            return Err(ChartError::InvalidConfig(
                "class name must not be empty".to_owned(),
            ));
        }
        self.resolve(name)
            .map(|factory| factory())
            .ok_or_else(|| ChartError::NotRegistered(name.to_owned()))
    }

    /// Names in registration order.
    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
