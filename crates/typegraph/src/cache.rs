//! Shared, lock-protected store of published models.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::model::{ModelDescriptor, TypeKey};
use crate::reflect::Reflect;

static GLOBAL: LazyLock<Arc<TypeGraphCache>> = LazyLock::new(|| Arc::new(TypeGraphCache::new()));

/// Type identity to model map. Owns every published model.
///
/// Lookups take the read lock and may run concurrently; inserts are
/// exclusive. Entries are never evicted. Two scans racing on the same type
/// may both build a model for it, and the last insert wins.
#[derive(Default)]
pub struct TypeGraphCache {
    models: RwLock<HashMap<TypeKey, Arc<ModelDescriptor>>>,
}

impl TypeGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used when a scanner is not given one.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    pub fn get(&self, key: &TypeKey) -> Option<Arc<ModelDescriptor>> {
        self.read().get(key).cloned()
    }

    pub fn get_of<T: Reflect>(&self) -> Option<Arc<ModelDescriptor>> {
        self.get(&TypeKey::of::<T>())
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All models, sorted by type name.
    pub fn models(&self) -> Vec<Arc<ModelDescriptor>> {
        let mut models: Vec<_> = self.read().values().cloned().collect();
        models.sort_by(|a, b| a.type_name().cmp(b.type_name()));
        models
    }

    pub(crate) fn insert(&self, model: Arc<ModelDescriptor>) -> Option<Arc<ModelDescriptor>> {
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model.key(), model)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TypeKey, Arc<ModelDescriptor>>> {
        // Writers only run a single `HashMap::insert`; a poisoned map is still consistent.
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TypeGraphCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeGraphCache")
            .field("models", &self.len())
            .finish()
    }
}
