//! Owner of loaded generator handles.
//!
//! Loading a model is expensive, so each handle is loaded on first use and
//! kept until the registry is dropped or the entry is unloaded. The registry
//! is owned by one studio and mutated through `&mut self`; there is no global
//! cache and no locking.

use crate::error::Result;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug)]
pub struct ModelRegistry<K, M> {
    models: HashMap<K, M>,
}

impl<K, M> Default for ModelRegistry<K, M> {
    fn default() -> Self {
        Self {
            models: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy + Debug, M> ModelRegistry<K, M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `key`, calling `load` only if it is absent.
    ///
    /// A failed load leaves the registry unchanged.
    pub fn get_or_load<F>(&mut self, key: K, load: F) -> Result<&M>
    where
        F: FnOnce(K) -> Result<M>,
    {
        match self.models.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::info!("loading model {:?}", key);
                let model = load(key)?;
                Ok(entry.insert(model))
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.models.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Drop the handle for `key`, returning it if it was loaded.
    pub fn unload(&mut self, key: &K) -> Option<M> {
        self.models.remove(key)
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }
}
