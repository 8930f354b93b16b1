// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Indexed object stores backing the listers
//!
//! A store is a key-addressable cache of objects populated by someone else
//! (a reflector, a manifest loader, a test). Listers only read from it
//! through the [`Indexer`] capability:
//!
//! - iterate every object with a callback
//! - look one object up by key
//!
//! Keys follow the Kubernetes convention: `name` for cluster-scoped objects,
//! `namespace/name` for namespaced ones.

use kube::runtime::reflector::{ObjectRef, Store};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use super::labels::Selector;

/// Read capability of an indexed store
pub trait Indexer<K> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Visit every object currently in the store
    fn list_all(&self, visit: &mut dyn FnMut(&Arc<K>)) -> Result<(), Self::Error>;

    /// Look up a single object by its store key
    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>, Self::Error>;
}

/// Store key of an object: `name` or `namespace/name`
pub fn meta_namespace_key<K: Resource>(obj: &K) -> String {
    match obj.namespace() {
        Some(ns) if !ns.is_empty() => format!("{}/{}", ns, obj.name_any()),
        _ => obj.name_any(),
    }
}

/// Split a store key into namespace and name
pub fn split_meta_namespace_key(key: &str) -> (Option<&str>, &str) {
    match key.split_once('/') {
        Some((ns, name)) => (Some(ns), name),
        None => (None, key),
    }
}

/// Visit every object whose labels match the selector
pub fn list_all<K, S, F>(indexer: &S, selector: &Selector, mut append: F) -> Result<(), S::Error>
where
    K: Resource,
    S: Indexer<K> + ?Sized,
    F: FnMut(&Arc<K>),
{
    if selector.is_everything() {
        return indexer.list_all(&mut |obj| append(obj));
    }
    indexer.list_all(&mut |obj| {
        if selector.matches(obj.labels()) {
            append(obj);
        }
    })
}

/// Visit every object in one namespace whose labels match the selector
pub fn list_all_by_namespace<K, S, F>(
    indexer: &S,
    namespace: &str,
    selector: &Selector,
    mut append: F,
) -> Result<(), S::Error>
where
    K: Resource,
    S: Indexer<K> + ?Sized,
    F: FnMut(&Arc<K>),
{
    indexer.list_all(&mut |obj| {
        if obj.namespace().as_deref() == Some(namespace) && selector.matches(obj.labels()) {
            append(obj);
        }
    })
}

/// Errors raised by [`MemoryStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned by a panicked writer")]
    Poisoned,
}

/// In-memory store keyed by [`meta_namespace_key`], iterated in key order
#[derive(Debug)]
pub struct MemoryStore<K> {
    items: RwLock<BTreeMap<String, Arc<K>>>,
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Resource> MemoryStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the given objects
    pub fn from_objects<I>(objects: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = K>,
    {
        let store = Self::new();
        for obj in objects {
            store.insert(obj)?;
        }
        Ok(store)
    }

    /// Insert or replace an object, returning the previous one under the same key
    pub fn insert(&self, obj: K) -> Result<Option<Arc<K>>, StoreError> {
        let key = meta_namespace_key(&obj);
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        Ok(items.insert(key, Arc::new(obj)))
    }

    /// Remove an object by key
    pub fn remove(&self, key: &str) -> Result<Option<Arc<K>>, StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        Ok(items.remove(key))
    }

    /// All keys currently stored
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl<K> Indexer<K> for MemoryStore<K> {
    type Error = StoreError;

    fn list_all(&self, visit: &mut dyn FnMut(&Arc<K>)) -> Result<(), Self::Error> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        items.values().for_each(|obj| visit(obj));
        Ok(())
    }

    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>, Self::Error> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.get(key).cloned())
    }
}

/// A kube-runtime reflector cache can back a lister directly
impl<K> Indexer<K> for Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
{
    type Error = Infallible;

    fn list_all(&self, visit: &mut dyn FnMut(&Arc<K>)) -> Result<(), Self::Error> {
        self.state().iter().for_each(|obj| visit(obj));
        Ok(())
    }

    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>, Self::Error> {
        let obj_ref = match split_meta_namespace_key(key) {
            (Some(ns), name) => ObjectRef::new(name).within(ns),
            (None, name) => ObjectRef::new(name),
        };
        Ok(self.get(&obj_ref))
    }
}
