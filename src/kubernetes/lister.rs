// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Read-only listers over indexed stores
//!
//! A [`Lister`] wraps a shared handle to a store and answers two queries:
//! list by label selector and get by name. It never writes to the store and
//! hands out the stored `Arc`s, which callers must treat as read-only.
//! Store errors are returned to the caller untouched.

use kube::Resource;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use super::labels::Selector;
use super::store::{self, Indexer};
use crate::apis::certmanager::{ClusterIssuer, Issuer};

/// Group-qualified resource name used in error messages, e.g. `clusterissuer.cert-manager.io`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new(group: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }

    /// Lowercased kind and API group of a static resource type
    pub fn of<K>() -> Self
    where
        K: Resource,
        K::DynamicType: Default,
    {
        let dt = K::DynamicType::default();
        Self::new(K::group(&dt), K::kind(&dt).to_lowercase())
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

/// Lister error: either the object is missing or the store failed
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: GroupResource, name: String },

    #[error(transparent)]
    Store(E),
}

impl<E> Error<E> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// The underlying store error, if this is one
    pub fn into_store_error(self) -> Option<E> {
        match self {
            Error::Store(e) => Some(e),
            Error::NotFound { .. } => None,
        }
    }
}

/// Typed read accessor for objects of kind `K` held in store `S`
pub struct Lister<K, S> {
    indexer: Arc<S>,
    _kind: PhantomData<fn() -> K>,
}

impl<K, S> Clone for Lister<K, S> {
    fn clone(&self) -> Self {
        Self {
            indexer: Arc::clone(&self.indexer),
            _kind: PhantomData,
        }
    }
}

impl<K, S> fmt::Debug for Lister<K, S>
where
    K: Resource,
    K::DynamicType: Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lister")
            .field("resource", &GroupResource::of::<K>().to_string())
            .finish_non_exhaustive()
    }
}

impl<K, S> Lister<K, S>
where
    K: Resource,
    K::DynamicType: Default,
    S: Indexer<K>,
{
    pub fn new(indexer: Arc<S>) -> Self {
        Self {
            indexer,
            _kind: PhantomData,
        }
    }

    /// All objects whose labels match the selector, in store iteration order
    pub fn list(&self, selector: &Selector) -> Result<Vec<Arc<K>>, Error<S::Error>> {
        let mut ret = Vec::new();
        store::list_all(self.indexer.as_ref(), selector, |obj| ret.push(Arc::clone(obj)))
            .map_err(Error::Store)?;
        Ok(ret)
    }

    /// The object stored under `name`
    pub fn get(&self, name: &str) -> Result<Arc<K>, Error<S::Error>> {
        match self.indexer.get_by_key(name).map_err(Error::Store)? {
            Some(obj) => Ok(obj),
            None => Err(Error::NotFound {
                resource: GroupResource::of::<K>(),
                name: name.to_string(),
            }),
        }
    }

    /// Lister restricted to one namespace, for namespaced kinds
    pub fn namespaced(&self, namespace: &str) -> NamespaceLister<K, S> {
        NamespaceLister {
            indexer: Arc::clone(&self.indexer),
            namespace: namespace.to_string(),
            _kind: PhantomData,
        }
    }
}

/// Read accessor for namespaced objects within a single namespace
pub struct NamespaceLister<K, S> {
    indexer: Arc<S>,
    namespace: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K, S> Clone for NamespaceLister<K, S> {
    fn clone(&self) -> Self {
        Self {
            indexer: Arc::clone(&self.indexer),
            namespace: self.namespace.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K, S> NamespaceLister<K, S>
where
    K: Resource,
    K::DynamicType: Default,
    S: Indexer<K>,
{
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Objects in this namespace whose labels match the selector
    pub fn list(&self, selector: &Selector) -> Result<Vec<Arc<K>>, Error<S::Error>> {
        let mut ret = Vec::new();
        store::list_all_by_namespace(self.indexer.as_ref(), &self.namespace, selector, |obj| {
            ret.push(Arc::clone(obj))
        })
        .map_err(Error::Store)?;
        Ok(ret)
    }

    /// The object stored under `namespace/name`
    pub fn get(&self, name: &str) -> Result<Arc<K>, Error<S::Error>> {
        let key = format!("{}/{}", self.namespace, name);
        match self.indexer.get_by_key(&key).map_err(Error::Store)? {
            Some(obj) => Ok(obj),
            None => Err(Error::NotFound {
                resource: GroupResource::of::<K>(),
                name: name.to_string(),
            }),
        }
    }
}

/// Lister for cert-manager `ClusterIssuer`s
pub type ClusterIssuerLister<S> = Lister<ClusterIssuer, S>;

/// Lister for cert-manager `Issuer`s
pub type IssuerLister<S> = Lister<Issuer, S>;

pub fn new_cluster_issuer_lister<S: Indexer<ClusterIssuer>>(indexer: Arc<S>) -> ClusterIssuerLister<S> {
    Lister::new(indexer)
}

pub fn new_issuer_lister<S: Indexer<Issuer>>(indexer: Arc<S>) -> IssuerLister<S> {
    Lister::new(indexer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::certmanager::{ClusterIssuerSpec, IssuerSpec};
    use crate::kubernetes::store::MemoryStore;
    use kube::ResourceExt;
    use std::collections::BTreeSet;

    fn cluster_issuer(name: &str, env: &str) -> ClusterIssuer {
        let mut issuer = ClusterIssuer::new(name, ClusterIssuerSpec::default());
        issuer
            .labels_mut()
            .insert("env".to_string(), env.to_string());
        issuer
    }

    fn names<K: Resource>(objs: &[Arc<K>]) -> BTreeSet<String> {
        objs.iter().map(|o| o.name_any()).collect()
    }

    fn example_lister() -> ClusterIssuerLister<MemoryStore<ClusterIssuer>> {
        let store = MemoryStore::from_objects([cluster_issuer("a", "prod"), cluster_issuer("b", "dev")])
            .unwrap();
        new_cluster_issuer_lister(Arc::new(store))
    }

    #[test]
    fn test_group_resource_display() {
        assert_eq!(
            GroupResource::of::<ClusterIssuer>().to_string(),
            "clusterissuer.cert-manager.io"
        );
        assert_eq!(GroupResource::new("", "pod").to_string(), "pod");
    }

    #[test]
    fn test_list_by_label() {
        let lister = example_lister();
        let prod = lister.list(&Selector::parse("env=prod").unwrap()).unwrap();
        assert_eq!(names(&prod), BTreeSet::from(["a".to_string()]));
    }

    #[test]
    fn test_list_everything_and_nothing() {
        let lister = example_lister();
        assert_eq!(lister.list(&Selector::everything()).unwrap().len(), 2);
        assert!(lister.list(&Selector::nothing()).unwrap().is_empty());
        assert!(lister.list(&Selector::parse("env=staging").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_get_returns_stored_object() {
        let store = Arc::new(MemoryStore::new());
        store.insert(cluster_issuer("b", "dev")).unwrap();
        let lister = new_cluster_issuer_lister(Arc::clone(&store));

        let b = lister.get("b").unwrap();
        let stored = store.get_by_key("b").unwrap().unwrap();
        assert!(Arc::ptr_eq(&b, &stored));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let lister = example_lister();
        let err = lister.get("c").unwrap_err();
        assert!(err.is_not_found());
        match &err {
            Error::NotFound { resource, name } => {
                assert_eq!(resource.resource, "clusterissuer");
                assert_eq!(resource.group, "cert-manager.io");
                assert_eq!(name, "c");
            }
            Error::Store(e) => panic!("unexpected store error: {}", e),
        }
        assert_eq!(err.to_string(), "clusterissuer.cert-manager.io \"c\" not found");
        assert!(err.into_store_error().is_none());
    }

    #[test]
    fn test_lister_sees_later_store_updates() {
        let store = Arc::new(MemoryStore::new());
        let lister = new_cluster_issuer_lister(Arc::clone(&store));
        assert!(lister.get("late").unwrap_err().is_not_found());

        store.insert(cluster_issuer("late", "prod")).unwrap();
        assert_eq!(lister.get("late").unwrap().name_any(), "late");
    }

    #[test]
    fn test_namespace_lister() {
        let store = MemoryStore::new();
        for (ns, name, env) in [("team-a", "ca", "prod"), ("team-a", "acme", "dev"), ("team-b", "ca", "prod")] {
            let mut issuer = Issuer::new(name, IssuerSpec::default());
            issuer.metadata.namespace = Some(ns.to_string());
            issuer.labels_mut().insert("env".to_string(), env.to_string());
            store.insert(issuer).unwrap();
        }
        let lister = new_issuer_lister(Arc::new(store));
        let team_a = lister.namespaced("team-a");
        assert_eq!(team_a.namespace(), "team-a");

        let all = team_a.list(&Selector::everything()).unwrap();
        assert_eq!(names(&all), BTreeSet::from(["ca".to_string(), "acme".to_string()]));

        let prod = team_a.list(&Selector::parse("env=prod").unwrap()).unwrap();
        assert_eq!(prod.len(), 1);
        assert_eq!(prod[0].namespace().as_deref(), Some("team-a"));

        assert_eq!(team_a.get("acme").unwrap().name_any(), "acme");
        let err = lister.namespaced("team-b").get("acme").unwrap_err();
        assert_eq!(err.to_string(), "issuer.cert-manager.io \"acme\" not found");
    }
}
